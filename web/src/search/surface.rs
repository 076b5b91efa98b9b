//! The slice of a map library the search page relies on.
//!
//! The model follows the source/layer split of vector map libraries: a
//! source holds data, layers render a source with a style and an optional
//! filter. Layers are never recreated; new data replaces the source content.

use shared_types::{Bounds, EntityFeature, FeatureCollection, LngLat};

use crate::config::FitBoundsOptions;

/// Content of a map source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceData {
    Features(FeatureCollection),
    /// A single closed ring of `[lng, lat]` vertices.
    Polygon(Vec<[f64; 2]>),
    Empty,
}

/// Which features of a point source a layer draws, keyed on `is_base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerFilter {
    BaseOnly,
    NeighborsOnly,
}

impl LayerFilter {
    pub fn matches(&self, feature: &EntityFeature) -> bool {
        match self {
            LayerFilter::BaseOnly => feature.is_base(),
            LayerFilter::NeighborsOnly => !feature.is_base(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CirclePaint {
    pub radius: f64,
    pub color: &'static str,
    pub stroke_width: f64,
    pub stroke_color: &'static str,
    pub opacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillPaint {
    pub color: &'static str,
    pub opacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePaint {
    pub color: &'static str,
    pub width: f64,
    pub dash: [f64; 2],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerPaint {
    Circle(CirclePaint),
    Fill(FillPaint),
    Line(LinePaint),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: &'static str,
    pub source: &'static str,
    pub paint: LayerPaint,
    pub filter: Option<LayerFilter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Default,
    Pointer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Move,
    Leave,
    Click,
}

/// A pointer event raised by a subscribed layer.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    PointerMove {
        layer: String,
        at: LngLat,
        feature: Option<EntityFeature>,
    },
    PointerLeave {
        layer: String,
    },
    Click {
        layer: String,
        feature: Option<EntityFeature>,
    },
}

impl MapEvent {
    pub fn layer(&self) -> &str {
        match self {
            MapEvent::PointerMove { layer, .. }
            | MapEvent::PointerLeave { layer }
            | MapEvent::Click { layer, .. } => layer,
        }
    }
}

pub trait MapSurface {
    fn has_source(&self, id: &str) -> bool;
    fn add_source(&mut self, id: &'static str, data: SourceData);
    fn set_source_data(&mut self, id: &str, data: SourceData);
    fn add_layer(&mut self, layer: LayerSpec);

    fn fit_bounds(&mut self, bounds: Bounds, options: FitBoundsOptions);
    fn fly_to(&mut self, center: LngLat, zoom: f64, speed: f64);
    fn center(&self) -> LngLat;
    fn set_center(&mut self, center: LngLat);

    /// Places the user-location marker, moving it if it already exists.
    fn place_user_marker(&mut self, at: LngLat, color: &'static str);

    fn set_cursor(&mut self, cursor: Cursor);
    fn show_popup(&mut self, at: LngLat, text: &str);
    fn hide_popup(&mut self);

    /// Starts delivering `kind` events for features of `layer_id` as
    /// [`MapEvent`]s.
    fn subscribe(&mut self, layer_id: &'static str, kind: PointerEventKind);
}

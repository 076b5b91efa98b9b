use shared_types::{circle_ring, Bounds, FeatureCollection};

use crate::config::SearchSettings;
use crate::search::interactions::InteractionRegistry;
use crate::search::surface::{
    CirclePaint, Cursor, FillPaint, LayerFilter, LayerPaint, LayerSpec, LinePaint, MapSurface,
    SourceData,
};

pub const NEARBY_SOURCE: &str = "nearby-entities";
pub const NEARBY_LAYER: &str = "nearby-circles";
pub const BASE_LAYER: &str = "base-entity";
pub const CATALOG_SOURCE: &str = "all-entities";
pub const CATALOG_LAYER: &str = "all-entities-layer";
pub const CIRCLE_SOURCE: &str = "range-circle";
pub const CIRCLE_FILL_LAYER: &str = "range-circle-fill";
pub const CIRCLE_LINE_LAYER: &str = "range-circle-line";

const ACCENT: &str = "#2f6f5e";
const PAPER: &str = "#f7f3e9";

const NEIGHBOR_PAINT: CirclePaint = CirclePaint {
    radius: 7.0,
    color: "#b86b3d",
    stroke_width: 2.0,
    stroke_color: "#fff7e6",
    opacity: 0.9,
};

const BASE_PAINT: CirclePaint = CirclePaint {
    radius: 9.0,
    color: ACCENT,
    stroke_width: 3.0,
    stroke_color: PAPER,
    opacity: 1.0,
};

const CATALOG_PAINT: CirclePaint = CirclePaint {
    radius: 5.0,
    color: "#4c4339",
    stroke_width: 1.0,
    stroke_color: PAPER,
    opacity: 0.55,
};

/// What [`MapLayers::update_nearby`] did besides replacing the points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyUpdate {
    pub circle_drawn: bool,
    pub fitted_to: Option<Bounds>,
}

/// Owns the map surface and keeps the search layers in sync with data.
pub struct MapLayers<M> {
    surface: M,
    interactions: InteractionRegistry,
}

impl<M: MapSurface> MapLayers<M> {
    pub fn new(surface: M) -> Self {
        Self {
            surface,
            interactions: InteractionRegistry::default(),
        }
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut M {
        &mut self.surface
    }

    pub fn interactions(&self) -> &InteractionRegistry {
        &self.interactions
    }

    /// Shows a search result: points split into base/neighbor layers, the
    /// range circle around the base entity, and a viewport fitted to all
    /// points.
    pub fn update_nearby(
        &mut self,
        data: &FeatureCollection,
        range_meters: f64,
        settings: &SearchSettings,
    ) -> NearbyUpdate {
        if self.surface.has_source(NEARBY_SOURCE) {
            self.replace_points(NEARBY_SOURCE, data);
        } else {
            self.create_nearby_layers(data);
        }

        let center = data.base_feature().and_then(|base| base.geometry);
        let circle = match center {
            Some(center) if range_meters.is_finite() && range_meters > 0.0 => Some(circle_ring(
                center,
                range_meters,
                settings.circle_steps,
            )),
            _ => None,
        };
        let circle_drawn = circle.is_some();
        let circle_data = circle.map_or(SourceData::Empty, SourceData::Polygon);
        self.surface.set_source_data(CIRCLE_SOURCE, circle_data);

        let fitted_to = data.bounds();
        if let Some(bounds) = fitted_to {
            self.surface.fit_bounds(bounds, settings.fit_bounds);
            // The viewport moves, so whatever was hovered is no longer under the pointer
            self.clear_hover();
        }

        NearbyUpdate {
            circle_drawn,
            fitted_to,
        }
    }

    /// Shows the full catalog in its own muted layer.
    pub fn update_catalog(&mut self, data: &FeatureCollection) {
        if self.surface.has_source(CATALOG_SOURCE) {
            self.replace_points(CATALOG_SOURCE, data);
            return;
        }

        self.surface
            .add_source(CATALOG_SOURCE, SourceData::Features(data.clone()));
        self.surface.add_layer(LayerSpec {
            id: CATALOG_LAYER,
            source: CATALOG_SOURCE,
            paint: LayerPaint::Circle(CATALOG_PAINT),
            filter: None,
        });
        self.interactions.register(&mut self.surface, CATALOG_LAYER);
    }

    /// Swaps the points of a source. Replaced markers never report a pointer
    /// leave, so hover feedback is reset here.
    fn replace_points(&mut self, source: &'static str, data: &FeatureCollection) {
        self.surface
            .set_source_data(source, SourceData::Features(data.clone()));
        self.clear_hover();
    }

    fn clear_hover(&mut self) {
        self.surface.set_cursor(Cursor::Default);
        self.surface.hide_popup();
    }

    fn create_nearby_layers(&mut self, data: &FeatureCollection) {
        self.surface
            .add_source(NEARBY_SOURCE, SourceData::Features(data.clone()));
        self.surface.add_layer(LayerSpec {
            id: NEARBY_LAYER,
            source: NEARBY_SOURCE,
            paint: LayerPaint::Circle(NEIGHBOR_PAINT),
            filter: Some(LayerFilter::NeighborsOnly),
        });
        self.surface.add_layer(LayerSpec {
            id: BASE_LAYER,
            source: NEARBY_SOURCE,
            paint: LayerPaint::Circle(BASE_PAINT),
            filter: Some(LayerFilter::BaseOnly),
        });

        if !self.surface.has_source(CIRCLE_SOURCE) {
            self.surface.add_source(CIRCLE_SOURCE, SourceData::Empty);
            self.surface.add_layer(LayerSpec {
                id: CIRCLE_FILL_LAYER,
                source: CIRCLE_SOURCE,
                paint: LayerPaint::Fill(FillPaint {
                    color: ACCENT,
                    opacity: 0.12,
                }),
                filter: None,
            });
            self.surface.add_layer(LayerSpec {
                id: CIRCLE_LINE_LAYER,
                source: CIRCLE_SOURCE,
                paint: LayerPaint::Line(LinePaint {
                    color: ACCENT,
                    width: 2.0,
                    dash: [2.0, 2.0],
                }),
                filter: None,
            });
        }

        self.interactions.register(&mut self.surface, NEARBY_LAYER);
        self.interactions.register(&mut self.surface, BASE_LAYER);
    }
}

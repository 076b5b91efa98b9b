//! [`MapSurface`] on top of Leaflet.
//!
//! Leaflet has no source/layer split, so sources are kept here and every
//! logical layer owns one `L.layerGroup` that is emptied and refilled when its
//! source changes. The groups themselves are created once.

use std::collections::HashMap;

use futures::channel::mpsc::UnboundedSender;
use js_sys::Array;
use leptos::logging::warn;
use leptos_leaflet::leaflet::{
    CircleMarker, CircleOptions, FitBoundsOptions as LeafletFitOptions, LatLng, LatLngBounds,
    LayerGroup, Map, MouseEvent, Point, Polygon, PolylineOptions, Popup, PopupOptions,
    ZoomPanOptions,
};
use shared_types::{Bounds, EntityFeature, LngLat};
use wasm_bindgen::prelude::*;

use crate::config::FitBoundsOptions;
use crate::search::surface::{
    CirclePaint, Cursor, LayerPaint, LayerSpec, MapEvent, MapSurface, PointerEventKind,
    SourceData,
};
use crate::search::Command;

type PointerHandler = Closure<dyn FnMut(MouseEvent)>;

fn lat_lng(at: LngLat) -> LatLng {
    LatLng::new(at.lat, at.lng)
}

fn leaflet_event(kind: PointerEventKind) -> &'static str {
    match kind {
        PointerEventKind::Move => "mousemove",
        PointerEventKind::Leave => "mouseout",
        PointerEventKind::Click => "click",
    }
}

fn circle_options(paint: &CirclePaint) -> CircleOptions {
    let options = CircleOptions::new();
    options.set_radius(paint.radius);
    options.set_fill_color(paint.color.to_string());
    options.set_fill_opacity(paint.opacity);
    options.set_color(paint.stroke_color.to_string());
    options.set_weight(paint.stroke_width);
    options.set_opacity(paint.opacity);
    options
}

struct LayerBinding {
    spec: LayerSpec,
    group: LayerGroup,
    handlers: Vec<PointerHandler>,
}

pub struct LeafletSurface {
    map: Map,
    sources: HashMap<String, SourceData>,
    layers: Vec<LayerBinding>,
    subscriptions: HashMap<&'static str, Vec<PointerEventKind>>,
    popup: Popup,
    user_marker: Option<CircleMarker>,
    commands: UnboundedSender<Command>,
}

impl LeafletSurface {
    pub fn new(map: Map, commands: UnboundedSender<Command>) -> Self {
        let options = PopupOptions::new();
        options.set_close_button(false);
        options.set_close_on_click(false);
        options.set_auto_pan(false);

        Self {
            map,
            sources: HashMap::new(),
            layers: Vec::new(),
            subscriptions: HashMap::new(),
            popup: Popup::new(&options, None),
            user_marker: None,
            commands,
        }
    }

    fn render_source(&mut self, source: &str) {
        let Self {
            sources,
            layers,
            subscriptions,
            commands,
            ..
        } = self;
        let data = sources.get(source);
        for binding in layers.iter_mut().filter(|b| b.spec.source == source) {
            let kinds = subscriptions
                .get(binding.spec.id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            render_layer(binding, data, kinds, commands);
        }
    }
}

fn render_layer(
    binding: &mut LayerBinding,
    data: Option<&SourceData>,
    kinds: &[PointerEventKind],
    commands: &UnboundedSender<Command>,
) {
    binding.group.clear_layers();
    binding.handlers.clear();

    match (binding.spec.paint, data) {
        (LayerPaint::Circle(paint), Some(SourceData::Features(collection))) => {
            let options = circle_options(&paint);
            let LayerSpec { id, filter, .. } = binding.spec;
            let matching = collection
                .iter()
                .filter(|f| filter.map_or(true, |filter| filter.matches(f)));
            for feature in matching {
                let Some(at) = feature.geometry else {
                    continue;
                };
                let marker = CircleMarker::new_with_options(&lat_lng(at), &options);
                for kind in kinds {
                    let handler = pointer_handler(*kind, id, feature, commands);
                    marker.on(leaflet_event(*kind), handler.as_ref());
                    binding.handlers.push(handler);
                }
                binding.group.add_layer(&marker);
            }
        }
        (LayerPaint::Fill(paint), Some(SourceData::Polygon(ring))) => {
            let options = PolylineOptions::new();
            options.set_stroke(false);
            options.set_fill_color(paint.color.to_string());
            options.set_fill_opacity(paint.opacity);
            options.set_interactive(false);
            binding
                .group
                .add_layer(&Polygon::new_with_options(&ring_array(ring), &options));
        }
        (LayerPaint::Line(paint), Some(SourceData::Polygon(ring))) => {
            // Dash lengths are in line widths, Leaflet wants pixels
            let dash = format!(
                "{} {}",
                paint.dash[0] * paint.width,
                paint.dash[1] * paint.width
            );
            let options = PolylineOptions::new();
            options.set_fill(false);
            options.set_color(paint.color.to_string());
            options.set_weight(paint.width);
            options.set_dash_array(dash);
            options.set_interactive(false);
            binding
                .group
                .add_layer(&Polygon::new_with_options(&ring_array(ring), &options));
        }
        _ => {}
    }
}

fn ring_array(ring: &[[f64; 2]]) -> Array {
    ring.iter()
        .map(|[lng, lat]| JsValue::from(LatLng::new(*lat, *lng)))
        .collect()
}

fn pointer_handler(
    kind: PointerEventKind,
    layer: &'static str,
    feature: &EntityFeature,
    commands: &UnboundedSender<Command>,
) -> PointerHandler {
    let feature = feature.clone();
    let commands = commands.clone();
    Closure::wrap(Box::new(move |event: MouseEvent| {
        let event = match kind {
            PointerEventKind::Move => {
                let at = event.lat_lng();
                MapEvent::PointerMove {
                    layer: layer.to_string(),
                    at: LngLat::new(at.lng(), at.lat()),
                    feature: Some(feature.clone()),
                }
            }
            PointerEventKind::Leave => MapEvent::PointerLeave {
                layer: layer.to_string(),
            },
            PointerEventKind::Click => MapEvent::Click {
                layer: layer.to_string(),
                feature: Some(feature.clone()),
            },
        };
        if commands.unbounded_send(Command::Map(event)).is_err() {
            warn!("Map event dropped, controller is gone");
        }
    }) as Box<dyn FnMut(MouseEvent)>)
}

impl MapSurface for LeafletSurface {
    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn add_source(&mut self, id: &'static str, data: SourceData) {
        self.sources.insert(id.to_string(), data);
        self.render_source(id);
    }

    fn set_source_data(&mut self, id: &str, data: SourceData) {
        match self.sources.get_mut(id) {
            Some(slot) => *slot = data,
            None => {
                warn!("Ignoring data for unknown source {}", id);
                return;
            }
        }
        self.render_source(id);
    }

    fn add_layer(&mut self, layer: LayerSpec) {
        let group = LayerGroup::new();
        group.add_to(&self.map);
        let mut binding = LayerBinding {
            spec: layer,
            group,
            handlers: Vec::new(),
        };
        let kinds = self
            .subscriptions
            .get(binding.spec.id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        render_layer(
            &mut binding,
            self.sources.get(binding.spec.source),
            kinds,
            &self.commands,
        );
        self.layers.push(binding);
    }

    fn fit_bounds(&mut self, bounds: Bounds, options: FitBoundsOptions) {
        let bounds = LatLngBounds::new(&lat_lng(bounds.south_west), &lat_lng(bounds.north_east));
        let fit = LeafletFitOptions::new();
        fit.set_padding(Point::new(options.padding, options.padding));
        fit.set_max_zoom(options.max_zoom);
        fit.set_duration(f64::from(options.duration_ms) / 1000.0);
        self.map.fly_to_bounds_with_options(&bounds, &fit);
    }

    fn fly_to(&mut self, center: LngLat, zoom: f64, speed: f64) {
        // Leaflet has no speed option, a slower flight just lasts longer
        let options = ZoomPanOptions::new();
        options.set_duration(if speed > 0.0 { 1.0 / speed } else { 1.0 });
        self.map
            .fly_to_with_options(&lat_lng(center), zoom, &options);
    }

    fn center(&self) -> LngLat {
        let center = self.map.get_center();
        LngLat::new(center.lng(), center.lat())
    }

    fn set_center(&mut self, center: LngLat) {
        self.map.set_view(&lat_lng(center), self.map.get_zoom());
    }

    fn place_user_marker(&mut self, at: LngLat, color: &'static str) {
        if let Some(previous) = self.user_marker.take() {
            previous.remove();
        }

        let options = CircleOptions::new();
        options.set_radius(8.0);
        options.set_color("#ffffff".to_string());
        options.set_weight(2.0);
        options.set_fill_color(color.to_string());
        options.set_fill_opacity(1.0);
        options.set_interactive(false);

        let marker = CircleMarker::new_with_options(&lat_lng(at), &options);
        marker.add_to(&self.map);
        self.user_marker = Some(marker);
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        let value = match cursor {
            Cursor::Default => "",
            Cursor::Pointer => "pointer",
        };
        if let Err(err) = self
            .map
            .get_container()
            .style()
            .set_property("cursor", value)
        {
            warn!("Could not set map cursor: {:?}", err);
        }
    }

    fn show_popup(&mut self, at: LngLat, text: &str) {
        // A text node keeps entity names from being parsed as HTML
        let Some(content) = web_sys::window()
            .and_then(|window| window.document())
            .map(|document| document.create_text_node(text))
        else {
            warn!("No document to render the popup into");
            return;
        };
        self.popup.set_lat_lng(&lat_lng(at));
        self.popup.set_content(&JsValue::from(content));
        self.popup.open_on(&self.map);
    }

    fn hide_popup(&mut self) {
        self.popup.remove();
    }

    fn subscribe(&mut self, layer_id: &'static str, kind: PointerEventKind) {
        let kinds = self.subscriptions.entry(layer_id).or_default();
        if kinds.contains(&kind) {
            return;
        }
        kinds.push(kind);

        // Markers already on the map were built without this handler
        if let Some(source) = self
            .layers
            .iter()
            .find(|b| b.spec.id == layer_id)
            .map(|b| b.spec.source)
        {
            self.render_source(source);
        }
    }
}

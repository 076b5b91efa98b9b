use std::collections::HashSet;

use crate::search::surface::{MapSurface, PointerEventKind};

/// Layers whose hover/click handlers are already attached.
#[derive(Debug, Default)]
pub struct InteractionRegistry {
    layers: HashSet<&'static str>,
}

impl InteractionRegistry {
    /// Subscribes move, leave and click events for `layer_id` the first time
    /// it is seen. Returns `false` when the layer was already registered.
    pub fn register<M: MapSurface>(&mut self, surface: &mut M, layer_id: &'static str) -> bool {
        if !self.layers.insert(layer_id) {
            return false;
        }
        for kind in [
            PointerEventKind::Move,
            PointerEventKind::Leave,
            PointerEventKind::Click,
        ] {
            surface.subscribe(layer_id, kind);
        }
        true
    }

    pub fn is_registered(&self, layer_id: &str) -> bool {
        self.layers.contains(layer_id)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

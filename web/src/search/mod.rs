//! Search page controller.
//!
//! [`SearchController`] owns everything the page mutates: the map layers, the
//! interaction registry and the request generation. It talks to the outside
//! through three seams: [`MapSurface`] for the map, [`EntityApi`] for the
//! backend and [`SearchPanel`] for the form and result widgets. All methods
//! take `&self` and are meant to be driven from one thread; no `RefCell`
//! borrow is held across an `.await`.

mod bootstrap;
pub mod form;
pub mod interactions;
pub mod layers;
mod orchestrator;
pub mod panel;
pub mod surface;

#[cfg(test)]
mod tests;

use std::cell::{Cell, Ref, RefCell};

pub use bootstrap::Geolocator;
pub use layers::MapLayers;
pub use orchestrator::Command;
pub use panel::{ResultList, SearchForm, SearchPanel, Status, StatusTone};
pub use surface::{MapEvent, MapSurface};

use crate::{api::EntityApi, config::SearchSettings};

pub struct SearchController<M, A, P> {
    layers: RefCell<MapLayers<M>>,
    api: A,
    panel: P,
    settings: SearchSettings,
    generation: Cell<u64>,
    ready: Cell<bool>,
}

impl<M, A, P> SearchController<M, A, P>
where
    M: MapSurface,
    A: EntityApi,
    P: SearchPanel,
{
    pub fn new(surface: M, api: A, panel: P, settings: SearchSettings) -> Self {
        Self {
            layers: RefCell::new(MapLayers::new(surface)),
            api,
            panel,
            settings,
            generation: Cell::new(0),
            ready: Cell::new(false),
        }
    }

    /// `true` once [`SearchController::bootstrap`] has run.
    pub fn is_ready(&self) -> bool {
        self.ready.get()
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn layers(&self) -> Ref<'_, MapLayers<M>> {
        self.layers.borrow()
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    fn next_generation(&self) -> u64 {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        generation
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.settings.drop_stale_responses && generation != self.generation.get()
    }
}

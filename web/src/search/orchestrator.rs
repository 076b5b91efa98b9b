use leptos::logging::{log, warn};

use crate::api::EntityApi;
use crate::search::panel::{
    ResultList, SearchPanel, Status, MSG_INVALID_FORM, MSG_SEARCHING, MSG_SEARCH_DONE,
    MSG_SEARCH_FAILED, UNNAMED,
};
use crate::search::surface::{Cursor, MapEvent, MapSurface};
use crate::search::SearchController;

/// Work queued for the controller by the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Submit,
    Map(MapEvent),
}

impl<M, A, P> SearchController<M, A, P>
where
    M: MapSurface,
    A: EntityApi,
    P: SearchPanel,
{
    pub async fn dispatch(&self, command: Command) {
        match command {
            Command::Submit => self.handle_submit().await,
            Command::Map(event) => self.handle_map_event(event).await,
        }
    }

    /// Runs one search from the current form contents.
    ///
    /// Submissions are never cancelled. A new one may start while an older
    /// request is still in flight; whether the older response may still
    /// overwrite the page depends on `SearchSettings::drop_stale_responses`.
    pub async fn handle_submit(&self) {
        if !self.is_ready() {
            log!("Search submitted before the map finished loading, ignoring");
            return;
        }

        let generation = self.next_generation();

        let query = match self.panel.read_form().validate() {
            Ok(query) => query,
            Err(err) => {
                log!("Rejected search form: {}", err);
                self.panel.set_status(Status::error(MSG_INVALID_FORM));
                self.panel.set_count(0);
                return;
            }
        };

        self.panel.set_status(Status::info(MSG_SEARCHING));
        self.panel.set_count(0);
        self.panel.clear_results();

        let outcome = self
            .api
            .fetch_nearby(&query.entity, query.range_meters)
            .await;

        if self.is_stale(generation) {
            log!(
                "Dropping response for '{}' (request {}), a newer search is active",
                query.entity,
                generation
            );
            return;
        }

        match outcome {
            Ok(data) => {
                let update = self.layers.borrow_mut().update_nearby(
                    &data,
                    query.range_meters,
                    &self.settings,
                );
                log!(
                    "Search '{}' returned {} features (circle: {}, fitted: {})",
                    query.entity,
                    data.len(),
                    update.circle_drawn,
                    update.fitted_to.is_some()
                );
                self.panel
                    .show_results(ResultList::from_features(&data.features));
                self.panel.set_status(Status::success(MSG_SEARCH_DONE));
                self.panel.set_count(data.neighbor_count());
            }
            Err(err) => {
                warn!("Search '{}' failed: {}", query.entity, err);
                self.panel
                    .set_status(Status::from_error(&err, MSG_SEARCH_FAILED));
                self.panel.set_count(0);
            }
        }
    }

    /// Reacts to a pointer event from one of the registered layers.
    pub async fn handle_map_event(&self, event: MapEvent) {
        if !self.layers.borrow().interactions().is_registered(event.layer()) {
            return;
        }

        match event {
            MapEvent::PointerMove {
                at,
                feature: Some(feature),
                ..
            } => {
                let name = feature.name().unwrap_or(UNNAMED);
                let mut layers = self.layers.borrow_mut();
                let surface = layers.surface_mut();
                surface.set_cursor(Cursor::Pointer);
                surface.show_popup(at, name);
            }
            MapEvent::PointerMove { feature: None, .. } => {}
            MapEvent::PointerLeave { .. } => {
                let mut layers = self.layers.borrow_mut();
                let surface = layers.surface_mut();
                surface.set_cursor(Cursor::Default);
                surface.hide_popup();
            }
            MapEvent::Click { feature, .. } => {
                let Some(name) = feature.as_ref().and_then(|f| f.name()) else {
                    return;
                };
                let name = name.to_string();
                self.panel.set_entity_input(&name);
                self.panel
                    .set_status(Status::info(format!("Centralizando em {}...", name)));
                self.handle_submit().await;
            }
        }
    }
}

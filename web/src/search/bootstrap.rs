use leptos::logging::{log, warn};
use shared_types::LngLat;

use crate::api::EntityApi;
use crate::config::GeolocationOptions;
use crate::error::GeolocationError;
use crate::search::panel::{
    ResultList, SearchPanel, Status, MSG_CATALOG_FAILED, MSG_CATALOG_LOADED, MSG_LOCATION_FAILED,
    MSG_LOCATION_FOUND, MSG_LOCATION_UNSUPPORTED,
};
use crate::search::surface::MapSurface;
use crate::search::SearchController;

/// Source of the user's current position.
#[allow(async_fn_in_trait)]
pub trait Geolocator {
    fn is_supported(&self) -> bool;

    async fn current_position(
        &self,
        options: GeolocationOptions,
    ) -> Result<LngLat, GeolocationError>;
}

impl<M, A, P> SearchController<M, A, P>
where
    M: MapSurface,
    A: EntityApi,
    P: SearchPanel,
{
    /// First-load sequence, run once the map is ready.
    ///
    /// Enables form submission, then locates the user and loads the catalog
    /// concurrently. Later calls do nothing.
    pub async fn bootstrap<G: Geolocator>(&self, geolocator: &G) {
        if self.ready.replace(true) {
            log!("Bootstrap already ran, skipping");
            return;
        }

        let load_center = self.layers.borrow().surface().center();
        futures::join!(
            self.locate_user(geolocator, load_center),
            self.load_catalog()
        );
    }

    async fn locate_user<G: Geolocator>(&self, geolocator: &G, load_center: LngLat) {
        if !geolocator.is_supported() {
            self.panel.set_status(Status::info(MSG_LOCATION_UNSUPPORTED));
            return;
        }

        match geolocator
            .current_position(self.settings.geolocation)
            .await
        {
            Ok(position) => {
                {
                    let mut layers = self.layers.borrow_mut();
                    let surface = layers.surface_mut();
                    let fly = self.settings.fly_to_user;
                    surface.fly_to(position, fly.zoom, fly.speed);
                    surface.place_user_marker(position, self.settings.user_marker_color);
                }
                self.panel.set_status(Status::success(MSG_LOCATION_FOUND));
            }
            Err(err) => {
                warn!("Geolocation unavailable: {}", err);
                self.panel.set_status(Status::error(MSG_LOCATION_FAILED));
                self.layers.borrow_mut().surface_mut().set_center(load_center);
            }
        }
    }

    async fn load_catalog(&self) {
        match self.api.fetch_all().await {
            Ok(data) => {
                self.layers.borrow_mut().update_catalog(&data);
                log!("Catalog loaded with {} entities", data.len());
                self.panel.set_status(Status::success(MSG_CATALOG_LOADED));
                self.panel.set_count(data.len());
                self.panel
                    .show_results(ResultList::from_features(&data.features));
            }
            Err(err) => {
                warn!("Catalog fetch failed: {}", err);
                self.panel
                    .set_status(Status::from_error(&err, MSG_CATALOG_FAILED));
            }
        }
    }
}

//! Access to the external entity search API.
//!
//! The browser never talks to the API directly: it calls the server functions
//! in [`server_fns`], which proxy the request from the SSR process.

#[cfg(feature = "ssr")]
pub mod client;
pub mod server_fns;

use shared_types::FeatureCollection;

use crate::error::ApiError;

/// The two queries the search page needs.
#[allow(async_fn_in_trait)]
pub trait EntityApi {
    /// Entities within `range_meters` of the entity named `entity`, plus the
    /// base entity itself flagged with `is_base`.
    async fn fetch_nearby(&self, entity: &str, range_meters: f64)
        -> Result<FeatureCollection, ApiError>;

    /// The whole catalog.
    async fn fetch_all(&self) -> Result<FeatureCollection, ApiError>;
}

/// [`EntityApi`] backed by the Leptos server functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerFnApi;

impl EntityApi for ServerFnApi {
    async fn fetch_nearby(
        &self,
        entity: &str,
        range_meters: f64,
    ) -> Result<FeatureCollection, ApiError> {
        server_fns::fetch_nearby_entities(entity.to_string(), range_meters)
            .await
            .map_err(ApiError::from)
    }

    async fn fetch_all(&self) -> Result<FeatureCollection, ApiError> {
        server_fns::fetch_all_entities().await.map_err(ApiError::from)
    }
}

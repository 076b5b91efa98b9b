use leptos::prelude::*;
use leptos::server;
use shared_types::FeatureCollection;

#[cfg(feature = "ssr")]
use crate::api::client::entity_client;

#[server]
pub async fn fetch_nearby_entities(
    entity: String,
    range: f64,
) -> Result<FeatureCollection, ServerFnError> {
    match entity_client().nearby(&entity, range).await {
        Ok(collection) => Ok(collection),
        Err(e) => Err(ServerFnError::new(e.to_string())),
    }
}

#[server]
pub async fn fetch_all_entities() -> Result<FeatureCollection, ServerFnError> {
    match entity_client().catalog().await {
        Ok(collection) => Ok(collection),
        Err(e) => Err(ServerFnError::new(e.to_string())),
    }
}

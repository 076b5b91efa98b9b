use std::sync::OnceLock;

use shared_types::FeatureCollection;

use crate::{config::ApiSettings, error::ApiError};

static ENTITY_CLIENT: OnceLock<EntityClient> = OnceLock::new();

/// Shared client, configured from the environment on first use.
pub fn entity_client() -> &'static EntityClient {
    ENTITY_CLIENT.get_or_init(|| EntityClient::new(ApiSettings::from_env()))
}

pub struct EntityClient {
    http: reqwest::Client,
    settings: ApiSettings,
}

impl EntityClient {
    pub fn new(settings: ApiSettings) -> Self {
        tracing::info!(base_url = %settings.base_url, "entity API client configured");
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    pub async fn nearby(
        &self,
        entity: &str,
        range_meters: f64,
    ) -> Result<FeatureCollection, ApiError> {
        self.get_collection(self.settings.nearby_url(entity, range_meters))
            .await
    }

    pub async fn catalog(&self) -> Result<FeatureCollection, ApiError> {
        self.get_collection(self.settings.catalog_url()).await
    }

    async fn get_collection(&self, url: String) -> Result<FeatureCollection, ApiError> {
        tracing::debug!(%url, "requesting entities");

        let response = self.http.get(&url).send().await.map_err(|e| {
            tracing::warn!(%url, error = %e, "entity API unreachable");
            ApiError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "entity API returned an error");
            return Err(ApiError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response.json().await?;
        let collection = FeatureCollection::from_geojson_value(&body).map_err(|e| {
            tracing::warn!(%url, error = %e, "entity API returned an unexpected body");
            ApiError::from(e)
        })?;

        tracing::debug!(%url, features = collection.len(), "entities received");
        Ok(collection)
    }
}

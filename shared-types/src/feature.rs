use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::geo::{bounds_of, Bounds, LngLat};

#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(String),
    #[error("expected a feature collection object, got {0}")]
    NotAnObject(&'static str),
    #[error("`features` must be an array, got {0}")]
    FeaturesNotArray(&'static str),
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct EntityProperties {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub is_base: bool,
}

/// One entity returned by the search API.
///
/// `geometry` is `None` when the payload carried no usable point (missing,
/// not a `Point`, or non-numeric coordinates). Such features still show up in
/// listings but never contribute to bounds or the radius circle.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct EntityFeature {
    pub geometry: Option<LngLat>,
    pub properties: EntityProperties,
}

impl EntityFeature {
    pub fn point(position: LngLat, properties: EntityProperties) -> Self {
        Self {
            geometry: Some(position),
            properties,
        }
    }

    pub fn is_base(&self) -> bool {
        self.properties.is_base
    }

    /// The entity name, treating an empty string as absent.
    pub fn name(&self) -> Option<&str> {
        self.properties.name.as_deref().filter(|name| !name.is_empty())
    }

    fn from_value(value: &Value) -> Self {
        let geometry = value.get("geometry").and_then(point_from_geometry);
        let properties = value
            .get("properties")
            .map(properties_from_value)
            .unwrap_or_default();

        Self {
            geometry,
            properties,
        }
    }
}

fn point_from_geometry(geometry: &Value) -> Option<LngLat> {
    if geometry.get("type").and_then(Value::as_str) != Some("Point") {
        return None;
    }
    let coordinates = geometry.get("coordinates")?.as_array()?;
    let lng = coordinates.first()?.as_f64()?;
    let lat = coordinates.get(1)?.as_f64()?;
    Some(LngLat::new(lng, lat))
}

fn properties_from_value(properties: &Value) -> EntityProperties {
    EntityProperties {
        id: properties.get("id").and_then(Value::as_i64),
        name: properties
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string),
        lat: properties.get("lat").and_then(Value::as_f64),
        lon: properties.get("lon").and_then(Value::as_f64),
        is_base: properties
            .get("is_base")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Ordered set of entities, as served by both search endpoints.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<EntityFeature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<EntityFeature>) -> Self {
        Self { features }
    }

    pub fn from_geojson_str(body: &str) -> Result<Self, DecodeError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| DecodeError::Json(e.to_string()))?;
        Self::from_geojson_value(&value)
    }

    /// Decodes a GeoJSON `FeatureCollection`.
    ///
    /// Only the envelope is strict. A missing or null `features` member is an
    /// empty collection, and individual malformed features are kept with
    /// whatever could be read from them.
    pub fn from_geojson_value(value: &Value) -> Result<Self, DecodeError> {
        let object = value
            .as_object()
            .ok_or_else(|| DecodeError::NotAnObject(json_kind(value)))?;

        let features = match object.get("features") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().map(EntityFeature::from_value).collect(),
            Some(other) => return Err(DecodeError::FeaturesNotArray(json_kind(other))),
        };

        Ok(Self { features })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityFeature> {
        self.features.iter()
    }

    /// First feature flagged as the search origin.
    pub fn base_feature(&self) -> Option<&EntityFeature> {
        self.features.iter().find(|feature| feature.is_base())
    }

    /// Features that are not the search origin, in original order.
    pub fn neighbors(&self) -> impl Iterator<Item = &EntityFeature> {
        self.features.iter().filter(|feature| !feature.is_base())
    }

    pub fn neighbor_count(&self) -> usize {
        self.neighbors().count()
    }

    /// Bounding box over every feature with a point geometry.
    pub fn bounds(&self) -> Option<Bounds> {
        bounds_of(self.features.iter().filter_map(|feature| feature.geometry))
    }
}

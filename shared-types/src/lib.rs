mod feature;
mod geo;

pub use feature::{DecodeError, EntityFeature, EntityProperties, FeatureCollection};
pub use geo::{bounds_of, circle_ring, Bounds, LngLat, DEFAULT_CIRCLE_STEPS, EARTH_RADIUS_M};

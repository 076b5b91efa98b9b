use serde::{Deserialize, Serialize};

/// Mean Earth radius used for all spherical math, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Vertex count used when the caller does not ask for a specific one.
pub const DEFAULT_CIRCLE_STEPS: usize = 64;

/// A geographic position in degrees, longitude first like GeoJSON.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

impl From<[f64; 2]> for LngLat {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

/// Axis-aligned box in degrees. Grows with [`Bounds::extend`].
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: LngLat,
    pub north_east: LngLat,
}

impl Bounds {
    pub fn from_point(point: LngLat) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }

    pub fn extend(&mut self, point: LngLat) {
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
    }
}

/// Builds a bounding box around every point, or `None` for an empty input.
pub fn bounds_of<I>(points: I) -> Option<Bounds>
where
    I: IntoIterator<Item = LngLat>,
{
    points.into_iter().fold(None, |acc, point| match acc {
        None => Some(Bounds::from_point(point)),
        Some(mut bounds) => {
            bounds.extend(point);
            Some(bounds)
        }
    })
}

/// Approximates a circle on the sphere as a closed ring of `steps + 1`
/// `[lng, lat]` vertices.
///
/// Each vertex is the destination point reached from `center` after
/// travelling `radius_m` meters along bearing `2π·i/steps`. The first and
/// last vertex coincide up to floating-point error.
///
/// Inputs are not validated: callers must reject non-positive or non-finite
/// radii before calling.
pub fn circle_ring(center: LngLat, radius_m: f64, steps: usize) -> Vec<[f64; 2]> {
    let lat1 = center.lat.to_radians();
    let lng1 = center.lng.to_radians();
    let angular_distance = radius_m / EARTH_RADIUS_M;

    let (sin_lat1, cos_lat1) = lat1.sin_cos();
    let (sin_ad, cos_ad) = angular_distance.sin_cos();

    (0..=steps)
        .map(|i| {
            let bearing = 2.0 * std::f64::consts::PI * i as f64 / steps as f64;
            let lat2 = (sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing.cos()).asin();
            let lng2 = lng1
                + (bearing.sin() * sin_ad * cos_lat1).atan2(cos_ad - sin_lat1 * lat2.sin());
            [lng2.to_degrees(), lat2.to_degrees()]
        })
        .collect()
}

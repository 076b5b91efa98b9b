use shared_types::LngLat;

/// Base URL of the entity search API when nothing overrides it.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

pub const TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

/// Rio de Janeiro city center.
pub const DEFAULT_CENTER: LngLat = LngLat {
    lng: -43.2094,
    lat: -22.911,
};
pub const DEFAULT_ZOOM: f64 = 11.0;

pub const DEFAULT_RANGE_METERS: &str = "500";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitBoundsOptions {
    pub padding: f64,
    pub max_zoom: f64,
    pub duration_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyToOptions {
    pub zoom: f64,
    pub speed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeolocationOptions {
    pub high_accuracy: bool,
    pub timeout_ms: u32,
    pub maximum_age_ms: u32,
}

/// Tunables for the search controller.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub fit_bounds: FitBoundsOptions,
    pub fly_to_user: FlyToOptions,
    pub geolocation: GeolocationOptions,
    pub circle_steps: usize,
    pub user_marker_color: &'static str,
    /// When set, a search response that resolves after a newer search was
    /// started is discarded instead of overwriting the newer result.
    pub drop_stale_responses: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            fit_bounds: FitBoundsOptions {
                padding: 80.0,
                max_zoom: 14.0,
                duration_ms: 800,
            },
            fly_to_user: FlyToOptions {
                zoom: 13.0,
                speed: 0.9,
            },
            geolocation: GeolocationOptions {
                high_accuracy: true,
                timeout_ms: 8_000,
                maximum_age_ms: 60_000,
            },
            circle_steps: shared_types::DEFAULT_CIRCLE_STEPS,
            user_marker_color: "#2f6f5e",
            drop_stale_responses: true,
        }
    }
}

/// Where the server-side proxy sends entity requests.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    pub base_url: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl ApiSettings {
    /// Reads `GEOSEARCH_API_BASE`, falling back to [`DEFAULT_API_BASE`].
    pub fn from_env() -> Self {
        std::env::var("GEOSEARCH_API_BASE")
            .ok()
            .map(|base| base.trim().to_string())
            .filter(|base| !base.is_empty())
            .map(Self::with_base)
            .unwrap_or_default()
    }

    pub fn with_base(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn nearby_url(&self, entity: &str, range_meters: f64) -> String {
        format!(
            "{}/entities/nearby?entity={}&range={}&geojson=true",
            self.base_url,
            urlencoding::encode(entity),
            range_meters
        )
    }

    pub fn catalog_url(&self) -> String {
        format!("{}/entities?geojson=true", self.base_url)
    }
}

use shared_types::DecodeError;
use thiserror::Error;

/// Failure of a call to the entity search API.
///
/// `Display` is what ends up in the status bar, so `Status` renders the
/// user-facing message and `Server` passes through whatever the proxy said.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    #[error("Erro na API ({0})")]
    Status(u16),
    #[error("Falha de rede: {0}")]
    Transport(String),
    #[error("Resposta invalida da API: {0}")]
    Decode(String),
    #[error("{0}")]
    Server(String),
}

impl From<DecodeError> for ApiError {
    fn from(err: DecodeError) -> Self {
        ApiError::Decode(err.to_string())
    }
}

#[cfg(feature = "ssr")]
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ApiError::Status(status.as_u16()),
            None => ApiError::Transport(err.to_string()),
        }
    }
}

impl From<leptos::prelude::ServerFnError> for ApiError {
    fn from(err: leptos::prelude::ServerFnError) -> Self {
        use leptos::prelude::ServerFnError;
        match err {
            ServerFnError::ServerError(message) => ApiError::Server(message),
            other => ApiError::Transport(other.to_string()),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeolocationError {
    #[error("geolocation permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("geolocation timed out")]
    Timeout,
    #[error("geolocation failed: {0}")]
    Other(String),
}

impl GeolocationError {
    /// Maps a `GeolocationPositionError.code` to a variant.
    pub fn from_code(code: u16, message: String) -> Self {
        match code {
            1 => GeolocationError::PermissionDenied,
            2 => GeolocationError::PositionUnavailable,
            3 => GeolocationError::Timeout,
            _ => GeolocationError::Other(message),
        }
    }
}

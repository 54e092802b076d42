//! Crate-wide error type for review providers.

use thiserror::Error;

/// Convenient alias for provider results.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Failure of a store-review provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Missing or malformed provider configuration.
    #[error("provider config error: {0}")]
    Config(String),

    /// Unauthorized (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// Not found (HTTP 404).
    #[error("not found")]
    NotFound,

    /// Rate limited (HTTP 429).
    #[error("rate limited")]
    RateLimited,

    /// Gateway / server error (HTTP 5xx).
    #[error("server error: status {0}")]
    Server(u16),

    /// Other non-2xx HTTP status.
    #[error("http status error: status {0}")]
    HttpStatus(u16),

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without HTTP status.
    #[error("network error: {0}")]
    Network(String),

    /// Provider answered with an explicit error payload.
    #[error("provider reported an error: {0}")]
    Upstream(String),

    /// Unexpected/invalid shape of provider response.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Maps a non-2xx status code into a specific variant.
    pub fn from_status(code: u16) -> Self {
        match code {
            401 => ProviderError::Unauthorized,
            403 => ProviderError::Forbidden,
            404 => ProviderError::NotFound,
            429 => ProviderError::RateLimited,
            500..=599 => ProviderError::Server(code),
            _ => ProviderError::HttpStatus(code),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return ProviderError::Timeout;
        }
        if let Some(status) = e.status() {
            return ProviderError::from_status(status.as_u16());
        }
        if e.is_decode() {
            return ProviderError::InvalidResponse(e.to_string());
        }
        ProviderError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_variants() {
        assert!(matches!(ProviderError::from_status(401), ProviderError::Unauthorized));
        assert!(matches!(ProviderError::from_status(429), ProviderError::RateLimited));
        assert!(matches!(ProviderError::from_status(503), ProviderError::Server(503)));
        assert!(matches!(ProviderError::from_status(418), ProviderError::HttpStatus(418)));
    }
}

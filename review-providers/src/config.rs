//! SerpAPI and store identifiers loaded from the environment.

use std::env;

use crate::errors::{ProviderError, ProviderResult};

pub const DEFAULT_SERPAPI_BASE: &str = "https://serpapi.com/search.json";
pub const DEFAULT_GOOGLE_PLAY_APP_ID: &str = "life.liquide.app";
pub const DEFAULT_APPLE_PRODUCT_ID: &str = "1624726081";
pub const DEFAULT_APPLE_COUNTRY: &str = "in";
pub const DEFAULT_SOURCE_COUNTRY: &str = "India";
pub const DEFAULT_MAX_PAGES: usize = 5;

/// Runtime configuration shared by both store clients.
#[derive(Debug, Clone)]
pub struct SerpApiConfig {
    pub api_key: String,
    /// Search endpoint, e.g. "https://serpapi.com/search.json".
    pub base_url: String,
    pub google_play_app_id: String,
    pub apple_product_id: String,
    /// Two-letter App Store storefront code.
    pub apple_country: String,
    /// Country label stamped on every fetched review.
    pub source_country: String,
    pub max_pages: usize,
    pub timeout_secs: u64,
}

impl SerpApiConfig {
    /// Reads `SERPAPI_API_KEY` (required) and the optional store identifiers.
    ///
    /// # Errors
    /// [`ProviderError::Config`] when the key is missing or a number is malformed.
    pub fn from_env() -> ProviderResult<Self> {
        let api_key = env::var("SERPAPI_API_KEY")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ProviderError::Config("SERPAPI_API_KEY is not set".into()))?;

        Ok(Self {
            api_key,
            base_url: env_or("SERPAPI_BASE_URL", DEFAULT_SERPAPI_BASE),
            google_play_app_id: env_or("GOOGLE_PLAY_APP_ID", DEFAULT_GOOGLE_PLAY_APP_ID),
            apple_product_id: env_or("APPLE_PRODUCT_ID", DEFAULT_APPLE_PRODUCT_ID),
            apple_country: env_or("APPLE_COUNTRY", DEFAULT_APPLE_COUNTRY),
            source_country: env_or("REVIEW_SOURCE_COUNTRY", DEFAULT_SOURCE_COUNTRY),
            max_pages: env_number("REVIEW_MAX_PAGES", DEFAULT_MAX_PAGES)?,
            timeout_secs: env_number("SERPAPI_TIMEOUT_SECS", 30)?,
        })
    }

    /// Config with defaults and an explicit key; used by callers that already
    /// resolved credentials.
    pub fn with_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_SERPAPI_BASE.to_string(),
            google_play_app_id: DEFAULT_GOOGLE_PLAY_APP_ID.to_string(),
            apple_product_id: DEFAULT_APPLE_PRODUCT_ID.to_string(),
            apple_country: DEFAULT_APPLE_COUNTRY.to_string(),
            source_country: DEFAULT_SOURCE_COUNTRY.to_string(),
            max_pages: DEFAULT_MAX_PAGES,
            timeout_secs: 30,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_number<T: std::str::FromStr>(key: &str, default: T) -> ProviderResult<T> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ProviderError::Config(format!("{key} must be a number, got {raw:?}"))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_key_uses_store_defaults() {
        let cfg = SerpApiConfig::with_key("k");
        assert_eq!(cfg.google_play_app_id, "life.liquide.app");
        assert_eq!(cfg.apple_product_id, "1624726081");
        assert_eq!(cfg.source_country, "India");
        assert!(cfg.max_pages > 0);
    }
}

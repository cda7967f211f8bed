//! Startup configuration
//!
//! The client needs exactly one external setting: the base URL of the
//! similarity-search service. It is read from the environment once at
//! startup and the app refuses to start without it; defaulting silently to
//! some host would only turn a config mistake into a confusing network
//! error later.

use thiserror::Error;

/// Environment variable holding the search-service base URL
pub const SERVER_URL_VAR: &str = "STYLE_MUSE_SERVER_URL";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} is not set; point it at the search service (e.g. http://localhost:5000)")]
    MissingServerUrl(&'static str),
}

/// Resolved configuration, derived once from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    base_url: String,
}

impl Config {
    /// Read the configuration from the environment, failing fast if the
    /// server URL is absent or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(SERVER_URL_VAR) {
            Ok(value) => Self::with_base_url(&value),
            Err(_) => Err(ConfigError::MissingServerUrl(SERVER_URL_VAR)),
        }
    }

    fn with_base_url(raw: &str) -> Result<Self, ConfigError> {
        let base_url = raw.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ConfigError::MissingServerUrl(SERVER_URL_VAR));
        }
        Ok(Self { base_url })
    }

    /// Endpoint receiving the multipart image upload
    pub fn search_endpoint(&self) -> String {
        format!("{}/api/find_similar", self.base_url)
    }

    /// Where a product image lives; `image_filename` is passed through
    /// from the search result unmodified
    pub fn image_url(&self, image_filename: &str) -> String {
        format!("{}/images/{}", self.base_url, image_filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derives_service_endpoints() {
        let config = Config::with_base_url("http://localhost:5000").unwrap();

        assert_eq!(
            config.search_endpoint(),
            "http://localhost:5000/api/find_similar"
        );
        assert_eq!(
            config.image_url("p1.jpg"),
            "http://localhost:5000/images/p1.jpg"
        );
    }

    #[test]
    fn test_trailing_slash_and_whitespace_are_tolerated() {
        let config = Config::with_base_url(" http://muse.example/ ").unwrap();

        assert_eq!(config.search_endpoint(), "http://muse.example/api/find_similar");
    }

    #[test]
    fn test_empty_value_is_rejected() {
        assert_eq!(
            Config::with_base_url("  "),
            Err(ConfigError::MissingServerUrl(SERVER_URL_VAR))
        );
    }
}

//! Engine configuration.
//!
//! Configuration is read once at startup and shared read-only by every
//! request (`Arc<HalConfig>` in the web adapter).
//!
//! # Example
//!
//! ```
//! use resourceful_core::config::HalConfig;
//!
//! let config = HalConfig::default()
//!     .with_base_url("https://api.example.com/v1/")
//!     .with_default_page_size(25);
//! assert!(config.validate().is_ok());
//! assert_eq!(config.base_url(), Some("https://api.example.com/v1"));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable for [`HalConfig::base_url`].
pub const ENV_BASE_URL: &str = "HAL_BASE_URL";
/// Environment variable for [`HalConfig::hypertext_cache_pattern`].
pub const ENV_HYPERTEXT_CACHE_PATTERN: &str = "HAL_HYPERTEXT_CACHE_PATTERN";
/// Environment variable for [`PaginationConfig::default_size`].
pub const ENV_DEFAULT_SIZE: &str = "HAL_PAGINATION_DEFAULT_SIZE";
/// Environment variable for [`PaginationConfig::default_offset`].
pub const ENV_DEFAULT_OFFSET: &str = "HAL_PAGINATION_DEFAULT_OFFSET";

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The base URL is malformed.
    #[error("Invalid base url {url}: {reason}")]
    InvalidBaseUrl {
        /// Offending value
        url: String,
        /// What is wrong with it
        reason: String,
    },

    /// An environment variable could not be parsed.
    #[error("Failed to parse {var}: {value}")]
    ParseError {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
    },
}

/// Pagination defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationConfig {
    /// Window size when the request has no `size` query parameter.
    ///
    /// Also the upper bound of the `prev`/`next` window sizes.
    ///
    /// Default: 10
    pub default_size: u64,

    /// Offset when the request has no `offset` query parameter.
    ///
    /// Default: 0
    pub default_offset: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_size: 10,
            default_offset: 0,
        }
    }
}

/// Configuration of the lifecycle engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HalConfig {
    /// Public base URL used for absolute links, e.g. `https://api.example.com/v1`.
    ///
    /// When unset the transport derives it from the request's scheme and host.
    base_url: Option<String>,

    /// Mirror the `self` link of embedded objects into the parent's `_links`.
    ///
    /// Default: true
    pub hypertext_cache_pattern: bool,

    /// Pagination defaults.
    pub pagination: PaginationConfig,
}

impl Default for HalConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            hypertext_cache_pattern: true,
            pagination: PaginationConfig::default(),
        }
    }
}

impl HalConfig {
    /// Load configuration from `HAL_*` environment variables, falling back to
    /// defaults for unset ones.
    ///
    /// # Errors
    ///
    /// Returns error if a variable cannot be parsed or the result is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            config = config.with_base_url(url);
        }
        if let Ok(value) = std::env::var(ENV_HYPERTEXT_CACHE_PATTERN) {
            config.hypertext_cache_pattern = parse_bool(ENV_HYPERTEXT_CACHE_PATTERN, &value)?;
        }
        if let Ok(value) = std::env::var(ENV_DEFAULT_SIZE) {
            config.pagination.default_size = parse_u64(ENV_DEFAULT_SIZE, &value)?;
        }
        if let Ok(value) = std::env::var(ENV_DEFAULT_OFFSET) {
            config.pagination.default_offset = parse_u64(ENV_DEFAULT_OFFSET, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL ends with more than one `/` or is not an
    /// absolute URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Some(url) = &self.base_url else {
            return Ok(());
        };

        if url.ends_with("//") {
            return Err(ConfigError::InvalidBaseUrl {
                url: url.clone(),
                reason: "url should end with a single \"/\"".to_string(),
            });
        }

        url::Url::parse(url).map_err(|error| ConfigError::InvalidBaseUrl {
            url: url.clone(),
            reason: error.to_string(),
        })?;

        Ok(())
    }

    /// Set the public base URL. A single trailing `/` is accepted.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Toggle the hypertext cache pattern.
    #[must_use]
    pub const fn with_hypertext_cache_pattern(mut self, enabled: bool) -> Self {
        self.hypertext_cache_pattern = enabled;
        self
    }

    /// Set the default page size.
    #[must_use]
    pub const fn with_default_page_size(mut self, size: u64) -> Self {
        self.pagination.default_size = size;
        self
    }

    /// Set the default page offset.
    #[must_use]
    pub const fn with_default_page_offset(mut self, offset: u64) -> Self {
        self.pagination.default_offset = offset;
        self
    }

    /// Configured base URL without trailing `/`.
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(|url| url.strip_suffix('/').unwrap_or(url))
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::ParseError {
            var,
            value: value.to_string(),
        }),
    }
}

fn parse_u64(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::ParseError {
        var,
        value: value.to_string(),
    })
}

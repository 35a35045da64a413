//! Process-level configuration.
//!
//! User-facing preferences live in [`crate::settings::Settings`]; this file
//! holds deployment knobs such as where assets live and how to reach the
//! liturgical calendar service.

use crate::app_dirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound for the calendar request timeout. Quote selection waits on
/// this request, so it must stay short.
pub const MAX_LITURGY_TIMEOUT_MS: u64 = 1_900;

/// Top-level runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Root of the quote, prayer and image assets.
    pub assets_dir: PathBuf,
    /// Settings file path.
    pub settings_file: PathBuf,
    /// Rotation cursor file path.
    pub indices_file: PathBuf,
    /// Liturgical calendar client settings.
    pub liturgy: LiturgyConfig,
    /// Host channel sizing.
    pub host: HostConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            assets_dir: app_dirs::default_assets_dir(),
            settings_file: app_dirs::settings_file(),
            indices_file: app_dirs::indices_file(),
            liturgy: LiturgyConfig::default(),
            host: HostConfig::default(),
        }
    }
}

/// Liturgical calendar API configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiturgyConfig {
    /// Base URL of the calendar API.
    pub base_url: String,
    /// Calendar identifier in the API path.
    pub calendar: String,
    /// Language requested from the API. Fixed independently of the display
    /// language so feast slugs, and therefore feast asset folders, stay stable.
    pub language: String,
    /// Request timeout in milliseconds (clamped to [`MAX_LITURGY_TIMEOUT_MS`]).
    pub timeout_ms: u64,
    /// Retry over HTTPS when a plain-HTTP request to the known calendar
    /// host fails.
    pub https_fallback: bool,
}

impl Default for LiturgyConfig {
    fn default() -> Self {
        Self {
            base_url: "http://calapi.inadiutorium.cz".to_owned(),
            calendar: "default".to_owned(),
            language: "en".to_owned(),
            timeout_ms: 1_500,
            https_fallback: true,
        }
    }
}

impl LiturgyConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.clamp(1, MAX_LITURGY_TIMEOUT_MS))
    }
}

/// Host command channel sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub request_capacity: usize,
    pub event_capacity: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            request_capacity: 64,
            event_capacity: 128,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::JaculatoriaError::Config(e.to_string()))
    }

    /// Load from [`app_dirs::runtime_config_file`], using defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_default() -> crate::error::Result<Self> {
        let path = app_dirs::runtime_config_file();
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn default_timeout_is_under_two_seconds() {
        let config = RuntimeConfig::default();
        assert!(config.liturgy.timeout() < Duration::from_secs(2));
        assert!(config.liturgy.https_fallback);
    }

    #[test]
    fn oversized_timeout_is_clamped() {
        let liturgy = LiturgyConfig {
            timeout_ms: 30_000,
            ..Default::default()
        };
        assert_eq!(liturgy.timeout(), Duration::from_millis(MAX_LITURGY_TIMEOUT_MS));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: RuntimeConfig = toml::from_str(
            r#"
            assets_dir = "/opt/jaculatoria/assets"

            [liturgy]
            timeout_ms = 800
            "#,
        )
        .unwrap();
        assert_eq!(config.assets_dir, PathBuf::from("/opt/jaculatoria/assets"));
        assert_eq!(config.liturgy.timeout_ms, 800);
        assert_eq!(config.liturgy.calendar, "default");
        assert_eq!(config.host, HostConfig::default());
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "assets_dir = [").unwrap();
        assert!(RuntimeConfig::from_file(&path).is_err());
    }
}

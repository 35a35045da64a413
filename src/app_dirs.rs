//! Centralized application directory paths.
//!
//! Uses the [`dirs`] crate for platform-appropriate resolution.
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | Config  | `~/Library/Application Support/jaculatoria/` | `~/.config/jaculatoria/` |
//! | Data    | `~/Library/Application Support/jaculatoria/` | `~/.local/share/jaculatoria/` |
//!
//! # Environment Overrides
//!
//! - `JACULATORIA_CONFIG_DIR`: overrides [`config_dir`]
//! - `JACULATORIA_DATA_DIR`: overrides [`data_dir`]
//! - `JACULATORIA_ASSETS_DIR`: overrides [`default_assets_dir`]

use std::path::PathBuf;

const APP_NAME: &str = "jaculatoria";

/// Config directory: settings, rotation indices and `jaculatoria.toml`.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("JACULATORIA_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from("/tmp/jaculatoria-config"))
}

/// Data directory: logs and bundled assets when not overridden.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("JACULATORIA_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from("/tmp/jaculatoria-data"))
}

/// Log file directory (`data_dir()/logs/`).
#[must_use]
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Quote, prayer and image assets (`data_dir()/assets/`).
#[must_use]
pub fn default_assets_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("JACULATORIA_ASSETS_DIR") {
        return PathBuf::from(override_dir);
    }
    data_dir().join("assets")
}

/// User settings file (`config_dir()/settings.json`).
#[must_use]
pub fn settings_file() -> PathBuf {
    config_dir().join("settings.json")
}

/// Rotation cursor file (`config_dir()/indices.json`).
#[must_use]
pub fn indices_file() -> PathBuf {
    config_dir().join("indices.json")
}

/// Process configuration file (`config_dir()/jaculatoria.toml`).
#[must_use]
pub fn runtime_config_file() -> PathBuf {
    config_dir().join("jaculatoria.toml")
}

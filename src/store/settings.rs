//! Settings file adapter.

use crate::error::{JaculatoriaError, Result};
use crate::settings::{Settings, SettingsPatch};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key of the wrapper object written by early releases (`{"config": {...}}`).
const LEGACY_WRAPPER_KEY: &str = "config";

/// Reads and writes `settings.json`.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, never failing.
    ///
    /// A missing file yields defaults; a malformed one is logged and yields
    /// defaults; missing or invalid fields are filled from defaults.
    #[must_use]
    pub fn load(&self) -> Settings {
        match self.try_load() {
            Ok(settings) => settings,
            Err(e) => {
                warn!("cannot load settings, using defaults: {e}");
                Settings::default()
            }
        }
    }

    /// Load settings, reporting unreadable or unparsable files.
    ///
    /// # Errors
    ///
    /// Returns [`JaculatoriaError::Persistence`] when the file exists but
    /// cannot be read or is not a JSON object.
    pub fn try_load(&self) -> Result<Settings> {
        let Some(bytes) = super::read_optional(&self.path)? else {
            debug!(path = %self.path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        };
        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| JaculatoriaError::Persistence(format!("cannot parse settings: {e}")))?;
        let Value::Object(object) = value else {
            return Err(JaculatoriaError::Persistence(
                "settings file is not a JSON object".to_owned(),
            ));
        };

        let (patch, mistyped) = SettingsPatch::from_json(&flatten_legacy(object));
        let (settings, rejected) = Settings::default().apply_lenient(&patch);
        for violation in mistyped.into_iter().chain(rejected) {
            warn!("ignoring persisted setting: {violation}");
        }
        Ok(settings)
    }

    /// Persist settings.
    ///
    /// # Errors
    ///
    /// Returns [`JaculatoriaError::Persistence`] when the file cannot be written.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        super::write_json(&self.path, settings)?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

/// Lift the fields of a legacy `{"config": {...}}` wrapper to the top level.
/// Wrapped fields win over top-level duplicates.
fn flatten_legacy(mut object: Map<String, Value>) -> Map<String, Value> {
    match object.remove(LEGACY_WRAPPER_KEY) {
        Some(Value::Object(inner)) => {
            debug!("flattening legacy settings wrapper");
            object.extend(inner);
            object
        }
        Some(other) => {
            object.insert(LEGACY_WRAPPER_KEY.to_owned(), other);
            object
        }
        None => object,
    }
}

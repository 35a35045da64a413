//! Flat JSON persistence for settings and rotation cursors.
//!
//! Both stores self-heal: a missing or unreadable file yields defaults
//! instead of an error. Writes go through a temp file and rename so a
//! crash mid-write cannot leave a truncated file behind.

pub mod indices;
pub mod settings;

pub use indices::IndicesStore;
pub use settings::SettingsStore;

use crate::error::{JaculatoriaError, Result};
use serde::Serialize;
use std::path::Path;

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            JaculatoriaError::Persistence(format!("cannot create {}: {e}", parent.display()))
        })?;
    }

    let json = serde_json::to_string_pretty(value)
        .map_err(|e| JaculatoriaError::Persistence(format!("cannot serialize: {e}")))?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(|e| {
        JaculatoriaError::Persistence(format!("cannot write {}: {e}", tmp.display()))
    })?;
    std::fs::rename(&tmp, path).map_err(|e| {
        JaculatoriaError::Persistence(format!("cannot replace {}: {e}", path.display()))
    })?;
    Ok(())
}

/// Read a file, mapping "not found" to `None`.
fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(JaculatoriaError::Persistence(format!(
            "cannot read {}: {e}",
            path.display()
        ))),
    }
}

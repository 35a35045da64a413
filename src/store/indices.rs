//! Rotation cursor file adapter.

use crate::day::DayOfWeek;
use crate::error::{JaculatoriaError, Result};
use crate::quotes::QuoteIndices;
use crate::quotes::selector::{create_empty_indices, should_reset_indices};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Reads and writes `indices.json`.
#[derive(Debug, Clone)]
pub struct IndicesStore {
    path: PathBuf,
}

impl IndicesStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cursors for `current_day`.
    ///
    /// Returns zeroed cursors stamped with `current_day` when the file is
    /// missing or malformed, or when it was written on another day.
    #[must_use]
    pub fn load(&self, current_day: DayOfWeek) -> QuoteIndices {
        let stored = match self.read() {
            Ok(Some(indices)) => indices,
            Ok(None) => return create_empty_indices(current_day),
            Err(e) => {
                warn!("resetting rotation cursors: {e}");
                return create_empty_indices(current_day);
            }
        };

        if should_reset_indices(stored.last_day, current_day) {
            debug!(last_day = %stored.last_day, %current_day, "day changed, resetting cursors");
            return create_empty_indices(current_day);
        }
        stored
    }

    fn read(&self) -> Result<Option<QuoteIndices>> {
        let Some(bytes) = super::read_optional(&self.path)? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| JaculatoriaError::Persistence(format!("cannot parse indices: {e}")))
    }

    /// Persist the cursors.
    ///
    /// # Errors
    ///
    /// Returns [`JaculatoriaError::Persistence`] when the file cannot be written.
    pub fn save(&self, indices: &QuoteIndices) -> Result<()> {
        super::write_json(&self.path, indices)
    }
}

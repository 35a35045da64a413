//! Persisted rotation cursors.

use crate::day::DayOfWeek;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rotation cursors for quotes, day images and feast images.
///
/// Stored as `{quoteIndices, imageIndices, feastImageIndices, lastDay}`.
/// Values are positions into collections whose length may have changed
/// since they were written, so readers always go through the selector,
/// which heals out-of-range cursors to `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteIndices {
    #[serde(default)]
    pub quote_indices: BTreeMap<DayOfWeek, usize>,
    #[serde(default)]
    pub image_indices: BTreeMap<DayOfWeek, usize>,
    /// Per feast slug image cursor.
    #[serde(default)]
    pub feast_image_indices: BTreeMap<String, usize>,
    pub last_day: DayOfWeek,
}

impl QuoteIndices {
    /// Zeroed cursors stamped with `day`.
    #[must_use]
    pub fn empty(day: DayOfWeek) -> Self {
        Self {
            quote_indices: BTreeMap::new(),
            image_indices: BTreeMap::new(),
            feast_image_indices: BTreeMap::new(),
            last_day: day,
        }
    }

    #[must_use]
    pub fn quote_index(&self, day: DayOfWeek) -> usize {
        self.quote_indices.get(&day).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn image_index(&self, day: DayOfWeek) -> usize {
        self.image_indices.get(&day).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn feast_image_index(&self, slug: &str) -> usize {
        self.feast_image_indices.get(slug).copied().unwrap_or(0)
    }

    pub fn set_quote_index(&mut self, day: DayOfWeek, index: usize) {
        self.quote_indices.insert(day, index);
    }

    pub fn set_image_index(&mut self, day: DayOfWeek, index: usize) {
        self.image_indices.insert(day, index);
    }

    pub fn set_feast_image_index(&mut self, slug: &str, index: usize) {
        self.feast_image_indices.insert(slug.to_owned(), index);
    }
}

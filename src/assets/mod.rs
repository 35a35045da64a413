//! Read-only quote, prayer and image assets.
//!
//! [`AssetSource`] is stateless: rotation cursors for feast images live in
//! [`crate::quotes::QuoteIndices`] and are passed in by the caller.

pub mod fs;

pub use fs::FsAssets;

use crate::day::DayOfWeek;
use crate::error::Result;
use crate::liturgy::LiturgicalSeason;
use crate::quotes::QuotesCollection;
use crate::quotes::selector::next_feast_image_index;
use crate::settings::{CanonicalHour, Language};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A titled prayer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prayer {
    pub title: String,
    pub text: String,
}

/// Prayers of one language (`prayers/<lang>.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrayerBook {
    pub angelus: Prayer,
    pub regina_caeli: Prayer,
    /// Short prayer per canonical hour.
    pub hours: BTreeMap<CanonicalHour, Prayer>,
}

/// Feast image chosen from a per-slug rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeastImage {
    pub path: PathBuf,
    /// Cursor to persist for the next draw.
    pub next_index: usize,
}

/// Access to bundled assets.
pub trait AssetSource: Send + Sync {
    /// Quotes for `season`, falling back to the language's ordinary file
    /// when the seasonal one is absent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::JaculatoriaError::Asset`] when neither file
    /// can be read.
    fn load_quotes(
        &self,
        language: Language,
        season: LiturgicalSeason,
    ) -> Result<QuotesCollection>;

    /// Prayers for `language`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::JaculatoriaError::Asset`] when the file is
    /// missing or malformed.
    fn load_prayers(&self, language: Language) -> Result<PrayerBook>;

    /// Images for `day` in `season`, falling back to ordinary time. Sorted.
    fn list_day_images(&self, day: DayOfWeek, season: LiturgicalSeason) -> Vec<PathBuf>;

    /// Curated quotes of a feast. Empty when the feast has none.
    fn load_feast_quotes(&self, slug: &str) -> Vec<String>;

    /// Images of a feast. Sorted; empty when the feast has none.
    fn feast_images(&self, slug: &str) -> Vec<PathBuf>;

    fn angelus_image_path(&self) -> Option<PathBuf>;

    fn regina_caeli_image_path(&self) -> Option<PathBuf>;

    /// Feast image at `cursor`, healing a stale cursor to `0`.
    fn feast_image_path(&self, slug: &str, cursor: usize) -> Option<FeastImage> {
        let images = self.feast_images(slug);
        let advance = next_feast_image_index(slug, images.len(), cursor)?;
        images.get(advance.current_index).map(|path| FeastImage {
            path: path.clone(),
            next_index: advance.next_index,
        })
    }
}

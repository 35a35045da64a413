//! Filesystem asset layout.
//!
//! ```text
//! <root>/quotes/<lang>/<season>.json     QuotesCollection
//! <root>/prayers/<lang>.json             PrayerBook
//! <root>/images/<season>/<day>/*         day images
//! <root>/images/angelus.<ext>
//! <root>/images/regina-caeli.<ext>
//! <root>/feasts/<slug>/quotes.json       ["...", ...]
//! <root>/feasts/<slug>/*.<ext>           feast images
//! ```

use crate::assets::{AssetSource, PrayerBook};
use crate::day::DayOfWeek;
use crate::error::{JaculatoriaError, Result};
use crate::liturgy::LiturgicalSeason;
use crate::quotes::QuotesCollection;
use crate::settings::Language;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

/// [`AssetSource`] reading from a directory tree.
#[derive(Debug, Clone)]
pub struct FsAssets {
    root: PathBuf,
}

impl FsAssets {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn quotes_file(&self, language: Language, season: LiturgicalSeason) -> PathBuf {
        self.root
            .join("quotes")
            .join(language.as_str())
            .join(format!("{}.json", season.as_str()))
    }

    fn day_image_dir(&self, day: DayOfWeek, season: LiturgicalSeason) -> PathBuf {
        self.root
            .join("images")
            .join(season.as_str())
            .join(day.key())
    }

    fn feast_dir(&self, slug: &str) -> Option<PathBuf> {
        is_safe_slug(slug).then(|| self.root.join("feasts").join(slug))
    }

    fn named_image(&self, stem: &str) -> Option<PathBuf> {
        let dir = self.root.join("images");
        IMAGE_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{stem}.{ext}")))
            .find(|path| path.is_file())
    }
}

impl AssetSource for FsAssets {
    fn load_quotes(
        &self,
        language: Language,
        season: LiturgicalSeason,
    ) -> Result<QuotesCollection> {
        let seasonal = self.quotes_file(language, season);
        if season != LiturgicalSeason::Ordinary && !seasonal.is_file() {
            debug!(%season, language = language.as_str(), "no seasonal quotes, using ordinary");
            return read_json(&self.quotes_file(language, LiturgicalSeason::Ordinary));
        }
        read_json(&seasonal)
    }

    fn load_prayers(&self, language: Language) -> Result<PrayerBook> {
        read_json(
            &self
                .root
                .join("prayers")
                .join(format!("{}.json", language.as_str())),
        )
    }

    fn list_day_images(&self, day: DayOfWeek, season: LiturgicalSeason) -> Vec<PathBuf> {
        let images = list_images(&self.day_image_dir(day, season));
        if images.is_empty() && season != LiturgicalSeason::Ordinary {
            return list_images(&self.day_image_dir(day, LiturgicalSeason::Ordinary));
        }
        images
    }

    fn load_feast_quotes(&self, slug: &str) -> Vec<String> {
        let Some(path) = self.feast_dir(slug).map(|dir| dir.join("quotes.json")) else {
            return Vec::new();
        };
        if !path.is_file() {
            return Vec::new();
        }
        read_json(&path).unwrap_or_else(|e| {
            warn!(slug, "ignoring feast quotes: {e}");
            Vec::new()
        })
    }

    fn feast_images(&self, slug: &str) -> Vec<PathBuf> {
        self.feast_dir(slug)
            .map(|dir| list_images(&dir))
            .unwrap_or_default()
    }

    fn angelus_image_path(&self) -> Option<PathBuf> {
        self.named_image("angelus")
    }

    fn regina_caeli_image_path(&self) -> Option<PathBuf> {
        self.named_image("regina-caeli")
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path)
        .map_err(|e| JaculatoriaError::Asset(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| JaculatoriaError::Asset(format!("cannot parse {}: {e}", path.display())))
}

/// Image files directly inside `dir`, sorted by name. Missing dir → empty.
fn list_images(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut images: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image(path))
        .collect();
    images.sort();
    images
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

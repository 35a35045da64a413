//! Records handed to the presentation layer.

use crate::day::DayOfWeek;
use crate::liturgy::LiturgicalSeason;
use crate::settings::CanonicalHour;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Quote chosen for a popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDto {
    pub text: String,
    /// Absolute image path, `null` when no image is available.
    pub image: Option<String>,
    pub day: DayOfWeek,
    pub theme: String,
    pub season: LiturgicalSeason,
    /// Feast slug; present only when the feast pool supplied the quote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feast: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feast_name: Option<String>,
}

/// Which prayer a [`PrayerDto`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrayerKind {
    Angelus,
    ReginaCaeli,
    Hour,
}

/// Prayer chosen for a popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrayerDto {
    pub kind: PrayerKind,
    pub title: String,
    pub text: String,
    pub image: Option<String>,
    pub season: LiturgicalSeason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<CanonicalHour>,
}

pub(crate) fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

//! Liturgical context of a calendar day.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Liturgical season. Selects the quote file and image folder.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiturgicalSeason {
    #[default]
    Ordinary,
    Advent,
    Lent,
    Easter,
    Christmas,
}

impl LiturgicalSeason {
    pub const ALL: [Self; 5] = [
        Self::Ordinary,
        Self::Advent,
        Self::Lent,
        Self::Easter,
        Self::Christmas,
    ];

    /// File and folder name of the season.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ordinary => "ordinary",
            Self::Advent => "advent",
            Self::Lent => "lent",
            Self::Easter => "easter",
            Self::Christmas => "christmas",
        }
    }

    /// Parse a season name as reported by the calendar service.
    ///
    /// The Triduum is folded into Lent.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ordinary" | "ordinary time" => Some(Self::Ordinary),
            "advent" => Some(Self::Advent),
            "lent" | "triduum" => Some(Self::Lent),
            "easter" | "eastertide" => Some(Self::Easter),
            "christmas" | "christmastide" => Some(Self::Christmas),
            _ => None,
        }
    }
}

impl std::fmt::Display for LiturgicalSeason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rank of the day's principal celebration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    #[default]
    Weekday,
    Memorial,
    Feast,
    Solemnity,
}

impl Rank {
    /// Map the calendar service's free-text rank (`"optional memorial"`,
    /// `"ferial"`, `"Solemnity"`, ...) onto the four ranks used here.
    #[must_use]
    pub fn from_api(raw: &str) -> Self {
        let raw = raw.to_ascii_lowercase();
        if raw.contains("solemnity") {
            Self::Solemnity
        } else if raw.contains("feast") {
            Self::Feast
        } else if raw.contains("memorial") {
            Self::Memorial
        } else {
            Self::Weekday
        }
    }
}

/// Season, feast and calendar quotes of one day.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiturgicalContext {
    pub season: LiturgicalSeason,
    /// Feast slug, matching the `feasts/<slug>/` asset folder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feast: Option<String>,
    /// Feast display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feast_name: Option<String>,
    #[serde(default)]
    pub rank: Rank,
    /// Quotes supplied by the calendar service for the feast.
    #[serde(default)]
    pub api_quotes: Vec<String>,
}

impl LiturgicalContext {
    /// Plain ordinary-time weekday. Substituted whenever the calendar
    /// cannot be reached.
    #[must_use]
    pub fn ordinary() -> Self {
        Self::default()
    }

    /// Context for `season` with no feast.
    #[must_use]
    pub fn in_season(season: LiturgicalSeason) -> Self {
        Self {
            season,
            ..Self::default()
        }
    }

    /// Feast slug, when the day celebrates one.
    #[must_use]
    pub fn feast(&self) -> Option<&str> {
        self.feast.as_deref().filter(|slug| !slug.is_empty())
    }
}

/// ASCII slug of a celebration title: `"São José, Esposo"` → `"sao-jose-esposo"`.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
    {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

//! Read-only quote collections keyed by day of week.

use crate::day::DayOfWeek;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quotes and theme for a single day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayQuotes {
    /// Display name of the day (e.g. `"Domingo"`).
    pub day: String,
    /// Devotional theme of the day.
    pub theme: String,
    /// Ordered quotes for the day.
    pub quotes: Vec<String>,
}

/// Mapping from day key (`"1"`..`"7"`) to that day's quotes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuotesCollection(BTreeMap<String, DayQuotes>);

impl QuotesCollection {
    #[must_use]
    pub fn new(days: BTreeMap<String, DayQuotes>) -> Self {
        Self(days)
    }

    /// Collection holding a single day, used when a feast pool replaces
    /// the seasonal quotes for one request.
    #[must_use]
    pub fn single_day(day: DayOfWeek, theme: impl Into<String>, quotes: Vec<String>) -> Self {
        let mut days = BTreeMap::new();
        days.insert(
            day.key(),
            DayQuotes {
                day: day.key(),
                theme: theme.into(),
                quotes,
            },
        );
        Self(days)
    }

    #[must_use]
    pub fn day(&self, day: DayOfWeek) -> Option<&DayQuotes> {
        self.0.get(&day.key())
    }

    /// Quotes of the day, `None` when the day is absent or has no quotes.
    #[must_use]
    pub fn quotes_for(&self, day: DayOfWeek) -> Option<&[String]> {
        self.day(day)
            .map(|entry| entry.quotes.as_slice())
            .filter(|quotes| !quotes.is_empty())
    }
}

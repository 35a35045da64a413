//! Day-of-week keying shared by quote rotation and asset lookup.
//!
//! Quote files, image folders and persisted rotation cursors are all keyed
//! `1..=7` with `1 = Sunday` and `7 = Saturday`. [`DayOfWeek::from_weekday`]
//! is the only place that converts from chrono's weekday representation.

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};

/// 1-based day of week, `1 = Sunday` .. `7 = Saturday`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub const SUNDAY: Self = Self(1);
    pub const SATURDAY: Self = Self(7);

    /// Build from a raw 1-based value. Returns `None` outside `1..=7`.
    #[must_use]
    pub fn new(value: u8) -> Option<Self> {
        (1..=7).contains(&value).then_some(Self(value))
    }

    /// Convert a chrono weekday (Sunday-first, 0-based) into the 1-based key.
    #[must_use]
    pub fn from_weekday(weekday: Weekday) -> Self {
        // num_days_from_sunday() is 0..=6, so the result is always in range.
        Self(weekday.num_days_from_sunday() as u8 + 1)
    }

    /// Day of week of any chrono date or datetime.
    #[must_use]
    pub fn of<D: Datelike>(date: &D) -> Self {
        Self::from_weekday(date.weekday())
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// String key used by quote collection files (`"1"`..`"7"`).
    #[must_use]
    pub fn key(self) -> String {
        self.0.to_string()
    }

    /// Parse a collection key such as `"3"`.
    #[must_use]
    pub fn parse_key(raw: &str) -> Option<Self> {
        raw.trim().parse::<u8>().ok().and_then(Self::new)
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("day of week must be 1..=7, got {value}"))
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> Self {
        day.0
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

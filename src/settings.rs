//! User settings value object.
//!
//! [`Settings`] is immutable from the outside: every change goes through
//! [`Settings::update`], which validates the whole [`SettingsPatch`] and
//! either returns a new instance or an aggregate error listing every
//! violation. Nothing is applied partially.

use crate::error::{JaculatoriaError, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Allowed popup interval, in minutes.
pub const INTERVAL_RANGE: RangeInclusive<i64> = 1..=60;

/// Allowed popup display duration, in seconds.
pub const DURATION_RANGE: RangeInclusive<i64> = 5..=30;

/// Display language for quotes and prayers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "pt-br")]
    PtBr,
    #[serde(rename = "en")]
    En,
    #[serde(rename = "la")]
    La,
}

impl Language {
    /// Wire/file code (`"pt-br"`, `"en"`, `"la"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PtBr => "pt-br",
            Self::En => "en",
            Self::La => "la",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pt-br" | "pt" => Some(Self::PtBr),
            "en" => Some(Self::En),
            "la" => Some(Self::La),
            _ => None,
        }
    }
}

/// Canonical hours of the Liturgy of the Hours that can raise a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalHour {
    Lauds,
    Terce,
    Sext,
    Nones,
    Vespers,
    Compline,
}

impl CanonicalHour {
    pub const ALL: [Self; 6] = [
        Self::Lauds,
        Self::Terce,
        Self::Sext,
        Self::Nones,
        Self::Vespers,
        Self::Compline,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lauds => "lauds",
            Self::Terce => "terce",
            Self::Sext => "sext",
            Self::Nones => "nones",
            Self::Vespers => "vespers",
            Self::Compline => "compline",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|hour| hour.as_str() == raw.trim().to_ascii_lowercase())
    }

    /// Traditional time of day for the hour.
    #[must_use]
    pub fn default_time(self) -> NaiveTime {
        let hour = match self {
            Self::Lauds => 6,
            Self::Terce => 9,
            Self::Sext => 12,
            Self::Nones => 15,
            Self::Vespers => 18,
            Self::Compline => 21,
        };
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
    }
}

/// Reminder settings for one canonical hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourSetting {
    pub enabled: bool,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
}

/// Validated user settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    interval: u32,
    duration: u32,
    autostart: bool,
    easter_time: bool,
    language: Language,
    liturgy_of_hours: BTreeMap<CanonicalHour, HourSetting>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval: 15,
            duration: 10,
            autostart: true,
            easter_time: false,
            language: Language::default(),
            liturgy_of_hours: CanonicalHour::ALL
                .into_iter()
                .map(|hour| {
                    (
                        hour,
                        HourSetting {
                            enabled: false,
                            time: hour.default_time(),
                        },
                    )
                })
                .collect(),
        }
    }
}

/// Partial settings change, as received from the shell or read from disk.
///
/// Numeric and enum fields are kept loose so validation can report the
/// offending value instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autostart: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub easter_time: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liturgy_of_hours: Option<BTreeMap<String, HourSettingPatch>>,
}

/// Partial change for one canonical hour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HourSettingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl SettingsPatch {
    /// Extract known fields one by one from a JSON object.
    ///
    /// A field of the wrong JSON type is left out of the patch and reported
    /// in the returned list, so callers can combine it with the range
    /// violations from [`Settings::update`]. Unknown keys and `null` values
    /// are ignored. Integers may also arrive as numeric strings.
    #[must_use]
    pub fn from_json(object: &Map<String, Value>) -> (Self, Vec<String>) {
        let mut mistyped = Vec::new();

        let interval = typed(object, "interval", "an integer", as_integer, &mut mistyped);
        let duration = typed(object, "duration", "an integer", as_integer, &mut mistyped);
        let autostart = typed(object, "autostart", "a boolean", Value::as_bool, &mut mistyped);
        let easter_time = typed(object, "easterTime", "a boolean", Value::as_bool, &mut mistyped);
        let language = typed(
            object,
            "language",
            "a string",
            |value| value.as_str().map(str::to_owned),
            &mut mistyped,
        );
        let liturgy_of_hours = typed(
            object,
            "liturgyOfHours",
            "an object of {enabled, time} entries",
            |value| serde_json::from_value(value.clone()).ok(),
            &mut mistyped,
        );

        let patch = Self {
            interval,
            duration,
            autostart,
            easter_time,
            language,
            liturgy_of_hours,
        };
        (patch, mistyped)
    }
}

fn typed<T>(
    object: &Map<String, Value>,
    key: &str,
    expected: &str,
    extract: impl Fn(&Value) -> Option<T>,
    mistyped: &mut Vec<String>,
) -> Option<T> {
    let value = object.get(key).filter(|value| !value.is_null())?;
    let parsed = extract(value);
    if parsed.is_none() {
        mistyped.push(format!("{key} must be {expected}, got {value}"));
    }
    parsed
}

fn as_integer(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|raw| raw.trim().parse().ok()))
}

impl Settings {
    /// Popup interval in minutes.
    #[must_use]
    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Popup interval as a duration.
    #[must_use]
    pub fn interval_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.interval) * 60)
    }

    /// Popup display duration in seconds.
    #[must_use]
    pub fn duration(&self) -> u32 {
        self.duration
    }

    #[must_use]
    pub fn autostart(&self) -> bool {
        self.autostart
    }

    #[must_use]
    pub fn easter_time(&self) -> bool {
        self.easter_time
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub fn liturgy_of_hours(&self) -> &BTreeMap<CanonicalHour, HourSetting> {
        &self.liturgy_of_hours
    }

    /// Enabled canonical hours with their trigger times.
    pub fn enabled_hours(&self) -> impl Iterator<Item = (CanonicalHour, NaiveTime)> + '_ {
        self.liturgy_of_hours
            .iter()
            .filter(|(_, setting)| setting.enabled)
            .map(|(hour, setting)| (*hour, setting.time))
    }

    /// Apply a patch, returning a new validated instance.
    ///
    /// # Errors
    ///
    /// Returns [`JaculatoriaError::InvalidSettings`] listing every violated
    /// constraint when any field is out of bounds. `self` is never modified.
    pub fn update(&self, patch: &SettingsPatch) -> Result<Self> {
        let (next, violations) = self.apply(patch);
        if violations.is_empty() {
            Ok(next)
        } else {
            Err(JaculatoriaError::InvalidSettings(violations))
        }
    }

    /// Apply every valid field of a patch and return the rejected ones.
    ///
    /// Used when reading files written by older versions: invalid fields
    /// keep their current value instead of rejecting the whole file.
    #[must_use]
    pub fn apply_lenient(&self, patch: &SettingsPatch) -> (Self, Vec<String>) {
        self.apply(patch)
    }

    fn apply(&self, patch: &SettingsPatch) -> (Self, Vec<String>) {
        let mut next = self.clone();
        let mut violations = Vec::new();

        if let Some(interval) = patch.interval {
            match checked_in_range(interval, &INTERVAL_RANGE) {
                Some(value) => next.interval = value,
                None => violations.push(format!(
                    "interval must be between {} and {} minutes, got {interval}",
                    INTERVAL_RANGE.start(),
                    INTERVAL_RANGE.end()
                )),
            }
        }

        if let Some(duration) = patch.duration {
            match checked_in_range(duration, &DURATION_RANGE) {
                Some(value) => next.duration = value,
                None => violations.push(format!(
                    "duration must be between {} and {} seconds, got {duration}",
                    DURATION_RANGE.start(),
                    DURATION_RANGE.end()
                )),
            }
        }

        if let Some(autostart) = patch.autostart {
            next.autostart = autostart;
        }

        if let Some(easter_time) = patch.easter_time {
            next.easter_time = easter_time;
        }

        if let Some(raw) = &patch.language {
            match Language::parse(raw) {
                Some(language) => next.language = language,
                None => violations.push(format!(
                    "language must be one of pt-br, en, la, got {raw:?}"
                )),
            }
        }

        if let Some(hours) = &patch.liturgy_of_hours {
            for (raw_hour, hour_patch) in hours {
                let Some(hour) = CanonicalHour::parse(raw_hour) else {
                    violations.push(format!("unknown canonical hour {raw_hour:?}"));
                    continue;
                };
                let entry = next.liturgy_of_hours.entry(hour).or_insert(HourSetting {
                    enabled: false,
                    time: hour.default_time(),
                });
                if let Some(enabled) = hour_patch.enabled {
                    entry.enabled = enabled;
                }
                if let Some(raw_time) = &hour_patch.time {
                    match hhmm::parse(raw_time) {
                        Some(time) => entry.time = time,
                        None => violations.push(format!(
                            "{} time must be HH:MM, got {raw_time:?}",
                            hour.as_str()
                        )),
                    }
                }
            }
        }

        (next, violations)
    }
}

fn checked_in_range(value: i64, range: &RangeInclusive<i64>) -> Option<u32> {
    if range.contains(&value) {
        u32::try_from(value).ok()
    } else {
        None
    }
}

/// `HH:MM` wire format for hour times.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    #[must_use]
    pub fn parse(raw: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(raw.trim(), "%H:%M").ok()
    }

    #[must_use]
    pub fn format(time: NaiveTime) -> String {
        time.format("%H:%M").to_string()
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid HH:MM time {raw:?}")))
    }
}

//! Jaculatoria: core of a tray app that surfaces short prayers during the day.
//!
//! The crate owns everything except the windows:
//! - **Quotes**: day-of-week quote pools, rotation cursors that survive
//!   restarts, and feast-day overrides from the liturgical calendar
//! - **Scheduler**: interval popups, the noon Angelus, optional canonical
//!   hours, and the first unlock of the day
//! - **Settings**: validated user preferences persisted as JSON
//! - **Host**: a versioned JSON-lines protocol through which a native shell
//!   sends commands and receives popup events
//!
//! [`app::App`] wires these together; `jaculatoria-host` runs it over
//! stdin/stdout.

pub mod app;
pub mod app_dirs;
pub mod assets;
pub mod config;
pub mod day;
pub mod error;
pub mod host;
pub mod liturgy;
pub mod logging;
pub mod power;
pub mod quotes;
pub mod scheduler;
pub mod settings;
pub mod store;
pub mod usecase;

pub use app::{App, AppDeps};
pub use config::RuntimeConfig;
pub use day::DayOfWeek;
pub use error::{JaculatoriaError, Result};
pub use power::{PowerEvent, PowerMonitor};
pub use settings::{CanonicalHour, Language, Settings, SettingsPatch};
pub use usecase::{GetNextQuoteUseCase, GetPrayerUseCase, PrayerDto, PrayerRequest, QuoteDto};

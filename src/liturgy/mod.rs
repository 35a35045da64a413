//! Liturgical calendar: season, feast and calendar-provided quotes.

pub mod client;
pub mod context;
pub mod service;

pub use client::CalendarClient;
pub use context::{LiturgicalContext, LiturgicalSeason, Rank, slugify};
pub use service::{FixedCalendar, LiturgicalCalendar, SeasonService};

//! Error types for jaculatoria.

use crate::day::DayOfWeek;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum JaculatoriaError {
    /// Settings update rejected; carries every violated constraint.
    #[error("invalid settings: {}", .0.join("; "))]
    InvalidSettings(Vec<String>),

    /// No quotes are configured for the resolved day.
    #[error("no quotes found for day {day}")]
    QuotesNotFound {
        /// Day whose quote pool was missing or empty.
        day: DayOfWeek,
    },

    /// Asset file missing or unreadable.
    #[error("asset error: {0}")]
    Asset(String),

    /// Runtime configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Settings or indices persistence error.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Liturgical calendar lookup error.
    #[error("liturgy error: {0}")]
    Liturgy(String),

    /// Host command routing or payload error.
    #[error("host error: {0}")]
    Host(String),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, JaculatoriaError>;

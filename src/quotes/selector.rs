//! Sequential quote/image rotation.
//!
//! Pure functions: every input comes in as an argument and every change
//! comes back as a return value. A cursor that does not point into the
//! current collection (stale after the asset files changed, or corrupted
//! on disk) is treated as `0`, so a persisted index can never produce an
//! out-of-range lookup.

use crate::day::DayOfWeek;
use crate::quotes::{QuoteIndices, QuotesCollection};
use tracing::debug;

/// Result of advancing a rotation cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexAdvance {
    /// Valid position to read now.
    pub current_index: usize,
    /// Position to persist for the next read.
    pub next_index: usize,
}

/// Advance the quote cursor of `day` over a collection of `total_count`.
///
/// Returns `None` for an empty collection; callers check for that before
/// selecting.
#[must_use]
pub fn next_quote_index(
    day: DayOfWeek,
    total_count: usize,
    current_index: usize,
) -> Option<IndexAdvance> {
    advance("quote", &day, total_count, current_index)
}

/// Advance the image cursor of `day`. Independent of the quote cursor.
#[must_use]
pub fn next_image_index(
    day: DayOfWeek,
    total_count: usize,
    current_index: usize,
) -> Option<IndexAdvance> {
    advance("image", &day, total_count, current_index)
}

/// Advance the image cursor of the feast `slug`.
#[must_use]
pub fn next_feast_image_index(
    slug: &str,
    total_count: usize,
    current_index: usize,
) -> Option<IndexAdvance> {
    advance("feast image", &slug, total_count, current_index)
}

fn advance(
    kind: &str,
    key: &dyn std::fmt::Display,
    total_count: usize,
    current_index: usize,
) -> Option<IndexAdvance> {
    if total_count == 0 {
        return None;
    }
    let valid = heal(current_index, total_count);
    if valid != current_index {
        debug!(kind, %key, current_index, total_count, "stale rotation cursor reset to 0");
    }
    Some(IndexAdvance {
        current_index: valid,
        next_index: (valid + 1) % total_count,
    })
}

fn heal(index: usize, total_count: usize) -> usize {
    if index < total_count { index } else { 0 }
}

/// `true` when the persisted cursors belong to another day.
#[must_use]
pub fn should_reset_indices(last_day: DayOfWeek, current_day: DayOfWeek) -> bool {
    last_day != current_day
}

/// Zeroed cursors stamped with `current_day`.
#[must_use]
pub fn create_empty_indices(current_day: DayOfWeek) -> QuoteIndices {
    QuoteIndices::empty(current_day)
}

/// Quote at `index` for `day`, clamping an out-of-range index to `0`.
///
/// Returns `None` when the day is absent or has no quotes.
#[must_use]
pub fn select_quote(collection: &QuotesCollection, day: DayOfWeek, index: usize) -> Option<&str> {
    let quotes = collection.quotes_for(day)?;
    quotes.get(heal(index, quotes.len())).map(String::as_str)
}

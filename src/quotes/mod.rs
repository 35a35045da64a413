//! Quote collections, rotation cursors and the pure selection logic.

pub mod collection;
pub mod dedup;
pub mod indices;
pub mod selector;

pub use collection::{DayQuotes, QuotesCollection};
pub use dedup::{merge_feast_quotes, normalize_quote};
pub use indices::QuoteIndices;
pub use selector::IndexAdvance;

//! Application workflows invoked by timers and host commands.

pub mod dto;
pub mod next_quote;
pub mod prayer;

pub use dto::{PrayerDto, PrayerKind, QuoteDto};
pub use next_quote::GetNextQuoteUseCase;
pub use prayer::{GetPrayerUseCase, PrayerRequest};

//! Reminder scheduling.
//!
//! [`prayer`] holds the pure time math, [`clock`] the seam to the wall
//! clock, and [`timers`] the stateful [`TimerManager`] that arms popup,
//! Angelus and canonical-hour timers.

pub mod clock;
pub mod prayer;
pub mod timers;

pub use clock::{Clock, ClockSchedule, FixedClock, PrayerSchedule, SystemClock};
pub use prayer::{DAILY_INTERVAL, NextTrigger};
pub use timers::{TimerCallbacks, TimerManager, TimerStatus};

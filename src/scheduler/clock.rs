//! Wall-clock seam between the pure time math and the timers.

use crate::day::DayOfWeek;
use crate::scheduler::prayer;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone};
use std::sync::Mutex;
use std::time::Duration;

/// Source of the current local time.
pub trait Clock: Send + Sync + 'static {
    type Tz: TimeZone;

    fn now(&self) -> DateTime<Self::Tz>;
}

/// The operating system's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Tz = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Manually driven clock.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<FixedOffset>>,
}

impl FixedClock {
    #[must_use]
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<FixedOffset>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }
}

impl Clock for FixedClock {
    type Tz = FixedOffset;

    fn now(&self) -> DateTime<FixedOffset> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Everything the timers and use cases need to know about "now".
///
/// Object-safe so [`crate::scheduler::TimerManager`] can hold any
/// implementation; tests substitute counting fakes.
pub trait PrayerSchedule: Send + Sync + 'static {
    /// Delay until the next noon.
    fn next_noon(&self) -> Duration;

    /// Delay until the next occurrence of a local time of day.
    fn next_time_of_day(&self, time: NaiveTime) -> Duration;

    /// Whether local time is inside the noon window.
    fn is_noon_time(&self) -> bool;

    /// Whether local time is inside the firing window of `time`.
    fn is_time_of_day(&self, time: NaiveTime) -> bool;

    /// Local calendar date.
    fn today(&self) -> NaiveDate;

    /// 1-based day of week of the local date.
    fn day_of_week(&self) -> DayOfWeek;
}

/// [`PrayerSchedule`] computed from a [`Clock`] with the pure functions of
/// [`crate::scheduler::prayer`].
#[derive(Debug, Default)]
pub struct ClockSchedule<C: Clock> {
    clock: C,
}

impl<C: Clock> ClockSchedule<C> {
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<C: Clock> PrayerSchedule for ClockSchedule<C> {
    fn next_noon(&self) -> Duration {
        prayer::calculate_next_noon(&self.clock.now()).delay
    }

    fn next_time_of_day(&self, time: NaiveTime) -> Duration {
        prayer::calculate_next_time_of_day(&self.clock.now(), time).delay
    }

    fn is_noon_time(&self) -> bool {
        prayer::is_noon_time(&self.clock.now())
    }

    fn is_time_of_day(&self, time: NaiveTime) -> bool {
        prayer::is_time_of_day(&self.clock.now(), time)
    }

    fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }

    fn day_of_week(&self) -> DayOfWeek {
        prayer::day_of_week(&self.clock.now())
    }
}

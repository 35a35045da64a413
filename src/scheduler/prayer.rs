//! Pure time math for the Angelus and canonical-hour reminders.
//!
//! Every function takes "now" as an argument so the logic can be driven
//! by a fixed clock in tests. Only [`crate::scheduler::clock::SystemClock`]
//! reads the real wall clock.

use crate::day::DayOfWeek;
use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use std::time::Duration;

/// Period of the daily repeating Angelus timer.
pub const DAILY_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Hour of the Angelus.
const NOON_HOUR: u32 = 12;

/// Minutes after a reminder's time still accepted by [`is_time_of_day`].
const FIRE_TOLERANCE_MINUTES: u32 = 1;

const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Next firing instant and the delay until it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextTrigger<Tz: TimeZone> {
    pub next_trigger_time: DateTime<Tz>,
    pub delay: Duration,
}

impl<Tz: TimeZone> NextTrigger<Tz> {
    #[must_use]
    pub fn delay_ms(&self) -> u128 {
        self.delay.as_millis()
    }
}

/// Next 12:00:00.000 local time strictly after `now`.
///
/// Exactly noon rolls over to tomorrow.
#[must_use]
pub fn calculate_next_noon<Tz: TimeZone>(now: &DateTime<Tz>) -> NextTrigger<Tz> {
    calculate_next_time_of_day(now, noon())
}

/// Next occurrence of `time` (local) strictly after `now`.
#[must_use]
pub fn calculate_next_time_of_day<Tz: TimeZone>(
    now: &DateTime<Tz>,
    time: NaiveTime,
) -> NextTrigger<Tz> {
    let today = now.date_naive();
    let mut next = resolve_local(&now.timezone(), today.and_time(time));
    if *now >= next {
        let tomorrow = today.succ_opt().unwrap_or(today);
        next = resolve_local(&now.timezone(), tomorrow.and_time(time));
    }
    let delay = (next.clone() - now.clone()).to_std().unwrap_or_default();
    NextTrigger {
        next_trigger_time: next,
        delay,
    }
}

/// `true` between 12:00:00.000 and 12:01:59.999 local time.
///
/// Validates that a fired Angelus timer really corresponds to noon; timers
/// armed before a suspend can fire late.
#[must_use]
pub fn is_noon_time<Tz: TimeZone>(now: &DateTime<Tz>) -> bool {
    is_time_of_day(now, noon())
}

/// `true` from `time` up to the end of the following minute, local time.
///
/// The window wraps past midnight, so 23:59 still matches at 00:00:30.
#[must_use]
pub fn is_time_of_day<Tz: TimeZone>(now: &DateTime<Tz>, time: NaiveTime) -> bool {
    let now = now.time().num_seconds_from_midnight();
    let target = time.num_seconds_from_midnight();
    let elapsed = (now + SECONDS_PER_DAY - target) % SECONDS_PER_DAY;
    elapsed < (FIRE_TOLERANCE_MINUTES + 1) * 60
}

fn noon() -> NaiveTime {
    NaiveTime::from_hms_opt(NOON_HOUR, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// 1-based day of week (`1 = Sunday`) of `date`.
#[must_use]
pub fn day_of_week<Tz: TimeZone>(date: &DateTime<Tz>) -> DayOfWeek {
    DayOfWeek::of(&date.date_naive())
}

/// Map a local wall-clock time to an instant.
///
/// Ambiguous times (DST fall-back) take the earlier instant. A time that
/// does not exist (DST spring-forward gap) is pushed one hour later.
fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Tz> {
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(local + chrono::Duration::hours(1)))
                .earliest()
        })
        .unwrap_or_else(|| tz.from_utc_datetime(&local))
}

//! Timer orchestration for popups, the Angelus and canonical hours.
//!
//! Each timer is a tokio task; re-arming aborts the previous task before
//! spawning the next, so a timer is never duplicated. Callbacks are
//! fire-and-forget: a panicking callback is logged and the timer keeps
//! running, and a missed popup is simply skipped.

use crate::power::PowerEvent;
use crate::scheduler::clock::PrayerSchedule;
use crate::scheduler::prayer::DAILY_INTERVAL;
use crate::settings::{CanonicalHour, Settings};
use chrono::{NaiveDate, NaiveTime};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Pause after a canonical-hour reminder before computing the next one, so
/// a timer that wakes a little early cannot fire twice for the same day.
const HOUR_REARM_GUARD: Duration = Duration::from_secs(60);

/// Receivers of timer firings.
pub trait TimerCallbacks: Send + Sync + 'static {
    /// Popup interval elapsed.
    fn on_popup_time(&self);
    /// It is noon.
    fn on_angelus_time(&self);
    /// First resume/unlock of the local calendar day.
    fn on_first_unlock_of_day(&self);
    /// An enabled canonical hour was reached.
    fn on_canonical_hour(&self, _hour: CanonicalHour) {}
}

/// Lifecycle of a [`TimerManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Idle,
    Running,
}

/// Owns every reminder timer and the power-event subscription.
///
/// Cheap to clone; clones share the same timers.
#[derive(Clone)]
pub struct TimerManager {
    inner: Arc<Inner>,
}

struct Inner {
    schedule: Arc<dyn PrayerSchedule>,
    callbacks: Arc<dyn TimerCallbacks>,
    state: Mutex<TimerState>,
    power_listening: AtomicBool,
}

#[derive(Default)]
struct TimerState {
    settings: Option<Settings>,
    popup_timer: Option<JoinHandle<()>>,
    angelus_timer: Option<JoinHandle<()>>,
    hour_timers: Vec<JoinHandle<()>>,
    power_listener: Option<JoinHandle<()>>,
    last_unlock_day: Option<NaiveDate>,
}

impl std::fmt::Debug for TimerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerManager")
            .field("status", &self.status())
            .finish()
    }
}

impl TimerManager {
    #[must_use]
    pub fn new(schedule: Arc<dyn PrayerSchedule>, callbacks: Arc<dyn TimerCallbacks>) -> Self {
        Self {
            inner: Arc::new(Inner {
                schedule,
                callbacks,
                state: Mutex::new(TimerState::default()),
                power_listening: AtomicBool::new(false),
            }),
        }
    }

    /// Store settings, start every timer and subscribe to power events.
    ///
    /// The power subscription is registered once; later calls drop
    /// `power_events`. Must be called inside a tokio runtime.
    pub fn setup(&self, settings: Settings, power_events: broadcast::Receiver<PowerEvent>) {
        {
            let mut state = self.inner.state();
            state.settings = Some(settings.clone());
            self.inner.arm_popup(&mut state, &settings);
            self.inner.arm_angelus(&mut state);
            self.inner.arm_hours(&mut state, &settings);
        }

        if !self.inner.power_listening.swap(true, Ordering::SeqCst) {
            let handle = tokio::spawn(listen_power(Arc::downgrade(&self.inner), power_events));
            self.inner.state().power_listener = Some(handle);
        }

        info!(
            interval_min = settings.interval(),
            hours = settings.enabled_hours().count(),
            "timers started"
        );
    }

    /// Replace settings and restart the popup timer.
    ///
    /// The Angelus timer is left alone. Canonical-hour timers are re-armed
    /// only when their configuration changed.
    pub fn update_settings(&self, settings: Settings) {
        let mut state = self.inner.state();
        let hours_changed = state
            .settings
            .as_ref()
            .is_none_or(|previous| previous.liturgy_of_hours() != settings.liturgy_of_hours());

        self.inner.arm_popup(&mut state, &settings);
        if hours_changed {
            self.inner.arm_hours(&mut state, &settings);
        }
        state.settings = Some(settings);
        debug!(hours_changed, "timer settings updated");
    }

    /// Drop any pending Angelus timer and schedule the next noon from now.
    pub fn reset_angelus_timer(&self) {
        let mut state = self.inner.state();
        self.inner.arm_angelus(&mut state);
    }

    /// React to a power event.
    ///
    /// Resume re-arms the clock-based timers, since in-process timers do not
    /// observe time spent suspended. Both resume and unlock then check for
    /// the first unlock of the day.
    pub fn handle_power_event(&self, event: PowerEvent) {
        debug!(?event, "power event");
        if event == PowerEvent::Resume {
            let mut state = self.inner.state();
            self.inner.arm_angelus(&mut state);
            if let Some(settings) = state.settings.clone() {
                self.inner.arm_hours(&mut state, &settings);
            }
        }
        self.check_first_unlock_of_day();
    }

    /// Fire the first-unlock callback at most once per local day.
    ///
    /// Returns `true` when the callback fired.
    pub fn check_first_unlock_of_day(&self) -> bool {
        let today = self.inner.schedule.today();
        {
            let mut state = self.inner.state();
            if state.last_unlock_day == Some(today) {
                return false;
            }
            state.last_unlock_day = Some(today);
        }
        info!(%today, "first unlock of the day");
        let callbacks = Arc::clone(&self.inner.callbacks);
        guarded("first_unlock", || callbacks.on_first_unlock_of_day());
        true
    }

    /// Clear every timer and the power subscription. Safe to call repeatedly.
    pub fn destroy(&self) {
        let mut guard = self.inner.state();
        let state = &mut *guard;
        for handle in state
            .popup_timer
            .take()
            .into_iter()
            .chain(state.angelus_timer.take())
            .chain(state.power_listener.take())
            .chain(state.hour_timers.drain(..))
        {
            handle.abort();
        }
        state.settings = None;
        self.inner.power_listening.store(false, Ordering::SeqCst);
        debug!("timers destroyed");
    }

    #[must_use]
    pub fn status(&self) -> TimerStatus {
        let state = self.inner.state();
        if state.popup_timer.is_some() || state.angelus_timer.is_some() {
            TimerStatus::Running
        } else {
            TimerStatus::Idle
        }
    }

    /// Settings currently driving the timers.
    #[must_use]
    pub fn settings(&self) -> Option<Settings> {
        self.inner.state().settings.clone()
    }
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn arm_popup(&self, state: &mut TimerState, settings: &Settings) {
        if let Some(handle) = state.popup_timer.take() {
            handle.abort();
        }
        let period = settings.interval_duration();
        let callbacks = Arc::clone(&self.callbacks);
        state.popup_timer = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(period).await;
                guarded("popup", || callbacks.on_popup_time());
            }
        }));
    }

    fn arm_angelus(&self, state: &mut TimerState) {
        if let Some(handle) = state.angelus_timer.take() {
            handle.abort();
        }
        let schedule = Arc::clone(&self.schedule);
        let callbacks = Arc::clone(&self.callbacks);
        state.angelus_timer = Some(tokio::spawn(run_angelus(schedule, callbacks)));
    }

    fn arm_hours(&self, state: &mut TimerState, settings: &Settings) {
        for handle in state.hour_timers.drain(..) {
            handle.abort();
        }
        for (hour, time) in settings.enabled_hours() {
            let schedule = Arc::clone(&self.schedule);
            let callbacks = Arc::clone(&self.callbacks);
            state
                .hour_timers
                .push(tokio::spawn(run_hour(schedule, callbacks, hour, time)));
        }
    }
}

/// One-shot to the next noon, then daily. Any firing outside the noon
/// window goes back to computing the next noon from the current time.
async fn run_angelus(schedule: Arc<dyn PrayerSchedule>, callbacks: Arc<dyn TimerCallbacks>) {
    loop {
        let delay = schedule.next_noon();
        debug!(delay_secs = delay.as_secs(), "angelus timer armed");
        tokio::time::sleep(delay).await;
        if !fire_angelus_if_noon(schedule.as_ref(), callbacks.as_ref()) {
            continue;
        }
        loop {
            tokio::time::sleep(DAILY_INTERVAL).await;
            if !fire_angelus_if_noon(schedule.as_ref(), callbacks.as_ref()) {
                break;
            }
        }
    }
}

/// Shared by the one-shot and the daily firing.
fn fire_angelus_if_noon(schedule: &dyn PrayerSchedule, callbacks: &dyn TimerCallbacks) -> bool {
    fire_if_due("angelus", schedule.is_noon_time(), || {
        callbacks.on_angelus_time();
    })
}

/// Run a reminder only when the wall clock agrees with its timer; timers
/// armed before a suspend can wake late. Returns `false` when the timer must
/// be rescheduled.
fn fire_if_due(name: &str, due: bool, fire: impl FnOnce()) -> bool {
    if !due {
        info!(timer = name, "timer fired outside its window; rescheduling");
        return false;
    }
    guarded(name, fire);
    true
}

async fn run_hour(
    schedule: Arc<dyn PrayerSchedule>,
    callbacks: Arc<dyn TimerCallbacks>,
    hour: CanonicalHour,
    time: NaiveTime,
) {
    loop {
        let delay = schedule.next_time_of_day(time);
        debug!(hour = hour.as_str(), delay_secs = delay.as_secs(), "hour timer armed");
        tokio::time::sleep(delay).await;
        let due = schedule.is_time_of_day(time);
        if fire_if_due(hour.as_str(), due, || callbacks.on_canonical_hour(hour)) {
            tokio::time::sleep(HOUR_REARM_GUARD).await;
        }
    }
}

async fn listen_power(inner: Weak<Inner>, mut events: broadcast::Receiver<PowerEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                TimerManager { inner }.handle_power_event(event);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(lagged = n, "power listener lagged; some events were dropped");
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("power event channel closed; stopping listener");
                break;
            }
        }
    }
}

/// Run a callback, logging instead of unwinding into the timer task.
fn guarded(name: &str, f: impl FnOnce()) {
    if std::panic::catch_unwind(AssertUnwindSafe(f)).is_err() {
        error!(timer = name, "timer callback panicked");
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::power::PowerMonitor;
    use crate::settings::{HourSettingPatch, SettingsPatch};
    use std::collections::BTreeMap;
    use std::sync::atomic::AtomicUsize;

    const MINUTE: Duration = Duration::from_secs(60);

    struct FakeSchedule {
        noon_delay: Duration,
        hour_delay: Duration,
        noon: AtomicBool,
        hour_on_time: AtomicBool,
        next_noon_calls: AtomicUsize,
        next_hour_calls: AtomicUsize,
        today: Mutex<NaiveDate>,
    }

    impl FakeSchedule {
        fn new(noon_delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                noon_delay,
                hour_delay: 30 * MINUTE,
                noon: AtomicBool::new(true),
                hour_on_time: AtomicBool::new(true),
                next_noon_calls: AtomicUsize::new(0),
                next_hour_calls: AtomicUsize::new(0),
                today: Mutex::new(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()),
            })
        }

        fn calls(&self) -> usize {
            self.next_noon_calls.load(Ordering::SeqCst)
        }

        fn set_noon(&self, noon: bool) {
            self.noon.store(noon, Ordering::SeqCst);
        }

        fn set_hour_on_time(&self, on_time: bool) {
            self.hour_on_time.store(on_time, Ordering::SeqCst);
        }

        fn hour_calls(&self) -> usize {
            self.next_hour_calls.load(Ordering::SeqCst)
        }

        fn next_day(&self) {
            let mut today = self.today.lock().unwrap();
            *today = today.succ_opt().unwrap();
        }
    }

    impl PrayerSchedule for FakeSchedule {
        fn next_noon(&self) -> Duration {
            self.next_noon_calls.fetch_add(1, Ordering::SeqCst);
            self.noon_delay
        }

        fn next_time_of_day(&self, _time: NaiveTime) -> Duration {
            self.next_hour_calls.fetch_add(1, Ordering::SeqCst);
            self.hour_delay
        }

        fn is_noon_time(&self) -> bool {
            self.noon.load(Ordering::SeqCst)
        }

        fn is_time_of_day(&self, _time: NaiveTime) -> bool {
            self.hour_on_time.load(Ordering::SeqCst)
        }

        fn today(&self) -> NaiveDate {
            *self.today.lock().unwrap()
        }

        fn day_of_week(&self) -> crate::day::DayOfWeek {
            crate::day::DayOfWeek::of(&self.today())
        }
    }

    #[derive(Default)]
    struct Counts {
        popups: AtomicUsize,
        angelus: AtomicUsize,
        unlocks: AtomicUsize,
        hours: Mutex<Vec<CanonicalHour>>,
    }

    impl TimerCallbacks for Counts {
        fn on_popup_time(&self) {
            self.popups.fetch_add(1, Ordering::SeqCst);
        }
        fn on_angelus_time(&self) {
            self.angelus.fetch_add(1, Ordering::SeqCst);
        }
        fn on_first_unlock_of_day(&self) {
            self.unlocks.fetch_add(1, Ordering::SeqCst);
        }
        fn on_canonical_hour(&self, hour: CanonicalHour) {
            self.hours.lock().unwrap().push(hour);
        }
    }

    impl Counts {
        fn popups(&self) -> usize {
            self.popups.load(Ordering::SeqCst)
        }
        fn angelus(&self) -> usize {
            self.angelus.load(Ordering::SeqCst)
        }
        fn unlocks(&self) -> usize {
            self.unlocks.load(Ordering::SeqCst)
        }
    }

    fn settings(interval: i64) -> Settings {
        Settings::default()
            .update(&SettingsPatch {
                interval: Some(interval),
                ..Default::default()
            })
            .unwrap()
    }

    fn with_vespers(base: &Settings) -> Settings {
        let mut hours = BTreeMap::new();
        hours.insert(
            "vespers".to_owned(),
            HourSettingPatch {
                enabled: Some(true),
                time: None,
            },
        );
        base.update(&SettingsPatch {
            liturgy_of_hours: Some(hours),
            ..Default::default()
        })
        .unwrap()
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    async fn advance(by: Duration) {
        tokio::time::advance(by).await;
        settle().await;
    }

    fn manager(schedule: &Arc<FakeSchedule>, counts: &Arc<Counts>) -> TimerManager {
        let schedule: Arc<dyn PrayerSchedule> = schedule.clone();
        let callbacks: Arc<dyn TimerCallbacks> = counts.clone();
        TimerManager::new(schedule, callbacks)
    }

    #[tokio::test(start_paused = true)]
    async fn popup_fires_every_interval() {
        let schedule = FakeSchedule::new(600 * MINUTE);
        let counts = Arc::new(Counts::default());
        let timers = manager(&schedule, &counts);
        timers.setup(settings(10), PowerMonitor::default().subscribe());
        settle().await;
        assert_eq!(timers.status(), TimerStatus::Running);

        advance(10 * MINUTE).await;
        assert_eq!(counts.popups(), 1);
        advance(10 * MINUTE).await;
        assert_eq!(counts.popups(), 2);
        timers.destroy();
    }

    #[tokio::test(start_paused = true)]
    async fn angelus_fires_at_noon_then_daily() {
        let schedule = FakeSchedule::new(60 * MINUTE);
        let counts = Arc::new(Counts::default());
        let timers = manager(&schedule, &counts);
        timers.setup(settings(60), PowerMonitor::default().subscribe());
        settle().await;
        assert_eq!(schedule.calls(), 1);

        advance(60 * MINUTE).await;
        assert_eq!(counts.angelus(), 1);

        advance(DAILY_INTERVAL).await;
        assert_eq!(counts.angelus(), 2);
        assert_eq!(schedule.calls(), 1, "daily repeat does not recompute noon");
        timers.destroy();
    }

    #[tokio::test(start_paused = true)]
    async fn mistimed_angelus_reschedules_instead_of_firing() {
        let schedule = FakeSchedule::new(60 * MINUTE);
        let counts = Arc::new(Counts::default());
        let timers = manager(&schedule, &counts);
        timers.setup(settings(60), PowerMonitor::default().subscribe());
        settle().await;
        assert_eq!(schedule.calls(), 1);

        schedule.set_noon(false);
        advance(60 * MINUTE).await;
        assert_eq!(counts.angelus(), 0);
        assert_eq!(schedule.calls(), 2);
        timers.destroy();
    }

    #[tokio::test(start_paused = true)]
    async fn mistimed_daily_tick_also_reschedules() {
        let schedule = FakeSchedule::new(60 * MINUTE);
        let counts = Arc::new(Counts::default());
        let timers = manager(&schedule, &counts);
        timers.setup(settings(60), PowerMonitor::default().subscribe());
        settle().await;

        advance(60 * MINUTE).await;
        assert_eq!(counts.angelus(), 1);

        schedule.set_noon(false);
        advance(DAILY_INTERVAL).await;
        assert_eq!(counts.angelus(), 1);
        assert_eq!(schedule.calls(), 2);
        timers.destroy();
    }

    #[tokio::test(start_paused = true)]
    async fn update_settings_restarts_popup_only() {
        let schedule = FakeSchedule::new(60 * MINUTE);
        let counts = Arc::new(Counts::default());
        let timers = manager(&schedule, &counts);
        timers.setup(settings(10), PowerMonitor::default().subscribe());
        settle().await;

        advance(5 * MINUTE).await;
        timers.update_settings(settings(10));
        settle().await;

        advance(9 * MINUTE).await;
        assert_eq!(counts.popups(), 0, "popup timer restarted at minute 5");
        advance(MINUTE).await;
        assert_eq!(counts.popups(), 1);

        // Angelus still due at minute 60 of the original schedule.
        advance(44 * MINUTE).await;
        assert_eq!(counts.angelus(), 0);
        advance(MINUTE).await;
        assert_eq!(counts.angelus(), 1);
        assert_eq!(schedule.calls(), 1);
        assert_eq!(timers.settings().map(|s| s.interval()), Some(10));
        timers.destroy();
    }

    #[tokio::test(start_paused = true)]
    async fn reset_angelus_recomputes_from_now() {
        let schedule = FakeSchedule::new(60 * MINUTE);
        let counts = Arc::new(Counts::default());
        let timers = manager(&schedule, &counts);
        timers.setup(settings(60), PowerMonitor::default().subscribe());
        settle().await;

        advance(30 * MINUTE).await;
        timers.reset_angelus_timer();
        settle().await;
        assert_eq!(schedule.calls(), 2);

        advance(30 * MINUTE).await;
        assert_eq!(counts.angelus(), 0, "old timer was cleared");
        advance(30 * MINUTE).await;
        assert_eq!(counts.angelus(), 1);
        timers.destroy();
    }

    #[tokio::test(start_paused = true)]
    async fn resume_resets_angelus_and_welcomes_once_per_day() {
        let schedule = FakeSchedule::new(60 * MINUTE);
        let counts = Arc::new(Counts::default());
        let timers = manager(&schedule, &counts);
        let monitor = PowerMonitor::default();
        timers.setup(settings(60), monitor.subscribe());
        settle().await;
        assert_eq!(schedule.calls(), 1);

        monitor.publish(PowerEvent::Resume);
        settle().await;
        assert_eq!(schedule.calls(), 2);
        assert_eq!(counts.unlocks(), 1);

        monitor.publish(PowerEvent::Unlock);
        monitor.publish(PowerEvent::Resume);
        settle().await;
        assert_eq!(counts.unlocks(), 1);

        schedule.next_day();
        monitor.publish(PowerEvent::Unlock);
        settle().await;
        assert_eq!(counts.unlocks(), 2);
        timers.destroy();
    }

    #[tokio::test(start_paused = true)]
    async fn power_listener_registers_once() {
        let schedule = FakeSchedule::new(60 * MINUTE);
        let counts = Arc::new(Counts::default());
        let timers = manager(&schedule, &counts);
        let monitor = PowerMonitor::default();
        timers.setup(settings(60), monitor.subscribe());
        settle().await;
        timers.setup(settings(60), monitor.subscribe());
        settle().await;
        let before = schedule.calls();

        monitor.publish(PowerEvent::Resume);
        settle().await;
        assert_eq!(schedule.calls(), before + 1);
        timers.destroy();
    }

    #[tokio::test(start_paused = true)]
    async fn canonical_hours_fire_and_rearm_on_change() {
        let schedule = FakeSchedule::new(600 * MINUTE);
        let counts = Arc::new(Counts::default());
        let timers = manager(&schedule, &counts);
        let base = settings(60);
        timers.setup(with_vespers(&base), PowerMonitor::default().subscribe());
        settle().await;

        advance(30 * MINUTE).await;
        assert_eq!(*counts.hours.lock().unwrap(), vec![CanonicalHour::Vespers]);

        timers.update_settings(base);
        settle().await;
        advance(120 * MINUTE).await;
        assert_eq!(counts.hours.lock().unwrap().len(), 1, "disabled hour stops firing");
        timers.destroy();
    }

    #[tokio::test(start_paused = true)]
    async fn late_hour_timer_reschedules_without_firing() {
        let schedule = FakeSchedule::new(600 * MINUTE);
        schedule.set_hour_on_time(false);
        let counts = Arc::new(Counts::default());
        let timers = manager(&schedule, &counts);
        timers.setup(with_vespers(&settings(60)), PowerMonitor::default().subscribe());
        settle().await;
        assert_eq!(schedule.hour_calls(), 1);

        advance(30 * MINUTE + Duration::from_secs(1)).await;
        assert!(counts.hours.lock().unwrap().is_empty());
        assert_eq!(schedule.hour_calls(), 2, "next occurrence recomputed at once");

        schedule.set_hour_on_time(true);
        advance(30 * MINUTE).await;
        assert_eq!(*counts.hours.lock().unwrap(), vec![CanonicalHour::Vespers]);
        timers.destroy();
    }

    #[tokio::test(start_paused = true)]
    async fn destroy_is_idempotent_and_silences_timers() {
        let schedule = FakeSchedule::new(60 * MINUTE);
        let counts = Arc::new(Counts::default());
        let timers = manager(&schedule, &counts);
        timers.setup(settings(1), PowerMonitor::default().subscribe());
        settle().await;

        timers.destroy();
        timers.destroy();
        assert_eq!(timers.status(), TimerStatus::Idle);

        advance(2 * DAILY_INTERVAL).await;
        assert_eq!(counts.popups(), 0);
        assert_eq!(counts.angelus(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_callback_does_not_kill_timer() {
        struct Panicky(AtomicUsize);
        impl TimerCallbacks for Panicky {
            fn on_popup_time(&self) {
                self.0.fetch_add(1, Ordering::SeqCst);
                panic!("popup window failed");
            }
            fn on_angelus_time(&self) {}
            fn on_first_unlock_of_day(&self) {}
        }

        let schedule: Arc<dyn PrayerSchedule> = FakeSchedule::new(600 * MINUTE);
        let callbacks = Arc::new(Panicky(AtomicUsize::new(0)));
        let timers = TimerManager::new(schedule, callbacks.clone());
        timers.setup(settings(1), PowerMonitor::default().subscribe());
        settle().await;

        advance(MINUTE).await;
        advance(MINUTE).await;
        assert_eq!(callbacks.0.load(Ordering::SeqCst), 2);
        timers.destroy();
    }
}

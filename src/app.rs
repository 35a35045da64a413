//! Composition root.
//!
//! [`App`] is built once at process start and owns the settings, the use
//! cases, the [`TimerManager`] and the event sink to the shell. Every
//! collaborator arrives through [`App::new`]; nothing is global.

use crate::assets::{AssetSource, FsAssets};
use crate::config::RuntimeConfig;
use crate::error::Result;
use crate::host::{CommandHandler, EventName, EventSink};
use crate::liturgy::{LiturgicalCalendar, SeasonService};
use crate::power::{PowerEvent, PowerMonitor};
use crate::scheduler::{ClockSchedule, PrayerSchedule, SystemClock, TimerCallbacks, TimerManager};
use crate::settings::{CanonicalHour, Settings, SettingsPatch};
use crate::store::{IndicesStore, SettingsStore};
use crate::usecase::{GetNextQuoteUseCase, GetPrayerUseCase, PrayerDto, PrayerRequest, QuoteDto};
use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Collaborators that differ between production and tests.
pub struct AppDeps {
    pub assets: Arc<dyn AssetSource>,
    pub calendar: Arc<dyn LiturgicalCalendar>,
    pub schedule: Arc<dyn PrayerSchedule>,
}

/// State shared by the command handler and the timer callbacks.
struct Services {
    settings: Mutex<Settings>,
    next_quote: GetNextQuoteUseCase,
    prayer: GetPrayerUseCase,
    events: EventSink,
}

impl Services {
    fn settings(&self) -> MutexGuard<'_, Settings> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn duration(&self) -> u32 {
        self.settings().duration()
    }

    async fn popup_quote(&self, event: EventName) {
        match self.next_quote.execute().await {
            Ok(quote) => {
                self.events.emit(
                    event,
                    json!({"quote": quote, "duration": self.duration()}),
                );
            }
            Err(e) => error!(event = event.as_str(), "cannot select quote: {e}"),
        }
    }

    async fn popup_prayer(&self, event: EventName, request: PrayerRequest) {
        match self.prayer.execute(request).await {
            Ok(prayer) => {
                self.events.emit(
                    event,
                    json!({"prayer": prayer, "duration": self.duration()}),
                );
            }
            Err(e) => error!(event = event.as_str(), "cannot load prayer: {e}"),
        }
    }
}

/// Turns timer firings into popup events.
struct PopupDispatcher {
    services: Arc<Services>,
}

impl PopupDispatcher {
    fn spawn_quote(&self, event: EventName) {
        let services = Arc::clone(&self.services);
        tokio::spawn(async move { services.popup_quote(event).await });
    }

    fn spawn_prayer(&self, event: EventName, request: PrayerRequest) {
        let services = Arc::clone(&self.services);
        tokio::spawn(async move { services.popup_prayer(event, request).await });
    }
}

impl TimerCallbacks for PopupDispatcher {
    fn on_popup_time(&self) {
        self.spawn_quote(EventName::PopupQuote);
    }

    fn on_angelus_time(&self) {
        self.spawn_prayer(EventName::PopupAngelus, PrayerRequest::default());
    }

    fn on_first_unlock_of_day(&self) {
        self.spawn_quote(EventName::PopupWelcome);
    }

    fn on_canonical_hour(&self, hour: CanonicalHour) {
        self.spawn_prayer(
            EventName::PopupHour,
            PrayerRequest {
                force_easter_time: None,
                hour: Some(hour),
            },
        );
    }
}

/// The application. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct App {
    services: Arc<Services>,
    settings_store: SettingsStore,
    timers: TimerManager,
    power: PowerMonitor,
    shutdown: CancellationToken,
}

impl App {
    /// Wire an application from explicit collaborators.
    #[must_use]
    pub fn new(config: &RuntimeConfig, deps: AppDeps, events: EventSink) -> Self {
        Self::with_shutdown(config, deps, events, CancellationToken::new())
    }

    /// Production wiring: filesystem assets, HTTP calendar, system clock.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::JaculatoriaError::Liturgy`] when the calendar
    /// HTTP client cannot be built.
    pub fn from_config(config: &RuntimeConfig, events: EventSink) -> Result<Self> {
        let shutdown = CancellationToken::new();
        let deps = AppDeps {
            assets: Arc::new(FsAssets::new(&config.assets_dir)),
            calendar: Arc::new(SeasonService::new(
                config.liturgy.clone(),
                shutdown.child_token(),
            )?),
            schedule: Arc::new(ClockSchedule::new(SystemClock)),
        };
        Ok(Self::with_shutdown(config, deps, events, shutdown))
    }

    fn with_shutdown(
        config: &RuntimeConfig,
        deps: AppDeps,
        events: EventSink,
        shutdown: CancellationToken,
    ) -> Self {
        let settings_store = SettingsStore::new(&config.settings_file);
        let indices_store = IndicesStore::new(&config.indices_file);

        let services = Arc::new(Services {
            settings: Mutex::new(settings_store.load()),
            next_quote: GetNextQuoteUseCase::new(
                settings_store.clone(),
                indices_store,
                Arc::clone(&deps.assets),
                Arc::clone(&deps.calendar),
                Arc::clone(&deps.schedule),
            ),
            prayer: GetPrayerUseCase::new(
                settings_store.clone(),
                deps.assets,
                deps.calendar,
                Arc::clone(&deps.schedule),
            ),
            events,
        });

        let dispatcher = Arc::new(PopupDispatcher {
            services: Arc::clone(&services),
        });
        let timers = TimerManager::new(deps.schedule, dispatcher);

        Self {
            services,
            settings_store,
            timers,
            power: PowerMonitor::new(config.host.event_capacity),
            shutdown,
        }
    }

    /// Start the timers with the loaded settings. Call inside a tokio runtime.
    pub fn start(&self) {
        let settings = self.settings();
        info!(
            language = settings.language().as_str(),
            interval_min = settings.interval(),
            "starting"
        );
        self.timers.setup(settings, self.power.subscribe());
    }

    /// Stop every timer and abort in-flight calendar lookups. Idempotent.
    pub fn shutdown(&self) {
        self.timers.destroy();
        self.shutdown.cancel();
    }

    #[must_use]
    pub fn settings(&self) -> Settings {
        self.services.settings().clone()
    }

    #[must_use]
    pub fn timers(&self) -> &TimerManager {
        &self.timers
    }

    #[must_use]
    pub fn events(&self) -> &EventSink {
        &self.services.events
    }
}

#[async_trait]
impl CommandHandler for App {
    async fn get_quote(&self) -> Result<QuoteDto> {
        self.services.next_quote.execute().await
    }

    async fn get_prayer(&self, request: PrayerRequest) -> Result<PrayerDto> {
        self.services.prayer.execute(request).await
    }

    fn get_config(&self) -> Settings {
        self.settings()
    }

    fn save_settings(&self, patch: &SettingsPatch) -> Result<Settings> {
        let next = {
            let mut current = self.services.settings();
            let next = current.update(patch)?;
            self.settings_store.save(&next)?;
            *current = next.clone();
            next
        };
        self.timers.update_settings(next.clone());
        info!(interval_min = next.interval(), "settings saved");
        Ok(next)
    }

    fn show_now(&self) -> Result<()> {
        let services = Arc::clone(&self.services);
        tokio::spawn(async move { services.popup_quote(EventName::PopupQuote).await });
        Ok(())
    }

    fn power_event(&self, event: PowerEvent) -> Result<()> {
        self.power.publish(event);
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.shutdown();
        Ok(())
    }
}

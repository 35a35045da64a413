//! Shared helpers for integration tests.

use chrono::{DateTime, FixedOffset, TimeZone};
use jaculatoria::assets::FsAssets;
use jaculatoria::host::{EventEnvelope, EventSink};
use jaculatoria::liturgy::{FixedCalendar, LiturgicalContext};
use jaculatoria::scheduler::{ClockSchedule, FixedClock, PrayerSchedule};
use jaculatoria::store::{IndicesStore, SettingsStore};
use jaculatoria::{App, AppDeps, GetNextQuoteUseCase, Language, RuntimeConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Sunday 2026-10-18, 09:00 at UTC-3.
pub(crate) fn sunday_morning() -> DateTime<FixedOffset> {
    FixedOffset::west_opt(3 * 3600)
        .unwrap()
        .with_ymd_and_hms(2026, 10, 18, 9, 0, 0)
        .unwrap()
}

/// Monday 2026-10-19, 09:00 at UTC-3.
pub(crate) fn monday_morning() -> DateTime<FixedOffset> {
    FixedOffset::west_opt(3 * 3600)
        .unwrap()
        .with_ymd_and_hms(2026, 10, 19, 9, 0, 0)
        .unwrap()
}

/// Asset tree plus settings and indices files inside one temp directory.
pub(crate) struct Fixture {
    pub dir: tempfile::TempDir,
}

impl Fixture {
    /// Ordinary-time quotes for Sunday and Monday, prayers and one image per day.
    pub(crate) fn new() -> Self {
        let fixture = Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        };
        let lang = Language::default().as_str();
        fixture.write(
            &format!("assets/quotes/{lang}/ordinary.json"),
            r#"{
                "1": {"day": "Domingo", "theme": "Ressurreição",
                      "quotes": ["Quote 1", "Quote 2", "Quote 3"]},
                "2": {"day": "Segunda", "theme": "Almas", "quotes": ["Monday 1", "Monday 2"]}
            }"#,
        );
        fixture.write(
            &format!("assets/prayers/{lang}.json"),
            r#"{
                "angelus": {"title": "Angelus", "text": "O anjo do Senhor..."},
                "reginaCaeli": {"title": "Regina Caeli", "text": "Rainha do céu..."},
                "hours": {"lauds": {"title": "Laudes", "text": "Vinde, ó Deus..."}}
            }"#,
        );
        fixture.write("assets/images/ordinary/1/a.png", "");
        fixture.write("assets/images/ordinary/1/b.jpg", "");
        fixture
    }

    pub(crate) fn write(&self, rel: &str, contents: &str) {
        let path = self.dir.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    pub(crate) fn root(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn config(&self) -> RuntimeConfig {
        RuntimeConfig {
            assets_dir: self.root().join("assets"),
            settings_file: self.settings_path(),
            indices_file: self.indices_path(),
            ..RuntimeConfig::default()
        }
    }

    pub(crate) fn settings_path(&self) -> PathBuf {
        self.root().join("settings.json")
    }

    pub(crate) fn indices_path(&self) -> PathBuf {
        self.root().join("indices.json")
    }

    pub(crate) fn read_indices(&self) -> serde_json::Value {
        let raw = std::fs::read_to_string(self.indices_path()).unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    /// Quote use case over this fixture, with a movable clock.
    pub(crate) fn next_quote(
        &self,
        context: LiturgicalContext,
        now: DateTime<FixedOffset>,
    ) -> (GetNextQuoteUseCase, Arc<ClockSchedule<FixedClock>>) {
        let schedule = Arc::new(ClockSchedule::new(FixedClock::new(now)));
        let use_case = GetNextQuoteUseCase::new(
            SettingsStore::new(self.settings_path()),
            IndicesStore::new(self.indices_path()),
            Arc::new(FsAssets::new(self.root().join("assets"))),
            Arc::new(FixedCalendar::new(context)),
            Arc::clone(&schedule) as Arc<dyn PrayerSchedule>,
        );
        (use_case, schedule)
    }

    /// Application over this fixture. Returns the app and its event sink.
    pub(crate) fn app(&self, context: LiturgicalContext) -> (App, EventSink) {
        let config = self.config();
        let events = EventSink::new(64);
        let deps = AppDeps {
            assets: Arc::new(FsAssets::new(&config.assets_dir)),
            calendar: Arc::new(FixedCalendar::new(context)),
            schedule: Arc::new(ClockSchedule::new(FixedClock::new(sunday_morning()))),
        };
        (App::new(&config, deps, events.clone()), events)
    }
}

/// Drain all pending events from the broadcast receiver into a Vec.
pub(crate) fn drain_events(rx: &mut broadcast::Receiver<EventEnvelope>) -> Vec<EventEnvelope> {
    let mut events = Vec::new();
    while let Ok(evt) = rx.try_recv() {
        events.push(evt);
    }
    events
}

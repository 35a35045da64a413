//! Application wiring: persistence across restarts and timer-driven popups.

use crate::helpers::{Fixture, drain_events};
use jaculatoria::host::CommandHandler;
use jaculatoria::liturgy::{LiturgicalContext, LiturgicalSeason};
use jaculatoria::scheduler::TimerStatus;
use jaculatoria::{CanonicalHour, PowerEvent, PrayerRequest, SettingsPatch};
use std::collections::BTreeMap;
use std::time::Duration;

#[tokio::test]
async fn settings_survive_a_restart() {
    let fixture = Fixture::new();
    {
        let (app, _) = fixture.app(LiturgicalContext::ordinary());
        let mut hours = BTreeMap::new();
        hours.insert(
            "lauds".to_owned(),
            jaculatoria::settings::HourSettingPatch {
                enabled: Some(true),
                time: Some("06:30".to_owned()),
            },
        );
        app.save_settings(&SettingsPatch {
            interval: Some(20),
            liturgy_of_hours: Some(hours),
            ..SettingsPatch::default()
        })
        .unwrap();
    }

    let (app, _) = fixture.app(LiturgicalContext::ordinary());
    let settings = app.get_config();
    assert_eq!(settings.interval(), 20);
    assert_eq!(
        settings.enabled_hours().map(|(hour, _)| hour).collect::<Vec<_>>(),
        [CanonicalHour::Lauds]
    );
}

#[tokio::test]
async fn legacy_wrapped_settings_are_read() {
    let fixture = Fixture::new();
    fixture.write(
        "settings.json",
        r#"{"config": {"interval": 45, "duration": 7}, "autostart": false}"#,
    );

    let (app, _) = fixture.app(LiturgicalContext::ordinary());
    let settings = app.get_config();
    assert_eq!(settings.interval(), 45);
    assert_eq!(settings.duration(), 7);
    assert!(!settings.autostart());
}

#[tokio::test]
async fn first_unlock_of_the_day_shows_a_welcome_quote_once() {
    let fixture = Fixture::new();
    let (app, events) = fixture.app(LiturgicalContext::ordinary());
    let mut rx = events.subscribe();
    app.start();
    assert_eq!(app.timers().status(), TimerStatus::Running);

    app.power_event(PowerEvent::Unlock).unwrap();
    let welcome = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no welcome popup")
        .unwrap();
    assert_eq!(welcome.event, "popup.welcome");
    assert_eq!(welcome.payload["quote"]["text"], "Quote 1");

    app.power_event(PowerEvent::Unlock).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(drain_events(&mut rx).is_empty());

    app.shutdown();
    assert_eq!(app.timers().status(), TimerStatus::Idle);
}

#[tokio::test]
async fn easter_season_switches_to_regina_caeli() {
    let fixture = Fixture::new();
    let (app, _) = fixture.app(LiturgicalContext::in_season(LiturgicalSeason::Easter));

    let prayer = app.get_prayer(PrayerRequest::default()).await.unwrap();
    assert_eq!(prayer.title, "Regina Caeli");

    let forced = app
        .get_prayer(PrayerRequest {
            force_easter_time: Some(false),
            hour: None,
        })
        .await
        .unwrap();
    assert_eq!(forced.title, "Angelus");
}

//! End-to-end wiring: a snapshot observable, the settings bus and the theme,
//! the way a screen would hook them up.

use std::{cell::RefCell, rc::Rc};

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use skycast_core::{
    DarkMode, Event, EventBus, EventKind, InterfaceStyle, JsonFileSource, ObservableValue, OwnerId,
    Settings, SettingsManager, SnapshotSource, ThemeState, WeatherSnapshot,
    model::{AirQuality, Astro, Base, Current, Daily, HalfDay, Temperature},
    range::daily_temperature_range,
};

fn at(h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, h, 0, 0).unwrap()
}

fn snapshot(updated: DateTime<Utc>, aqi: f64) -> WeatherSnapshot {
    let utc = FixedOffset::east_opt(0).unwrap();
    let half = |t| HalfDay { temperature: Temperature { temperature: t, ..Default::default() }, ..Default::default() };
    let daily = Daily {
        time: at(0),
        day: half(24.0),
        night: half(12.0),
        sun: Astro {
            rise_time: Some(utc.with_ymd_and_hms(2024, 6, 1, 5, 0, 0).unwrap()),
            set_time: Some(utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap()),
        },
        moon: Astro::default(),
        air_quality: AirQuality::default(),
        uv: Default::default(),
    };
    let current = Current {
        air_quality: AirQuality { aqi_index: Some(aqi), ..Default::default() },
        ..Default::default()
    };

    WeatherSnapshot::new(
        Base { location_id: "home".into(), update_time: updated },
        current,
        None,
        vec![daily],
        vec![],
        vec![],
    )
}

/// A screen that renders a line per snapshot and tears itself down explicitly.
struct Screen {
    owner: OwnerId,
    rendered: Rc<RefCell<Vec<String>>>,
}

impl Screen {
    fn attach(weather: &ObservableValue<WeatherSnapshot>, bus: &EventBus) -> Self {
        let owner = OwnerId::new();
        let rendered = Rc::new(RefCell::new(Vec::new()));

        let sink = rendered.clone();
        weather
            .subscribe(owner, true, move |w: &WeatherSnapshot| {
                let range = daily_temperature_range(w);
                sink.borrow_mut().push(format!(
                    "aqi={} range={}..{} day={}",
                    w.current().air_quality.aqi_level(),
                    range.min,
                    range.max,
                    w.is_daylight(FixedOffset::east_opt(0).unwrap(), w.update_time()),
                ));
            })
            .detach();

        let sink = rendered.clone();
        bus.subscribe(owner, EventKind::SettingsChanged, move |_| {
            sink.borrow_mut().push("settings".into())
        })
        .detach();

        Self { owner, rendered }
    }

    fn teardown(&self, weather: &ObservableValue<WeatherSnapshot>, bus: &EventBus) {
        weather.unsubscribe(self.owner);
        bus.unsubscribe_all(self.owner);
    }
}

#[test]
fn screen_renders_on_attach_and_on_new_snapshot_only() {
    let bus = EventBus::new();
    let weather = ObservableValue::new(snapshot(at(8), 40.0));
    let screen = Screen::attach(&weather, &bus);

    // Same update time: deduplicated even though the readings differ.
    weather.set(snapshot(at(8), 180.0));
    weather.set(snapshot(at(21), 180.0));

    assert_eq!(
        *screen.rendered.borrow(),
        vec!["aqi=1 range=12..24 day=true", "aqi=4 range=12..24 day=false"]
    );
}

#[test]
fn teardown_stops_all_delivery() {
    let bus = EventBus::new();
    let weather = ObservableValue::new(snapshot(at(8), 40.0));
    let manager = SettingsManager::new(Settings::default(), bus.clone());
    let screen = Screen::attach(&weather, &bus);

    manager.set_update_interval(skycast_core::UpdateInterval::TwoHours);
    screen.teardown(&weather, &bus);
    manager.set_dark_mode(DarkMode::Dark);
    weather.set(snapshot(at(9), 60.0));

    assert_eq!(*screen.rendered.borrow(), vec!["aqi=1 range=12..24 day=true", "settings"]);
    assert_eq!(weather.subscriber_count(), 0);
    assert_eq!(bus.subscriber_count(EventKind::SettingsChanged), 0);
}

#[test]
fn settings_drive_theme_through_bus() {
    let bus = EventBus::new();
    let manager = SettingsManager::new(Settings::default(), bus.clone());
    let theme = ThemeState::new(manager.settings().dark_mode, false);
    let _binding = theme.bind(&bus, OwnerId::new());

    assert_eq!(theme.home_style().get(), InterfaceStyle::Dark);

    manager.set_dark_mode(DarkMode::Light);
    assert_eq!(theme.home_style().get(), InterfaceStyle::Light);
    assert_eq!(theme.global_style().get(), InterfaceStyle::Light);
}

#[test]
fn notification_tap_before_home_screen_exists_is_replayed() {
    let bus = EventBus::new();
    bus.publish_sticky(Event::AppShortcut { formatted_id: "loc-42".into() });

    let opened = Rc::new(RefCell::new(None));
    let sink = opened.clone();
    let _home = bus.subscribe_sticky(OwnerId::new(), EventKind::AppShortcut, move |e| {
        if let Event::AppShortcut { formatted_id } = e {
            *sink.borrow_mut() = Some(formatted_id.clone());
        }
    });

    assert_eq!(opened.borrow().as_deref(), Some("loc-42"));
}

#[test]
fn freshness_follows_update_interval_setting() {
    let bus = EventBus::new();
    let manager = SettingsManager::new(Settings::default(), bus);
    let snap = snapshot(at(8), 10.0);
    let now = at(8) + Duration::minutes(90);

    assert!(!snap.is_fresh(manager.settings().update_interval.hours(), now));

    manager.set_update_interval(skycast_core::UpdateInterval::TwoHours);
    assert!(snap.is_fresh(manager.settings().update_interval.hours(), now));
}

#[tokio::test]
async fn demo_snapshot_loads_and_renders_consistently() {
    let source = JsonFileSource::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../demos/snapshot.json"));
    let snap = source.fetch().await.expect("demo snapshot");

    assert_eq!(snap.current().air_quality.aqi_level(), 3);
    assert_eq!(snap.current().air_quality.pm25_level(), 3);

    // Yesterday (17, 29) anchors the scan; tomorrow's night is colder.
    let range = daily_temperature_range(&snap);
    assert_eq!((range.min, range.max), (16.0, 30.0));

    // 08:30 local, between 04:47 and 19:38.
    let beijing = FixedOffset::east_opt(8 * 3600).unwrap();
    assert!(snap.is_daylight(beijing, snap.update_time()));
}

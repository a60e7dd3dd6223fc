use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, convert::TryFrom, fmt};
use tracing::debug;

use crate::bus::{Event, EventBus};

/// How long a fetched snapshot stays fresh before a refresh is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UpdateInterval {
    HalfHour,
    #[default]
    OneHour,
    OneAndHalfHours,
    TwoHours,
    TwoAndHalfHours,
    ThreeHours,
    ThreeAndHalfHours,
    FourHours,
}

impl UpdateInterval {
    pub fn hours(&self) -> f64 {
        match self {
            UpdateInterval::HalfHour => 0.5,
            UpdateInterval::OneHour => 1.0,
            UpdateInterval::OneAndHalfHours => 1.5,
            UpdateInterval::TwoHours => 2.0,
            UpdateInterval::TwoAndHalfHours => 2.5,
            UpdateInterval::ThreeHours => 3.0,
            UpdateInterval::ThreeAndHalfHours => 3.5,
            UpdateInterval::FourHours => 4.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateInterval::HalfHour => "0.5h",
            UpdateInterval::OneHour => "1h",
            UpdateInterval::OneAndHalfHours => "1.5h",
            UpdateInterval::TwoHours => "2h",
            UpdateInterval::TwoAndHalfHours => "2.5h",
            UpdateInterval::ThreeHours => "3h",
            UpdateInterval::ThreeAndHalfHours => "3.5h",
            UpdateInterval::FourHours => "4h",
        }
    }

    pub const fn all() -> &'static [UpdateInterval] {
        &[
            UpdateInterval::HalfHour,
            UpdateInterval::OneHour,
            UpdateInterval::OneAndHalfHours,
            UpdateInterval::TwoHours,
            UpdateInterval::TwoAndHalfHours,
            UpdateInterval::ThreeHours,
            UpdateInterval::ThreeAndHalfHours,
            UpdateInterval::FourHours,
        ]
    }
}

impl fmt::Display for UpdateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UpdateInterval {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.trim().to_lowercase();
        let normalized = if lower.ends_with('h') { lower } else { format!("{lower}h") };

        UpdateInterval::all()
            .iter()
            .copied()
            .find(|i| i.as_str() == normalized)
            .ok_or_else(|| {
                anyhow!(
                    "Unknown update interval '{value}'. Supported: 0.5h, 1h, 1.5h, 2h, 2.5h, 3h, 3.5h, 4h."
                )
            })
    }
}

/// How the home screen picks light or dark appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DarkMode {
    /// Follow daylight at the displayed location.
    #[default]
    Auto,
    /// Follow the system appearance.
    System,
    Light,
    Dark,
}

impl DarkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DarkMode::Auto => "auto",
            DarkMode::System => "system",
            DarkMode::Light => "light",
            DarkMode::Dark => "dark",
        }
    }

    pub const fn all() -> &'static [DarkMode] {
        &[DarkMode::Auto, DarkMode::System, DarkMode::Light, DarkMode::Dark]
    }
}

impl fmt::Display for DarkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DarkMode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "auto" => Ok(DarkMode::Auto),
            "system" => Ok(DarkMode::System),
            "light" => Ok(DarkMode::Light),
            "dark" => Ok(DarkMode::Dark),
            _ => Err(anyhow!(
                "Unknown dark mode '{value}'. Supported modes: auto, system, light, dark."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    /// Convert a Celsius reading into this unit.
    pub fn convert(&self, celsius: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
            TemperatureUnit::Kelvin => celsius + 273.15,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
            TemperatureUnit::Kelvin => "K",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "c",
            TemperatureUnit::Fahrenheit => "f",
            TemperatureUnit::Kelvin => "k",
        }
    }

    pub const fn all() -> &'static [TemperatureUnit] {
        &[TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit, TemperatureUnit::Kelvin]
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TemperatureUnit {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            "k" | "kelvin" => Ok(TemperatureUnit::Kelvin),
            _ => Err(anyhow!("Unknown temperature unit '{value}'. Supported units: c, f, k.")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpeedUnit {
    #[default]
    Kph,
    Mps,
    Kn,
    Mph,
}

impl SpeedUnit {
    /// Convert a km/h reading into this unit.
    pub fn convert(&self, kph: f64) -> f64 {
        match self {
            SpeedUnit::Kph => kph,
            SpeedUnit::Mps => kph / 3.6,
            SpeedUnit::Kn => kph / 1.852,
            SpeedUnit::Mph => kph / 1.609_344,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedUnit::Kph => "km/h",
            SpeedUnit::Mps => "m/s",
            SpeedUnit::Kn => "kn",
            SpeedUnit::Mph => "mph",
        }
    }

    pub const fn all() -> &'static [SpeedUnit] {
        &[SpeedUnit::Kph, SpeedUnit::Mps, SpeedUnit::Kn, SpeedUnit::Mph]
    }
}

impl fmt::Display for SpeedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SpeedUnit {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "kph" | "km/h" => Ok(SpeedUnit::Kph),
            "mps" | "m/s" => Ok(SpeedUnit::Mps),
            "kn" | "knots" => Ok(SpeedUnit::Kn),
            "mph" => Ok(SpeedUnit::Mph),
            _ => Err(anyhow!("Unknown speed unit '{value}'. Supported units: kph, mps, kn, mph.")),
        }
    }
}

/// Daily forecast notification toggle and its local "HH:MM" time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastReminder {
    pub enabled: bool,
    pub time: String,
}

/// User preferences persisted in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub alert_enabled: bool,
    pub precipitation_alert_enabled: bool,
    pub update_interval: UpdateInterval,
    pub dark_mode: DarkMode,
    /// Show "day / night" instead of "night / day" temperatures.
    pub exchange_day_night_temperature: bool,
    pub temperature_unit: TemperatureUnit,
    pub speed_unit: SpeedUnit,
    pub today_forecast: ForecastReminder,
    pub tomorrow_forecast: ForecastReminder,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            alert_enabled: true,
            precipitation_alert_enabled: false,
            update_interval: UpdateInterval::default(),
            dark_mode: DarkMode::default(),
            exchange_day_night_temperature: false,
            temperature_unit: TemperatureUnit::default(),
            speed_unit: SpeedUnit::default(),
            today_forecast: ForecastReminder { enabled: false, time: "07:00".to_string() },
            tomorrow_forecast: ForecastReminder { enabled: false, time: "21:00".to_string() },
        }
    }
}

/// Owns the live [`Settings`] and announces every effective change on the bus:
/// first the specific event, then `SettingsChanged`.
#[derive(Debug)]
pub struct SettingsManager {
    settings: RefCell<Settings>,
    bus: EventBus,
}

impl SettingsManager {
    pub fn new(settings: Settings, bus: EventBus) -> Self {
        Self { settings: RefCell::new(settings), bus }
    }

    pub fn settings(&self) -> Settings {
        self.settings.borrow().clone()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    fn apply<V, F>(&self, value: V, field: F, event: impl FnOnce(&V) -> Event) -> bool
    where
        V: PartialEq,
        F: FnOnce(&mut Settings) -> &mut V,
    {
        let announcement = {
            let mut settings = self.settings.borrow_mut();
            let slot = field(&mut *settings);
            if *slot == value {
                return false;
            }
            let announcement = event(&value);
            *slot = value;
            announcement
        };

        debug!(kind = %announcement.kind(), "setting changed");
        self.bus.publish(announcement);
        self.bus.publish(Event::SettingsChanged);
        true
    }

    pub fn set_alert_enabled(&self, enabled: bool) -> bool {
        self.apply(enabled, |s| &mut s.alert_enabled, |v| Event::AlertEnabledChanged(*v))
    }

    pub fn set_precipitation_alert_enabled(&self, enabled: bool) -> bool {
        self.apply(
            enabled,
            |s| &mut s.precipitation_alert_enabled,
            |v| Event::PrecipitationAlertEnabledChanged(*v),
        )
    }

    pub fn set_update_interval(&self, interval: UpdateInterval) -> bool {
        self.apply(interval, |s| &mut s.update_interval, |v| Event::UpdateIntervalChanged(*v))
    }

    pub fn set_dark_mode(&self, mode: DarkMode) -> bool {
        self.apply(mode, |s| &mut s.dark_mode, |v| Event::DarkModeChanged(*v))
    }

    pub fn set_exchange_day_night_temperature(&self, exchange: bool) -> bool {
        self.apply(
            exchange,
            |s| &mut s.exchange_day_night_temperature,
            |v| Event::ExchangeDayNightTemperatureChanged(*v),
        )
    }

    pub fn set_temperature_unit(&self, unit: TemperatureUnit) -> bool {
        self.apply(unit, |s| &mut s.temperature_unit, |v| Event::TemperatureUnitChanged(*v))
    }

    pub fn set_speed_unit(&self, unit: SpeedUnit) -> bool {
        self.apply(unit, |s| &mut s.speed_unit, |v| Event::SpeedUnitChanged(*v))
    }

    pub fn set_today_forecast(&self, reminder: ForecastReminder) -> bool {
        self.apply(reminder, |s| &mut s.today_forecast, |r| Event::TodayForecastChanged {
            enabled: r.enabled,
            time: r.time.clone(),
        })
    }

    pub fn set_tomorrow_forecast(&self, reminder: ForecastReminder) -> bool {
        self.apply(reminder, |s| &mut s.tomorrow_forecast, |r| Event::TomorrowForecastChanged {
            enabled: r.enabled,
            time: r.time.clone(),
        })
    }
}

use serde::{Deserialize, Serialize};

use crate::settings::{DarkMode, SpeedUnit, TemperatureUnit, UpdateInterval};

/// Tag of an [`Event`], used as the registry key on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    SettingsChanged,
    AlertEnabledChanged,
    PrecipitationAlertEnabledChanged,
    UpdateIntervalChanged,
    DarkModeChanged,
    ExchangeDayNightTemperatureChanged,
    TemperatureUnitChanged,
    SpeedUnitChanged,
    TodayForecastChanged,
    TomorrowForecastChanged,
    BackgroundUpdate,
    DailyTrendCellTap,
    TimeBarManagement,
    TimeBarAlert,
    AlertNotification,
    ForecastNotification,
    AppShortcut,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::SettingsChanged => "settings_changed",
            EventKind::AlertEnabledChanged => "alert_enabled_changed",
            EventKind::PrecipitationAlertEnabledChanged => "precipitation_alert_enabled_changed",
            EventKind::UpdateIntervalChanged => "update_interval_changed",
            EventKind::DarkModeChanged => "dark_mode_changed",
            EventKind::ExchangeDayNightTemperatureChanged => "exchange_day_night_temperature_changed",
            EventKind::TemperatureUnitChanged => "temperature_unit_changed",
            EventKind::SpeedUnitChanged => "speed_unit_changed",
            EventKind::TodayForecastChanged => "today_forecast_changed",
            EventKind::TomorrowForecastChanged => "tomorrow_forecast_changed",
            EventKind::BackgroundUpdate => "background_update",
            EventKind::DailyTrendCellTap => "daily_trend_cell_tap",
            EventKind::TimeBarManagement => "time_bar_management",
            EventKind::TimeBarAlert => "time_bar_alert",
            EventKind::AlertNotification => "alert_notification",
            EventKind::ForecastNotification => "forecast_notification",
            EventKind::AppShortcut => "app_shortcut",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that travels over the bus, one variant per [`EventKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // settings.
    SettingsChanged,
    AlertEnabledChanged(bool),
    PrecipitationAlertEnabledChanged(bool),
    UpdateIntervalChanged(UpdateInterval),
    DarkModeChanged(DarkMode),
    ExchangeDayNightTemperatureChanged(bool),
    TemperatureUnitChanged(TemperatureUnit),
    SpeedUnitChanged(SpeedUnit),
    TodayForecastChanged { enabled: bool, time: String },
    TomorrowForecastChanged { enabled: bool, time: String },

    // background work and user actions.
    BackgroundUpdate { location_id: String },
    DailyTrendCellTap { index: usize },
    TimeBarManagement,
    TimeBarAlert,

    // app entry points, usually published sticky.
    AlertNotification,
    ForecastNotification,
    AppShortcut { formatted_id: String },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::SettingsChanged => EventKind::SettingsChanged,
            Event::AlertEnabledChanged(_) => EventKind::AlertEnabledChanged,
            Event::PrecipitationAlertEnabledChanged(_) => EventKind::PrecipitationAlertEnabledChanged,
            Event::UpdateIntervalChanged(_) => EventKind::UpdateIntervalChanged,
            Event::DarkModeChanged(_) => EventKind::DarkModeChanged,
            Event::ExchangeDayNightTemperatureChanged(_) => {
                EventKind::ExchangeDayNightTemperatureChanged
            }
            Event::TemperatureUnitChanged(_) => EventKind::TemperatureUnitChanged,
            Event::SpeedUnitChanged(_) => EventKind::SpeedUnitChanged,
            Event::TodayForecastChanged { .. } => EventKind::TodayForecastChanged,
            Event::TomorrowForecastChanged { .. } => EventKind::TomorrowForecastChanged,
            Event::BackgroundUpdate { .. } => EventKind::BackgroundUpdate,
            Event::DailyTrendCellTap { .. } => EventKind::DailyTrendCellTap,
            Event::TimeBarManagement => EventKind::TimeBarManagement,
            Event::TimeBarAlert => EventKind::TimeBarAlert,
            Event::AlertNotification => EventKind::AlertNotification,
            Event::ForecastNotification => EventKind::ForecastNotification,
            Event::AppShortcut { .. } => EventKind::AppShortcut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_variants_map_to_their_tag() {
        assert_eq!(Event::DarkModeChanged(DarkMode::Dark).kind(), EventKind::DarkModeChanged);
        assert_eq!(Event::DailyTrendCellTap { index: 3 }.kind(), EventKind::DailyTrendCellTap);
        assert_eq!(
            Event::AppShortcut { formatted_id: "x".into() }.kind(),
            EventKind::AppShortcut
        );
    }

    #[test]
    fn kind_names_are_snake_case() {
        assert_eq!(EventKind::TimeBarAlert.to_string(), "time_bar_alert");
    }
}

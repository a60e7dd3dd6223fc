//! Plain-text rendering of a snapshot, standing in for the app's cards.

use chrono::{DateTime, FixedOffset, Utc};
use skycast_core::{
    SeverityBand, Settings, WeatherSnapshot,
    model::{AirQuality, Wind},
    range::{self, TemperatureRange},
};

/// Everything besides the snapshot that rendering depends on.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub timezone: FixedOffset,
    pub now: DateTime<Utc>,
    pub settings: Settings,
}

impl RenderContext {
    fn temperature(&self, celsius: f64) -> String {
        let unit = self.settings.temperature_unit;
        format!("{:.0}{}", unit.convert(celsius), unit.symbol())
    }

    fn range(&self, range: TemperatureRange) -> String {
        if range.is_empty() {
            return "n/a".to_string();
        }
        let (low, high) = (self.temperature(range.min), self.temperature(range.max));
        if self.settings.exchange_day_night_temperature {
            format!("{high} / {low}")
        } else {
            format!("{low} / {high}")
        }
    }

    fn wind(&self, wind: &Wind) -> String {
        let mut text = String::new();
        if let Some(direction) = wind.direction.as_deref() {
            text.push_str(direction);
            text.push(' ');
        }
        if let Some(speed) = wind.speed {
            let unit = self.settings.speed_unit;
            text.push_str(&format!("{:.1} {unit} ", unit.convert(speed)));
        }
        text.push_str(&format!("(level {})", wind.wind_level()));

        let arrow = wind.degree.arrow();
        if !arrow.is_empty() {
            text.push(' ');
            text.push_str(arrow);
        }
        text
    }
}

fn level(level: u8) -> String {
    format!("{level} ({})", SeverityBand::from_level(level))
}

fn air_quality_lines(aq: &AirQuality) -> Vec<String> {
    let readings = [
        ("AQI", aq.aqi_index, aq.aqi_level()),
        ("PM2.5", aq.pm25, aq.pm25_level()),
        ("PM10", aq.pm10, aq.pm10_level()),
        ("SO2", aq.so2, aq.so2_level()),
        ("NO2", aq.no2, aq.no2_level()),
        ("O3", aq.o3, aq.o3_level()),
        ("CO", aq.co, aq.co_level()),
    ];

    readings
        .into_iter()
        .filter_map(|(name, value, lvl)| {
            value.map(|v| format!("  {name:<6} {v:>7.1}  level {}", level(lvl)))
        })
        .collect()
}

pub fn render(snapshot: &WeatherSnapshot, ctx: &RenderContext) -> Vec<String> {
    let mut lines = Vec::new();
    let current = snapshot.current();
    let interval = ctx.settings.update_interval;

    let freshness = if snapshot.is_fresh(interval.hours(), ctx.now) {
        "fresh".to_string()
    } else {
        format!("stale, older than {interval}")
    };
    lines.push(format!(
        "{} updated {} ({freshness})",
        snapshot.base().location_id,
        snapshot.update_time().with_timezone(&ctx.timezone).format("%Y-%m-%d %H:%M"),
    ));

    let daylight = snapshot.is_daylight(ctx.timezone, ctx.now);
    lines.push(format!("{}: {}", if daylight { "day" } else { "night" }, current.weather_text));
    lines.push(format!("temperature {}", ctx.temperature(current.temperature.temperature)));
    lines.push(format!("wind {}", ctx.wind(&current.wind)));

    if current.uv.is_valid() {
        lines.push(format!("uv {} level {}", current.uv.description(), level(current.uv.uv_level())));
    }

    if current.air_quality.is_valid() {
        lines.push("air quality".to_string());
        lines.extend(air_quality_lines(&current.air_quality));
    }

    if let Some(summary) = current.daily_forecast.as_deref() {
        lines.push(format!("outlook: {summary}"));
    }

    lines.push(format!("daily range {}", ctx.range(range::daily_temperature_range(snapshot))));
    lines.push(format!("hourly range {}", ctx.range(range::hourly_temperature_range(snapshot))));

    let hourly = snapshot.hourly_forecasts();
    if !hourly.is_empty() {
        let unit = ctx.settings.speed_unit;
        lines.push(format!(
            "hourly peaks: wind {:.1} {unit}, humidity {:.0}%",
            unit.convert(range::max_wind_speed(hourly)),
            range::max_humidity(hourly),
        ));
    }

    for alert in snapshot.alerts() {
        lines.push(format!("alert [{}] {}", alert.priority, alert.description));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use skycast_core::{
        model::{Base, Current, WindDegree},
        settings::{SpeedUnit, TemperatureUnit},
    };

    fn ctx(settings: Settings) -> RenderContext {
        RenderContext {
            timezone: FixedOffset::east_opt(0).unwrap(),
            now: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
            settings,
        }
    }

    fn snapshot(current: Current) -> WeatherSnapshot {
        WeatherSnapshot::new(
            Base {
                location_id: "home".into(),
                update_time: Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap(),
            },
            current,
            None,
            vec![],
            vec![],
            vec![],
        )
    }

    #[test]
    fn renders_header_and_fallback_daylight() {
        let lines = render(&snapshot(Current::default()), &ctx(Settings::default()));

        assert_eq!(lines[0], "home updated 2024-06-01 09:30 (fresh)");
        assert!(lines[1].starts_with("day:"));
        assert!(lines.contains(&"daily range n/a".to_string()));
    }

    #[test]
    fn lists_only_present_pollutants() {
        let current = Current {
            air_quality: AirQuality { pm25: Some(80.0), ..Default::default() },
            ..Default::default()
        };

        let lines = render(&snapshot(current), &ctx(Settings::default()));

        let aq: Vec<_> = lines.iter().filter(|l| l.starts_with("  ")).collect();
        assert_eq!(aq.len(), 1);
        assert!(aq[0].contains("PM2.5"));
        assert!(aq[0].contains("level 3 (unhealthy)"));
    }

    #[test]
    fn applies_units() {
        let current = Current {
            wind: Wind {
                direction: Some("N".into()),
                degree: WindDegree { degree: 0.0, no_direction: false },
                speed: Some(36.0),
                level: 3,
            },
            ..Default::default()
        };
        let settings = Settings {
            temperature_unit: TemperatureUnit::Fahrenheit,
            speed_unit: SpeedUnit::Mps,
            ..Default::default()
        };

        let lines = render(&snapshot(current), &ctx(settings));

        assert!(lines.contains(&"temperature 32°F".to_string()));
        assert!(lines.contains(&"wind N 10.0 m/s (level 2) ↓".to_string()));
    }
}

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::{self, Level, Metric};

/// Pollutant readings. Every field may be absent independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirQuality {
    /// Level reported by the provider, kept as-is.
    pub aqi_level: Option<u8>,
    pub aqi_index: Option<f64>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub so2: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    pub co: Option<f64>,
}

impl AirQuality {
    pub fn aqi_level(&self) -> Level {
        Metric::AqiIndex.classify(self.aqi_index)
    }

    pub fn pm25_level(&self) -> Level {
        Metric::Pm25.classify(self.pm25)
    }

    pub fn pm10_level(&self) -> Level {
        Metric::Pm10.classify(self.pm10)
    }

    pub fn so2_level(&self) -> Level {
        Metric::So2.classify(self.so2)
    }

    pub fn no2_level(&self) -> Level {
        Metric::No2.classify(self.no2)
    }

    pub fn o3_level(&self) -> Level {
        Metric::O3.classify(self.o3)
    }

    pub fn co_level(&self) -> Level {
        Metric::Co.classify(self.co)
    }

    /// Any reading present.
    pub fn is_valid(&self) -> bool {
        self.aqi_index.is_some()
            || self.aqi_level.is_some()
            || self.pm25.is_some()
            || self.pm10.is_some()
            || self.so2.is_some()
            || self.no2.is_some()
            || self.o3.is_some()
            || self.co.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Uv {
    pub index: Option<f64>,
    pub level: Option<String>,
    pub description: Option<String>,
}

impl Uv {
    pub fn uv_level(&self) -> Level {
        classify::classify(self.index, &classify::UV_INDEX)
    }

    pub fn is_valid(&self) -> bool {
        self.index.is_some() || self.level.is_some() || self.description.is_some()
    }

    /// "index level description", skipping absent or empty parts.
    pub fn description(&self) -> String {
        self.join_parts(true)
    }

    /// "index level".
    pub fn short_description(&self) -> String {
        self.join_parts(false)
    }

    fn join_parts(&self, with_description: bool) -> String {
        let mut parts = Vec::new();
        if let Some(index) = self.index {
            parts.push(format!("{index}"));
        }
        if let Some(level) = self.level.as_deref().filter(|s| !s.is_empty()) {
            parts.push(level.to_string());
        }
        if with_description {
            if let Some(desc) = self.description.as_deref().filter(|s| !s.is_empty()) {
                parts.push(desc.to_string());
            }
        }
        parts.join(" ")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindDegree {
    pub degree: f64,
    #[serde(default)]
    pub no_direction: bool,
}

impl WindDegree {
    /// Arrow pointing where the wind blows to, in 45° sectors centred on the
    /// compass points. Empty when the wind has no direction.
    pub fn arrow(&self) -> &'static str {
        if self.no_direction {
            return "";
        }
        let d = self.degree;
        if 22.5 < d && d <= 67.5 {
            "↙"
        } else if 67.5 < d && d <= 112.5 {
            "←"
        } else if 112.5 < d && d <= 157.5 {
            "↖"
        } else if 157.5 < d && d <= 202.5 {
            "↑"
        } else if 202.5 < d && d <= 247.5 {
            "↗"
        } else if 247.5 < d && d <= 292.5 {
            "→"
        } else if 292.5 < d && d <= 337.5 {
            "↘"
        } else {
            "↓"
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub degree: WindDegree,
    /// km/h.
    #[serde(default)]
    pub speed: Option<f64>,
    /// Beaufort-style level reported by the provider.
    #[serde(default)]
    pub level: u8,
}

impl Wind {
    pub fn wind_level(&self) -> Level {
        Metric::WindSpeed.classify(self.speed)
    }

    pub fn is_valid_speed(&self) -> bool {
        self.speed.is_some_and(|s| s > 0.0)
    }
}

/// Sunrise/sunset (or moonrise/moonset). Each timestamp keeps the offset it
/// was reported in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Astro {
    pub rise_time: Option<DateTime<FixedOffset>>,
    pub set_time: Option<DateTime<FixedOffset>>,
}

impl Astro {
    /// Both ends present. Unlike the reading groups this is not an "any".
    pub fn is_valid(&self) -> bool {
        self.rise_time.is_some() && self.set_time.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub temperature: f64,
    #[serde(default)]
    pub real_feel_temperature: Option<f64>,
    #[serde(default)]
    pub apparent_temperature: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HalfDay {
    #[serde(default)]
    pub weather_text: String,
    pub temperature: Temperature,
    #[serde(default)]
    pub wind: Option<Wind>,
    #[serde(default)]
    pub precipitation_probability: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Daily {
    pub time: DateTime<Utc>,
    pub day: HalfDay,
    pub night: HalfDay,
    #[serde(default)]
    pub sun: Astro,
    #[serde(default)]
    pub moon: Astro,
    #[serde(default)]
    pub air_quality: AirQuality,
    #[serde(default)]
    pub uv: Uv,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hourly {
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub daylight: bool,
    #[serde(default)]
    pub weather_text: String,
    pub temperature: Temperature,
    #[serde(default)]
    pub wind: Option<Wind>,
    /// Percent.
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub precipitation_probability: Option<f64>,
}

/// Yesterday's extremes, used as the anchor of a temperature range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub time: DateTime<Utc>,
    pub daytime_temperature: f64,
    pub nighttime_temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub time: DateTime<Utc>,
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub priority: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Base {
    pub location_id: String,
    pub update_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Current {
    #[serde(default)]
    pub weather_text: String,
    pub temperature: Temperature,
    #[serde(default)]
    pub wind: Wind,
    #[serde(default)]
    pub uv: Uv,
    #[serde(default)]
    pub air_quality: AirQuality,
    #[serde(default)]
    pub relative_humidity: Option<f64>,
    #[serde(default)]
    pub pressure: Option<f64>,
    /// Provider's one-line outlook for the coming days.
    #[serde(default)]
    pub daily_forecast: Option<String>,
    /// Provider's one-line outlook for the coming hours.
    #[serde(default)]
    pub hourly_forecast: Option<String>,
}

/// One complete fetch result.
///
/// Never mutated after construction; a refresh replaces the whole snapshot.
/// Two snapshots are equal when their base update times are equal, whatever
/// their forecast content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    base: Base,
    current: Current,
    #[serde(default)]
    yesterday: Option<History>,
    #[serde(default)]
    daily_forecasts: Vec<Daily>,
    #[serde(default)]
    hourly_forecasts: Vec<Hourly>,
    #[serde(default)]
    alerts: Vec<Alert>,
}

impl WeatherSnapshot {
    pub fn new(
        base: Base,
        current: Current,
        yesterday: Option<History>,
        daily_forecasts: Vec<Daily>,
        hourly_forecasts: Vec<Hourly>,
        alerts: Vec<Alert>,
    ) -> Self {
        Self { base, current, yesterday, daily_forecasts, hourly_forecasts, alerts }
    }

    pub fn base(&self) -> &Base {
        &self.base
    }

    pub fn update_time(&self) -> DateTime<Utc> {
        self.base.update_time
    }

    pub fn current(&self) -> &Current {
        &self.current
    }

    pub fn yesterday(&self) -> Option<&History> {
        self.yesterday.as_ref()
    }

    pub fn daily_forecasts(&self) -> &[Daily] {
        &self.daily_forecasts
    }

    pub fn hourly_forecasts(&self) -> &[Hourly] {
        &self.hourly_forecasts
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }
}

impl PartialEq for WeatherSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.base.update_time == other.base.update_time
    }
}

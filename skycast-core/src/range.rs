//! Min/max scans over forecast sequences, used to scale trend charts.

use crate::model::{Daily, History, Hourly, WeatherSnapshot};

/// Something with a low and a high temperature.
pub trait TemperatureBounds {
    fn low(&self) -> f64;
    fn high(&self) -> f64;
}

impl TemperatureBounds for Daily {
    fn low(&self) -> f64 {
        self.night.temperature.temperature
    }

    fn high(&self) -> f64 {
        self.day.temperature.temperature
    }
}

impl TemperatureBounds for Hourly {
    fn low(&self) -> f64 {
        self.temperature.temperature
    }

    fn high(&self) -> f64 {
        self.temperature.temperature
    }
}

impl TemperatureBounds for (f64, f64) {
    fn low(&self) -> f64 {
        self.0
    }

    fn high(&self) -> f64 {
        self.1
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

impl TemperatureRange {
    /// The seed of a scan with no anchor: `(+inf, -inf)`.
    pub const EMPTY: TemperatureRange = TemperatureRange { min: f64::INFINITY, max: f64::NEG_INFINITY };

    /// `min > max`, i.e. nothing was scanned. Callers treat this as "no data".
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    pub fn span(&self) -> Option<f64> {
        (!self.is_empty()).then(|| self.max - self.min)
    }
}

/// Single forward scan seeded with `anchor` as `(low, high)`, or with the
/// `(+inf, -inf)` sentinels when there is none.
pub fn temperature_range<'a, T, I>(records: I, anchor: Option<(f64, f64)>) -> TemperatureRange
where
    T: TemperatureBounds + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let seed = anchor
        .map(|(low, high)| TemperatureRange { min: low, max: high })
        .unwrap_or(TemperatureRange::EMPTY);

    records.into_iter().fold(seed, |mut range, record| {
        if record.low() < range.min {
            range.min = record.low();
        }
        if record.high() > range.max {
            range.max = record.high();
        }
        range
    })
}

fn anchor(history: Option<&History>) -> Option<(f64, f64)> {
    history.map(|h| (h.nighttime_temperature, h.daytime_temperature))
}

/// Range across daily highs and lows, anchored on yesterday when known.
pub fn daily_temperature_range(snapshot: &WeatherSnapshot) -> TemperatureRange {
    temperature_range(snapshot.daily_forecasts(), anchor(snapshot.yesterday()))
}

/// Range across hourly temperatures, anchored on yesterday when known.
pub fn hourly_temperature_range(snapshot: &WeatherSnapshot) -> TemperatureRange {
    temperature_range(snapshot.hourly_forecasts(), anchor(snapshot.yesterday()))
}

/// Highest hourly wind speed, 0.0 when none is reported.
pub fn max_wind_speed(hourly: &[Hourly]) -> f64 {
    hourly
        .iter()
        .filter_map(|h| h.wind.as_ref().and_then(|w| w.speed))
        .fold(0.0, f64::max)
}

/// Highest hourly relative humidity, 0.0 when none is reported.
pub fn max_humidity(hourly: &[Hourly]) -> f64 {
    hourly.iter().filter_map(|h| h.humidity).fold(0.0, f64::max)
}

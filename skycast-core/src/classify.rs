//! Threshold tables that turn raw readings into small severity levels.
//!
//! Every table is a strictly ascending list of inclusive upper bounds. A table
//! of `k` bounds yields levels `1..=k + 1`: a reading equal to a bound stays on
//! that bound's level, anything above moves up. An absent reading is level 1.

use std::{borrow::Cow, cmp::Ordering, convert::TryFrom, fmt};

use anyhow::anyhow;
use thiserror::Error;

/// Severity level, starting at 1.
pub type Level = u8;

/// Longest table whose top level still fits in a [`Level`].
pub const MAX_BOUNDS: usize = Level::MAX as usize - 1;

#[derive(Debug, Error, PartialEq)]
pub enum ClassifyError {
    #[error("threshold table '{name}' is empty")]
    Empty { name: String },

    #[error("threshold table '{name}' is not strictly ascending at index {index} ({previous} >= {value})")]
    NotAscending { name: String, index: usize, previous: f64, value: f64 },

    #[error("threshold table '{name}' has {len} bounds, at most {max} are supported")]
    TooLong { name: String, len: usize, max: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    name: Cow<'static, str>,
    bounds: Cow<'static, [f64]>,
}

impl ThresholdTable {
    /// Table over static bounds. The bounds must be strictly ascending; this is
    /// not checked here.
    pub const fn from_static(name: &'static str, bounds: &'static [f64]) -> Self {
        Self { name: Cow::Borrowed(name), bounds: Cow::Borrowed(bounds) }
    }

    /// Checked constructor for tables built at runtime.
    pub fn new(name: impl Into<String>, bounds: Vec<f64>) -> Result<Self, ClassifyError> {
        let name = name.into();
        if bounds.is_empty() {
            return Err(ClassifyError::Empty { name });
        }
        if bounds.len() > MAX_BOUNDS {
            return Err(ClassifyError::TooLong { name, len: bounds.len(), max: MAX_BOUNDS });
        }
        let misordered = bounds.windows(2).position(|w| w[0].partial_cmp(&w[1]) != Some(Ordering::Less));
        if let Some(index) = misordered {
            return Err(ClassifyError::NotAscending {
                name,
                index: index + 1,
                previous: bounds[index],
                value: bounds[index + 1],
            });
        }

        Ok(Self { name: Cow::Owned(name), bounds: Cow::Owned(bounds) })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    /// Highest level this table can produce.
    pub fn max_level(&self) -> Level {
        self.bounds.len() as Level + 1
    }

    pub fn is_ascending(&self) -> bool {
        self.bounds.windows(2).all(|w| w[0] < w[1])
    }

    pub fn classify(&self, value: Option<f64>) -> Level {
        classify(value, self)
    }
}

/// `1 + number of bounds strictly below value`, or 1 when absent.
///
/// NaN compares false against every bound and therefore lands on level 1.
pub fn classify(value: Option<f64>, table: &ThresholdTable) -> Level {
    match value {
        None => 1,
        Some(v) => 1 + table.bounds.iter().filter(|&&t| v > t).count() as Level,
    }
}

pub static AQI_INDEX: ThresholdTable =
    ThresholdTable::from_static("aqi", &[50.0, 100.0, 150.0, 200.0, 300.0]);
pub static PM25: ThresholdTable =
    ThresholdTable::from_static("pm2.5", &[35.0, 75.0, 115.0, 150.0, 250.0]);
pub static PM10: ThresholdTable =
    ThresholdTable::from_static("pm10", &[50.0, 150.0, 250.0, 350.0, 420.0]);
pub static SO2: ThresholdTable =
    ThresholdTable::from_static("so2", &[50.0, 150.0, 475.0, 800.0, 1600.0]);
pub static NO2: ThresholdTable =
    ThresholdTable::from_static("no2", &[40.0, 80.0, 180.0, 280.0, 565.0]);
pub static O3: ThresholdTable =
    ThresholdTable::from_static("o3", &[160.0, 200.0, 300.0, 400.0, 800.0]);
pub static CO: ThresholdTable = ThresholdTable::from_static("co", &[5.0, 10.0, 35.0, 60.0, 90.0]);
pub static UV_INDEX: ThresholdTable = ThresholdTable::from_static("uv", &[2.0, 5.0, 7.0, 10.0]);
/// km/h.
pub static WIND_SPEED: ThresholdTable =
    ThresholdTable::from_static("wind", &[19.0, 40.0, 62.0, 87.0, 117.0]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    AqiIndex,
    Pm25,
    Pm10,
    So2,
    No2,
    O3,
    Co,
    UvIndex,
    WindSpeed,
}

impl Metric {
    pub fn table(&self) -> &'static ThresholdTable {
        match self {
            Metric::AqiIndex => &AQI_INDEX,
            Metric::Pm25 => &PM25,
            Metric::Pm10 => &PM10,
            Metric::So2 => &SO2,
            Metric::No2 => &NO2,
            Metric::O3 => &O3,
            Metric::Co => &CO,
            Metric::UvIndex => &UV_INDEX,
            Metric::WindSpeed => &WIND_SPEED,
        }
    }

    pub fn classify(&self, value: Option<f64>) -> Level {
        classify(value, self.table())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::AqiIndex => "aqi",
            Metric::Pm25 => "pm25",
            Metric::Pm10 => "pm10",
            Metric::So2 => "so2",
            Metric::No2 => "no2",
            Metric::O3 => "o3",
            Metric::Co => "co",
            Metric::UvIndex => "uv",
            Metric::WindSpeed => "wind",
        }
    }

    pub const fn all() -> &'static [Metric] {
        &[
            Metric::AqiIndex,
            Metric::Pm25,
            Metric::Pm10,
            Metric::So2,
            Metric::No2,
            Metric::O3,
            Metric::Co,
            Metric::UvIndex,
            Metric::WindSpeed,
        ]
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Metric {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase().replace(['.', '_'], "");
        Metric::all().iter().copied().find(|m| m.as_str() == lower).ok_or_else(|| {
            anyhow!(
                "Unknown metric '{value}'. Supported metrics: aqi, pm25, pm10, so2, no2, o3, co, uv, wind."
            )
        })
    }
}

/// Named band for a level, shared by every table. Levels past 6 saturate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SeverityBand {
    Good,
    Moderate,
    Unhealthy,
    VeryUnhealthy,
    Severe,
    Hazardous,
}

impl SeverityBand {
    pub fn from_level(level: Level) -> Self {
        match level {
            0 | 1 => SeverityBand::Good,
            2 => SeverityBand::Moderate,
            3 => SeverityBand::Unhealthy,
            4 => SeverityBand::VeryUnhealthy,
            5 => SeverityBand::Severe,
            _ => SeverityBand::Hazardous,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityBand::Good => "good",
            SeverityBand::Moderate => "moderate",
            SeverityBand::Unhealthy => "unhealthy",
            SeverityBand::VeryUnhealthy => "very unhealthy",
            SeverityBand::Severe => "severe",
            SeverityBand::Hazardous => "hazardous",
        }
    }
}

impl fmt::Display for SeverityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_are_strictly_ascending() {
        for metric in Metric::all() {
            assert!(metric.table().is_ascending(), "{metric} table is not ascending");
        }
    }

    #[test]
    fn absent_reading_is_level_one_everywhere() {
        for metric in Metric::all() {
            assert_eq!(metric.classify(None), 1, "{metric}");
        }
    }

    #[test]
    fn aqi_bounds_are_inclusive() {
        assert_eq!(Metric::AqiIndex.classify(Some(50.0)), 1);
        assert_eq!(Metric::AqiIndex.classify(Some(51.0)), 2);
        assert_eq!(Metric::AqiIndex.classify(Some(100.0)), 2);
        assert_eq!(Metric::AqiIndex.classify(Some(101.0)), 3);
        assert_eq!(Metric::AqiIndex.classify(Some(300.0)), 5);
        assert_eq!(Metric::AqiIndex.classify(Some(301.0)), 6);
    }

    #[test]
    fn uv_tops_out_at_five() {
        assert_eq!(Metric::UvIndex.classify(Some(10.0)), 4);
        assert_eq!(Metric::UvIndex.classify(Some(11.0)), 5);
        assert_eq!(UV_INDEX.max_level(), 5);
    }

    #[test]
    fn wind_bounds_are_inclusive() {
        assert_eq!(Metric::WindSpeed.classify(Some(19.0)), 1);
        assert_eq!(Metric::WindSpeed.classify(Some(19.1)), 2);
        assert_eq!(Metric::WindSpeed.classify(Some(117.0)), 5);
        assert_eq!(Metric::WindSpeed.classify(Some(117.1)), 6);
    }

    #[test]
    fn pollutant_tables_spot_checks() {
        assert_eq!(Metric::Pm25.classify(Some(35.0)), 1);
        assert_eq!(Metric::Pm25.classify(Some(251.0)), 6);
        assert_eq!(Metric::Pm10.classify(Some(420.0)), 5);
        assert_eq!(Metric::So2.classify(Some(476.0)), 4);
        assert_eq!(Metric::No2.classify(Some(80.5)), 3);
        assert_eq!(Metric::O3.classify(Some(0.0)), 1);
        assert_eq!(Metric::Co.classify(Some(10.0)), 2);
    }

    #[test]
    fn nan_reading_is_level_one() {
        assert_eq!(Metric::AqiIndex.classify(Some(f64::NAN)), 1);
    }

    #[test]
    fn checked_constructor_rejects_bad_tables() {
        let err = ThresholdTable::new("flat", vec![1.0, 2.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            ClassifyError::NotAscending { name: "flat".into(), index: 2, previous: 2.0, value: 2.0 }
        );

        let err = ThresholdTable::new("none", vec![]).unwrap_err();
        assert!(err.to_string().contains("is empty"));
    }

    #[test]
    fn checked_constructor_accepts_ascending_table() {
        let table = ThresholdTable::new("humidity", vec![30.0, 60.0, 90.0]).expect("ascending");

        assert_eq!(table.name(), "humidity");
        assert_eq!(table.max_level(), 4);
        assert_eq!(table.classify(Some(75.0)), 3);
    }

    #[test]
    fn checked_constructor_caps_table_length() {
        let bounds = |n: usize| (0..n).map(|i| i as f64).collect::<Vec<_>>();

        let widest = ThresholdTable::new("widest", bounds(MAX_BOUNDS)).expect("at the limit");
        assert_eq!(widest.max_level(), Level::MAX);
        assert_eq!(widest.classify(Some(1_000.0)), Level::MAX);

        let err = ThresholdTable::new("too wide", bounds(MAX_BOUNDS + 1)).unwrap_err();
        assert_eq!(err, ClassifyError::TooLong { name: "too wide".into(), len: 255, max: 254 });
    }

    #[test]
    fn metric_names_parse_loosely() {
        assert_eq!(Metric::try_from("PM2.5").unwrap(), Metric::Pm25);
        assert_eq!(Metric::try_from("wind").unwrap(), Metric::WindSpeed);
        assert!(Metric::try_from("pollen").is_err());
    }

    #[test]
    fn severity_band_saturates() {
        assert_eq!(SeverityBand::from_level(1), SeverityBand::Good);
        assert_eq!(SeverityBand::from_level(6), SeverityBand::Hazardous);
        assert_eq!(SeverityBand::from_level(9), SeverityBand::Hazardous);
    }
}

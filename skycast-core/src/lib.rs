//! Core library for the `skycast` weather app.
//!
//! This crate defines:
//! - Reactive state plumbing: [`ObservableValue`] and the [`EventBus`]
//! - Classification of raw readings into severity levels
//! - Freshness, daylight and temperature-range helpers
//! - Settings, theme state and configuration handling
//!
//! Everything reactive here is single-threaded; see [`source`] for how fetched
//! data gets onto the owning thread.

pub mod bus;
pub mod classify;
pub mod config;
pub mod model;
pub mod observable;
pub mod range;
pub mod settings;
pub mod source;
pub mod subscription;
pub mod theme;
pub mod validity;

pub use bus::{Event, EventBus, EventKind};
pub use classify::{ClassifyError, Level, Metric, SeverityBand, ThresholdTable};
pub use config::Config;
pub use model::WeatherSnapshot;
pub use observable::ObservableValue;
pub use range::TemperatureRange;
pub use settings::{DarkMode, Settings, SettingsManager, UpdateInterval};
pub use source::{JsonFileSource, SnapshotSource, SourceError};
pub use subscription::{OwnerId, Subscription};
pub use theme::{InterfaceStyle, ThemeState};

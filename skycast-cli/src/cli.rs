use std::{cell::Cell, path::PathBuf, rc::Rc, time::Duration};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use inquire::{Select, Text};
use skycast_core::{
    Config, DarkMode, EventBus, EventKind, InterfaceStyle, JsonFileSource, Metric, ObservableValue,
    OwnerId, SettingsManager, SeverityBand, SnapshotSource, ThemeState, ThresholdTable,
    UpdateInterval, WeatherSnapshot,
    config::parse_offset,
    settings::{SpeedUnit, TemperatureUnit},
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::render::{RenderContext, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Inspect weather snapshots")]
pub struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Change preferences. Prompts interactively when no flag is given.
    Configure(ConfigureArgs),

    /// Render a snapshot file once.
    Show {
        /// Path to a JSON snapshot.
        snapshot: PathBuf,

        /// UTC offset of the location, e.g. "+08:00". Defaults to the configured one.
        #[arg(long)]
        timezone: Option<String>,

        /// RFC 3339 instant to evaluate freshness and daylight at; if absent, means "now".
        #[arg(long)]
        now: Option<String>,
    },

    /// Re-read a snapshot file periodically, rendering only when it changes.
    Watch {
        snapshot: PathBuf,

        /// Seconds between reads.
        #[arg(long, default_value_t = 30)]
        every: u64,

        /// Stop after this many reads.
        #[arg(long)]
        count: Option<u32>,

        #[arg(long)]
        timezone: Option<String>,
    },

    /// Classify a reading, or print the metric's thresholds when no value is given.
    Classify {
        /// One of aqi, pm25, pm10, so2, no2, o3, co, uv, wind.
        metric: String,

        #[arg(allow_negative_numbers = true)]
        value: Option<f64>,
    },
}

#[derive(Debug, Default, Args)]
pub struct ConfigureArgs {
    /// auto, system, light or dark.
    #[arg(long)]
    pub dark_mode: Option<String>,

    /// Refresh interval, e.g. "1.5h".
    #[arg(long)]
    pub interval: Option<String>,

    /// c, f or k.
    #[arg(long)]
    pub temperature_unit: Option<String>,

    /// kph, mps, kn or mph.
    #[arg(long)]
    pub speed_unit: Option<String>,

    /// UTC offset of the displayed location.
    #[arg(long)]
    pub timezone: Option<String>,
}

impl ConfigureArgs {
    fn is_empty(&self) -> bool {
        self.dark_mode.is_none()
            && self.interval.is_none()
            && self.temperature_unit.is_none()
            && self.speed_unit.is_none()
            && self.timezone.is_none()
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure(args) => configure(args),
            Command::Show { snapshot, timezone, now } => {
                show(snapshot, timezone.as_deref(), now.as_deref()).await
            }
            Command::Watch { snapshot, every, count, timezone } => {
                watch(snapshot, Duration::from_secs(every.max(1)), count, timezone.as_deref()).await
            }
            Command::Classify { metric, value } => classify(&metric, value),
        }
    }
}

fn configure(args: ConfigureArgs) -> Result<()> {
    let mut config = Config::load()?;
    let bus = EventBus::new();
    let manager = SettingsManager::new(config.settings.clone(), bus.clone());

    let changes = Rc::new(Cell::new(0usize));
    let counter = changes.clone();
    let _counting = bus.subscribe(OwnerId::new(), EventKind::SettingsChanged, move |_| {
        counter.set(counter.get() + 1)
    });

    if args.is_empty() {
        prompt_settings(&manager, &mut config)?;
    } else {
        apply_flags(&manager, &mut config, args)?;
    }

    config.settings = manager.settings();
    config.save()?;

    println!(
        "Saved configuration ({} setting(s) changed) to {}",
        changes.get(),
        Config::config_file_path()?.display()
    );
    Ok(())
}

fn apply_flags(manager: &SettingsManager, config: &mut Config, args: ConfigureArgs) -> Result<()> {
    if let Some(raw) = args.dark_mode.as_deref() {
        manager.set_dark_mode(DarkMode::try_from(raw)?);
    }
    if let Some(raw) = args.interval.as_deref() {
        manager.set_update_interval(UpdateInterval::try_from(raw)?);
    }
    if let Some(raw) = args.temperature_unit.as_deref() {
        manager.set_temperature_unit(TemperatureUnit::try_from(raw)?);
    }
    if let Some(raw) = args.speed_unit.as_deref() {
        manager.set_speed_unit(SpeedUnit::try_from(raw)?);
    }
    if let Some(raw) = args.timezone.as_deref() {
        config.set_timezone(raw)?;
    }
    Ok(())
}

fn select<T>(message: &str, options: &[T], current: T) -> Result<T>
where
    T: Copy + PartialEq + std::fmt::Display,
{
    let cursor = options.iter().position(|o| *o == current).unwrap_or(0);
    Select::new(message, options.to_vec())
        .with_starting_cursor(cursor)
        .prompt()
        .with_context(|| format!("Prompt '{message}' was cancelled"))
}

fn prompt_settings(manager: &SettingsManager, config: &mut Config) -> Result<()> {
    let current = manager.settings();

    manager.set_dark_mode(select("Dark mode:", DarkMode::all(), current.dark_mode)?);
    manager.set_update_interval(select(
        "Update interval:",
        UpdateInterval::all(),
        current.update_interval,
    )?);
    manager.set_temperature_unit(select(
        "Temperature unit:",
        TemperatureUnit::all(),
        current.temperature_unit,
    )?);
    manager.set_speed_unit(select("Speed unit:", SpeedUnit::all(), current.speed_unit)?);

    let timezone = Text::new("Timezone offset (e.g. +08:00):")
        .with_default(config.timezone.as_deref().unwrap_or("UTC"))
        .prompt()
        .context("Timezone prompt was cancelled")?;
    config.set_timezone(&timezone)?;

    Ok(())
}

fn resolve_timezone(config: &Config, flag: Option<&str>) -> Result<FixedOffset> {
    match flag {
        Some(raw) => parse_offset(raw),
        None => config.timezone_offset(),
    }
}

fn parse_now(raw: Option<&str>) -> Result<DateTime<Utc>> {
    match raw {
        None => Ok(Utc::now()),
        Some(raw) => Ok(DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("Invalid --now '{raw}', expected RFC 3339"))?
            .with_timezone(&Utc)),
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

async fn show(path: PathBuf, timezone: Option<&str>, now: Option<&str>) -> Result<()> {
    let config = Config::load()?;
    let timezone = resolve_timezone(&config, timezone)?;
    let now = parse_now(now)?;

    let snapshot = JsonFileSource::new(path).fetch().await?;
    debug!(location = %snapshot.base().location_id, "snapshot loaded");

    let ctx = RenderContext { timezone, now, settings: config.settings };
    let theme = ThemeState::new(ctx.settings.dark_mode, snapshot.is_daylight(timezone, now));

    print_lines(&render(&snapshot, &ctx));
    println!("appearance: {}", theme.home_style().get().as_str());
    Ok(())
}

/// Fetches run on a tokio task and are handed back over a channel, so the
/// observable and its subscribers never leave this thread.
async fn watch(
    path: PathBuf,
    every: Duration,
    count: Option<u32>,
    timezone: Option<&str>,
) -> Result<()> {
    let config = Config::load()?;
    let timezone = resolve_timezone(&config, timezone)?;
    let settings = config.settings;

    let source = JsonFileSource::new(path);
    let (tx, mut rx) = mpsc::channel(4);
    let producer = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        let mut fetched = 0u32;
        while count.is_none_or(|limit| fetched < limit) {
            ticker.tick().await;
            fetched += 1;
            if tx.send(source.fetch().await).await.is_err() {
                break;
            }
        }
    });

    let owner = OwnerId::new();
    let weather: ObservableValue<Option<WeatherSnapshot>> = ObservableValue::new(None);
    let theme = ThemeState::new(settings.dark_mode, true);

    let _appearance = theme.home_style().subscribe(owner, false, |style: &InterfaceStyle| {
        println!("appearance: {}", style.as_str())
    });

    let view_theme = theme.clone();
    let _view = weather.subscribe(owner, false, move |snapshot: &Option<WeatherSnapshot>| {
        let Some(snapshot) = snapshot else { return };
        let now = Utc::now();
        let ctx = RenderContext { timezone, now, settings: settings.clone() };

        print_lines(&render(snapshot, &ctx));
        view_theme.update(None, Some(snapshot.is_daylight(timezone, now)));
    });

    while let Some(fetched) = rx.recv().await {
        match fetched {
            Ok(snapshot) => {
                let updated = snapshot.update_time();
                if !weather.set(Some(snapshot)) {
                    info!(%updated, "snapshot unchanged");
                }
            }
            Err(err) => warn!(error = ?err, "fetch failed"),
        }
    }

    producer.await.context("Snapshot reader task failed")?;
    Ok(())
}

fn threshold_lines(table: &ThresholdTable) -> Vec<String> {
    let bounds = table.bounds();
    let mut lines: Vec<String> = bounds
        .iter()
        .zip(1u8..)
        .map(|(bound, level)| {
            format!("level {level}  <= {bound:<6} {}", SeverityBand::from_level(level))
        })
        .collect();

    if let Some(last) = bounds.last() {
        let level = table.max_level();
        lines.push(format!("level {level}  >  {last:<6} {}", SeverityBand::from_level(level)));
    }
    lines
}

fn classify(metric: &str, value: Option<f64>) -> Result<()> {
    let metric = Metric::try_from(metric)?;

    match value {
        Some(value) => {
            let level = metric.classify(Some(value));
            println!("{metric} {value}: level {level} ({})", SeverityBand::from_level(level));
        }
        None => {
            println!("{} thresholds", metric.table().name());
            print_lines(&threshold_lines(metric.table()));
        }
    }
    Ok(())
}

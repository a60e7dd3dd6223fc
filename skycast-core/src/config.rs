use anyhow::{Context, Result, anyhow};
use chrono::{FixedOffset, Offset, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::settings::Settings;

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// UTC offset of the displayed location, e.g. "+08:00".
    pub timezone: Option<String>,

    /// Example TOML:
    /// [settings]
    /// dark_mode = "auto"
    /// update_interval = "one_hour"
    #[serde(default)]
    pub settings: Settings,
}

impl Config {
    /// Parsed [`Config::timezone`], UTC when unset.
    pub fn timezone_offset(&self) -> Result<FixedOffset> {
        match self.timezone.as_deref() {
            None => Ok(utc_offset()),
            Some(raw) => parse_offset(raw),
        }
    }

    /// Store a timezone after checking that it parses.
    pub fn set_timezone(&mut self, raw: &str) -> Result<()> {
        parse_offset(raw)?;
        self.timezone = Some(raw.trim().to_string());
        Ok(())
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// Parse "Z", "UTC", "+08:00", "-0530" or "+8" into a fixed offset.
pub fn parse_offset(raw: &str) -> Result<FixedOffset> {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return Ok(utc_offset());
    }

    let invalid = || anyhow!("Invalid timezone offset '{raw}'. Expected e.g. +08:00, -05:30 or UTC.");
    if !s.is_ascii() {
        return Err(invalid());
    }

    let (sign, rest) = match s.chars().next() {
        Some('+') => (1, &s[1..]),
        Some('-') => (-1, &s[1..]),
        _ => return Err(invalid()),
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    let (hours, minutes) = match digits.len() {
        1 | 2 => (digits.as_str(), "0"),
        4 => digits.split_at(2),
        _ => return Err(invalid()),
    };

    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{DarkMode, UpdateInterval};

    #[test]
    fn default_timezone_is_utc() {
        let cfg = Config::default();
        assert_eq!(cfg.timezone_offset().unwrap().local_minus_utc(), 0);
    }

    #[test]
    fn parses_common_offset_spellings() {
        assert_eq!(parse_offset("+08:00").unwrap().local_minus_utc(), 8 * 3600);
        assert_eq!(parse_offset("-0530").unwrap().local_minus_utc(), -(5 * 3600 + 30 * 60));
        assert_eq!(parse_offset("+9").unwrap().local_minus_utc(), 9 * 3600);
        assert_eq!(parse_offset("UTC").unwrap().local_minus_utc(), 0);
    }

    #[test]
    fn rejects_garbage_offsets() {
        for raw in ["08:00", "+8:75", "+123", "+ab:cd", "", "+30:00", "+1é1", "−05:00"] {
            let err = parse_offset(raw).unwrap_err();
            assert!(err.to_string().contains("Invalid timezone offset"), "{raw}");
        }
    }

    #[test]
    fn set_timezone_validates_before_storing() {
        let mut cfg = Config::default();

        assert!(cfg.set_timezone("nowhere").is_err());
        assert!(cfg.timezone.is_none());

        cfg.set_timezone(" +02:00 ").unwrap();
        assert_eq!(cfg.timezone.as_deref(), Some("+02:00"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            timezone = "+01:00"

            [settings]
            dark_mode = "dark"
            update_interval = "two_hours"
            "#,
        )
        .expect("valid toml");

        assert_eq!(cfg.settings.dark_mode, DarkMode::Dark);
        assert_eq!(cfg.settings.update_interval, UpdateInterval::TwoHours);
        assert!(cfg.settings.alert_enabled);
        assert_eq!(cfg.settings.today_forecast.time, "07:00");
    }

    #[test]
    fn save_then_load_from_explicit_path() {
        let dir = std::env::temp_dir().join(format!("skycast-config-test-{}", std::process::id()));
        let path = dir.join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.settings.dark_mode = DarkMode::Light;
        cfg.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded, cfg);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let path = std::env::temp_dir().join("skycast-definitely-missing").join("config.toml");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }
}

//! Freshness and day/night decisions.

use chrono::{DateTime, FixedOffset, TimeZone, Timelike, Utc};

use crate::model::{Astro, WeatherSnapshot};

/// Hours in `[DAY_START_HOUR, DAY_END_HOUR)` count as daylight when no sun
/// data is available.
pub const DAY_START_HOUR: u32 = 6;
pub const DAY_END_HOUR: u32 = 18;

/// Whether data updated at `update_time` is still fresh at `now`.
///
/// An update time in the future is never fresh.
pub fn is_fresh(update_time: DateTime<Utc>, polling_interval_hours: f64, now: DateTime<Utc>) -> bool {
    if now < update_time {
        return false;
    }
    let age_secs = (now - update_time).num_milliseconds() as f64 / 1000.0;
    age_secs < polling_interval_hours * 3600.0
}

fn minutes_of_day<Tz: TimeZone>(time: &DateTime<Tz>) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Day/night at `now` for a location in `target`.
///
/// With both sunrise and sunset known, daylight is
/// `sunrise <= now < sunset` on wall-clock minutes. `now` is read in `target`
/// while sunrise and sunset are read in the offset they carry. Days where the
/// interval wraps past midnight are not handled. Without sun data, daylight is
/// `06:00 <= now < 18:00` in `target`.
pub fn is_daylight_at(sun: Option<&Astro>, target: FixedOffset, now: DateTime<Utc>) -> bool {
    let local_now = now.with_timezone(&target);

    match sun.and_then(|astro| astro.rise_time.zip(astro.set_time)) {
        Some((rise, set)) => {
            let now_minutes = minutes_of_day(&local_now);
            minutes_of_day(&rise) <= now_minutes && now_minutes < minutes_of_day(&set)
        }
        None => (DAY_START_HOUR..DAY_END_HOUR).contains(&local_now.hour()),
    }
}

/// [`is_daylight_at`] using the sun of the first daily forecast. No daily
/// forecasts means no sun data.
pub fn is_daylight(snapshot: &WeatherSnapshot, target: FixedOffset, now: DateTime<Utc>) -> bool {
    is_daylight_at(snapshot.daily_forecasts().first().map(|d| &d.sun), target, now)
}

impl WeatherSnapshot {
    pub fn is_fresh(&self, polling_interval_hours: f64, now: DateTime<Utc>) -> bool {
        is_fresh(self.update_time(), polling_interval_hours, now)
    }

    pub fn is_daylight(&self, target: FixedOffset, now: DateTime<Utc>) -> bool {
        is_daylight(self, target, now)
    }
}

//! Display rules: pure functions from weather readings to the strings a
//! screen shows.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;
use std::fmt;

use crate::model::{Condition, CurrentConditions, ForecastEntry, UnitSystem, WeatherSnapshot};

/// Forecast readings per day at 3-hour resolution.
pub const ENTRIES_PER_DAY: usize = 8;
pub const DAILY_DAYS: usize = 5;

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Coarse temperature bucket that picks the news placeholder sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Cold,
    Cool,
    Hot,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Cold => "cold",
            Mood::Cool => "cool",
            Mood::Hot => "hot",
        }
    }

    pub fn news_description(&self) -> &'static str {
        match self {
            Mood::Cold => "Showing depressing news (cold weather)",
            Mood::Hot => "Showing fear-related news (hot weather)",
            Mood::Cool => "Showing positive news (cool weather)",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cold at or below 15°C / 59°F, hot at or above 25°C / 77°F.
pub fn mood(temperature: f64, units: UnitSystem) -> Mood {
    let (cold, hot) = match units {
        UnitSystem::Metric => (15.0, 25.0),
        UnitSystem::Imperial => (59.0, 77.0),
    };

    if temperature <= cold {
        Mood::Cold
    } else if temperature >= hot {
        Mood::Hot
    } else {
        Mood::Cool
    }
}

/// Sentence for the news section; empty until current conditions exist.
pub fn news_filter_description(current: Option<&CurrentConditions>, units: UnitSystem) -> &'static str {
    current.map_or("", |c| mood(c.temperature, units).news_description())
}

/// Next 24 hours: the first eight readings, in order.
pub fn hourly_slice(entries: &[ForecastEntry]) -> &[ForecastEntry] {
    &entries[..entries.len().min(ENTRIES_PER_DAY)]
}

/// One reading per day: every eighth entry from index 0, at most five.
///
/// Days are counted from the first entry, not from midnight.
pub fn daily_slice(entries: &[ForecastEntry]) -> Vec<&ForecastEntry> {
    entries.iter().step_by(ENTRIES_PER_DAY).take(DAILY_DAYS).collect()
}

pub fn format_temperature(temperature: f64, units: UnitSystem) -> String {
    // `as i64` also turns -0.0 into 0.
    format!("{}{}", temperature.round() as i64, units.temperature_symbol())
}

pub fn format_wind(speed: f64, units: UnitSystem) -> String {
    format!("{} {}", speed, units.wind_speed_unit())
}

/// Meters to kilometers with one decimal; zero counts as not reported.
pub fn format_visibility(visibility_m: Option<u32>) -> String {
    match visibility_m {
        Some(m) if m > 0 => format!("{:.1} km", f64::from(m) / 1000.0),
        _ => "N/A".to_string(),
    }
}

pub fn format_humidity(humidity_pct: u8) -> String {
    format!("{humidity_pct}%")
}

pub fn format_pressure(pressure_hpa: f64) -> String {
    format!("{pressure_hpa} hPa")
}

pub fn icon_url(icon: &str) -> String {
    format!("{ICON_BASE_URL}/{icon}@2x.png")
}

pub fn small_icon_url(icon: &str) -> String {
    format!("{ICON_BASE_URL}/{icon}.png")
}

pub fn format_time_in<Tz: TimeZone>(time: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    time.with_timezone(tz).format("%H:%M").to_string()
}

pub fn format_date_in<Tz: TimeZone>(time: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    time.with_timezone(tz).format("%a, %b %-d").to_string()
}

/// `HH:MM` in the local time zone.
pub fn format_time(time: DateTime<Utc>) -> String {
    format_time_in(time, &Local)
}

/// e.g. `Mon, Jan 1` in the local time zone.
pub fn format_date(time: DateTime<Utc>) -> String {
    format_date_in(time, &Local)
}

pub fn location_label(current: &CurrentConditions) -> String {
    match current.country.as_deref().filter(|c| !c.is_empty()) {
        Some(country) => format!("{}, {}", current.location_name, country),
        None => current.location_name.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyItem {
    pub time: String,
    pub icon_url: Option<String>,
    pub temperature: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyItem {
    pub date: String,
    pub icon_url: Option<String>,
    pub description: String,
    pub temperature: String,
    pub humidity: String,
}

/// Everything the weather screen shows, already formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherView {
    pub units: UnitSystem,
    pub temperature: String,
    pub description: String,
    pub icon_url: Option<String>,
    pub feels_like: String,
    pub humidity: String,
    pub wind: String,
    pub pressure: String,
    pub visibility: String,
    pub location: String,
    pub mood: Mood,
    pub news_filter: String,
    pub hourly: Vec<HourlyItem>,
    pub daily: Vec<DailyItem>,
}

impl WeatherView {
    pub fn from_snapshot(snapshot: &WeatherSnapshot) -> Self {
        Self::from_snapshot_in(snapshot, &Local)
    }

    pub fn from_snapshot_in<Tz: TimeZone>(snapshot: &WeatherSnapshot, tz: &Tz) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        let units = snapshot.units;
        let current = &snapshot.current;
        let entries = &snapshot.forecast.entries;
        let mood = mood(current.temperature, units);

        let hourly = hourly_slice(entries)
            .iter()
            .map(|e| HourlyItem {
                time: format_time_in(e.time, tz),
                icon_url: small_icon(e.condition.as_ref()),
                temperature: format_temperature(e.temperature, units),
                summary: e.condition.as_ref().map(|c| c.main.clone()).unwrap_or_default(),
            })
            .collect();

        let daily = daily_slice(entries)
            .into_iter()
            .map(|e| DailyItem {
                date: format_date_in(e.time, tz),
                icon_url: small_icon(e.condition.as_ref()),
                description: e.condition.as_ref().map(|c| c.description.clone()).unwrap_or_default(),
                temperature: format_temperature(e.temperature, units),
                humidity: format!("{} humidity", format_humidity(e.humidity_pct)),
            })
            .collect();

        WeatherView {
            units,
            temperature: format_temperature(current.temperature, units),
            description: current
                .condition
                .as_ref()
                .map(|c| c.description.clone())
                .unwrap_or_default(),
            icon_url: current
                .condition
                .as_ref()
                .filter(|c| !c.icon.is_empty())
                .map(|c| icon_url(&c.icon)),
            feels_like: format_temperature(current.feels_like, units),
            humidity: format_humidity(current.humidity_pct),
            wind: format_wind(current.wind_speed, units),
            pressure: format_pressure(current.pressure_hpa),
            visibility: format_visibility(current.visibility_m),
            location: location_label(current),
            mood,
            news_filter: mood.news_description().to_string(),
            hourly,
            daily,
        }
    }
}

fn small_icon(condition: Option<&Condition>) -> Option<String> {
    condition.filter(|c| !c.icon.is_empty()).map(|c| small_icon_url(&c.icon))
}

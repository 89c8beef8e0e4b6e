//! Text rendering of the weather & news screen.

use serde::Serialize;
use std::fmt::Write;
use weather_news_core::{WeatherStore, WeatherView, store::FetchStatus};

const NO_NEWS: &str = "No news articles available";

/// What the screen shows, read from the store in one go.
#[derive(Debug, Clone, Serialize)]
pub struct ScreenState {
    pub status: &'static str,
    pub error: Option<String>,
    pub location_error: Option<String>,
    pub weather_error: Option<String>,
    pub weather: Option<WeatherView>,
    pub news_filter: String,
}

impl ScreenState {
    pub fn from_store(store: &WeatherStore) -> Self {
        Self::new(store, store.snapshot().map(WeatherView::from_snapshot))
    }

    fn new(store: &WeatherStore, weather: Option<WeatherView>) -> Self {
        let news_filter = weather.as_ref().map(|w| w.news_filter.clone()).unwrap_or_default();

        Self {
            status: store.status().as_str(),
            error: store.error().map(str::to_owned),
            location_error: store.location_error().map(str::to_owned),
            weather_error: store.weather_error().map(str::to_owned),
            weather,
            news_filter,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        // Writing into a String cannot fail.
        let _ = self.write_screen(&mut out);
        out
    }

    fn write_screen(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "Weather & News")?;
        writeln!(out, "==============")?;
        writeln!(out)?;

        if let Some(location_error) = &self.location_error {
            writeln!(out, "! {location_error}")?;
            if let Some(error) = &self.error {
                writeln!(out, "  {error}")?;
            }
            writeln!(out)?;
        }

        if self.status == FetchStatus::Loading.as_str() {
            writeln!(out, "Loading...")?;
        } else if self.weather_error.is_some() {
            writeln!(out, "! Failed to load weather data")?;
            // Otherwise the message was already printed with the location error.
            if let (None, Some(error)) = (&self.location_error, &self.error) {
                writeln!(out, "  {error}")?;
            }
        } else if let Some(view) = &self.weather {
            write_weather(out, view)?;
        }

        writeln!(out)?;
        writeln!(out, "News Headlines")?;
        if !self.news_filter.is_empty() {
            writeln!(out, "  {}", self.news_filter)?;
        }
        writeln!(out, "  {NO_NEWS}")?;

        Ok(())
    }
}

fn write_weather(out: &mut String, view: &WeatherView) -> std::fmt::Result {
    writeln!(out, "{}  {}", view.temperature, view.description)?;
    if let Some(icon) = &view.icon_url {
        writeln!(out, "  icon: {icon}")?;
    }
    writeln!(
        out,
        "  Feels Like {} | Humidity {} | Wind {}",
        view.feels_like, view.humidity, view.wind
    )?;
    writeln!(
        out,
        "  Pressure {} | Visibility {} | UV Index N/A",
        view.pressure, view.visibility
    )?;
    writeln!(out, "  {}", view.location)?;

    if view.hourly.is_empty() && view.daily.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "5-Day Forecast")?;
    writeln!(out, "  Hourly Forecast")?;
    for item in &view.hourly {
        writeln!(out, "    {:<6} {:>5}  {}", item.time, item.temperature, item.summary)?;
    }
    writeln!(out, "  Daily Forecast")?;
    for item in &view.daily {
        writeln!(
            out,
            "    {:<12} {:<20} {:>5}  {}",
            item.date, item.description, item.temperature, item.humidity
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use weather_news_core::{
        Condition, CurrentConditions, ErrorFlagPolicy, FetchError, ForecastEntry, ForecastList,
        UnitSystem, WeatherSnapshot,
    };

    fn snapshot() -> WeatherSnapshot {
        let at = Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap();
        let entries = (0..16)
            .map(|i| ForecastEntry {
                time: at + chrono::Duration::hours(3 * i),
                temperature: 20.0,
                feels_like: 19.0,
                humidity_pct: 55,
                condition: Some(Condition {
                    icon: "01d".into(),
                    description: "clear sky".into(),
                    main: "Clear".into(),
                }),
            })
            .collect();

        WeatherSnapshot {
            current: CurrentConditions {
                location_name: "Lisbon".into(),
                country: Some("PT".into()),
                temperature: 20.4,
                feels_like: 19.6,
                humidity_pct: 60,
                pressure_hpa: 1018.0,
                wind_speed: 5.5,
                visibility_m: None,
                condition: Some(Condition {
                    icon: "01d".into(),
                    description: "clear sky".into(),
                    main: "Clear".into(),
                }),
                observation_time: at,
            },
            forecast: ForecastList { city: None, country: None, entries },
            units: UnitSystem::Metric,
            fetched_at: at,
        }
    }

    fn succeeded_store() -> WeatherStore {
        let mut store = WeatherStore::new(ErrorFlagPolicy::PerSource);
        let token = store.begin_fetch();
        store.complete(token, Ok(snapshot()));
        store
    }

    #[test]
    fn renders_weather_card_forecast_and_news() {
        let store = succeeded_store();
        let view = WeatherView::from_snapshot_in(store.snapshot().unwrap(), &Utc);
        let text = ScreenState::new(&store, Some(view)).render();

        assert!(text.starts_with("Weather & News\n"));
        assert!(text.contains("20°C  clear sky"));
        assert!(text.contains("Feels Like 20°C | Humidity 60% | Wind 5.5 m/s"));
        assert!(text.contains("Pressure 1018 hPa | Visibility N/A | UV Index N/A"));
        assert!(text.contains("Lisbon, PT"));
        assert!(text.contains("5-Day Forecast"));
        assert_eq!(text.matches("Clear").count(), 8);
        assert!(text.contains("Tue, Mar 5"));
        assert!(text.contains("Showing positive news (cool weather)"));
        assert!(text.ends_with("No news articles available\n"));
    }

    #[test]
    fn renders_loading_state() {
        let mut store = succeeded_store();
        store.begin_fetch();

        let text = ScreenState::new(&store, None).render();
        assert!(text.contains("Loading..."));
        assert!(!text.contains("Failed"));
    }

    #[test]
    fn renders_fetch_failure() {
        let mut store = WeatherStore::new(ErrorFlagPolicy::PerSource);
        let token = store.begin_fetch();
        let source = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let err = FetchError::Parse { endpoint: weather_news_core::Endpoint::Current, source };
        store.complete(token, Err(&err));

        let state = ScreenState::from_store(&store);
        let text = state.render();

        assert_eq!(state.status, "failed");
        assert!(text.contains("! Failed to load weather data"));
        assert!(text.contains("  Failed to fetch weather data"));
        assert!(!text.contains("Showing"));
    }

    #[test]
    fn screen_state_serializes_to_json() {
        let store = succeeded_store();
        let view = WeatherView::from_snapshot_in(store.snapshot().unwrap(), &Utc);
        let state = ScreenState::new(&store, Some(view));

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "succeeded");
        assert_eq!(json["weather"]["mood"], "cool");
        assert_eq!(json["weather"]["hourly"].as_array().unwrap().len(), 8);
        assert!(json["error"].is_null());
    }
}

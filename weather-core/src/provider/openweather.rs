use async_trait::async_trait;
use chrono::{DateTime, Utc, serde::ts_seconds};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, info};

use crate::{
    config::DEFAULT_BASE_URL,
    error::{Endpoint, FetchError},
    model::{
        Condition, Coordinates, CurrentConditions, ForecastEntry, ForecastList, UnitSystem,
        WeatherSnapshot,
    },
};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint.path())
    }

    /// GET one endpoint. The status is checked before the body is parsed.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        coordinates: &Coordinates,
        units: UnitSystem,
    ) -> Result<T, FetchError> {
        let url = self.endpoint_url(endpoint);
        let lat = coordinates.latitude.to_string();
        let lon = coordinates.longitude.to_string();

        debug!(%url, %lat, %lon, units = units.as_str(), "requesting OpenWeather {endpoint}");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("units", units.as_str()),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })?;

        let status = res.status();
        if !status.is_success() {
            // Best effort: the body only enriches the error.
            let body = res.text().await.unwrap_or_default();
            return Err(FetchError::Status { endpoint, status, body: truncate_body(&body) });
        }

        let body = res
            .text()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })?;

        serde_json::from_str(&body).map_err(|source| FetchError::Parse { endpoint, source })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    #[serde(default)]
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    icon: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    main: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    #[serde(with = "ts_seconds")]
    dt: DateTime<Utc>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    visibility: Option<u32>,
    #[serde(default)]
    sys: OwSys,
}

#[derive(Debug, Default, Deserialize)]
struct OwCity {
    name: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    /// Out-of-range timestamps fail the parse instead of dropping the entry.
    #[serde(with = "ts_seconds")]
    dt: DateTime<Utc>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    #[serde(default)]
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

fn first_condition(weather: Vec<OwWeather>) -> Option<Condition> {
    weather.into_iter().next().map(|w| Condition {
        icon: w.icon,
        description: w.description,
        main: w.main,
    })
}

impl From<OwCurrentResponse> for CurrentConditions {
    fn from(parsed: OwCurrentResponse) -> Self {
        CurrentConditions {
            location_name: parsed.name,
            country: parsed.sys.country,
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            pressure_hpa: parsed.main.pressure,
            wind_speed: parsed.wind.speed,
            visibility_m: parsed.visibility,
            condition: first_condition(parsed.weather),
            observation_time: parsed.dt,
        }
    }
}

impl From<OwForecastResponse> for ForecastList {
    fn from(parsed: OwForecastResponse) -> Self {
        let entries = parsed
            .list
            .into_iter()
            .map(|e| ForecastEntry {
                time: e.dt,
                temperature: e.main.temp,
                feels_like: e.main.feels_like,
                humidity_pct: e.main.humidity,
                condition: first_condition(e.weather),
            })
            .collect();

        ForecastList { city: parsed.city.name, country: parsed.city.country, entries }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_weather(
        &self,
        coordinates: &Coordinates,
        units: UnitSystem,
    ) -> Result<WeatherSnapshot, FetchError> {
        // Sequential on purpose: no forecast request once the current one failed.
        let current: OwCurrentResponse =
            self.get_json(Endpoint::Current, coordinates, units).await?;
        let forecast: OwForecastResponse =
            self.get_json(Endpoint::Forecast, coordinates, units).await?;

        let snapshot = WeatherSnapshot {
            current: current.into(),
            forecast: forecast.into(),
            units,
            fetched_at: Utc::now(),
        };

        info!(
            location = %snapshot.current.location_name,
            forecast_entries = snapshot.forecast.entries.len(),
            "fetched weather from OpenWeather"
        );

        Ok(snapshot)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

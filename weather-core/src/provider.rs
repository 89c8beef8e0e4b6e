use crate::{
    Config,
    error::FetchError,
    model::{Coordinates, UnitSystem, WeatherSnapshot},
    provider::openweather::OpenWeatherProvider,
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;

pub mod openweather;

/// Source of current conditions plus forecast for a coordinate.
///
/// Both parts succeed together or the whole call fails.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_weather(
        &self,
        coordinates: &Coordinates,
        units: UnitSystem,
    ) -> Result<WeatherSnapshot, FetchError>;
}

/// Construct the OpenWeather provider from config (API key, base URL, timeout).
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key()?;

    let mut builder = Client::builder();
    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }
    let http = builder.build().context("Failed to build HTTP client")?;

    let provider = OpenWeatherProvider::new(api_key.to_owned())
        .with_base_url(config.base_url())
        .with_client(http);

    Ok(Box::new(provider))
}

//! Core library for the `weather-news` screen.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Geolocation providers and the OpenWeather fetcher
//! - The fenced weather state store
//! - Display rules (mood category, forecast slices, unit-aware labels)
//! - The pipeline tying location, fetch and store together
//!
//! It is used by `weather-news-cli`, but can also be reused by other front ends.

pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod store;
pub mod view;

pub use config::{Config, LocationMode};
pub use error::{Endpoint, FetchError, LocationError, PipelineError};
pub use location::{FixedLocation, GeolocationProvider, IpApiLocation};
pub use model::{
    Condition, Coordinates, CurrentConditions, ForecastEntry, ForecastList, UnitSystem,
    WeatherSnapshot,
};
pub use pipeline::WeatherPipeline;
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
pub use store::{Completion, ErrorFlagPolicy, FetchStatus, RequestToken, SharedStore, WeatherStore};
pub use view::{Mood, WeatherView};

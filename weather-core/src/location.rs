//! Geolocation: a permission gate plus a one-shot coordinate read.
//!
//! Providers never retry; the pipeline decides what to do with a failure.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};
use tracing::{debug, info};

use crate::{Config, error::LocationError, model::Coordinates};

pub const IP_API_URL: &str = "http://ip-api.com/json";
const IP_API_TIMEOUT_SECS: u64 = 10;

#[async_trait]
pub trait GeolocationProvider: Send + Sync + Debug {
    /// Ask for permission to read the location. May prompt the user at most
    /// once per call. Providers without a permission model always grant.
    async fn request_permission(&self) -> bool {
        true
    }

    async fn current_coordinates(&self) -> Result<Coordinates, LocationError>;
}

#[async_trait]
impl<T: GeolocationProvider + ?Sized> GeolocationProvider for Box<T> {
    async fn request_permission(&self) -> bool {
        (**self).request_permission().await
    }

    async fn current_coordinates(&self) -> Result<Coordinates, LocationError> {
        (**self).current_coordinates().await
    }
}

/// Coordinates known up front (config file or command line).
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation {
    coordinates: Coordinates,
}

impl FixedLocation {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl GeolocationProvider for FixedLocation {
    async fn current_coordinates(&self) -> Result<Coordinates, LocationError> {
        Ok(self.coordinates)
    }
}

/// Approximate coordinates from the public IP address via ip-api.com.
#[derive(Debug, Clone)]
pub struct IpApiLocation {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
}

impl IpApiLocation {
    pub fn new() -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(IP_API_TIMEOUT_SECS))
            .build()
            .context("Failed to build geolocation HTTP client")?;

        Ok(Self { url: IP_API_URL.to_string(), http })
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl GeolocationProvider for IpApiLocation {
    async fn current_coordinates(&self) -> Result<Coordinates, LocationError> {
        debug!(url = %self.url, "requesting IP geolocation");

        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LocationError::unavailable("transport", e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(LocationError::unavailable(
                format!("http/{}", status.as_u16()),
                format!("geolocation service returned status {status}"),
            ));
        }

        let body: IpApiResponse = res
            .json()
            .await
            .map_err(|e| LocationError::unavailable("parse", e.to_string()))?;

        if body.status != "success" {
            return Err(LocationError::unavailable(
                format!("ip-api/{}", body.status),
                body.message.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => {
                info!(lat, lon, city = ?body.city, "geolocation resolution successful");
                Ok(Coordinates::new(lat, lon))
            }
            _ => Err(LocationError::unavailable("ip-api/incomplete", "response had no coordinates")),
        }
    }
}

/// Pick the location provider: explicit coordinates win, then config.
pub fn location_from_config(
    config: &Config,
    explicit: Option<Coordinates>,
) -> anyhow::Result<Box<dyn GeolocationProvider>> {
    if let Some(coordinates) = explicit {
        return Ok(Box::new(FixedLocation::new(coordinates)));
    }

    if let Some(coordinates) = config.fixed_coordinates()? {
        return Ok(Box::new(FixedLocation::new(coordinates)));
    }

    Ok(Box::new(IpApiLocation::new()?))
}

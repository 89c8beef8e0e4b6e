//! Error types for the location and weather steps of the pipeline.

use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

/// Which of the two weather requests an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Current,
    Forecast,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Current => "current weather",
            Endpoint::Forecast => "forecast",
        }
    }

    /// Path below the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Current => "weather",
            Endpoint::Forecast => "forecast",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable ({code}): {message}")]
    Unavailable { code: String, message: String },
}

impl LocationError {
    pub fn unavailable(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable { code: code.into(), message: message.into() }
    }

    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionDenied => "Location permission was not granted".to_string(),
            Self::Unavailable { .. } => "Failed to get location".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to reach OpenWeather ({endpoint}): {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("OpenWeather {endpoint} request failed with status {status}: {body}")]
    Status { endpoint: Endpoint, status: StatusCode, body: String },

    #[error("Failed to parse OpenWeather {endpoint} JSON: {source}")]
    Parse {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Parse { endpoint, .. } => *endpoint,
        }
    }

    /// HTTP status for `Status` errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { .. } => "Failed to fetch weather or forecast data".to_string(),
            Self::Transport { .. } | Self::Parse { .. } => "Failed to fetch weather data".to_string(),
        }
    }
}

/// Any failure of a full pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl PipelineError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Location(e) => e.user_message(),
            Self::Fetch(e) => e.user_message(),
        }
    }
}

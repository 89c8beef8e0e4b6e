//! Interactive prompts: location permission, retry and `configure`.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use inquire::{Confirm, CustomType, InquireError, Password, PasswordDisplayMode, Select};
use std::{fmt, sync::Arc};
use tracing::warn;
use weather_news_core::{
    Config, Coordinates, GeolocationProvider, LocationError, LocationMode, UnitSystem,
};

const PERMISSION_QUESTION: &str = "Allow weather-news to use your location?";

type Ask = dyn Fn(&str) -> Result<bool, InquireError> + Send + Sync;

/// Gates a location provider behind a yes/no prompt, asked once per
/// permission request.
pub struct PromptedLocation<P> {
    inner: P,
    ask: Arc<Ask>,
}

impl<P> PromptedLocation<P> {
    pub fn new(inner: P) -> Self {
        Self::with_prompt(inner, |question| {
            Confirm::new(question)
                .with_default(true)
                .with_help_message("Coordinates are only sent to the weather service")
                .prompt()
        })
    }

    pub fn with_prompt<F>(inner: P, ask: F) -> Self
    where
        F: Fn(&str) -> Result<bool, InquireError> + Send + Sync + 'static,
    {
        Self { inner, ask: Arc::new(ask) }
    }
}

impl<P: fmt::Debug> fmt::Debug for PromptedLocation<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptedLocation").field("inner", &self.inner).finish_non_exhaustive()
    }
}

#[async_trait]
impl<P: GeolocationProvider> GeolocationProvider for PromptedLocation<P> {
    async fn request_permission(&self) -> bool {
        if !self.inner.request_permission().await {
            return false;
        }

        let ask = Arc::clone(&self.ask);
        match tokio::task::spawn_blocking(move || ask(PERMISSION_QUESTION)).await {
            Ok(Ok(granted)) => granted,
            // A prompt that could not be shown or was cancelled is a denial.
            Ok(Err(err)) => {
                warn!(error = %err, "location permission prompt failed");
                false
            }
            Err(err) => {
                warn!(error = %err, "location permission prompt task failed");
                false
            }
        }
    }

    async fn current_coordinates(&self) -> Result<Coordinates, LocationError> {
        self.inner.current_coordinates().await
    }
}

/// Run a blocking prompt off the async runtime.
async fn blocking<T, F>(prompt: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(prompt).await.context("Prompt task failed")?
}

pub async fn confirm_retry() -> Result<bool> {
    blocking(|| Ok(Confirm::new("Retry?").with_default(true).prompt()?)).await
}

/// Walk through the settings and return the updated config.
pub async fn configure(cfg: Config) -> Result<Config> {
    blocking(move || configure_blocking(cfg)).await
}

fn configure_blocking(mut cfg: Config) -> Result<Config> {
    let has_key = cfg.api_key().is_ok();
    let help = if has_key { "Leave empty to keep the current key" } else { "Get one at openweathermap.org" };

    let key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message(help)
        .prompt()?;

    match key.trim() {
        "" if has_key => {}
        "" => bail!("An API key is required"),
        key => cfg.set_api_key(key.to_string()),
    }

    let start = UnitSystem::all().iter().position(|u| *u == cfg.units).unwrap_or(0);
    cfg.units = Select::new("Unit system:", UnitSystem::all().to_vec())
        .with_starting_cursor(start)
        .prompt()?;

    let sources = vec!["Approximate (from IP address)", "Fixed coordinates"];
    let start = match cfg.location.mode {
        LocationMode::Ip => 0,
        LocationMode::Fixed => 1,
    };
    let source = Select::new("Location source:", sources).with_starting_cursor(start).raw_prompt()?;

    if source.index == 0 {
        cfg.location.mode = LocationMode::Ip;
    } else {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please type a decimal number")
            .prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please type a decimal number")
            .prompt()?;

        let coordinates = Coordinates::new(latitude, longitude);
        if !coordinates.is_valid() {
            bail!("Coordinates out of range: {coordinates}");
        }
        cfg.set_fixed_location(coordinates);
    }

    Ok(cfg)
}

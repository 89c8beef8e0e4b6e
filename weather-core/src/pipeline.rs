//! Location-to-weather pipeline: permission, coordinates, fetch, store.

use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    error::{LocationError, PipelineError},
    location::GeolocationProvider,
    model::UnitSystem,
    provider::WeatherProvider,
    store::{Completion, SharedStore},
};

/// Runs one full fetch cycle per [`WeatherPipeline::run`] call. A retry is
/// simply another `run`, starting again from the permission step.
#[derive(Debug, Clone)]
pub struct WeatherPipeline {
    location: Arc<dyn GeolocationProvider>,
    provider: Arc<dyn WeatherProvider>,
    units: UnitSystem,
    store: SharedStore,
}

impl WeatherPipeline {
    pub fn new(
        location: Arc<dyn GeolocationProvider>,
        provider: Arc<dyn WeatherProvider>,
        units: UnitSystem,
        store: SharedStore,
    ) -> Self {
        Self { location, provider, units, store }
    }

    pub fn store(&self) -> SharedStore {
        Arc::clone(&self.store)
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    /// Resolve the location, fetch weather for it and record the outcome.
    ///
    /// Every failure is written to the store before it is returned. The
    /// `Completion` tells whether this run's result was the one kept.
    pub async fn run(&self) -> Result<Completion, PipelineError> {
        // The store lock is only held for these synchronous calls.
        let token = self.store.lock().begin_fetch();

        if !self.location.request_permission().await {
            let err = LocationError::PermissionDenied;
            warn!("location permission denied; skipping weather fetch");
            self.store.lock().fail_location(token, &err);
            return Err(err.into());
        }

        let coordinates = match self.location.current_coordinates().await {
            Ok(c) => c,
            Err(err) => {
                warn!(error = %err, "failed to resolve location");
                self.store.lock().fail_location(token, &err);
                return Err(err.into());
            }
        };

        info!(%coordinates, units = %self.units, "fetching weather");

        match self.provider.fetch_weather(&coordinates, self.units).await {
            Ok(snapshot) => {
                let completion = self.store.lock().complete(token, Ok(snapshot));
                Ok(completion)
            }
            Err(err) => {
                warn!(error = %err, endpoint = %err.endpoint(), "weather fetch failed");
                self.store.lock().complete(token, Err(&err));
                Err(err.into())
            }
        }
    }
}

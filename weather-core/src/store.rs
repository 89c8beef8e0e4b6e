//! Weather fetch state machine (idle -> loading -> succeeded | failed).
//!
//! Every fetch is fenced by a [`RequestToken`]; only the completion carrying
//! the most recently issued token is applied.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

use crate::{
    error::{FetchError, LocationError},
    model::WeatherSnapshot,
};

pub const LOCATION_ERROR_TEXT: &str = "Failed to get location";
pub const WEATHER_ERROR_TEXT: &str = "Failed to fetch weather data";

/// Store shared between the pipeline and whoever renders it.
pub type SharedStore = Arc<Mutex<WeatherStore>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl FetchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStatus::Idle => "idle",
            FetchStatus::Loading => "loading",
            FetchStatus::Succeeded => "succeeded",
            FetchStatus::Failed => "failed",
        }
    }
}

/// Which error flags a failure sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorFlagPolicy {
    /// Only the flag of the failing step.
    #[default]
    PerSource,
    /// Both flags on any failure.
    Coupled,
}

/// Identifies one fetch; strictly increasing per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer fetch was started (or the store was reset) in the meantime.
    Superseded,
}

#[derive(Debug, Default)]
pub struct WeatherStore {
    status: FetchStatus,
    snapshot: Option<WeatherSnapshot>,
    error: Option<String>,
    location_error: Option<String>,
    weather_error: Option<String>,
    policy: ErrorFlagPolicy,
    issued: u64,
}

impl WeatherStore {
    pub fn new(policy: ErrorFlagPolicy) -> Self {
        Self { policy, ..Self::default() }
    }

    pub fn shared(policy: ErrorFlagPolicy) -> SharedStore {
        Arc::new(Mutex::new(Self::new(policy)))
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    /// Latest snapshot. Kept while a refetch is loading or after it failed.
    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn location_error(&self) -> Option<&str> {
        self.location_error.as_deref()
    }

    pub fn weather_error(&self) -> Option<&str> {
        self.weather_error.as_deref()
    }

    pub fn policy(&self) -> ErrorFlagPolicy {
        self.policy
    }

    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    /// Enter `Loading` and issue the token the completion must carry.
    pub fn begin_fetch(&mut self) -> RequestToken {
        self.issued += 1;
        self.status = FetchStatus::Loading;
        self.error = None;
        self.location_error = None;
        self.weather_error = None;
        RequestToken(self.issued)
    }

    fn is_current(&self, token: RequestToken) -> bool {
        self.status == FetchStatus::Loading && token.0 == self.issued
    }

    pub fn complete(
        &mut self,
        token: RequestToken,
        result: Result<WeatherSnapshot, &FetchError>,
    ) -> Completion {
        if !self.is_current(token) {
            debug!(?token, latest = self.issued, "dropping superseded weather result");
            return Completion::Superseded;
        }

        match result {
            Ok(snapshot) => {
                self.status = FetchStatus::Succeeded;
                self.snapshot = Some(snapshot);
            }
            Err(err) => {
                self.status = FetchStatus::Failed;
                self.error = Some(err.user_message());
                self.weather_error = Some(WEATHER_ERROR_TEXT.to_string());
                if self.policy == ErrorFlagPolicy::Coupled {
                    self.location_error = Some(LOCATION_ERROR_TEXT.to_string());
                }
            }
        }

        Completion::Applied
    }

    pub fn fail_location(&mut self, token: RequestToken, err: &LocationError) -> Completion {
        if !self.is_current(token) {
            debug!(?token, latest = self.issued, "dropping superseded location failure");
            return Completion::Superseded;
        }

        self.status = FetchStatus::Failed;
        self.error = Some(err.user_message());
        self.location_error = Some(LOCATION_ERROR_TEXT.to_string());
        if self.policy == ErrorFlagPolicy::Coupled {
            self.weather_error = Some(WEATHER_ERROR_TEXT.to_string());
        }

        Completion::Applied
    }

    /// Back to `Idle` with no data. Tokens issued before the reset are superseded.
    pub fn reset(&mut self) {
        self.status = FetchStatus::Idle;
        self.snapshot = None;
        self.error = None;
        self.location_error = None;
        self.weather_error = None;
        // Keep the counter so outstanding tokens stay stale.
        self.issued += 1;
    }
}

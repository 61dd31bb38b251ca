//! Error types for fetching weather and resolving the user's position.
//!
//! Both enums keep the full cause for logging, while `user_message()` gives
//! the single static string shown in the view.

use thiserror::Error;

/// Shown in place of the weather display after any failed fetch.
pub const FETCH_ERROR_MESSAGE: &str = "City not found. Please try again.";

pub const LOCATE_ERROR_MESSAGE: &str =
    "Unable to fetch location. Please ensure location permissions are enabled.";

pub const LOCATE_UNSUPPORTED_MESSAGE: &str = "Geolocation is not supported by your device";

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response contained no weather conditions")]
    EmptyConditions,
}

impl WeatherError {
    /// Every fetch failure looks the same to the user.
    pub fn user_message(&self) -> &'static str {
        FETCH_ERROR_MESSAGE
    }
}

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("no position source is available")]
    Unsupported,

    #[error("location permission denied")]
    PermissionDenied,

    #[error("position lookup failed: {0}")]
    Unavailable(String),

    #[error("position request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("location name lookup failed: {0}")]
    Weather(#[from] WeatherError),

    #[error("weather response did not include a location name")]
    MissingName,
}

impl LocateError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LocateError::Unsupported => LOCATE_UNSUPPORTED_MESSAGE,
            _ => LOCATE_ERROR_MESSAGE,
        }
    }
}

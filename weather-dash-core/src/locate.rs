//! "Use my location": find the device position, then ask the weather API
//! which place that is.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{error::LocateError, model::Coordinates, provider::WeatherSource};

pub const DEFAULT_IP_LOOKUP_URL: &str = "http://ip-api.com/json";

#[async_trait]
pub trait PositionSource: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, LocateError>;
}

/// Approximate position from the public IP address.
#[derive(Debug, Clone)]
pub struct IpPositionSource {
    url: String,
    http: Client,
}

impl IpPositionSource {
    pub fn new() -> Self {
        Self::with_url(DEFAULT_IP_LOOKUP_URL)
    }

    pub fn with_url(url: &str) -> Self {
        Self { url: url.to_string(), http: Client::new() }
    }
}

impl Default for IpPositionSource {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[async_trait]
impl PositionSource for IpPositionSource {
    async fn current_position(&self) -> Result<Coordinates, LocateError> {
        let res = self.http.get(&self.url).send().await?;

        if !res.status().is_success() {
            return Err(LocateError::Unavailable(format!(
                "lookup returned status {}",
                res.status()
            )));
        }

        let body: IpLookupResponse = res.json().await?;

        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(latitude), Some(longitude)) => Ok(Coordinates { latitude, longitude }),
            _ => Err(LocateError::Unavailable(
                body.message.unwrap_or_else(|| format!("lookup status '{}'", body.status)),
            )),
        }
    }
}

/// Coordinates supplied by the user, e.g. from the config file.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

#[async_trait]
impl PositionSource for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates, LocateError> {
        Ok(self.0)
    }
}

/// Used when location lookup is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPosition;

#[async_trait]
impl PositionSource for NoPosition {
    async fn current_position(&self) -> Result<Coordinates, LocateError> {
        Err(LocateError::Unsupported)
    }
}

/// Resolve the current position to a city name usable as a search query.
pub async fn resolve_city(
    positions: &dyn PositionSource,
    weather: &dyn WeatherSource,
) -> Result<String, LocateError> {
    let coords = positions.current_position().await?;
    tracing::debug!(lat = coords.latitude, lon = coords.longitude, "resolved position");

    let name = weather.fetch_location_name(&coords).await?.ok_or(LocateError::MissingName)?;
    tracing::debug!(%name, "resolved location name");

    Ok(name)
}

use crate::{
    error::WeatherError,
    model::{Coordinates, ForecastEntry, LocationQuery, Units, WeatherBundle, WeatherSnapshot},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// The remote weather API. `OpenWeatherClient` is the only production
/// implementation; tests substitute their own.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_current(
        &self,
        query: &LocationQuery,
        units: Units,
    ) -> Result<WeatherSnapshot, WeatherError>;

    async fn fetch_forecast(
        &self,
        query: &LocationQuery,
        units: Units,
    ) -> Result<Vec<ForecastEntry>, WeatherError>;

    /// Name of the place at `coords`, or `None` when the API does not report one.
    async fn fetch_location_name(
        &self,
        coords: &Coordinates,
    ) -> Result<Option<String>, WeatherError>;
}

/// Fetch current conditions and the forecast concurrently. Either failing
/// fails the whole call and nothing from the other half is kept.
pub async fn fetch_bundle(
    source: &dyn WeatherSource,
    query: &LocationQuery,
    units: Units,
) -> Result<WeatherBundle, WeatherError> {
    tracing::debug!(%query, %units, "fetching current conditions and forecast");

    let (snapshot, forecast) = tokio::try_join!(
        source.fetch_current(query, units),
        source.fetch_forecast(query, units),
    )?;

    Ok(WeatherBundle { snapshot, forecast })
}

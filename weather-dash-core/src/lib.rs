//! Core library for the `weather-dash` terminal client.
//!
//! This crate defines:
//! - Configuration handling
//! - The OpenWeather client behind the `WeatherSource` trait
//! - Forecast sampling, city search and position lookup
//! - Page state, its update cycle and the text renderer
//!
//! It is used by `weather-dash-cli`, but can also be reused by other front ends.

pub mod app;
pub mod cities;
pub mod config;
pub mod error;
pub mod locate;
pub mod model;
pub mod provider;
pub mod sampler;
pub mod view;

pub use app::{Action, AppState, Effect};
pub use cities::CityDirectory;
pub use config::Config;
pub use error::{LocateError, WeatherError};
pub use model::{CityEntry, Coordinates, ForecastEntry, LocationQuery, Units, WeatherBundle, WeatherSnapshot};
pub use provider::{OpenWeatherClient, WeatherSource};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Select, Text};
use weather_dash_core::{
    Action, AppState, CityDirectory, Config, OpenWeatherClient, Units,
    app::dispatch,
    locate::{FixedPosition, IpPositionSource, PositionSource},
    view,
};

use crate::interactive;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dash", version, about = "Current weather and 5-day forecast")]
pub struct Cli {
    /// OpenWeather API key; overrides the config file.
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Runs the interactive page when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and startup defaults.
    Configure,

    /// Print the page once and exit.
    Show {
        /// City name; the configured default when absent.
        city: Option<String>,

        /// "metric" (°C) or "imperial" (°F).
        #[arg(long)]
        units: Option<String>,

        /// Look up the city from the current position.
        #[arg(long, conflicts_with = "city")]
        here: bool,
    },

    /// Search the bundled city list.
    Cities {
        #[arg(default_value = "")]
        query: String,
    },

    /// Interactive page with search, location and unit toggle.
    Interactive {
        #[arg(long)]
        units: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        tracing::debug!(
            path = ?Config::config_file_path().ok(),
            base_url = config.base_url.as_deref().unwrap_or("default"),
            "loaded configuration"
        );
        if let Some(key) = self.api_key {
            tracing::debug!("using API key from command line or environment");
            config.api_key = Some(key);
        }

        match self.command {
            Some(Command::Configure) => configure(config),
            Some(Command::Cities { query }) => {
                let cities = CityDirectory::bundled().context("Failed to load bundled city list")?;
                for city in cities.search(&query) {
                    println!("{city}");
                }
                Ok(())
            }
            Some(Command::Show { city, units, here }) => {
                let units = resolve_units(units.as_deref(), &config)?;
                let city = city.unwrap_or_else(|| config.startup_city().to_string());
                show(&config, AppState::new(city, units), here).await
            }
            Some(Command::Interactive { units }) => {
                let units = resolve_units(units.as_deref(), &config)?;
                start_interactive(&config, units).await
            }
            None => {
                let units = config.units;
                start_interactive(&config, units).await
            }
        }
    }
}

fn resolve_units(flag: Option<&str>, config: &Config) -> anyhow::Result<Units> {
    match flag {
        Some(value) => Units::try_from(value),
        None => Ok(config.units),
    }
}

fn weather_client(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    let api_key = config.require_api_key()?.to_owned();

    Ok(match config.base_url.as_deref() {
        Some(base_url) => OpenWeatherClient::with_base_url(api_key, base_url),
        None => OpenWeatherClient::new(api_key),
    })
}

fn position_source(config: &Config) -> Box<dyn PositionSource> {
    match config.fixed_position() {
        Some(coords) => Box::new(FixedPosition(coords)),
        None => Box::new(IpPositionSource::new()),
    }
}

async fn show(config: &Config, mut state: AppState, here: bool) -> anyhow::Result<()> {
    let client = weather_client(config)?;
    let positions = position_source(config);
    let cities = CityDirectory::bundled().context("Failed to load bundled city list")?;

    let action = if here { Action::Locate } else { Action::Refresh };
    tracing::debug!(city = %state.selected_city, units = %state.units, here, "rendering once");
    dispatch(&mut state, action, &client, positions.as_ref()).await;

    if let Some(alert) = state.alert.take() {
        bail!("{alert}");
    }
    if state.display.is_none() {
        bail!("{}", state.error_message);
    }

    print!("{}", view::render(&state, chrono::Local::now(), &cities));
    Ok(())
}

async fn start_interactive(config: &Config, units: Units) -> anyhow::Result<()> {
    let client = weather_client(config)?;
    let positions = position_source(config);
    let cities = CityDirectory::bundled().context("Failed to load bundled city list")?;
    let state = AppState::new(config.startup_city(), units);

    interactive::run(state, &client, positions.as_ref(), &cities).await
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let mut key_prompt = Text::new("OpenWeather API key:");
    if let Some(existing) = config.api_key.as_deref() {
        key_prompt = key_prompt.with_default(existing);
    }
    let api_key = key_prompt.prompt()?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    let city = Text::new("Default city:").with_default(config.startup_city()).prompt()?;

    let starting_cursor = Units::all().iter().position(|u| *u == config.units).unwrap_or(0);
    let units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(starting_cursor)
        .prompt()?;

    config.api_key = Some(api_key.trim().to_string());
    config.default_city = Some(city.trim().to_string());
    config.units = units;

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

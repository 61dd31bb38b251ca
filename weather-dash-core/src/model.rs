use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit system sent to the API and used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Value of the `units` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    /// OpenWeather reports wind in m/s for metric and mph for imperial.
    pub fn wind_unit(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }

    pub fn is_celsius(&self) -> bool {
        matches!(self, Units::Metric)
    }

    pub fn toggled(&self) -> Self {
        match self {
            Units::Metric => Units::Imperial,
            Units::Imperial => Units::Metric,
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial]
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.trim().to_lowercase();

        match lower.as_str() {
            "metric" | "celsius" | "c" => Ok(Units::Metric),
            "imperial" | "fahrenheit" | "f" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric (°C), imperial (°F)."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// What to ask the weather API about.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coords(Coordinates),
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::City(name) => f.write_str(name),
            LocationQuery::Coords(c) => write!(f, "{:.4}, {:.4}", c.latitude, c.longitude),
        }
    }
}

/// Current conditions for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub icon_code: String,
    pub condition_main: String,
    pub temperature: f64,
    pub humidity_pct: u8,
    pub pressure: f64,
    pub wind_speed: f64,
    pub wind_direction_deg: f64,
    pub visibility_m: f64,
    pub location_name: String,
}

/// One 3-hour forecast sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Unix epoch seconds.
    pub timestamp: i64,
    pub icon_code: String,
    pub description: String,
    pub temp_max: f64,
    pub temp_min: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityEntry {
    pub name: String,
    pub country: String,
}

impl fmt::Display for CityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.name, self.country)
    }
}

/// Snapshot and raw forecast from the same fetch. They are only ever
/// displayed together.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherBundle {
    pub snapshot: WeatherSnapshot,
    pub forecast: Vec<ForecastEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_as_str_roundtrip() {
        for units in Units::all() {
            let parsed = Units::try_from(units.as_param()).expect("roundtrip should succeed");
            assert_eq!(*units, parsed);
        }
    }

    #[test]
    fn units_accept_temperature_names() {
        assert_eq!(Units::try_from("Celsius").unwrap(), Units::Metric);
        assert_eq!(Units::try_from(" F ").unwrap(), Units::Imperial);
    }

    #[test]
    fn unknown_units_error() {
        let err = Units::try_from("kelvin").unwrap_err();
        assert!(err.to_string().contains("Unknown unit system"));
    }

    #[test]
    fn toggle_flips_symbol() {
        assert_eq!(Units::Metric.symbol(), "°C");
        assert_eq!(Units::Metric.toggled().symbol(), "°F");
        assert_eq!(Units::Imperial.toggled(), Units::Metric);
        assert!(Units::default().is_celsius());
    }

    #[test]
    fn city_entry_display() {
        let city = CityEntry { name: "London".into(), country: "GB".into() };
        assert_eq!(city.to_string(), "London, GB");
    }
}

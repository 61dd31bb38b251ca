use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    error::WeatherError,
    model::{Coordinates, ForecastEntry, LocationQuery, Units, WeatherSnapshot},
};

use super::WeatherSource;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

const CURRENT_ENDPOINT: &str = "weather";
const FORECAST_ENDPOINT: &str = "forecast";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        params: &[(&'static str, String)],
    ) -> Result<T, WeatherError> {
        let res = self.http.get(self.endpoint_url(endpoint)).query(params).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::Status {
                endpoint,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Query parameters for either endpoint. `units` is omitted when `None`,
/// which makes the API answer in Kelvin.
pub fn request_params(
    query: &LocationQuery,
    units: Option<Units>,
    api_key: &str,
) -> Vec<(&'static str, String)> {
    let mut params = match query {
        LocationQuery::City(name) => vec![("q", name.clone())],
        LocationQuery::Coords(c) => {
            vec![("lat", c.latitude.to_string()), ("lon", c.longitude.to_string())]
        }
    };

    params.push(("appid", api_key.to_string()));

    if let Some(units) = units {
        params.push(("units", units.as_param().to_string()));
    }

    params
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    icon: String,
    #[serde(default)]
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwCondition>,
    wind: OwWind,
    visibility: f64,
}

#[derive(Debug, Deserialize)]
struct OwTempRange {
    temp_max: f64,
    temp_min: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwTempRange,
    weather: Vec<OwCondition>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwNameOnly {
    #[serde(default)]
    name: Option<String>,
}

impl TryFrom<OwCurrentResponse> for WeatherSnapshot {
    type Error = WeatherError;

    fn try_from(parsed: OwCurrentResponse) -> Result<Self, Self::Error> {
        let condition = parsed.weather.into_iter().next().ok_or(WeatherError::EmptyConditions)?;

        Ok(WeatherSnapshot {
            icon_code: condition.icon,
            condition_main: condition.main,
            temperature: parsed.main.temp,
            humidity_pct: parsed.main.humidity,
            pressure: parsed.main.pressure,
            wind_speed: parsed.wind.speed,
            wind_direction_deg: parsed.wind.deg,
            visibility_m: parsed.visibility,
            location_name: parsed.name,
        })
    }
}

impl TryFrom<OwForecastEntry> for ForecastEntry {
    type Error = WeatherError;

    fn try_from(entry: OwForecastEntry) -> Result<Self, Self::Error> {
        let condition = entry.weather.into_iter().next().ok_or(WeatherError::EmptyConditions)?;

        Ok(ForecastEntry {
            timestamp: entry.dt,
            icon_code: condition.icon,
            description: condition.description,
            temp_max: entry.main.temp_max,
            temp_min: entry.main.temp_min,
        })
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn fetch_current(
        &self,
        query: &LocationQuery,
        units: Units,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let params = request_params(query, Some(units), &self.api_key);
        let parsed: OwCurrentResponse = self.get_json(CURRENT_ENDPOINT, &params).await?;
        parsed.try_into()
    }

    async fn fetch_forecast(
        &self,
        query: &LocationQuery,
        units: Units,
    ) -> Result<Vec<ForecastEntry>, WeatherError> {
        let params = request_params(query, Some(units), &self.api_key);
        let parsed: OwForecastResponse = self.get_json(FORECAST_ENDPOINT, &params).await?;
        parsed.list.into_iter().map(ForecastEntry::try_from).collect()
    }

    async fn fetch_location_name(
        &self,
        coords: &Coordinates,
    ) -> Result<Option<String>, WeatherError> {
        let params = request_params(&LocationQuery::Coords(*coords), None, &self.api_key);
        let parsed: OwNameOnly = self.get_json(CURRENT_ENDPOINT, &params).await?;
        Ok(parsed.name.filter(|name| !name.trim().is_empty()))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn current_body() -> serde_json::Value {
        json!({
            "weather": [{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }],
            "main": { "temp": 18.6, "feels_like": 18.0, "humidity": 72, "pressure": 1013 },
            "visibility": 9000,
            "wind": { "speed": 4.12, "deg": 200 },
            "dt": 1760745600,
            "name": "Lima"
        })
    }

    fn forecast_body(n: usize) -> serde_json::Value {
        let list: Vec<_> = (0..n)
            .map(|i| {
                json!({
                    "dt": 1760745600 + i * 10800,
                    "main": { "temp": 17.0, "temp_max": 19.2, "temp_min": 15.8, "humidity": 70 },
                    "weather": [{ "main": "Clouds", "description": "few clouds", "icon": "02d" }]
                })
            })
            .collect();
        json!({ "cod": "200", "cnt": n, "list": list, "city": { "name": "Lima", "country": "PE" } })
    }

    #[test]
    fn city_params_include_units_and_key() {
        let params = request_params(&LocationQuery::City("São Paulo".into()), Some(Units::Imperial), "KEY");
        assert_eq!(
            params,
            vec![
                ("q", "São Paulo".to_string()),
                ("appid", "KEY".to_string()),
                ("units", "imperial".to_string()),
            ]
        );
    }

    #[test]
    fn coordinate_params_without_units() {
        let coords = Coordinates { latitude: -12.05, longitude: -77.04 };
        let params = request_params(&LocationQuery::Coords(coords), None, "KEY");
        assert_eq!(
            params,
            vec![
                ("lat", "-12.05".to_string()),
                ("lon", "-77.04".to_string()),
                ("appid", "KEY".to_string()),
            ]
        );
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let out = truncate_body(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }

    #[tokio::test]
    async fn fetch_current_maps_snapshot() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Lima"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "KEY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .mount(&server)
            .await;

        let client = OpenWeatherClient::with_base_url("KEY".into(), &server.uri());
        let snapshot = client
            .fetch_current(&LocationQuery::City("Lima".into()), Units::Metric)
            .await
            .unwrap();

        assert_eq!(snapshot.icon_code, "01d");
        assert_eq!(snapshot.condition_main, "Clear");
        assert_eq!(snapshot.temperature, 18.6);
        assert_eq!(snapshot.humidity_pct, 72);
        assert_eq!(snapshot.pressure, 1013.0);
        assert_eq!(snapshot.wind_speed, 4.12);
        assert_eq!(snapshot.wind_direction_deg, 200.0);
        assert_eq!(snapshot.visibility_m, 9000.0);
        assert_eq!(snapshot.location_name, "Lima");
    }

    #[tokio::test]
    async fn fetch_forecast_keeps_every_entry_in_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("units", "imperial"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(40)))
            .mount(&server)
            .await;

        let client = OpenWeatherClient::with_base_url("KEY".into(), &server.uri());
        let list = client
            .fetch_forecast(&LocationQuery::City("Lima".into()), Units::Imperial)
            .await
            .unwrap();

        assert_eq!(list.len(), 40);
        assert_eq!(list[0].timestamp, 1760745600);
        assert_eq!(list[39].timestamp, 1760745600 + 39 * 10800);
        assert_eq!(list[0].description, "few clouds");
        assert_eq!(list[0].temp_max, 19.2);
    }

    #[tokio::test]
    async fn not_found_status_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "cod": "404", "message": "city not found" })),
            )
            .mount(&server)
            .await;

        let client = OpenWeatherClient::with_base_url("KEY".into(), &server.uri());
        let err = client
            .fetch_current(&LocationQuery::City("Atlantis".into()), Units::Metric)
            .await
            .unwrap_err();

        match err {
            WeatherError::Status { endpoint, status, body } => {
                assert_eq!(endpoint, "weather");
                assert_eq!(status, 404);
                assert!(body.contains("city not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = OpenWeatherClient::with_base_url("KEY".into(), &server.uri());
        let err = client
            .fetch_forecast(&LocationQuery::City("Lima".into()), Units::Metric)
            .await
            .unwrap_err();

        assert!(matches!(err, WeatherError::Parse(_)));
    }

    #[tokio::test]
    async fn empty_weather_array_is_rejected() {
        let server = MockServer::start().await;
        let mut body = current_body();
        body["weather"] = json!([]);

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = OpenWeatherClient::with_base_url("KEY".into(), &server.uri());
        let err = client
            .fetch_current(&LocationQuery::City("Lima".into()), Units::Metric)
            .await
            .unwrap_err();

        assert!(matches!(err, WeatherError::EmptyConditions));
    }

    #[tokio::test]
    async fn location_name_by_coordinates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("lat", "51.5"))
            .and(query_param("lon", "-0.12"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "London" })))
            .mount(&server)
            .await;

        let client = OpenWeatherClient::with_base_url("KEY".into(), &server.uri());
        let coords = Coordinates { latitude: 51.5, longitude: -0.12 };
        let name = client.fetch_location_name(&coords).await.unwrap();

        assert_eq!(name.as_deref(), Some("London"));
    }

    #[tokio::test]
    async fn blank_location_name_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "" })))
            .mount(&server)
            .await;

        let client = OpenWeatherClient::with_base_url("KEY".into(), &server.uri());
        let coords = Coordinates { latitude: 0.0, longitude: 0.0 };

        assert_eq!(client.fetch_location_name(&coords).await.unwrap(), None);
    }
}

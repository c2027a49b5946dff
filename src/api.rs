//! HTTP clients for the cities dataset and the current-weather API

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::notify::ErrorCategory;
use crate::pagination::PAGE_SIZE;
use crate::state::{City, Coordinates, UnitSystem, WeatherRequest, WeatherSnapshot};

pub const DEFAULT_CITIES_URL: &str = "https://public.opendatasoft.com/api/explore/v2.1/catalog/datasets/geonames-all-cities-with-a-population-1000/records";
pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather?";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub const MISSING_CITY_MESSAGE: &str = "City information is missing.";

// ============================================================================
// Errors
// ============================================================================

/// Failure of one request, classified by where it broke.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum FetchError {
    #[error("API Error: {message}")]
    Api { status: u16, message: String },
    #[error("Network Error: unable to reach the API. Please check your connection.")]
    Network(String),
    #[error("Error: {0}")]
    Request(String),
}

impl FetchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FetchError::Api { .. } => ErrorCategory::Api,
            FetchError::Network(_) => ErrorCategory::Network,
            FetchError::Request(_) => ErrorCategory::Request,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_builder() {
            FetchError::Request(error.to_string())
        } else if let Some(status) = error.status() {
            FetchError::Api {
                status: status.as_u16(),
                message: error.to_string(),
            }
        } else if error.is_decode() {
            FetchError::Api {
                status: StatusCode::OK.as_u16(),
                message: format!("invalid response body: {error}"),
            }
        } else {
            FetchError::Network(error.to_string())
        }
    }
}

/// Error payload shape shared by both APIs
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

// ============================================================================
// Configuration + client
// ============================================================================

#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Cities endpoint; `limit` and `offset` are appended
    pub cities_url: String,
    /// Weather endpoint prefix; `q`, `appid` and `units` are appended
    pub weather_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cities_url: DEFAULT_CITIES_URL.to_string(),
            weather_url: DEFAULT_WEATHER_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Fetch one page of `PAGE_SIZE` cities starting at `offset`.
    pub async fn fetch_cities_page(&self, offset: usize) -> Result<Vec<City>, FetchError> {
        let url = cities_page_url(&self.config.cities_url, offset);
        tracing::debug!(offset, "requesting cities page");
        let data: CitiesResponse = self.get_json(&url).await?;
        data.results.into_iter().map(City::try_from).collect()
    }

    /// Fetch current conditions for a city name. A blank name is refused
    /// without touching the network.
    pub async fn fetch_weather(
        &self,
        request: &WeatherRequest,
    ) -> Result<WeatherSnapshot, FetchError> {
        let city = request.city.trim();
        if city.is_empty() {
            return Err(FetchError::Request(MISSING_CITY_MESSAGE.to_string()));
        }
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| FetchError::Request("weather API key is not configured".into()))?;

        let url = weather_url(&self.config.weather_url, city, api_key, request.units);
        tracing::debug!(city, units = %request.units, "requesting weather");
        let data: WeatherResponse = self.get_json(&url).await?;
        Ok(data.into_snapshot(request.units))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let message = if status.is_success() {
                format!("Received status code {}", status.as_u16())
            } else {
                response
                    .json::<ErrorBody>()
                    .await
                    .ok()
                    .and_then(|body| body.message)
                    .unwrap_or_else(|| "Something went wrong!".to_string())
            };
            return Err(FetchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

/// Append a query string to a base URL that may already carry one.
fn join_query(base: &str, query: &str) -> String {
    if base.ends_with('?') || base.ends_with('&') {
        format!("{base}{query}")
    } else if base.contains('?') {
        format!("{base}&{query}")
    } else {
        format!("{base}?{query}")
    }
}

pub fn cities_page_url(base: &str, offset: usize) -> String {
    join_query(base, &format!("limit={PAGE_SIZE}&offset={offset}"))
}

pub fn weather_url(base: &str, city: &str, api_key: &str, units: UnitSystem) -> String {
    join_query(
        base,
        &format!(
            "q={}&appid={}&units={}",
            urlencoding::encode(city),
            urlencoding::encode(api_key),
            units.as_param()
        ),
    )
}

// ============================================================================
// Cities dataset
// ============================================================================

#[derive(Debug, Deserialize)]
struct CitiesResponse {
    results: Vec<CityRecord>,
}

/// The dataset serves ids as strings; numbers are accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeonameId {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct CityRecord {
    geoname_id: GeonameId,
    name: String,
    cou_name_en: Option<String>,
    population: Option<u64>,
    timezone: Option<String>,
    coordinates: Option<Coordinates>,
}

impl TryFrom<CityRecord> for City {
    type Error = FetchError;

    fn try_from(record: CityRecord) -> Result<Self, Self::Error> {
        let id = match record.geoname_id {
            GeonameId::Number(id) => id,
            GeonameId::Text(text) => text.trim().parse().map_err(|_| FetchError::Api {
                status: StatusCode::OK.as_u16(),
                message: format!("invalid geoname id {text:?} for {}", record.name),
            })?,
        };
        Ok(City {
            id,
            name: record.name,
            country: record.cou_name_en.unwrap_or_default(),
            population: record.population.unwrap_or_default(),
            timezone: record.timezone.unwrap_or_default(),
            coordinates: record.coordinates,
        })
    }
}

// ============================================================================
// Weather API
// ============================================================================

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    name: String,
    #[serde(default)]
    weather: Vec<ConditionEntry>,
    main: MainReadings,
    wind: Wind,
    #[serde(default)]
    clouds: Clouds,
    sys: Sys,
    coord: Coordinates,
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct ConditionEntry {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f32,
    feels_like: f32,
    temp_min: f32,
    temp_max: f32,
    pressure: u32,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: f32,
    #[serde(default)]
    deg: u16,
    gust: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct Clouds {
    all: u8,
}

#[derive(Debug, Deserialize)]
struct Sys {
    country: Option<String>,
    sunrise: i64,
    sunset: i64,
}

impl WeatherResponse {
    fn into_snapshot(self, units: UnitSystem) -> WeatherSnapshot {
        let (condition, description) = self
            .weather
            .into_iter()
            .next()
            .map(|entry| (entry.main, entry.description))
            .unwrap_or_else(|| ("Unknown".to_string(), String::new()));

        WeatherSnapshot {
            city: self.name,
            country: self.sys.country.unwrap_or_default(),
            condition,
            description,
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            temp_min: self.main.temp_min,
            temp_max: self.main.temp_max,
            pressure: self.main.pressure,
            humidity: self.main.humidity,
            wind_speed: self.wind.speed,
            wind_deg: self.wind.deg,
            wind_gust: self.wind.gust,
            cloudiness: self.clouds.all,
            sunrise: self.sys.sunrise,
            sunset: self.sys.sunset,
            timezone_offset: self.timezone,
            coordinates: self.coord,
            units,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cities_page_url_separator() {
        assert_eq!(
            cities_page_url("https://x.test/records", 40),
            "https://x.test/records?limit=20&offset=40"
        );
        assert_eq!(
            cities_page_url("https://x.test/records?order_by=name", 0),
            "https://x.test/records?order_by=name&limit=20&offset=0"
        );
    }

    #[test]
    fn test_weather_url_encodes_city() {
        assert_eq!(
            weather_url(DEFAULT_WEATHER_URL, "São Paulo", "k3y", UnitSystem::Imperial),
            "https://api.openweathermap.org/data/2.5/weather?q=S%C3%A3o%20Paulo&appid=k3y&units=imperial"
        );
    }

    #[test]
    fn test_city_record_accepts_string_ids() {
        let json = r#"{"results": [
            {"geoname_id": "2988507", "name": "Paris", "cou_name_en": "France",
             "population": 2138551, "timezone": "Europe/Paris",
             "coordinates": {"lon": 2.3488, "lat": 48.85341}},
            {"geoname_id": 2950159, "name": "Berlin", "cou_name_en": null,
             "population": null, "timezone": null}
        ]}"#;
        let data: CitiesResponse = serde_json::from_str(json).unwrap();
        let cities: Vec<City> = data
            .results
            .into_iter()
            .map(City::try_from)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(cities[0].id, 2988507);
        assert_eq!(cities[0].country, "France");
        assert_eq!(cities[0].coordinates.map(|c| c.lat), Some(48.85341));
        assert_eq!(cities[1].id, 2950159);
        assert_eq!(cities[1].population, 0);
        assert_eq!(cities[1].country, "");
    }

    #[test]
    fn test_bad_geoname_id_is_an_api_error() {
        let record = CityRecord {
            geoname_id: GeonameId::Text("n/a".into()),
            name: "Nowhere".into(),
            cou_name_en: None,
            population: None,
            timezone: None,
            coordinates: None,
        };
        let err = City::try_from(record).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Api);
    }

    #[test]
    fn test_weather_response_into_snapshot() {
        let json = r#"{
            "coord": {"lon": 2.35, "lat": 48.85},
            "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
            "main": {"temp": 11.2, "feels_like": 10.4, "temp_min": 9.9, "temp_max": 12.6,
                     "pressure": 1012, "humidity": 81},
            "wind": {"speed": 4.6, "deg": 230},
            "clouds": {"all": 75},
            "sys": {"country": "FR", "sunrise": 1700000000, "sunset": 1700030000},
            "timezone": 3600,
            "name": "Paris"
        }"#;
        let data: WeatherResponse = serde_json::from_str(json).unwrap();
        let snapshot = data.into_snapshot(UnitSystem::Metric);

        assert_eq!(snapshot.city, "Paris");
        assert_eq!(snapshot.country, "FR");
        assert_eq!(snapshot.condition, "Rain");
        assert_eq!(snapshot.description, "light rain");
        assert_eq!(snapshot.humidity, 81);
        assert_eq!(snapshot.wind_gust, None);
        assert_eq!(snapshot.cloudiness, 75);
        assert_eq!(snapshot.timezone_offset, 3600);
        assert_eq!(snapshot.units, UnitSystem::Metric);
    }

    #[test]
    fn test_error_messages_by_category() {
        let api = FetchError::Api {
            status: 404,
            message: "city not found".into(),
        };
        assert_eq!(api.to_string(), "API Error: city not found");
        assert_eq!(
            FetchError::Network("connection refused".into()).to_string(),
            "Network Error: unable to reach the API. Please check your connection."
        );
        assert_eq!(
            FetchError::Request("bad url".into()).to_string(),
            "Error: bad url"
        );
    }
}

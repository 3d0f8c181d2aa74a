//! Open-Meteo forecast API client
//!
//! Free, keyless API. Requests are made per city coordinate; responses are
//! reported in the Asia/Tokyo timezone since every supported city is in Japan.
//! See: https://open-meteo.com/en/docs

use crate::cities::City;
use crate::codes;
use crate::error::{Result, WeatherError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const TIMEZONE: &str = "Asia/Tokyo";

/// Longest forecast the live tool requests
pub const MAX_FORECAST_DAYS: u32 = 7;

/// Current conditions for one city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Observation time (local, ISO 8601 without offset)
    pub time: String,
    pub temperature_c: f64,
    pub humidity_percent: f64,
    pub weather_code: u8,
    pub wind_speed_kmh: f64,
}

impl CurrentWeather {
    pub fn condition(&self) -> String {
        codes::describe(self.weather_code)
    }
}

/// One day of a forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Date (YYYY-MM-DD)
    pub date: String,
    pub weather_code: Option<u8>,
    pub max_c: Option<f64>,
    pub min_c: Option<f64>,
    pub precipitation_probability: Option<f64>,
}

impl DailyForecast {
    pub fn condition(&self) -> String {
        self.weather_code
            .map_or_else(|| "Unknown".to_string(), codes::describe)
    }
}

/// Client for the Open-Meteo forecast endpoint
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

impl OpenMeteoClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("toolhost/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: OPEN_METEO_BASE_URL.to_string(),
        })
    }

    /// Use a different endpoint (self-hosted Open-Meteo, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Current temperature, humidity, weather code and wind speed
    #[instrument(skip(self), fields(city = city.name))]
    pub async fn current(&self, city: &City) -> Result<CurrentWeather> {
        let response: ForecastResponse = self
            .fetch(
                city,
                &[
                    (
                        "current",
                        "temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m"
                            .to_string(),
                    ),
                ],
            )
            .await?;
        parse_current(response)
    }

    /// Daily forecast for `days` days, clamped to `1..=7`
    #[instrument(skip(self), fields(city = city.name))]
    pub async fn forecast(&self, city: &City, days: u32) -> Result<Vec<DailyForecast>> {
        let days = clamp_days(i64::from(days), MAX_FORECAST_DAYS);
        let response: ForecastResponse = self
            .fetch(
                city,
                &[
                    (
                        "daily",
                        "weather_code,temperature_2m_max,temperature_2m_min,precipitation_probability_max"
                            .to_string(),
                    ),
                    ("forecast_days", days.to_string()),
                ],
            )
            .await?;
        parse_daily(response)
    }

    async fn fetch<T: DeserializeOwned>(&self, city: &City, extra: &[(&str, String)]) -> Result<T> {
        let mut query = vec![
            ("latitude", city.latitude.to_string()),
            ("longitude", city.longitude.to_string()),
            ("timezone", TIMEZONE.to_string()),
        ];
        query.extend(extra.iter().map(|(k, v)| (*k, v.clone())));

        debug!(base_url = %self.base_url, "Requesting Open-Meteo forecast");
        let response = self
            .client
            .get(format!("{}/forecast", self.base_url))
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.reason)
                .unwrap_or(body);
            return Err(WeatherError::Api {
                status: status.as_u16(),
                reason,
            });
        }

        response.json::<T>().await.map_err(|e| {
            WeatherError::UnexpectedResponse(format!("Failed to decode forecast: {e}"))
        })
    }
}

/// Clamp a requested day count into `1..=max`
pub fn clamp_days(days: i64, max: u32) -> u32 {
    u32::try_from(days.clamp(1, i64::from(max))).unwrap_or(1)
}

// Wire types

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    reason: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastResponse {
    #[serde(default)]
    current: Option<CurrentBlock>,
    #[serde(default)]
    daily: Option<DailyBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    time: String,
    temperature_2m: f64,
    relative_humidity_2m: f64,
    weather_code: u8,
    wind_speed_10m: f64,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<String>,
    weather_code: Vec<Option<u8>>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability_max: Vec<Option<f64>>,
}

pub(crate) fn parse_current(response: ForecastResponse) -> Result<CurrentWeather> {
    let current = response.current.ok_or_else(|| {
        WeatherError::UnexpectedResponse("missing 'current' block".to_string())
    })?;

    Ok(CurrentWeather {
        time: current.time,
        temperature_c: current.temperature_2m,
        humidity_percent: current.relative_humidity_2m,
        weather_code: current.weather_code,
        wind_speed_kmh: current.wind_speed_10m,
    })
}

pub(crate) fn parse_daily(response: ForecastResponse) -> Result<Vec<DailyForecast>> {
    let daily = response
        .daily
        .ok_or_else(|| WeatherError::UnexpectedResponse("missing 'daily' block".to_string()))?;

    let days = daily.time.len();
    if daily.weather_code.len() != days
        || daily.temperature_2m_max.len() != days
        || daily.temperature_2m_min.len() != days
    {
        return Err(WeatherError::UnexpectedResponse(
            "daily arrays have different lengths".to_string(),
        ));
    }

    Ok(daily
        .time
        .into_iter()
        .enumerate()
        .map(|(i, date)| DailyForecast {
            date,
            weather_code: daily.weather_code[i],
            max_c: daily.temperature_2m_max[i],
            min_c: daily.temperature_2m_min[i],
            precipitation_probability: daily
                .precipitation_probability_max
                .get(i)
                .copied()
                .flatten(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities::find_city;
    use serde_json::json;

    fn response(value: serde_json::Value) -> ForecastResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_current() {
        let current = parse_current(response(json!({
            "latitude": 35.7,
            "longitude": 139.6875,
            "timezone": "Asia/Tokyo",
            "current_units": {"temperature_2m": "°C"},
            "current": {
                "time": "2025-04-01T12:00",
                "interval": 900,
                "temperature_2m": 18.4,
                "relative_humidity_2m": 52,
                "weather_code": 2,
                "wind_speed_10m": 11.2
            }
        })))
        .unwrap();

        assert!((current.temperature_c - 18.4).abs() < f64::EPSILON);
        assert!((current.humidity_percent - 52.0).abs() < f64::EPSILON);
        assert_eq!(current.condition(), "Partly cloudy");
    }

    #[test]
    fn test_parse_current_missing_block() {
        assert!(matches!(
            parse_current(response(json!({"latitude": 1.0}))),
            Err(WeatherError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_parse_daily() {
        let days = parse_daily(response(json!({
            "daily": {
                "time": ["2025-04-01", "2025-04-02"],
                "weather_code": [61, null],
                "temperature_2m_max": [19.0, 21.5],
                "temperature_2m_min": [10.1, 12.0],
                "precipitation_probability_max": [80, null]
            }
        })))
        .unwrap();

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].condition(), "Slight rain");
        assert_eq!(days[0].precipitation_probability, Some(80.0));
        assert_eq!(days[1].condition(), "Unknown");
        assert_eq!(days[1].precipitation_probability, None);
    }

    #[test]
    fn test_parse_daily_mismatched_lengths() {
        let result = parse_daily(response(json!({
            "daily": {
                "time": ["2025-04-01", "2025-04-02"],
                "weather_code": [0],
                "temperature_2m_max": [19.0, 21.5],
                "temperature_2m_min": [10.1, 12.0]
            }
        })));
        assert!(result.is_err());
    }

    #[test]
    fn test_clamp_days() {
        assert_eq!(clamp_days(0, MAX_FORECAST_DAYS), 1);
        assert_eq!(clamp_days(3, MAX_FORECAST_DAYS), 3);
        assert_eq!(clamp_days(30, MAX_FORECAST_DAYS), 7);
        assert_eq!(clamp_days(-2, MAX_FORECAST_DAYS), 1);
        assert_eq!(clamp_days(i64::MAX, MAX_FORECAST_DAYS), 7);
    }

    #[tokio::test]
    #[ignore = "requires network access to api.open-meteo.com"]
    async fn test_live_current_weather() {
        let client = OpenMeteoClient::new().unwrap();
        let tokyo = find_city("Tokyo").unwrap();
        let current = client.current(tokyo).await.unwrap();
        assert!((-50.0..60.0).contains(&current.temperature_c));
    }

    #[tokio::test]
    #[ignore = "requires network access to api.open-meteo.com"]
    async fn test_live_forecast() {
        let client = OpenMeteoClient::new().unwrap();
        let osaka = find_city("Osaka").unwrap();
        let days = client.forecast(osaka, 3).await.unwrap();
        assert_eq!(days.len(), 3);
    }
}

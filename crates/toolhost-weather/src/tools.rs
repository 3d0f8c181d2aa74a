//! Live weather tools backed by Open-Meteo
//!
//! An unsupported city is not an error: the tool answers with a message
//! naming the supported cities so the model can correct itself. Upstream
//! failures are reported as [`toolhost_core::Error::ToolFailed`].

use crate::cities::{City, city_labels, find_city};
use crate::client::{CurrentWeather, DailyForecast, MAX_FORECAST_DAYS, OpenMeteoClient, clamp_days};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt::Write as _;
use std::sync::Arc;
use toolhost_core::{Error, Result};
use toolhost_llm::tools::schema;
use toolhost_tools::Tool;
use tracing::warn;

const DEFAULT_FORECAST_DAYS: i64 = 3;

/// The three live weather tools sharing one client
pub fn weather_tools(client: Arc<OpenMeteoClient>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(GetWeatherTool::new(Arc::clone(&client))),
        Arc::new(GetWeatherForecastTool::new(client)),
        Arc::new(ListCitiesTool),
    ]
}

fn unsupported_city(query: &str) -> Value {
    Value::String(format!(
        "Unsupported city: '{query}'. Available cities: {}",
        city_labels().join(", ")
    ))
}

fn parse_params<T: for<'de> Deserialize<'de>>(tool: &str, params: Value) -> Result<T> {
    serde_json::from_value(params).map_err(|e| Error::invalid_parameters(tool, e.to_string()))
}

/// Render a current-conditions report
pub fn format_current(city: &City, weather: &CurrentWeather) -> String {
    format!(
        "Current weather in {}:\n\
         - Condition: {}\n\
         - Temperature: {:.1}°C\n\
         - Humidity: {:.0}%\n\
         - Wind speed: {:.1} km/h",
        city.label(),
        weather.condition(),
        weather.temperature_c,
        weather.humidity_percent,
        weather.wind_speed_kmh,
    )
}

/// Render a multi-day forecast, one line per day
pub fn format_forecast(city: &City, days: &[DailyForecast]) -> String {
    let mut out = format!("{}-day forecast for {}:", days.len(), city.label());
    for day in days {
        let range = match (day.min_c, day.max_c) {
            (Some(min), Some(max)) => format!("{min:.1}°C to {max:.1}°C"),
            _ => "temperature n/a".to_string(),
        };
        let rain = day
            .precipitation_probability
            .map_or_else(|| "n/a".to_string(), |p| format!("{p:.0}%"));
        let _ = write!(
            out,
            "\n- {}: {}, {}, precipitation {}",
            day.date,
            day.condition(),
            range,
            rain
        );
    }
    out
}

#[derive(Debug, Deserialize)]
struct CityParams {
    city: String,
}

/// `get_weather(city)`: current conditions
pub struct GetWeatherTool {
    client: Arc<OpenMeteoClient>,
}

impl GetWeatherTool {
    pub fn new(client: Arc<OpenMeteoClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetWeatherTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let params: CityParams = parse_params(self.name(), params)?;
        let Some(city) = find_city(&params.city) else {
            return Ok(unsupported_city(&params.city));
        };

        let weather = self.client.current(city).await.map_err(|e| {
            warn!(city = city.name, error = %e, "Current weather lookup failed");
            Error::tool_failed(self.name(), e.to_string())
        })?;
        Ok(Value::String(format_current(city, &weather)))
    }

    fn name(&self) -> &'static str {
        "get_weather"
    }

    fn description(&self) -> &'static str {
        "Get the current weather (condition, temperature, humidity, wind speed) for a city \
         in Japan. Accepts English or Japanese city names."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({"city": schema::string("City name, e.g. 'Tokyo' or '東京'")}),
            &["city"],
        )
    }
}

#[derive(Debug, Deserialize)]
struct ForecastParams {
    city: String,
    #[serde(default)]
    days: Option<i64>,
}

/// `get_weather_forecast(city, days = 3)`: daily forecast, 1 to 7 days
pub struct GetWeatherForecastTool {
    client: Arc<OpenMeteoClient>,
}

impl GetWeatherForecastTool {
    pub fn new(client: Arc<OpenMeteoClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetWeatherForecastTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let params: ForecastParams = parse_params(self.name(), params)?;
        let Some(city) = find_city(&params.city) else {
            return Ok(unsupported_city(&params.city));
        };
        let days = clamp_days(
            params.days.unwrap_or(DEFAULT_FORECAST_DAYS),
            MAX_FORECAST_DAYS,
        );

        let forecast = self.client.forecast(city, days).await.map_err(|e| {
            warn!(city = city.name, days, error = %e, "Forecast lookup failed");
            Error::tool_failed(self.name(), e.to_string())
        })?;
        Ok(Value::String(format_forecast(city, &forecast)))
    }

    fn name(&self) -> &'static str {
        "get_weather_forecast"
    }

    fn description(&self) -> &'static str {
        "Get the daily weather forecast for a city in Japan for 1 to 7 days \
         (default 3): condition, min/max temperature and precipitation probability."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "city": schema::string("City name, e.g. 'Osaka' or '大阪'"),
                "days": {
                    "type": "integer",
                    "description": "Number of days to forecast",
                    "minimum": 1,
                    "maximum": MAX_FORECAST_DAYS,
                    "default": DEFAULT_FORECAST_DAYS
                }
            }),
            &["city"],
        )
    }
}

/// `list_available_cities()`: supported cities in table order
pub struct ListCitiesTool;

#[async_trait]
impl Tool for ListCitiesTool {
    async fn execute(&self, _params: Value) -> Result<Value> {
        Ok(Value::String(format!(
            "Available cities: {}",
            city_labels().join(", ")
        )))
    }

    fn name(&self) -> &'static str {
        "list_available_cities"
    }

    fn description(&self) -> &'static str {
        "List the cities whose weather can be looked up."
    }

    fn input_schema(&self) -> Value {
        schema::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities::CITIES;

    fn client() -> Arc<OpenMeteoClient> {
        // Unroutable endpoint: tests below must never reach the network
        Arc::new(
            OpenMeteoClient::new()
                .unwrap()
                .with_base_url("http://127.0.0.1:9"),
        )
    }

    #[tokio::test]
    async fn test_list_cities_is_stable_and_non_empty() {
        let first = ListCitiesTool.execute(json!({})).await.unwrap();
        let second = ListCitiesTool.execute(Value::Null).await.unwrap();
        assert_eq!(first, second);

        let text = first.as_str().unwrap();
        for city in CITIES {
            assert!(text.contains(city.name), "missing {}", city.name);
        }
    }

    #[tokio::test]
    async fn test_unknown_city_is_a_message() {
        let out = GetWeatherTool::new(client())
            .execute(json!({"city": "Paris"}))
            .await
            .unwrap();
        let text = out.as_str().unwrap();
        assert!(text.contains("Unsupported city: 'Paris'"));
        assert!(text.contains("Tokyo"));
    }

    #[tokio::test]
    async fn test_missing_city_parameter() {
        let err = GetWeatherForecastTool::new(client())
            .execute(json!({"days": 2}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameters { .. }));
    }

    #[tokio::test]
    async fn test_negative_days_are_accepted() {
        let tool = GetWeatherForecastTool::new(client());
        let out = tool
            .execute(json!({"city": "Paris", "days": -2}))
            .await
            .unwrap();
        assert!(out.as_str().unwrap().contains("Unsupported city"));

        // parses and clamps, then fails only on the unreachable endpoint
        let err = tool
            .execute(json!({"city": "Tokyo", "days": -2}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ToolFailed { .. }));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_tool_failure() {
        let err = GetWeatherTool::new(client())
            .execute(json!({"city": "Tokyo"}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ToolFailed { ref tool, .. } if tool == "get_weather"));
    }

    #[test]
    fn test_format_current_contains_city_and_temperature() {
        let tokyo = find_city("Tokyo").unwrap();
        let text = format_current(
            tokyo,
            &CurrentWeather {
                time: "2025-04-01T12:00".into(),
                temperature_c: 18.4,
                humidity_percent: 52.0,
                weather_code: 0,
                wind_speed_kmh: 11.2,
            },
        );
        assert!(text.contains("Tokyo"));
        assert!(text.contains("18.4°C"));
        assert!(text.contains("Clear sky"));
    }

    #[test]
    fn test_format_forecast() {
        let kobe = find_city("Kobe").unwrap();
        let text = format_forecast(
            kobe,
            &[DailyForecast {
                date: "2025-04-02".into(),
                weather_code: Some(3),
                max_c: Some(20.0),
                min_c: Some(11.5),
                precipitation_probability: None,
            }],
        );
        assert_eq!(
            text,
            "1-day forecast for Kobe (神戸):\n- 2025-04-02: Overcast, 11.5°C to 20.0°C, precipitation n/a"
        );
    }

    #[test]
    fn test_weather_tool_set() {
        let names: Vec<String> = weather_tools(client())
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["get_weather", "get_weather_forecast", "list_available_cities"]
        );
    }

    #[tokio::test]
    #[ignore = "requires network access to api.open-meteo.com"]
    async fn test_live_weather_report() {
        let tool = GetWeatherTool::new(Arc::new(OpenMeteoClient::new().unwrap()));
        let out = tool.execute(json!({"city": "東京"})).await.unwrap();
        let text = out.as_str().unwrap();
        assert!(text.contains("Tokyo"));
        assert!(text.contains("°C"));
    }
}

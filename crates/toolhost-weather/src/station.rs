//! Fixed weather dataset served by the sample MCP server
//!
//! Answers never change between runs, which makes the remote tools easy to
//! compare against direct calls.

use crate::client::clamp_days;
use serde::Deserialize;
use serde_json::json;
use std::fmt::Write as _;
use std::sync::Arc;
use toolhost_llm::tools::schema;
use toolhost_tools::{FnTool, Tool};

/// Longest forecast the station holds
pub const MAX_STATION_DAYS: u32 = 5;
const DEFAULT_STATION_DAYS: i64 = 3;

/// URI of the city-listing resource
pub const CITIES_RESOURCE_URI: &str = "weather://cities";

/// One city's entry in the station dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationReport {
    pub city: &'static str,
    pub local_name: &'static str,
    pub temperature_c: i32,
    pub condition: &'static str,
    pub humidity_percent: u8,
    pub forecast: [&'static str; MAX_STATION_DAYS as usize],
}

pub const STATION_DATA: &[StationReport] = &[
    StationReport {
        city: "Tokyo",
        local_name: "東京",
        temperature_c: 22,
        condition: "Sunny",
        humidity_percent: 45,
        forecast: ["Sunny", "Sunny", "Cloudy", "Rain", "Sunny"],
    },
    StationReport {
        city: "Osaka",
        local_name: "大阪",
        temperature_c: 24,
        condition: "Cloudy",
        humidity_percent: 55,
        forecast: ["Cloudy", "Rain", "Rain", "Sunny", "Sunny"],
    },
    StationReport {
        city: "Nagoya",
        local_name: "名古屋",
        temperature_c: 23,
        condition: "Sunny",
        humidity_percent: 50,
        forecast: ["Sunny", "Sunny", "Sunny", "Cloudy", "Cloudy"],
    },
    StationReport {
        city: "Sapporo",
        local_name: "札幌",
        temperature_c: 15,
        condition: "Rain",
        humidity_percent: 70,
        forecast: ["Rain", "Cloudy", "Sunny", "Sunny", "Snow"],
    },
    StationReport {
        city: "Fukuoka",
        local_name: "福岡",
        temperature_c: 25,
        condition: "Sunny",
        humidity_percent: 60,
        forecast: ["Sunny", "Sunny", "Cloudy", "Cloudy", "Sunny"],
    },
];

impl StationReport {
    fn label(&self) -> String {
        format!("{} ({})", self.city, self.local_name)
    }
}

/// Look a station entry up by English (any case) or Japanese name
pub fn lookup(query: &str) -> Option<&'static StationReport> {
    let query = query.trim();
    STATION_DATA
        .iter()
        .find(|r| r.city.eq_ignore_ascii_case(query) || r.local_name == query)
}

fn unknown(query: &str) -> String {
    let names: Vec<&str> = STATION_DATA.iter().map(|r| r.city).collect();
    format!(
        "No weather data for '{query}'. Available cities: {}",
        names.join(", ")
    )
}

/// Current conditions text for `city`
pub fn current_report(city: &str) -> String {
    match lookup(city) {
        Some(r) => format!(
            "{}: {}, temperature {}°C, humidity {}%",
            r.label(),
            r.condition,
            r.temperature_c,
            r.humidity_percent
        ),
        None => unknown(city),
    }
}

/// Forecast text for `city`, `days` clamped to `1..=5`
pub fn forecast_report(city: &str, days: i64) -> String {
    let Some(r) = lookup(city) else {
        return unknown(city);
    };
    let days = clamp_days(days, MAX_STATION_DAYS) as usize;
    let mut out = format!("{}-day forecast for {}:", days, r.label());
    for (i, condition) in r.forecast.iter().take(days).enumerate() {
        let _ = write!(out, "\nDay {}: {}", i + 1, condition);
    }
    out
}

/// Body of the `weather://cities` resource
pub fn cities_listing() -> String {
    let mut out = String::from("Cities with weather data:");
    for r in STATION_DATA {
        let _ = write!(out, "\n- {}", r.label());
    }
    out
}

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    city: String,
}

#[derive(Debug, Deserialize)]
struct ForecastArgs {
    city: String,
    #[serde(default)]
    days: Option<i64>,
}

/// `get_weather(city)` and `get_forecast(city, days = 3)` over the dataset
pub fn station_tools() -> Vec<Arc<dyn Tool>> {
    let weather = FnTool::typed(
        "get_weather",
        "Get the current weather (condition, temperature, humidity) for a city.",
        schema::object(
            json!({"city": schema::string("City name, e.g. 'Tokyo' or '東京'")}),
            &["city"],
        ),
        |args: WeatherArgs| async move { Ok(current_report(&args.city)) },
    );

    let forecast = FnTool::typed(
        "get_forecast",
        "Get the weather forecast for a city for 1 to 5 days (default 3).",
        schema::object(
            json!({
                "city": schema::string("City name"),
                "days": {
                    "type": "integer",
                    "description": "Number of days",
                    "minimum": 1,
                    "maximum": MAX_STATION_DAYS,
                    "default": DEFAULT_STATION_DAYS
                }
            }),
            &["city"],
        ),
        |args: ForecastArgs| async move {
            Ok(forecast_report(
                &args.city,
                args.days.unwrap_or(DEFAULT_STATION_DAYS),
            ))
        },
    );

    vec![Arc::new(weather), Arc::new(forecast)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_report() {
        assert_eq!(
            current_report("Tokyo"),
            "Tokyo (東京): Sunny, temperature 22°C, humidity 45%"
        );
        assert_eq!(current_report("札幌"), current_report("sapporo"));
    }

    #[test]
    fn test_unknown_city() {
        let text = current_report("Kyoto");
        assert!(text.starts_with("No weather data for 'Kyoto'"));
        assert!(text.contains("Fukuoka"));
        assert_eq!(forecast_report("Kyoto", 2), text);
    }

    #[test]
    fn test_forecast_clamps_days() {
        assert_eq!(
            forecast_report("Osaka", 2),
            "2-day forecast for Osaka (大阪):\nDay 1: Cloudy\nDay 2: Rain"
        );
        assert_eq!(forecast_report("Osaka", 0).lines().count(), 2);
        assert_eq!(forecast_report("Sapporo", 99).lines().last(), Some("Day 5: Snow"));
    }

    #[test]
    fn test_cities_listing() {
        let listing = cities_listing();
        assert_eq!(listing.lines().count(), STATION_DATA.len() + 1);
        assert!(listing.contains("- Nagoya (名古屋)"));
    }

    #[tokio::test]
    async fn test_station_tools() {
        let tools = station_tools();
        assert_eq!(tools.len(), 2);

        let out = tools[0].execute(json!({"city": "Fukuoka"})).await.unwrap();
        assert_eq!(out, json!(current_report("Fukuoka")));

        let out = tools[1].execute(json!({"city": "Tokyo"})).await.unwrap();
        assert_eq!(out.as_str().unwrap().lines().count(), 4);
    }

    #[tokio::test]
    async fn test_negative_days_clamp_to_one() {
        let tools = station_tools();
        let out = tools[1]
            .execute(json!({"city": "Osaka", "days": -2}))
            .await
            .unwrap();
        assert_eq!(out, json!("1-day forecast for Osaka (大阪):\nDay 1: Cloudy"));
        assert_eq!(forecast_report("Osaka", -2), forecast_report("Osaka", 1));
    }
}

//! Weather capability provider for toolhost
//!
//! Two flavours of the same domain:
//!
//! - [`tools`]: live tools backed by the public Open-Meteo forecast API
//!   ([`client::OpenMeteoClient`]), covering the cities in [`cities`].
//! - [`station`]: a fixed in-memory dataset served by the sample MCP server,
//!   so remote tool calls give reproducible answers.

pub mod cities;
pub mod client;
pub mod codes;
pub mod error;
pub mod station;
pub mod tools;

pub use cities::{CITIES, City, find_city};
pub use client::{CurrentWeather, DailyForecast, OpenMeteoClient};
pub use error::{Result, WeatherError};
pub use tools::{GetWeatherForecastTool, GetWeatherTool, ListCitiesTool, weather_tools};

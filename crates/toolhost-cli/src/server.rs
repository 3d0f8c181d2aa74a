//! The `mcp-server` sample: the weather station over MCP stdio

use std::sync::Arc;
use toolhost_mcp::{FnResource, McpServer};
use toolhost_weather::station::{self, CITIES_RESOURCE_URI};
use tracing::info;

pub const SERVER_NAME: &str = "weather-server";

const INSTRUCTIONS: &str =
    "Provides weather information. Ask for the current weather or a forecast by city name.";

pub fn weather_server() -> toolhost_mcp::Result<McpServer> {
    McpServer::builder(SERVER_NAME)
        .instructions(INSTRUCTIONS)
        .tools(station::station_tools())
        .resource(Arc::new(
            FnResource::new(CITIES_RESOURCE_URI, "cities", || async {
                Ok(station::cities_listing())
            })
            .with_description("Cities with weather data"),
        ))
        .build()
}

/// Serve until the client closes stdin
pub async fn run() -> anyhow::Result<()> {
    let server = weather_server()?;
    info!(
        name = SERVER_NAME,
        tools = ?server.tool_names(),
        "Serving MCP on stdio"
    );
    server.serve_stdio().await?;
    info!("MCP client disconnected, shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolhost_mcp::protocol::resource_text;

    #[test]
    fn test_server_advertises_station() {
        let server = weather_server().unwrap();
        assert_eq!(server.name(), SERVER_NAME);
        assert_eq!(server.tool_names(), vec!["get_forecast", "get_weather"]);
        assert_eq!(server.resource_uris(), vec![CITIES_RESOURCE_URI]);
    }

    #[tokio::test]
    async fn test_cities_resource_matches_listing() {
        let server = weather_server().unwrap();
        let read = server.read(CITIES_RESOURCE_URI).await.unwrap();
        assert_eq!(
            resource_text(&read.contents[0]),
            Some(station::cities_listing().as_str())
        );
    }
}

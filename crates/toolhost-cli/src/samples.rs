//! Agent samples: each builds a tool set, a system prompt and a list of
//! questions, then answers them one after another in the same conversation

use crate::console::{ConsoleEventHandler, ask_all, banner, truncate};
use crate::provider::{build_provider, executor_config};
use crate::server::SERVER_NAME;
use anyhow::{Context as _, bail};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use std::path::Path;
use std::sync::Arc;
use toolhost_mcp::MCPConfig;
use toolhost_runtime::{AgentRuntime, AgentRuntimeBuilder};
use toolhost_tools::builtin::{ClockTool, calculator_tools};
use toolhost_tools::{Tool, ToolRegistry};
use toolhost_utils::Config;
use toolhost_weather::station::{self, CITIES_RESOURCE_URI};
use toolhost_weather::{OpenMeteoClient, weather_tools};
use tracing::info;

const CALCULATOR_PROMPT: &str = "You are a helpful calculator assistant. \
Use the available tools for arithmetic and for the current time, then give a short answer.";

const CALCULATOR_QUESTIONS: &[&str] = &[
    "Add 3 and 5.",
    "What is 7 times 8?",
    "What time is it now?",
    "Add 12 and 3, then multiply the result by 2.",
];

const FORECASTER_PROMPT: &str = "You are a friendly weather assistant. \
Answer questions with the weather tools. Only the cities returned by \
list_available_cities are supported; if asked about another city, say so \
and list the supported ones. Keep answers short.";

const FORECASTER_QUESTIONS: &[&str] = &[
    "What's the weather in Tokyo?",
    "What's the 3-day forecast for Osaka?",
    "Which is colder right now, Tokyo or Sapporo?",
    "Which cities can you look up?",
];

const WEATHER_ASSISTANT_PROMPT: &str = "You are a weather assistant. \
Use the weather tools to answer questions about current conditions and \
forecasts, and the clock tool for the current time.";

const MCP_QUESTIONS: &[&str] = &[
    "What's the weather in Tokyo?",
    "Give me the 3-day forecast for Osaka.",
    "What time is it now? Also, how is the weather in Sapporo?",
    "Which is warmer, Tokyo or Fukuoka?",
];

/// Agent name looked up in the MCP configuration
const MCP_AGENT_NAME: &str = "weather-assistant";

pub fn greeting() -> &'static str {
    "Hello from toolhost!"
}

/// `--prompt` replaces the scripted questions
fn questions(prompt: Option<String>, scripted: &[&str]) -> Vec<String> {
    match prompt {
        Some(prompt) => vec![prompt],
        None => scripted.iter().map(|q| (*q).to_string()).collect(),
    }
}

fn runtime_builder(
    config: &Config,
    tools: Vec<Arc<dyn Tool>>,
) -> anyhow::Result<AgentRuntimeBuilder> {
    let registry = ToolRegistry::new();
    registry.register_all(tools)?;
    Ok(AgentRuntime::builder()
        .provider(build_provider(config)?)
        .tool_registry(Arc::new(registry))
        .event_handler(Arc::new(ConsoleEventHandler)))
}

pub async fn tool_agent(prompt: Option<String>) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    banner("Tool agent: arithmetic and clock tools");

    let clock = ClockTool::new(config.utc_offset_hours)?;
    let runtime = runtime_builder(&config, calculator_tools(clock))?.build()?;
    let agent =
        runtime.create_tool_agent(executor_config(&config, CALCULATOR_PROMPT), "calculator");

    ask_all(&agent, &questions(prompt, CALCULATOR_QUESTIONS)).await
}

pub async fn api_agent(prompt: Option<String>) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    banner("API agent: live weather from Open-Meteo");

    let client = Arc::new(OpenMeteoClient::new()?);
    let runtime = runtime_builder(&config, weather_tools(client))?.build()?;
    let agent =
        runtime.create_tool_agent(executor_config(&config, FORECASTER_PROMPT), "forecaster");

    ask_all(&agent, &questions(prompt, FORECASTER_QUESTIONS)).await
}

/// `path`, or this binary started as `mcp-server`
fn mcp_config(path: Option<&Path>) -> anyhow::Result<MCPConfig> {
    if let Some(path) = path {
        return MCPConfig::from_file(path)
            .with_context(|| format!("failed to load MCP config from {}", path.display()));
    }
    let exe = std::env::current_exe().context("cannot locate the toolhost binary")?;
    Ok(MCPConfig::single_stdio(
        SERVER_NAME,
        exe.to_string_lossy(),
        vec!["mcp-server".to_string()],
    ))
}

pub async fn mcp_agent(
    path: Option<std::path::PathBuf>,
    prompt: Option<String>,
) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    banner("MCP agent: weather tools from an MCP server");

    let mcp = mcp_config(path.as_deref())?;
    let clock = ClockTool::new(config.utc_offset_hours)?;
    let runtime = runtime_builder(&config, vec![Arc::new(clock)])?
        .mcp_config(Arc::new(mcp))
        .build()?;

    let agent = runtime
        .create_tool_agent_with_mcp(
            executor_config(&config, WEATHER_ASSISTANT_PROMPT),
            MCP_AGENT_NAME,
        )
        .await?;
    let Some(manager) = agent.mcp_manager().cloned() else {
        bail!("no MCP servers are configured for agent '{MCP_AGENT_NAME}'");
    };
    if !manager.has_connections().await {
        bail!("could not connect to any MCP server");
    }

    println!("Tools from MCP servers:");
    for tool in manager.discover_tools().await? {
        let description = tool.definition.description.as_deref().unwrap_or_default();
        println!(
            "  - {} [{}]: {}",
            tool.definition.name,
            tool.server_name,
            truncate(description, 50)
        );
    }
    println!();

    let result = ask_all(&agent, &questions(prompt, MCP_QUESTIONS)).await;
    manager.shutdown().await?;
    info!("MCP sessions closed");
    result
}

/// Every local tool the samples register, with the sample that uses it
pub fn tools_table() -> anyhow::Result<Table> {
    let clock = ClockTool::new(Config::default().utc_offset_hours)?;
    let client = Arc::new(OpenMeteoClient::new()?);
    let groups: [(&str, Vec<Arc<dyn Tool>>); 3] = [
        ("tool-agent", calculator_tools(clock)),
        ("api-agent", weather_tools(client)),
        ("mcp-server", station::station_tools()),
    ];

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Tool", "Sample", "Description"]);
    for (sample, tools) in groups {
        for tool in tools {
            table.add_row(vec![tool.name(), sample, tool.description()]);
        }
    }
    Ok(table)
}

pub fn list_tools() -> anyhow::Result<()> {
    println!("{}", tools_table()?);
    println!("\nThe mcp-server sample also serves the resource {CITIES_RESOURCE_URI}");
    Ok(())
}

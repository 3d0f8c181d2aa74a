//! Command-line samples for toolhost
//!
//! Each subcommand is one self-contained sample; all of them run without
//! flags. Logs go to stderr so `mcp-server` can own stdout.

mod console;
mod provider;
mod samples;
mod server;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "toolhost")]
#[command(about = "Tool-calling agent samples and an MCP weather server", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a greeting and exit
    Hello,

    /// Agent with local arithmetic and clock tools
    ToolAgent {
        /// Ask this instead of the scripted questions
        #[arg(short, long)]
        prompt: Option<String>,
    },

    /// Weather agent backed by the Open-Meteo API
    ApiAgent {
        /// Ask this instead of the scripted questions
        #[arg(short, long)]
        prompt: Option<String>,
    },

    /// Serve the weather station over MCP on stdin/stdout
    McpServer,

    /// Agent whose weather tools come from an MCP server
    McpAgent {
        /// MCP configuration file; defaults to spawning `toolhost mcp-server`
        #[arg(long, value_name = "PATH")]
        mcp_config: Option<PathBuf>,

        /// Ask this instead of the scripted questions
        #[arg(short, long)]
        prompt: Option<String>,
    },

    /// List the tools the samples register locally
    Tools,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    toolhost_utils::init_tracing();

    let cli = Cli::parse();
    info!(command = ?cli.command, "Starting toolhost");

    match cli.command {
        Commands::Hello => {
            println!("{}", samples::greeting());
            Ok(())
        }
        Commands::ToolAgent { prompt } => samples::tool_agent(prompt).await,
        Commands::ApiAgent { prompt } => samples::api_agent(prompt).await,
        Commands::McpServer => server::run().await,
        Commands::McpAgent { mcp_config, prompt } => samples::mcp_agent(mcp_config, prompt).await,
        Commands::Tools => samples::list_tools(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_samples_need_no_flags() {
        for name in ["hello", "tool-agent", "api-agent", "mcp-server", "mcp-agent", "tools"] {
            assert!(Cli::try_parse_from(["toolhost", name]).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_prompt_and_config_flags() {
        let cli = Cli::try_parse_from([
            "toolhost",
            "mcp-agent",
            "--mcp-config",
            ".mcp.json",
            "--prompt",
            "Weather in Tokyo?",
        ])
        .unwrap();

        match cli.command {
            Commands::McpAgent { mcp_config, prompt } => {
                assert_eq!(mcp_config, Some(PathBuf::from(".mcp.json")));
                assert_eq!(prompt.as_deref(), Some("Weather in Tokyo?"));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["toolhost", "tool-agent", "-p", "What is 2 + 2?"]).unwrap();
        assert!(matches!(cli.command, Commands::ToolAgent { prompt: Some(_) }));
    }

    #[test]
    fn test_unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["toolhost", "stock-agent"]).is_err());
        assert!(Cli::try_parse_from(["toolhost"]).is_err());
    }
}

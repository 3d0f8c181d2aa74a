//! Model Context Protocol (MCP) client and server for toolhost
//!
//! The client side lets an agent use tools hosted by another process:
//! - Spawn MCP servers as child processes and talk to them over stdio
//! - Discover their tools and register them next to local tools
//! - Read the resources they expose
//!
//! The server side publishes local [`toolhost_tools::Tool`]s and
//! [`server::Resource`]s to any MCP client.
//!
//! Calls are relayed unchanged in both directions. A session whose
//! connection fails, or whose peer speaks an unsupported protocol version,
//! is closed for good.
//!
//! # Example
//!
//! ```no_run
//! use toolhost_mcp::{MCPClientManager, MCPConfig, discover_and_register_tools};
//! use toolhost_tools::ToolRegistry;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MCPConfig::from_file(".mcp.json")?;
//! let manager = Arc::new(MCPClientManager::new(Arc::new(config), "weather-agent"));
//! manager.initialize().await?;
//!
//! let registry = ToolRegistry::new();
//! let count = discover_and_register_tools(Arc::clone(&manager), &registry).await?;
//! println!("Registered {count} remote tools");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod protocol;
pub mod server;
pub mod tool;
pub mod transport;

pub use client::manager::MCPClientManager;
pub use client::{ArcMCPClient, MCPClient, StdioMCPClient, StreamMCPClient};
pub use config::{AgentMCPConfig, MCPConfig, MCPServerConfig};
pub use discovery::discover_and_register_tools;
pub use error::MCPError;
pub use server::{FnResource, McpServer, Resource};
pub use tool::MCPTool;

/// Result type for MCP operations
pub type Result<T> = std::result::Result<T, MCPError>;

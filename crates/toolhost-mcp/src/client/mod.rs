//! MCP client implementations

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::Result;
use crate::protocol::{
    MCPResourceContent, MCPResourceDefinition, MCPServerInfo, MCPToolDefinition, MCPToolResult,
};

pub mod manager;
pub mod stdio;
pub mod stream;

pub use stdio::StdioMCPClient;
pub use stream::StreamMCPClient;

/// Name this client reports during the handshake
pub const CLIENT_NAME: &str = "toolhost";

/// MCP client trait - abstracts over how the session's byte stream is opened
///
/// All methods take `&self` so clients can be shared through `Arc`.
/// A session that fails to connect, or whose transport breaks, stays closed.
#[async_trait]
pub trait MCPClient: Send + Sync {
    /// Open the session and perform the initialize handshake
    async fn connect(&self) -> Result<()>;

    fn is_connected(&self) -> bool;

    async fn disconnect(&self) -> Result<()>;

    /// Tools the server declares
    async fn list_tools(&self) -> Result<Vec<MCPToolDefinition>>;

    /// Forward a tool invocation; arguments are sent unchanged
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<MCPToolResult>;

    async fn list_resources(&self) -> Result<Vec<MCPResourceDefinition>>;

    async fn read_resource(&self, uri: &str) -> Result<Vec<MCPResourceContent>>;

    /// Server info from the initialize response
    async fn server_info(&self) -> Option<MCPServerInfo>;
}

/// Type alias for Arc-wrapped MCP client
pub type ArcMCPClient = Arc<dyn MCPClient>;

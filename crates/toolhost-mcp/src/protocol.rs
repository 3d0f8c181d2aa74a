//! Protocol constants and the MCP message types shared by the client and
//! the server
//!
//! Message payloads are the `rmcp` model types; only the JSON-RPC response
//! envelope the client reads off the wire is defined here.

use serde::Deserialize;
use serde_json::Value;

pub use rmcp::model::{
    CallToolResult as MCPToolResult, Content as MCPContent, InitializeResult, RawContent,
    Resource as MCPResourceDefinition, ResourceContents as MCPResourceContent,
    ServerCapabilities as MCPServerCapabilities, Tool as MCPToolDefinition,
};

/// Protocol version this implementation requests
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Protocol versions this implementation can speak, oldest first
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2024-11-05", "2025-03-26", "2025-06-18"];

pub const JSONRPC_VERSION: &str = "2.0";

pub fn is_supported_version(version: &str) -> bool {
    SUPPORTED_PROTOCOL_VERSIONS.contains(&version)
}

/// JSON-RPC and MCP error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
    /// MCP: resource not found
    pub const RESOURCE_NOT_FOUND: i64 = -32002;
}

/// MCP method names
pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const INITIALIZED: &str = "notifications/initialized";
    pub const PING: &str = "ping";
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";
    pub const RESOURCES_LIST: &str = "resources/list";
    pub const RESOURCES_READ: &str = "resources/read";
}

/// Response to one of the client's requests
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    pub id: Value,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Text blocks of a tool result joined with newlines
pub fn result_text(result: &MCPToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text of a `resources/read` entry; `None` for binary contents
pub fn resource_text(content: &MCPResourceContent) -> Option<&str> {
    match content {
        MCPResourceContent::TextResourceContents { text, .. } => Some(text),
        MCPResourceContent::BlobResourceContents { .. } => None,
    }
}

/// Server description kept by the client after the handshake
#[derive(Debug, Clone)]
pub struct MCPServerInfo {
    pub name: String,
    pub version: String,
    pub protocol_version: String,
    pub capabilities: MCPServerCapabilities,
    pub instructions: Option<String>,
}

impl MCPServerInfo {
    /// `protocol_version` is the version string exactly as the server sent it
    pub fn new(result: InitializeResult, protocol_version: String) -> Self {
        Self {
            name: result.server_info.name,
            version: result.server_info.version,
            protocol_version,
            capabilities: result.capabilities,
            instructions: result.instructions,
        }
    }
}

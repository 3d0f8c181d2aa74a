//! Error types for MCP operations

use thiserror::Error;

/// Errors that can occur during MCP operations
#[derive(Error, Debug)]
pub enum MCPError {
    /// Transport could not be opened or broke mid-session
    #[error("MCP connection failed: {0}")]
    ConnectionFailed(String),

    /// The initialize handshake failed
    #[error("MCP initialization failed: {0}")]
    InitializationFailed(String),

    /// The server answered with a protocol version this client cannot speak
    #[error("MCP protocol mismatch: server uses '{server}', supported: {supported}")]
    ProtocolMismatch { server: String, supported: String },

    #[error("Not connected to MCP server")]
    NotConnected,

    /// The peer answered with a JSON-RPC error object
    #[error("MCP request failed ({code}): {message}")]
    Rpc { code: i64, message: String },

    #[error("MCP request failed: {0}")]
    RequestFailed(String),

    #[error("MCP tool call failed: {0}")]
    ToolCallFailed(String),

    #[error("MCP server not found: {0}")]
    ServerNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
}

impl MCPError {
    /// Whether the session that produced this error can no longer be used
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_)
                | Self::InitializationFailed(_)
                | Self::ProtocolMismatch { .. }
                | Self::IoError(_)
        )
    }
}

impl From<MCPError> for toolhost_core::Error {
    fn from(err: MCPError) -> Self {
        match err {
            MCPError::ConfigError(msg) | MCPError::EnvVarNotFound(msg) => {
                toolhost_core::Error::Config(msg)
            }
            other => toolhost_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}

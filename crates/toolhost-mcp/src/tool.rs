//! Adapter exposing a remote MCP tool through the local [`Tool`] trait

use crate::client::manager::{MCPClientManager, MCPToolInfo};
use crate::protocol::{MCPToolResult, result_text};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use toolhost_core::{Error, Result};
use toolhost_tools::Tool;
use tracing::debug;

/// A tool living on an MCP server
///
/// Arguments are forwarded unchanged, and the server's answer is returned
/// without reinterpretation, so calling through the bridge yields the same
/// value as calling the tool directly.
pub struct MCPTool {
    manager: Arc<MCPClientManager>,
    server_name: String,
    name: String,
    description: String,
    input_schema: Value,
}

impl MCPTool {
    pub fn new(manager: Arc<MCPClientManager>, info: MCPToolInfo) -> Self {
        Self {
            manager,
            server_name: info.server_name,
            name: info.definition.name.to_string(),
            description: info
                .definition
                .description
                .as_deref()
                .unwrap_or_default()
                .to_string(),
            input_schema: Value::Object(info.definition.input_schema.as_ref().clone()),
        }
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }
}

/// Map a `tools/call` result onto the local tool contract
pub fn result_to_value(tool: &str, result: MCPToolResult) -> Result<Value> {
    let text = result_text(&result);
    if result.is_error.unwrap_or(false) {
        return Err(Error::tool_failed(tool, text));
    }
    Ok(result.structured_content.unwrap_or(Value::String(text)))
}

#[async_trait]
impl Tool for MCPTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        debug!(server = %self.server_name, tool = %self.name, "Forwarding tool call");
        let result = self
            .manager
            .call_tool(&self.server_name, &self.name, params)
            .await?;
        result_to_value(&self.name, result)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        self.input_schema.clone()
    }
}

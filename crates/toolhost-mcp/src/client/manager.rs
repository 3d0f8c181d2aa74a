//! MCP client manager for coordinating multiple MCP server connections

use super::{ArcMCPClient, StdioMCPClient};
use crate::Result;
use crate::config::{MCPConfig, MCPServerConfig, should_include_tool};
use crate::error::MCPError;
use crate::protocol::{MCPResourceContent, MCPResourceDefinition, MCPToolDefinition, MCPToolResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// An MCP tool together with the server that provides it
#[derive(Debug, Clone)]
pub struct MCPToolInfo {
    pub server_name: String,
    pub definition: MCPToolDefinition,
}

/// An MCP resource together with the server that provides it
#[derive(Debug, Clone)]
pub struct MCPResourceInfo {
    pub server_name: String,
    pub definition: MCPResourceDefinition,
}

/// Owns the MCP sessions of one agent
///
/// Servers that fail to connect are logged and skipped. A session that
/// breaks later is not reopened.
pub struct MCPClientManager {
    config: Arc<MCPConfig>,
    clients: RwLock<BTreeMap<String, ArcMCPClient>>,
    agent_name: String,
}

impl MCPClientManager {
    pub fn new(config: Arc<MCPConfig>, agent_name: impl Into<String>) -> Self {
        Self {
            config,
            clients: RwLock::new(BTreeMap::new()),
            agent_name: agent_name.into(),
        }
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    pub fn config(&self) -> &MCPConfig {
        &self.config
    }

    /// Connect every server configured for this agent
    pub async fn initialize(&self) -> Result<()> {
        let agent_config = self
            .config
            .get_agent_config(&self.agent_name)
            .ok_or_else(|| {
                MCPError::ConfigError(format!(
                    "No MCP configuration found for agent: {}",
                    self.agent_name
                ))
            })?;

        let mut clients = self.clients.write().await;
        for server_name in &agent_config.mcp_servers {
            let server_config = self.config.mcp_servers.get(server_name).ok_or_else(|| {
                MCPError::ConfigError(format!("MCP server not found: {server_name}"))
            })?;

            match Self::create_and_connect_client(server_config).await {
                Ok(client) => {
                    info!(server = %server_name, "Connected to MCP server");
                    clients.insert(server_name.clone(), client);
                }
                Err(e) => {
                    warn!(
                        server = %server_name,
                        error = %e,
                        "Failed to connect to MCP server, continuing without it"
                    );
                }
            }
        }

        if clients.is_empty() {
            warn!(agent = %self.agent_name, "No MCP servers connected");
        } else {
            info!(
                agent = %self.agent_name,
                "Connected to {}/{} MCP servers",
                clients.len(),
                agent_config.mcp_servers.len()
            );
        }
        Ok(())
    }

    async fn create_and_connect_client(config: &MCPServerConfig) -> Result<ArcMCPClient> {
        let client: ArcMCPClient = Arc::new(StdioMCPClient::from_config(config));
        client.connect().await?;
        Ok(client)
    }

    /// Connect an already-built client and manage it under `server_name`
    pub async fn add_client(
        &self,
        server_name: impl Into<String>,
        client: ArcMCPClient,
    ) -> Result<()> {
        let server_name = server_name.into();
        client.connect().await?;
        let mut clients = self.clients.write().await;
        if clients.contains_key(&server_name) {
            return Err(MCPError::ConfigError(format!(
                "MCP server already registered: {server_name}"
            )));
        }
        clients.insert(server_name, client);
        Ok(())
    }

    /// Tools from every connected server, filtered by the agent's allow/deny lists
    pub async fn discover_tools(&self) -> Result<Vec<MCPToolInfo>> {
        let clients = self.clients.read().await;
        let mut all_tools = Vec::new();

        for (server_name, client) in clients.iter() {
            match client.list_tools().await {
                Ok(tools) => {
                    info!(server = %server_name, count = tools.len(), "Discovered MCP tools");
                    all_tools.extend(tools.into_iter().map(|definition| MCPToolInfo {
                        server_name: server_name.clone(),
                        definition,
                    }));
                }
                Err(e) => warn!(server = %server_name, error = %e, "Failed to list tools"),
            }
        }

        if let Some(config) = self.config.get_agent_config(&self.agent_name) {
            all_tools.retain(|tool| should_include_tool(&tool.definition.name, config));
        }
        Ok(all_tools)
    }

    pub async fn discover_resources(&self) -> Result<Vec<MCPResourceInfo>> {
        let clients = self.clients.read().await;
        let mut all_resources = Vec::new();

        for (server_name, client) in clients.iter() {
            match client.list_resources().await {
                Ok(resources) => {
                    info!(server = %server_name, count = resources.len(), "Discovered MCP resources");
                    all_resources.extend(resources.into_iter().map(|definition| MCPResourceInfo {
                        server_name: server_name.clone(),
                        definition,
                    }));
                }
                Err(e) => warn!(server = %server_name, error = %e, "Failed to list resources"),
            }
        }
        Ok(all_resources)
    }

    pub async fn call_tool(
        &self,
        server_name: &str,
        tool_name: &str,
        arguments: Value,
    ) -> Result<MCPToolResult> {
        let client = self
            .get_client(server_name)
            .await
            .ok_or_else(|| MCPError::ServerNotFound(server_name.to_string()))?;
        client.call_tool(tool_name, arguments).await
    }

    pub async fn read_resource(
        &self,
        server_name: &str,
        uri: &str,
    ) -> Result<Vec<MCPResourceContent>> {
        let client = self
            .get_client(server_name)
            .await
            .ok_or_else(|| MCPError::ServerNotFound(server_name.to_string()))?;
        client.read_resource(uri).await
    }

    pub async fn get_client(&self, server_name: &str) -> Option<ArcMCPClient> {
        self.clients.read().await.get(server_name).cloned()
    }

    /// Names of managed servers, sorted
    pub async fn connected_servers(&self) -> Vec<String> {
        self.clients.read().await.keys().cloned().collect()
    }

    pub async fn has_connections(&self) -> bool {
        !self.clients.read().await.is_empty()
    }

    /// Connection status per server
    pub async fn health_check(&self) -> BTreeMap<String, bool> {
        let clients = self.clients.read().await;
        clients
            .iter()
            .map(|(name, client)| {
                let connected = client.is_connected();
                if !connected {
                    warn!(server = %name, "MCP server is not connected");
                }
                (name.clone(), connected)
            })
            .collect()
    }

    /// Disconnect from all servers
    pub async fn shutdown(&self) -> Result<()> {
        let mut clients = self.clients.write().await;
        for (server_name, client) in clients.iter() {
            info!(server = %server_name, "Disconnecting from MCP server");
            if let Err(e) = client.disconnect().await {
                warn!(server = %server_name, error = %e, "Error disconnecting");
            }
        }
        clients.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AgentMCPConfig, ToolFilter};

    #[tokio::test]
    async fn test_manager_creation() {
        let manager = MCPClientManager::new(Arc::new(MCPConfig::default()), "test-agent");

        assert!(!manager.has_connections().await);
        assert!(manager.connected_servers().await.is_empty());
        assert!(manager.health_check().await.is_empty());
    }

    #[tokio::test]
    async fn test_initialize_without_agent_config() {
        let manager = MCPClientManager::new(Arc::new(MCPConfig::default()), "test-agent");
        assert!(matches!(
            manager.initialize().await,
            Err(MCPError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_server_is_skipped() {
        let mut config =
            MCPConfig::single_stdio("broken", "definitely-not-a-real-mcp-server", vec![]);
        config.agent_configurations.insert(
            "test-agent".to_string(),
            AgentMCPConfig {
                mcp_servers: vec!["broken".to_string()],
                tools: ToolFilter::default(),
            },
        );

        let manager = MCPClientManager::new(Arc::new(config), "test-agent");
        assert!(manager.initialize().await.is_ok());
        assert!(!manager.has_connections().await);
        assert!(matches!(
            manager.call_tool("broken", "get_weather", Value::Null).await,
            Err(MCPError::ServerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_server_reference() {
        let mut config = MCPConfig::default();
        config.agent_configurations.insert(
            "default".to_string(),
            AgentMCPConfig {
                mcp_servers: vec!["missing".to_string()],
                tools: ToolFilter::default(),
            },
        );
        let manager = MCPClientManager::new(Arc::new(config), "anyone");
        assert!(manager.initialize().await.is_err());
    }
}

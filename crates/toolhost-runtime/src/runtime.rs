//! Runtime holding the shared pieces agents are built from
//!
//! The AgentRuntime owns the LLM provider, the local tool registry and the
//! optional MCP configuration, and hands out [`ToolAgent`]s wired to them.

use crate::agent::ToolAgent;
use crate::executor::{AgentExecutor, ExecutorConfig, ExecutorEventHandler};
use std::path::PathBuf;
use std::sync::Arc;
use toolhost_core::{Error, Result};
use toolhost_llm::LLMProvider;
use toolhost_mcp::{MCPClientManager, MCPConfig, discover_and_register_tools};
use toolhost_tools::ToolRegistry;
use tracing::info;

/// Configuration for the agent runtime
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Executor settings used by [`AgentRuntime::default_executor_config`]
    pub executor: ExecutorConfig,

    /// Where the MCP configuration was loaded from
    pub mcp_config_path: Option<PathBuf>,
}

/// Shared provider, tools and MCP configuration
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use toolhost_llm::providers::AnthropicProvider;
/// use toolhost_runtime::AgentRuntime;
/// use toolhost_tools::ToolRegistry;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let runtime = AgentRuntime::builder()
///     .provider(Arc::new(AnthropicProvider::from_env()?))
///     .tool_registry(Arc::new(ToolRegistry::new()))
///     .build()?;
///
/// let agent = runtime.create_tool_agent(runtime.default_executor_config(), "assistant");
/// # Ok(())
/// # }
/// ```
pub struct AgentRuntime {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
    config: RuntimeConfig,
    mcp_config: Option<Arc<MCPConfig>>,
    event_handler: Option<Arc<dyn ExecutorEventHandler>>,
}

impl AgentRuntime {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: RuntimeConfig,
        mcp_config: Option<Arc<MCPConfig>>,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
            mcp_config,
            event_handler: None,
        }
    }

    /// Handler attached to every agent created from now on
    pub fn with_event_handler(mut self, handler: Arc<dyn ExecutorEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    fn executor(&self, registry: Arc<ToolRegistry>, config: ExecutorConfig) -> AgentExecutor {
        let executor = AgentExecutor::new(Arc::clone(&self.provider), registry, config);
        match &self.event_handler {
            Some(handler) => executor.with_event_handler(Arc::clone(handler)),
            None => executor,
        }
    }

    pub fn builder() -> AgentRuntimeBuilder {
        AgentRuntimeBuilder::new()
    }

    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn mcp_config(&self) -> Option<&Arc<MCPConfig>> {
        self.mcp_config.as_ref()
    }

    pub fn default_executor_config(&self) -> ExecutorConfig {
        self.config.executor.clone()
    }

    /// Agent using the runtime's local tools
    pub fn create_tool_agent(&self, config: ExecutorConfig, name: impl Into<String>) -> ToolAgent {
        let executor = self.executor(Arc::clone(&self.tool_registry), config);
        ToolAgent::new(executor, name)
    }

    /// Agent using the local tools plus the remote tools configured for `name`
    ///
    /// Without an MCP configuration, or without an entry for this agent (and
    /// no `default` entry), this is the same as [`Self::create_tool_agent`].
    /// Servers that cannot be reached are skipped.
    pub async fn create_tool_agent_with_mcp(
        &self,
        config: ExecutorConfig,
        name: impl Into<String>,
    ) -> Result<ToolAgent> {
        let agent_name = name.into();

        let Some(mcp_config) = &self.mcp_config else {
            info!("No MCP configuration found, creating regular tool agent");
            return Ok(self.create_tool_agent(config, agent_name));
        };
        if mcp_config.get_agent_config(&agent_name).is_none() {
            info!(agent = %agent_name, "No MCP configuration for agent, creating regular tool agent");
            return Ok(self.create_tool_agent(config, agent_name));
        }

        let manager = Arc::new(MCPClientManager::new(Arc::clone(mcp_config), agent_name.clone()));
        manager.initialize().await?;
        self.create_tool_agent_with_manager(config, agent_name, manager)
            .await
    }

    /// Agent using the local tools plus every tool `manager` exposes
    pub async fn create_tool_agent_with_manager(
        &self,
        config: ExecutorConfig,
        name: impl Into<String>,
        manager: Arc<MCPClientManager>,
    ) -> Result<ToolAgent> {
        let agent_name = name.into();

        let registry = ToolRegistry::new();
        registry.extend_from(&self.tool_registry)?;
        let count = discover_and_register_tools(Arc::clone(&manager), &registry).await?;
        info!(agent = %agent_name, count, total = registry.len(), "Registered MCP tools");

        let executor = self.executor(Arc::new(registry), config);
        Ok(ToolAgent::new(executor, agent_name).with_mcp_manager(manager))
    }
}

/// Builder for AgentRuntime
pub struct AgentRuntimeBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    tool_registry: Option<Arc<ToolRegistry>>,
    config: RuntimeConfig,
    mcp_config: Option<Arc<MCPConfig>>,
    event_handler: Option<Arc<dyn ExecutorEventHandler>>,
}

impl AgentRuntimeBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tool_registry: None,
            config: RuntimeConfig::default(),
            mcp_config: None,
            event_handler: None,
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = Some(registry);
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn executor_config(mut self, config: ExecutorConfig) -> Self {
        self.config.executor = config;
        self
    }

    pub fn mcp_config(mut self, config: Arc<MCPConfig>) -> Self {
        self.mcp_config = Some(config);
        self
    }

    pub fn event_handler(mut self, handler: Arc<dyn ExecutorEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Load MCP configuration from file
    pub fn mcp_config_from_file(mut self, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config = MCPConfig::from_file(&path)?;
        self.config.mcp_config_path = Some(path);
        self.mcp_config = Some(Arc::new(config));
        Ok(self)
    }

    pub fn build(self) -> Result<AgentRuntime> {
        let provider = self
            .provider
            .ok_or_else(|| Error::InitializationFailed("Provider not set".to_string()))?;

        let tool_registry = self
            .tool_registry
            .unwrap_or_else(|| Arc::new(ToolRegistry::new()));

        let runtime = AgentRuntime::new(provider, tool_registry, self.config, self.mcp_config);
        Ok(match self.event_handler {
            Some(handler) => runtime.with_event_handler(handler),
            None => runtime,
        })
    }
}

impl Default for AgentRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

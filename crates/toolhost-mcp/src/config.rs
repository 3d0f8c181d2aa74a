//! Configuration types for MCP integration
//!
//! Loaded from `.mcp.json` files. Only the stdio transport is supported.

use crate::error::MCPError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Name of the agent configuration used when no specific one exists
pub const DEFAULT_AGENT: &str = "default";

static ENV_REF: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)").ok()
});

/// Root MCP configuration
///
/// # Example
///
/// ```json
/// {
///   "mcpServers": {
///     "weather": {
///       "command": "toolhost",
///       "args": ["mcp-server"]
///     }
///   },
///   "agentConfigurations": {
///     "default": {
///       "mcpServers": ["weather"],
///       "tools": {"allow": "*", "deny": ["get_forecast"]}
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MCPConfig {
    #[serde(default)]
    pub mcp_servers: HashMap<String, MCPServerConfig>,

    #[serde(default)]
    pub agent_configurations: HashMap<String, AgentMCPConfig>,
}

/// Transport kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Stdio,
}

/// A server launched as a child process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MCPServerConfig {
    #[serde(default)]
    pub transport: Transport,

    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub env: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

impl MCPServerConfig {
    pub fn stdio(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            transport: Transport::Stdio,
            command: command.into(),
            args,
            env: HashMap::new(),
            cwd: None,
        }
    }
}

/// Which servers an agent uses and which of their tools it sees
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMCPConfig {
    /// Keys into `mcpServers`
    pub mcp_servers: Vec<String>,

    #[serde(default)]
    pub tools: ToolFilter,
}

/// Allow/deny lists for remote tools; deny wins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolFilter {
    #[serde(default = "default_allow_all")]
    pub allow: ToolPattern,

    #[serde(default)]
    pub deny: Vec<String>,
}

impl Default for ToolFilter {
    fn default() -> Self {
        Self {
            allow: default_allow_all(),
            deny: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolPattern {
    /// `"*"`
    All(String),
    List(Vec<String>),
}

fn default_allow_all() -> ToolPattern {
    ToolPattern::All("*".to_string())
}

impl MCPConfig {
    /// Load configuration from a file, expanding `${VAR}` and `$VAR`
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, MCPError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            MCPError::ConfigError(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, MCPError> {
        let mut config: MCPConfig = serde_json::from_str(content)
            .map_err(|e| MCPError::ConfigError(format!("Failed to parse config: {e}")))?;
        config.resolve_env_vars()?;
        Ok(config)
    }

    /// One stdio server used by the default agent configuration
    pub fn single_stdio(server_name: &str, command: impl Into<String>, args: Vec<String>) -> Self {
        let mut config = Self::default();
        config.mcp_servers.insert(
            server_name.to_string(),
            MCPServerConfig::stdio(command, args),
        );
        config.agent_configurations.insert(
            DEFAULT_AGENT.to_string(),
            AgentMCPConfig {
                mcp_servers: vec![server_name.to_string()],
                tools: ToolFilter::default(),
            },
        );
        config
    }

    /// Merge another config into this one; `other` wins on conflicts
    pub fn merge(&mut self, other: MCPConfig) {
        self.mcp_servers.extend(other.mcp_servers);
        self.agent_configurations.extend(other.agent_configurations);
    }

    /// Configuration for `agent_name`, or the `default` one
    pub fn get_agent_config(&self, agent_name: &str) -> Option<&AgentMCPConfig> {
        self.agent_configurations
            .get(agent_name)
            .or_else(|| self.agent_configurations.get(DEFAULT_AGENT))
    }

    pub fn resolve_env_vars(&mut self) -> Result<(), MCPError> {
        self.resolve_env_vars_with(|name| std::env::var(name).ok())
    }

    /// Expand variable references using `lookup`
    pub fn resolve_env_vars_with<F>(&mut self, lookup: F) -> Result<(), MCPError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for server in self.mcp_servers.values_mut() {
            server.command = resolve_env_with(&server.command, &lookup)?;
            for arg in &mut server.args {
                *arg = resolve_env_with(arg, &lookup)?;
            }
            for value in server.env.values_mut() {
                *value = resolve_env_with(value, &lookup)?;
            }
            if let Some(cwd) = &mut server.cwd {
                *cwd = PathBuf::from(resolve_env_with(&cwd.to_string_lossy(), &lookup)?);
            }
        }
        Ok(())
    }
}

/// Expand `${VAR}` and `$VAR` from the process environment
pub fn resolve_env_string(s: &str) -> Result<String, MCPError> {
    resolve_env_with(s, |name| std::env::var(name).ok())
}

/// Expand `${VAR}` and `$VAR` using `lookup`; unknown variables are errors
pub fn resolve_env_with<F>(s: &str, lookup: F) -> Result<String, MCPError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(re) = ENV_REF.as_ref() else {
        return Ok(s.to_string());
    };

    let mut result = String::with_capacity(s.len());
    let mut last = 0;
    for caps in re.captures_iter(s) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(name) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        let value = lookup(name.as_str())
            .ok_or_else(|| MCPError::EnvVarNotFound(name.as_str().to_string()))?;
        result.push_str(&s[last..whole.start()]);
        result.push_str(&value);
        last = whole.end();
    }
    result.push_str(&s[last..]);
    Ok(result)
}

/// Check if a tool should be included based on allow/deny rules
pub fn should_include_tool(tool_name: &str, config: &AgentMCPConfig) -> bool {
    if config.tools.deny.iter().any(|d| d == tool_name) {
        return false;
    }
    match &config.tools.allow {
        ToolPattern::All(pattern) => pattern == "*",
        ToolPattern::List(allowed) => allowed.iter().any(|a| a == tool_name),
    }
}

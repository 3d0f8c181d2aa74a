//! Stdio transport MCP client
//!
//! Spawns the server as a child process and speaks newline-delimited
//! JSON-RPC over its stdin/stdout. The child's stderr is inherited so
//! server logs stay visible.

use super::{MCPClient, StreamMCPClient};
use crate::Result;
use crate::config::MCPServerConfig;
use crate::error::MCPError;
use crate::protocol::{
    MCPResourceContent, MCPResourceDefinition, MCPServerInfo, MCPToolDefinition, MCPToolResult,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// How long a child gets to exit after its stdin closes
const EXIT_GRACE: Duration = Duration::from_secs(2);

/// MCP client using stdio transport
pub struct StdioMCPClient {
    command: String,
    args: Vec<String>,
    env: HashMap<String, String>,
    cwd: Option<PathBuf>,

    child: Mutex<Option<Child>>,
    session: std::sync::Mutex<Option<Arc<StreamMCPClient>>>,
    closed: AtomicBool,
}

impl StdioMCPClient {
    pub fn new(
        command: impl Into<String>,
        args: Vec<String>,
        env: HashMap<String, String>,
        cwd: Option<PathBuf>,
    ) -> Self {
        Self {
            command: command.into(),
            args,
            env,
            cwd,
            child: Mutex::new(None),
            session: std::sync::Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &MCPServerConfig) -> Self {
        Self::new(
            config.command.clone(),
            config.args.clone(),
            config.env.clone(),
            config.cwd.clone(),
        )
    }

    fn session(&self) -> Result<Arc<StreamMCPClient>> {
        self.session
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
            .ok_or(MCPError::NotConnected)
    }

    fn spawn(&self) -> Result<(Child, StreamMCPClient)> {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .envs(&self.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }

        let mut child = cmd.spawn().map_err(|e| {
            MCPError::ConnectionFailed(format!("failed to spawn '{}': {e}", self.command))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| MCPError::ConnectionFailed("child stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MCPError::ConnectionFailed("child stdout unavailable".to_string()))?;

        Ok((child, StreamMCPClient::new(stdout, stdin)))
    }

    async fn stop_child(&self) {
        let Some(mut child) = self.child.lock().await.take() else {
            return;
        };
        match tokio::time::timeout(EXIT_GRACE, child.wait()).await {
            Ok(Ok(status)) => debug!(command = %self.command, %status, "MCP server exited"),
            Ok(Err(e)) => warn!(command = %self.command, error = %e, "Failed to wait for MCP server"),
            Err(_) => {
                warn!(command = %self.command, "MCP server did not exit, killing it");
                if let Err(e) = child.kill().await {
                    warn!(command = %self.command, error = %e, "Failed to kill MCP server");
                }
            }
        }
    }
}

#[async_trait]
impl MCPClient for StdioMCPClient {
    async fn connect(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(MCPError::ConnectionFailed(
                "session is closed and cannot be reopened".to_string(),
            ));
        }
        if self.is_connected() {
            return Ok(());
        }

        info!(command = %self.command, args = ?self.args, "Starting MCP server process");
        let (child, stream) = self.spawn().inspect_err(|_| {
            self.closed.store(true, Ordering::SeqCst);
        })?;
        *self.child.lock().await = Some(child);

        if let Err(e) = stream.connect().await {
            self.closed.store(true, Ordering::SeqCst);
            let _ = stream.disconnect().await;
            if let Some(mut child) = self.child.lock().await.take() {
                let _ = child.kill().await;
            }
            return Err(e);
        }

        *self
            .session
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(Arc::new(stream));
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .is_some_and(|s| s.is_connected())
    }

    async fn disconnect(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        let session = self
            .session
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if let Some(session) = session {
            session.disconnect().await?;
        }
        self.stop_child().await;
        Ok(())
    }

    async fn list_tools(&self) -> Result<Vec<MCPToolDefinition>> {
        self.session()?.list_tools().await
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<MCPToolResult> {
        self.session()?.call_tool(name, arguments).await
    }

    async fn list_resources(&self) -> Result<Vec<MCPResourceDefinition>> {
        self.session()?.list_resources().await
    }

    async fn read_resource(&self, uri: &str) -> Result<Vec<MCPResourceContent>> {
        self.session()?.read_resource(uri).await
    }

    async fn server_info(&self) -> Option<MCPServerInfo> {
        let session = self.session().ok()?;
        session.server_info().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_failure_is_connection_error() {
        let client = StdioMCPClient::new(
            "definitely-not-a-real-mcp-server",
            vec![],
            HashMap::new(),
            None,
        );
        let err = client.connect().await.unwrap_err();
        assert!(matches!(err, MCPError::ConnectionFailed(_)));
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_not_connected_before_connect() {
        let client = StdioMCPClient::new("cat", vec![], HashMap::new(), None);
        assert!(matches!(
            client.list_tools().await,
            Err(MCPError::NotConnected)
        ));
        assert!(client.server_info().await.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_mcp_process_fails_and_stays_closed() {
        // `true` exits immediately, so the handshake sees end-of-stream
        let client = StdioMCPClient::new("true", vec![], HashMap::new(), None);
        assert!(client.connect().await.is_err());
        assert!(!client.is_connected());

        let err = client.connect().await.unwrap_err();
        assert!(matches!(err, MCPError::ConnectionFailed(_)));
    }
}

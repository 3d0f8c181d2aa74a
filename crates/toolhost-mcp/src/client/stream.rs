//! MCP client over any async reader/writer pair

use super::{CLIENT_NAME, MCPClient};
use crate::Result;
use crate::error::MCPError;
use crate::protocol::{
    InitializeResult, MCPResourceContent, MCPResourceDefinition, MCPServerInfo,
    MCPToolDefinition, MCPToolResult, PROTOCOL_VERSION, SUPPORTED_PROTOCOL_VERSIONS,
    is_supported_version, methods,
};
use crate::transport::JsonRpcChannel;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    New,
    Connected,
    Closed,
}

/// MCP client speaking over an already-open byte stream
///
/// Used directly for in-process servers and wrapped by
/// [`StdioMCPClient`](super::StdioMCPClient) for child processes.
pub struct StreamMCPClient {
    channel: JsonRpcChannel,
    state: std::sync::Mutex<State>,
    server_info: Mutex<Option<MCPServerInfo>>,
    closing: AtomicBool,
}

#[derive(Deserialize)]
struct ToolsPage {
    tools: Vec<MCPToolDefinition>,
    #[serde(default, rename = "nextCursor")]
    next_cursor: Option<String>,
}

#[derive(Deserialize)]
struct ResourcesPage {
    resources: Vec<MCPResourceDefinition>,
    #[serde(default, rename = "nextCursor")]
    next_cursor: Option<String>,
}

#[derive(Deserialize)]
struct ReadResult {
    contents: Vec<MCPResourceContent>,
}

/// Pagination state for the `*/list` methods
///
/// A server that hands back a cursor it already gave would otherwise be
/// polled forever.
#[derive(Default)]
struct Cursors {
    current: Option<String>,
    seen: HashSet<String>,
}

impl Cursors {
    fn params(&self) -> Value {
        self.current
            .as_ref()
            .map_or_else(|| json!({}), |c| json!({"cursor": c}))
    }

    /// Move to `next`; `Ok(false)` once the listing is complete
    fn advance(&mut self, method: &str, next: Option<String>) -> Result<bool> {
        let Some(next) = next else {
            return Ok(false);
        };
        if !self.seen.insert(next.clone()) {
            return Err(MCPError::RequestFailed(format!(
                "{method}: server repeated pagination cursor '{next}'"
            )));
        }
        self.current = Some(next);
        Ok(true)
    }
}

impl StreamMCPClient {
    pub fn new<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            channel: JsonRpcChannel::new(reader, writer),
            state: std::sync::Mutex::new(State::New),
            server_info: Mutex::new(None),
            closing: AtomicBool::new(false),
        }
    }

    fn state(&self) -> State {
        *self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn set_state(&self, state: State) {
        *self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = state;
    }

    /// Send a request on a connected session; fatal errors close it
    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        if self.state() != State::Connected {
            return Err(MCPError::NotConnected);
        }
        match self.channel.request(method, params).await {
            Ok(result) => serde_json::from_value(result).map_err(|e| {
                MCPError::RequestFailed(format!("{method}: failed to parse result: {e}"))
            }),
            Err(e) => {
                if e.is_fatal() {
                    warn!(method, error = %e, "MCP session lost");
                    self.set_state(State::Closed);
                }
                Err(e)
            }
        }
    }

    async fn handshake(&self) -> Result<MCPServerInfo> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": CLIENT_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            }
        });

        let result = self
            .channel
            .request(methods::INITIALIZE, params)
            .await
            .map_err(|e| match e {
                MCPError::Rpc { .. } | MCPError::RequestFailed(_) => {
                    MCPError::InitializationFailed(e.to_string())
                }
                other => other,
            })?;

        let version = result
            .get("protocolVersion")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if !is_supported_version(&version) {
            return Err(MCPError::ProtocolMismatch {
                server: version,
                supported: SUPPORTED_PROTOCOL_VERSIONS.join(", "),
            });
        }

        let init: InitializeResult = serde_json::from_value(result).map_err(|e| {
            MCPError::InitializationFailed(format!("invalid initialize result: {e}"))
        })?;

        self.channel.notify(methods::INITIALIZED, None).await?;
        Ok(MCPServerInfo::new(init, version))
    }
}

#[async_trait]
impl MCPClient for StreamMCPClient {
    async fn connect(&self) -> Result<()> {
        match self.state() {
            State::Connected => return Ok(()),
            State::Closed => {
                return Err(MCPError::ConnectionFailed(
                    "session is closed and cannot be reopened".to_string(),
                ));
            }
            State::New => {}
        }

        match self.handshake().await {
            Ok(server_info) => {
                info!(
                    server = %server_info.name,
                    version = %server_info.version,
                    protocol = %server_info.protocol_version,
                    "Connected to MCP server"
                );
                *self.server_info.lock().await = Some(server_info);
                self.set_state(State::Connected);
                Ok(())
            }
            Err(e) => {
                self.set_state(State::Closed);
                let _ = self.channel.close().await;
                Err(e)
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.state() == State::Connected
    }

    async fn disconnect(&self) -> Result<()> {
        if self.closing.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        debug!("Closing MCP session");
        self.set_state(State::Closed);
        // Peer may already be gone
        let _ = self.channel.close().await;
        Ok(())
    }

    async fn list_tools(&self) -> Result<Vec<MCPToolDefinition>> {
        let mut tools = Vec::new();
        let mut cursors = Cursors::default();
        loop {
            let params = cursors.params();
            let page: ToolsPage = self.request(methods::TOOLS_LIST, params).await?;
            tools.extend(page.tools);
            if !cursors.advance(methods::TOOLS_LIST, page.next_cursor)? {
                return Ok(tools);
            }
        }
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<MCPToolResult> {
        self.request(
            methods::TOOLS_CALL,
            json!({"name": name, "arguments": arguments}),
        )
        .await
    }

    async fn list_resources(&self) -> Result<Vec<MCPResourceDefinition>> {
        let mut resources = Vec::new();
        let mut cursors = Cursors::default();
        loop {
            let params = cursors.params();
            let page: ResourcesPage = self.request(methods::RESOURCES_LIST, params).await?;
            resources.extend(page.resources);
            if !cursors.advance(methods::RESOURCES_LIST, page.next_cursor)? {
                return Ok(resources);
            }
        }
    }

    async fn read_resource(&self, uri: &str) -> Result<Vec<MCPResourceContent>> {
        let result: ReadResult = self
            .request(methods::RESOURCES_READ, json!({"uri": uri}))
            .await
            .map_err(|e| match e {
                MCPError::Rpc { code, .. }
                    if code == crate::protocol::error_codes::RESOURCE_NOT_FOUND =>
                {
                    MCPError::ResourceNotFound(uri.to_string())
                }
                other => other,
            })?;
        Ok(result.contents)
    }

    async fn server_info(&self) -> Option<MCPServerInfo> {
        self.server_info.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursors_stop_on_repeat() {
        let mut cursors = Cursors::default();
        assert_eq!(cursors.params(), json!({}));

        assert!(cursors.advance("tools/list", Some("p2".to_string())).unwrap());
        assert_eq!(cursors.params(), json!({"cursor": "p2"}));
        assert!(cursors.advance("tools/list", Some("p3".to_string())).unwrap());

        let err = cursors
            .advance("tools/list", Some("p2".to_string()))
            .unwrap_err();
        assert!(matches!(err, MCPError::RequestFailed(ref msg) if msg.contains("p2")));
        assert!(!cursors.advance("tools/list", None).unwrap());
    }
}

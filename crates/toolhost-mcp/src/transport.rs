//! Newline-delimited JSON-RPC over an async byte stream
//!
//! MCP's stdio transport: each message is one line of JSON. The same
//! framing works over child-process pipes and in-memory duplex streams.

use crate::Result;
use crate::error::MCPError;
use crate::protocol::{JSONRPC_VERSION, JsonRpcResponse};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

type BoxedReader = Box<dyn tokio::io::AsyncBufRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Write one JSON value followed by a newline, then flush
pub async fn write_json_line<W, T>(writer: &mut W, message: &T) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
    T: Serialize,
{
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await
}

/// Request/response channel for the client side of a session
///
/// Requests are serialized: the reader lock is held from sending a request
/// until its response arrives. Lines that are not the awaited response
/// (server notifications, stray output) are skipped.
pub struct JsonRpcChannel {
    reader: Mutex<BoxedReader>,
    writer: Mutex<BoxedWriter>,
    next_id: AtomicU64,
}

impl JsonRpcChannel {
    pub fn new<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            reader: Mutex::new(Box::new(BufReader::new(reader))),
            writer: Mutex::new(Box::new(writer)),
            next_id: AtomicU64::new(1),
        }
    }

    /// Send a request and wait for the matching response's `result`
    pub async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut reader = self.reader.lock().await;

        debug!(method, id, "Sending request");
        self.send(&json!({
            "jsonrpc": JSONRPC_VERSION,
            "id": id,
            "method": method,
            "params": params,
        }))
        .await?;

        let mut line = String::new();
        loop {
            line.clear();
            let read = reader
                .read_line(&mut line)
                .await
                .map_err(|e| MCPError::ConnectionFailed(e.to_string()))?;
            if read == 0 {
                return Err(MCPError::ConnectionFailed(
                    "Server closed connection".to_string(),
                ));
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let message: Value = match serde_json::from_str(trimmed) {
                Ok(message) => message,
                Err(e) => {
                    warn!(error = %e, "Skipping non-JSON line from server");
                    continue;
                }
            };

            let is_response = message.get("method").is_none()
                && message.get("id").and_then(Value::as_u64) == Some(id);
            if !is_response {
                trace!(%message, "Skipping unrelated message");
                continue;
            }

            let response: JsonRpcResponse = serde_json::from_value(message)?;
            if let Some(error) = response.error {
                return Err(MCPError::Rpc {
                    code: error.code,
                    message: format!("{method}: {}", error.message),
                });
            }
            debug!(method, id, "Received response");
            return response
                .result
                .ok_or_else(|| MCPError::RequestFailed(format!("{method}: no result in response")));
        }
    }

    /// Send a notification (no response expected)
    pub async fn notify(&self, method: &str, params: Option<Value>) -> Result<()> {
        let mut message = json!({"jsonrpc": JSONRPC_VERSION, "method": method});
        if let Some(params) = params {
            message["params"] = params;
        }
        self.send(&message).await
    }

    /// Close the write half so the peer sees end-of-stream
    pub async fn close(&self) -> Result<()> {
        let mut writer = self.writer.lock().await;
        writer.shutdown().await?;
        Ok(())
    }

    async fn send(&self, message: &Value) -> Result<()> {
        let mut writer = self.writer.lock().await;
        write_json_line(&mut *writer, message)
            .await
            .map_err(|e| MCPError::ConnectionFailed(e.to_string()))
    }
}

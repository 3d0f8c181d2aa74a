//! MCP server exposing local tools and resources
//!
//! Tools are the same [`Tool`] values an agent registers locally, so any
//! capability can be served remotely without changes. Framing, the
//! handshake and JSON-RPC error replies are handled by `rmcp`.

mod resource;

pub use resource::{FnResource, Resource};

use crate::Result;
use crate::error::MCPError;
use rmcp::model::{
    AnnotateAble, CallToolRequestParam, CallToolResult, Content, Implementation,
    InitializeRequestParam, JsonObject, ListResourcesResult, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, RawResource, ReadResourceRequestParam,
    ReadResourceResult, ResourceContents, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler, ServiceExt};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use toolhost_core::Error;
use toolhost_tools::{Tool, ToolRegistry};
use tracing::{debug, info, warn};

/// Builder for [`McpServer`]
pub struct McpServerBuilder {
    name: String,
    version: String,
    instructions: Option<String>,
    tools: Vec<Arc<dyn Tool>>,
    resources: Vec<Arc<dyn Resource>>,
}

impl McpServerBuilder {
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Usage hints sent to clients in the `initialize` result
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn resource(mut self, resource: Arc<dyn Resource>) -> Self {
        self.resources.push(resource);
        self
    }

    /// Fails on duplicate tool names or resource URIs
    pub fn build(self) -> Result<McpServer> {
        let registry = ToolRegistry::new();
        registry
            .register_all(self.tools)
            .map_err(|e| MCPError::ConfigError(e.to_string()))?;

        let mut resources = BTreeMap::new();
        for resource in self.resources {
            let uri = resource.uri().to_string();
            if resources.insert(uri.clone(), resource).is_some() {
                return Err(MCPError::ConfigError(format!(
                    "Resource already registered: {uri}"
                )));
            }
        }

        Ok(McpServer {
            name: self.name,
            version: self.version,
            instructions: self.instructions,
            tools: Arc::new(registry),
            resources: Arc::new(resources),
        })
    }
}

/// MCP server over a byte stream
///
/// Cloning is cheap; every session shares the same tools and resources.
#[derive(Clone)]
pub struct McpServer {
    name: String,
    version: String,
    instructions: Option<String>,
    tools: Arc<ToolRegistry>,
    resources: Arc<BTreeMap<String, Arc<dyn Resource>>>,
}

impl McpServer {
    pub fn builder(name: impl Into<String>) -> McpServerBuilder {
        McpServerBuilder {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            instructions: None,
            tools: Vec::new(),
            resources: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.names()
    }

    pub fn resource_uris(&self) -> Vec<String> {
        self.resources.keys().cloned().collect()
    }

    /// Serve stdin/stdout until stdin closes
    pub async fn serve_stdio(&self) -> Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve one session until the reader reaches end-of-stream
    ///
    /// Nothing but protocol messages is written to `writer`.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        info!(
            server = %self.name,
            tools = self.tools.len(),
            resources = self.resources.len(),
            "MCP server started"
        );

        let running = ServiceExt::serve(self.clone(), (reader, writer))
            .await
            .map_err(|e| MCPError::InitializationFailed(e.to_string()))?;
        let reason = running
            .waiting()
            .await
            .map_err(|e| MCPError::ConnectionFailed(e.to_string()))?;

        info!(server = %self.name, ?reason, "MCP client disconnected");
        Ok(())
    }

    /// `tools/list` entries, sorted by name
    pub fn tool_definitions(&self) -> Vec<rmcp::model::Tool> {
        self.tools
            .list_tools()
            .iter()
            .map(|tool| {
                rmcp::model::Tool::new(
                    tool.name().to_string(),
                    tool.description().to_string(),
                    Arc::new(schema_object(tool.input_schema())),
                )
            })
            .collect()
    }

    /// Run one tool for a `tools/call` request
    ///
    /// Tool failures become `isError` results; only an unknown tool is a
    /// protocol error.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> std::result::Result<CallToolResult, ErrorData> {
        if !self.tools.contains(name) {
            return Err(ErrorData::invalid_params(
                format!("Unknown tool: {name}"),
                None,
            ));
        }

        let arguments = Value::Object(arguments.unwrap_or_default());
        match self.tools.execute(name, arguments).await {
            Ok(output) => Ok(output_to_result(output)),
            Err(e) => {
                warn!(tool = %name, error = %e, "Tool call failed");
                Ok(CallToolResult::error(vec![Content::text(error_text(&e))]))
            }
        }
    }

    /// `resources/list` entries, sorted by URI
    pub fn resource_definitions(&self) -> Vec<rmcp::model::Resource> {
        self.resources
            .values()
            .map(|r| {
                let mut raw = RawResource::new(r.uri(), r.name());
                raw.description = r.description().map(str::to_string);
                raw.mime_type = Some(r.mime_type().to_string());
                raw.no_annotation()
            })
            .collect()
    }

    pub async fn read(&self, uri: &str) -> std::result::Result<ReadResourceResult, ErrorData> {
        let resource = self.resources.get(uri).ok_or_else(|| {
            ErrorData::resource_not_found(format!("Resource not found: {uri}"), None)
        })?;

        let text = resource
            .read()
            .await
            .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;
        let mut contents = ResourceContents::text(text, uri);
        if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
            *mime_type = Some(resource.mime_type().to_string());
        }
        Ok(ReadResourceResult {
            contents: vec![contents],
        })
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_resources()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: self.name.clone(),
                version: self.version.clone(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: self.instructions.clone(),
        }
    }

    fn initialize(
        &self,
        request: InitializeRequestParam,
        context: RequestContext<RoleServer>,
    ) -> impl Future<Output = std::result::Result<ServerInfo, ErrorData>> + Send + '_ {
        let mut info = self.get_info();
        info.protocol_version = negotiate(&request.protocol_version);
        info!(
            client = %request.client_info.name,
            version = %request.client_info.version,
            "Client connected"
        );
        context.peer.set_peer_info(request);
        std::future::ready(Ok(info))
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = std::result::Result<ListToolsResult, ErrorData>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult::with_all_items(self.tool_definitions())))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = std::result::Result<CallToolResult, ErrorData>> + Send + '_ {
        async move {
            debug!(tool = %request.name, "Handling tools/call");
            self.call(&request.name, request.arguments).await
        }
    }

    fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = std::result::Result<ListResourcesResult, ErrorData>> + Send + '_
    {
        std::future::ready(Ok(ListResourcesResult::with_all_items(
            self.resource_definitions(),
        )))
    }

    fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = std::result::Result<ReadResourceResult, ErrorData>> + Send + '_
    {
        async move { self.read(&request.uri).await }
    }
}

/// The client's version when this server speaks it, otherwise the oldest one
fn negotiate(requested: &ProtocolVersion) -> ProtocolVersion {
    if *requested == ProtocolVersion::V_2025_03_26 {
        ProtocolVersion::V_2025_03_26
    } else {
        ProtocolVersion::V_2024_11_05
    }
}

fn schema_object(schema: Value) -> JsonObject {
    match schema {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}

/// Strings become one text block; other values also travel as structured content
fn output_to_result(output: Value) -> CallToolResult {
    match output {
        Value::String(text) => CallToolResult::success(vec![Content::text(text)]),
        other => {
            let mut result = CallToolResult::success(vec![Content::text(other.to_string())]);
            result.structured_content = Some(other);
            result
        }
    }
}

/// Message reported in an `isError` result
fn error_text(error: &Error) -> String {
    match error {
        Error::ToolFailed { message, .. } | Error::InvalidParameters { message, .. } => {
            message.clone()
        }
        other => other.to_string(),
    }
}

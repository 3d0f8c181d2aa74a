//! Registration of remote MCP tools into a local registry

use crate::Result;
use crate::client::manager::MCPClientManager;
use crate::tool::MCPTool;
use std::sync::Arc;
use toolhost_tools::ToolRegistry;
use tracing::{info, warn};

/// Discover the manager's tools and register each as an [`MCPTool`]
///
/// Allow/deny filtering is applied by the manager. A remote tool whose name
/// is already registered is skipped with a warning. Returns the number of
/// tools registered.
pub async fn discover_and_register_tools(
    manager: Arc<MCPClientManager>,
    registry: &ToolRegistry,
) -> Result<usize> {
    let tools = manager.discover_tools().await?;
    let mut registered = 0;

    for info in tools {
        let name = info.definition.name.clone();
        let server = info.server_name.clone();
        match registry.register(Arc::new(MCPTool::new(Arc::clone(&manager), info))) {
            Ok(()) => {
                registered += 1;
                info!(tool = %name, server = %server, "Registered MCP tool");
            }
            Err(e) => warn!(tool = %name, server = %server, error = %e, "Skipping MCP tool"),
        }
    }

    Ok(registered)
}

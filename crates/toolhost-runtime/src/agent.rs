//! Tool agent implementation (wraps AgentExecutor)

use crate::executor::{AgentExecutor, RunOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use toolhost_core::{Agent, Context, Result, RunUsage};
use toolhost_llm::Message;
use toolhost_mcp::MCPClientManager;
use tracing::{info, warn};

/// An agent that answers instructions with the LLM/tool loop
///
/// The conversation is kept between instructions, so follow-up questions can
/// refer to earlier answers. Instructions are handled one at a time.
///
/// # Example
///
/// ```no_run
/// use toolhost_core::{Agent, Context};
/// use toolhost_runtime::{AgentRuntime, ExecutorConfig};
///
/// # async fn example(runtime: AgentRuntime) -> toolhost_core::Result<()> {
/// let agent = runtime.create_tool_agent(ExecutorConfig::default(), "assistant");
///
/// let mut context = Context::new();
/// let answer = agent.process("What is 3 + 4?".to_string(), &mut context).await?;
/// println!("{answer} (tools: {:?})", context.tool_calls());
/// # Ok(())
/// # }
/// ```
pub struct ToolAgent {
    executor: AgentExecutor,
    name: String,
    history: Mutex<Vec<Message>>,
    mcp: Option<Arc<MCPClientManager>>,
}

impl ToolAgent {
    pub fn new(executor: AgentExecutor, name: impl Into<String>) -> Self {
        Self {
            executor,
            name: name.into(),
            history: Mutex::new(Vec::new()),
            mcp: None,
        }
    }

    /// Attach the MCP sessions backing some of this agent's tools
    pub fn with_mcp_manager(mut self, manager: Arc<MCPClientManager>) -> Self {
        self.mcp = Some(manager);
        self
    }

    pub fn executor(&self) -> &AgentExecutor {
        &self.executor
    }

    pub fn mcp_manager(&self) -> Option<&Arc<MCPClientManager>> {
        self.mcp.as_ref()
    }

    /// Conversation so far
    pub async fn history(&self) -> Vec<Message> {
        self.history.lock().await.clone()
    }

    pub async fn clear_history(&self) {
        self.history.lock().await.clear();
    }

    /// Answer one instruction and return the full outcome
    ///
    /// History is only extended when the run succeeds.
    pub async fn run(&self, input: impl Into<String>) -> Result<RunOutcome> {
        let mut history = self.history.lock().await;
        let outcome = self
            .executor
            .run_with_history(input, history.clone())
            .await?;
        history.clone_from(&outcome.messages);
        Ok(outcome)
    }
}

#[async_trait]
impl Agent for ToolAgent {
    async fn process(&self, input: String, context: &mut Context) -> Result<String> {
        context.reset_run();
        let outcome = self.run(input).await?;

        for name in &outcome.tool_calls {
            context.record_tool_call(name);
        }
        context.set_iterations(outcome.iterations);
        context.set_usage(RunUsage {
            input_tokens: outcome.usage.input_tokens,
            output_tokens: outcome.usage.output_tokens,
        });
        Ok(outcome.text)
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn shutdown(&mut self) -> Result<()> {
        if let Some(manager) = self.mcp.take() {
            info!(agent = %self.name, "Closing MCP sessions");
            if let Err(e) = manager.shutdown().await {
                warn!(agent = %self.name, error = %e, "Failed to close MCP sessions");
            }
        }
        Ok(())
    }
}

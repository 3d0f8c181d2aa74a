//! Agent executor for running agent loops
//!
//! The AgentExecutor implements the core agent loop pattern:
//! 1. Call the LLM with the conversation and the registry's tool definitions
//! 2. Check the stop reason
//! 3. If tool use was requested, execute the tools and loop back
//! 4. Otherwise return the final text

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use toolhost_core::{Error, Result};
use toolhost_llm::providers::anthropic::DEFAULT_MODEL;
use toolhost_llm::{
    CompletionRequest, ContentBlock, LLMProvider, Message, Role, StopReason, TokenUsage,
};
use toolhost_tools::ToolRegistry;
use tracing::{debug, info, warn};

/// Callbacks fired while an instruction is being answered
#[async_trait]
pub trait ExecutorEventHandler: Send + Sync {
    /// Called before a tool runs
    async fn on_tool_start(&self, _id: &str, _name: &str, _input: &Value) {}

    /// Called after a tool ran; `result` is the output or the error text
    async fn on_tool_done(
        &self,
        _id: &str,
        _name: &str,
        _result: std::result::Result<&Value, &str>,
        _duration_ms: u64,
    ) {
    }

    /// Called with the final answer
    async fn on_complete(&self, _result: &str) {}

    /// Called when the run fails
    async fn on_error(&self, _error: &str) {}
}

/// Event handler that ignores every event
pub struct NoOpEventHandler;

#[async_trait]
impl ExecutorEventHandler for NoOpEventHandler {}

/// Configuration for agent execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of model round-trips per instruction
    pub max_iterations: usize,

    pub model: String,

    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: u32,

    /// `None` leaves the provider default
    pub temperature: Option<f32>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            model: DEFAULT_MODEL.to_string(),
            system_prompt: None,
            max_tokens: 4096,
            temperature: None,
        }
    }
}

/// What one instruction produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Final assistant text
    pub text: String,
    /// The full conversation including this run's turns
    pub messages: Vec<Message>,
    /// Names of the tools invoked, in call order
    pub tool_calls: Vec<String>,
    /// Model round-trips used
    pub iterations: usize,
    pub usage: TokenUsage,
    pub stop_reason: StopReason,
}

/// Executes an agent loop: LLM → tool calls → execution → loop back
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
    event_handler: Option<Arc<dyn ExecutorEventHandler>>,
}

impl AgentExecutor {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
            event_handler: None,
        }
    }

    pub fn builder() -> AgentExecutorBuilder {
        AgentExecutorBuilder::new()
    }

    /// Set the event handler for receiving execution events
    pub fn with_event_handler(mut self, handler: Arc<dyn ExecutorEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    pub fn set_event_handler(&mut self, handler: Arc<dyn ExecutorEventHandler>) {
        self.event_handler = Some(handler);
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Answer a single message with no prior history
    pub async fn run(&self, user_message: impl Into<String>) -> Result<RunOutcome> {
        self.run_conversation(vec![Message::user(user_message)])
            .await
    }

    /// Answer `user_message` following `history`
    pub async fn run_with_history(
        &self,
        user_message: impl Into<String>,
        history: Vec<Message>,
    ) -> Result<RunOutcome> {
        let mut conversation = history;
        conversation.push(Message::user(user_message));
        self.run_conversation(conversation).await
    }

    /// Drive the loop until the model stops asking for tools
    ///
    /// Fails with [`Error::MaxIterations`] when the model is still requesting
    /// tools after `max_iterations` round-trips.
    pub async fn run_conversation(&self, conversation: Vec<Message>) -> Result<RunOutcome> {
        let result = self.drive(conversation).await;
        if let Some(handler) = &self.event_handler {
            match &result {
                Ok(outcome) => handler.on_complete(&outcome.text).await,
                Err(e) => handler.on_error(&e.to_string()).await,
            }
        }
        result
    }

    async fn drive(&self, mut conversation: Vec<Message>) -> Result<RunOutcome> {
        let definitions = self.tool_registry.definitions();
        let mut tool_calls = Vec::new();
        let mut usage = TokenUsage::default();

        for iteration in 1..=self.config.max_iterations {
            info!(
                iteration,
                max_iterations = self.config.max_iterations,
                "Agent iteration started"
            );

            let mut builder = CompletionRequest::builder(&self.config.model)
                .messages(conversation.clone())
                .max_tokens(self.config.max_tokens)
                .tools(definitions.clone());
            if let Some(system) = &self.config.system_prompt {
                builder = builder.system(system.clone());
            }
            if let Some(temperature) = self.config.temperature {
                builder = builder.temperature(temperature);
            }

            debug!(
                model = %self.config.model,
                tool_count = definitions.len(),
                "Sending request to LLM"
            );
            let response = self.provider.complete(builder.build()).await?;
            usage.add(response.usage);

            info!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );

            let message = response.message;
            conversation.push(message.clone());

            match response.stop_reason {
                StopReason::ToolUse if message.has_tool_uses() => {
                    let results = self.execute_tools(&message, &mut tool_calls).await;
                    conversation.push(Message::tool_results(results));
                }
                StopReason::ToolUse => {
                    warn!("Tool use requested without any tool calls, finishing");
                    return Ok(finish(
                        conversation,
                        tool_calls,
                        iteration,
                        usage,
                        StopReason::ToolUse,
                    ));
                }
                StopReason::MaxTokens => {
                    warn!("Response truncated at the token limit");
                    if message.has_tool_uses() {
                        // calls cut off mid-stream never get a result
                        warn!("Dropping unanswered tool calls from the truncated response");
                        conversation.pop();
                        conversation.extend(message.without_tool_uses());
                    }
                    return Ok(finish(
                        conversation,
                        tool_calls,
                        iteration,
                        usage,
                        StopReason::MaxTokens,
                    ));
                }
                reason @ (StopReason::EndTurn | StopReason::StopSequence) => {
                    info!(iteration, tool_calls = tool_calls.len(), "Agent completed");
                    return Ok(finish(conversation, tool_calls, iteration, usage, reason));
                }
            }
        }

        warn!(
            max_iterations = self.config.max_iterations,
            "Max iterations reached without a final answer"
        );
        Err(Error::MaxIterations(self.config.max_iterations))
    }

    /// Run every tool call in `message`, in order
    ///
    /// Failures, including unknown tools, become error results for the model.
    async fn execute_tools(
        &self,
        message: &Message,
        tool_calls: &mut Vec<String>,
    ) -> Vec<ContentBlock> {
        let mut results = Vec::new();

        for block in message.tool_uses() {
            let ContentBlock::ToolUse { id, name, input } = block else {
                continue;
            };
            tool_calls.push(name.clone());

            let input_preview: String = input.to_string().chars().take(500).collect();
            info!(tool_name = %name, tool_id = %id, input_preview = %input_preview, "Executing tool");
            if let Some(handler) = &self.event_handler {
                handler.on_tool_start(id, name, input).await;
            }

            let start = Instant::now();
            let outcome = self.tool_registry.execute(name, input.clone()).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match outcome {
                Ok(output) => {
                    let text = render_output(&output);
                    info!(
                        tool_name = %name,
                        duration_ms,
                        result_length = text.len(),
                        "Tool execution succeeded"
                    );
                    if let Some(handler) = &self.event_handler {
                        handler.on_tool_done(id, name, Ok(&output), duration_ms).await;
                    }
                    results.push(ContentBlock::tool_result(id.clone(), text));
                }
                Err(e) => {
                    let error = e.to_string();
                    warn!(tool_name = %name, duration_ms, error = %error, "Tool execution failed");
                    if let Some(handler) = &self.event_handler {
                        handler.on_tool_done(id, name, Err(&error), duration_ms).await;
                    }
                    results.push(ContentBlock::tool_error(id.clone(), format!("Error: {error}")));
                }
            }
        }

        results
    }
}

fn finish(
    messages: Vec<Message>,
    tool_calls: Vec<String>,
    iterations: usize,
    usage: TokenUsage,
    stop_reason: StopReason,
) -> RunOutcome {
    let text = messages
        .last()
        .filter(|m| m.role == Role::Assistant)
        .and_then(Message::text)
        .unwrap_or_default();
    RunOutcome {
        text,
        messages,
        tool_calls,
        iterations,
        usage,
        stop_reason,
    }
}

/// Text handed back to the model for a tool output
fn render_output(output: &Value) -> String {
    match output {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Builder for AgentExecutor
pub struct AgentExecutorBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
    event_handler: Option<Arc<dyn ExecutorEventHandler>>,
}

impl AgentExecutorBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tool_registry: Arc::new(ToolRegistry::new()),
            config: ExecutorConfig::default(),
            event_handler: None,
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = registry;
        self
    }

    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    pub fn event_handler(mut self, handler: Arc<dyn ExecutorEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    pub fn build(self) -> Result<AgentExecutor> {
        let provider = self
            .provider
            .ok_or_else(|| Error::InitializationFailed("Provider not set".to_string()))?;
        if self.config.max_iterations == 0 {
            return Err(Error::Config("max_iterations must be greater than 0".to_string()));
        }

        let mut executor = AgentExecutor::new(provider, self.tool_registry, self.config);
        executor.event_handler = self.event_handler;
        Ok(executor)
    }
}

impl Default for AgentExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! Agent host for toolhost
//!
//! - [`AgentExecutor`]: the loop that lets the model call registered tools
//!   until it produces a final answer
//! - [`ToolAgent`]: an [`toolhost_core::Agent`] backed by an executor, with
//!   conversation history and optional MCP sessions
//! - [`AgentRuntime`]: shared provider, tools and MCP configuration

pub mod agent;
pub mod executor;
pub mod runtime;

pub use agent::ToolAgent;
pub use executor::{
    AgentExecutor, AgentExecutorBuilder, ExecutorConfig, ExecutorEventHandler, NoOpEventHandler,
    RunOutcome,
};
pub use runtime::{AgentRuntime, AgentRuntimeBuilder, RuntimeConfig};

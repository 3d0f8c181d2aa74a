//! LLM provider abstraction layer for toolhost
//!
//! Provider-agnostic types for talking to a language model that can request
//! tool invocations:
//!
//! - Message types, including tool use and tool result blocks
//! - Completion request/response types
//! - Tool definitions advertised to the model
//! - The [`LLMProvider`] trait and concrete providers (behind feature flags)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod tools;

pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::LLMProvider;
pub use tools::ToolDefinition;

#[cfg(any(feature = "anthropic", feature = "openai"))]
pub mod providers;

//! Error types for toolhost-core

use thiserror::Error;

/// Result type alias for toolhost-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type shared by agents, tools and the runtime
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Agent initialization failed
    #[error("Agent initialization failed: {0}")]
    InitializationFailed(String),

    /// Agent processing failed
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),

    /// No tool with this name is registered
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// A tool with this name is already registered
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    /// Tool input did not match its schema
    #[error("Invalid parameters for tool '{tool}': {message}")]
    InvalidParameters { tool: String, message: String },

    /// Tool ran but reported a failure
    #[error("Tool '{tool}' failed: {message}")]
    ToolFailed { tool: String, message: String },

    /// Language-model backend error
    #[error("LLM error: {0}")]
    Llm(String),

    /// The agent loop did not finish within its iteration limit
    #[error("Exceeded maximum iterations ({0}) without a final answer")]
    MaxIterations(usize),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidParameters`]
    pub fn invalid_parameters(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::ToolFailed`]
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_parameters("add_numbers", "missing field `a`");
        assert_eq!(
            err.to_string(),
            "Invalid parameters for tool 'add_numbers': missing field `a`"
        );
        assert_eq!(
            Error::MaxIterations(3).to_string(),
            "Exceeded maximum iterations (3) without a final answer"
        );
    }
}

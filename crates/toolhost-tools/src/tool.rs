//! Tool trait definition

use async_trait::async_trait;
use serde_json::Value;
use toolhost_core::Result;
use toolhost_llm::ToolDefinition;

/// Trait for tools that agents can execute
///
/// Each tool provides a name, a description the model reads when deciding
/// whether to call it, and a JSON Schema for its input.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with given parameters
    ///
    /// `params` should match [`Tool::input_schema`]. Implementations report
    /// malformed input as [`toolhost_core::Error::InvalidParameters`].
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Get the tool's name
    ///
    /// Must be unique within a ToolRegistry
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Get the tool's input schema (JSON Schema format)
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    ///
    /// let schema = json!({
    ///     "type": "object",
    ///     "properties": {
    ///         "a": { "type": "integer" },
    ///         "b": { "type": "integer" }
    ///     },
    ///     "required": ["a", "b"]
    /// });
    /// ```
    fn input_schema(&self) -> Value;

    /// Definition advertised to the model
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.input_schema())
    }
}

//! Per-instruction execution context
//!
//! A [`Context`] travels with each instruction. Callers use it to pass
//! settings in (session id, timezone); agent hosts use it to report what
//! happened during the run (tools invoked, iterations, token usage).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known context keys
pub mod keys {
    /// Session ID for tracking
    pub const SESSION_ID: &str = "session_id";
    /// Timezone label used when formatting times
    pub const TIMEZONE: &str = "timezone";
    /// Names of the tools invoked during the last run, in call order
    pub const TOOL_CALLS: &str = "tool_calls";
    /// Number of model round-trips in the last run
    pub const ITERATIONS: &str = "iterations";
    /// Token usage of the last run
    pub const USAGE: &str = "usage";
}

/// Token counts reported back through the context
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Context passed to agents during execution
///
/// # Example
///
/// ```
/// use toolhost_core::Context;
///
/// let mut ctx = Context::new().with_session_id("session-123");
/// ctx.record_tool_call("get_weather");
///
/// assert_eq!(ctx.session_id(), Some("session-123"));
/// assert_eq!(ctx.tool_calls(), vec!["get_weather".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    data: HashMap<String, serde_json::Value>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session ID
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.insert(keys::SESSION_ID, serde_json::json!(session_id.into()));
        self
    }

    /// Set the timezone label
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.insert(keys::TIMEZONE, serde_json::json!(timezone.into()));
        self
    }

    pub fn session_id(&self) -> Option<&str> {
        self.get(keys::SESSION_ID).and_then(|v| v.as_str())
    }

    pub fn timezone(&self) -> Option<&str> {
        self.get(keys::TIMEZONE).and_then(|v| v.as_str())
    }

    // =========== Run Metadata ===========

    /// Forget metadata from a previous run
    pub fn reset_run(&mut self) {
        self.data.remove(keys::TOOL_CALLS);
        self.data.remove(keys::ITERATIONS);
        self.data.remove(keys::USAGE);
    }

    /// Append a tool name to the list of invoked tools
    pub fn record_tool_call(&mut self, name: &str) {
        let entry = self
            .data
            .entry(keys::TOOL_CALLS.to_string())
            .or_insert_with(|| serde_json::Value::Array(Vec::new()));
        if let serde_json::Value::Array(calls) = entry {
            calls.push(serde_json::json!(name));
        } else {
            *entry = serde_json::json!([name]);
        }
    }

    /// Tools invoked during the last run
    pub fn tool_calls(&self) -> Vec<String> {
        self.get(keys::TOOL_CALLS)
            .and_then(|v| v.as_array())
            .map(|calls| {
                calls
                    .iter()
                    .filter_map(|c| c.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set_iterations(&mut self, iterations: usize) {
        self.insert(keys::ITERATIONS, serde_json::json!(iterations));
    }

    pub fn iterations(&self) -> Option<usize> {
        self.get(keys::ITERATIONS)
            .and_then(serde_json::Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
    }

    pub fn set_usage(&mut self, usage: RunUsage) {
        self.insert(
            keys::USAGE,
            serde_json::json!({
                "input_tokens": usage.input_tokens,
                "output_tokens": usage.output_tokens,
            }),
        );
    }

    pub fn usage(&self) -> Option<RunUsage> {
        self.get_typed(keys::USAGE).ok().flatten()
    }

    // =========== Generic Key-Value Operations ===========

    /// Insert a value into the context
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the context
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Insert a typed value into the context
    pub fn insert_typed<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> crate::Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| {
            crate::Error::ProcessingFailed(format!("Failed to serialize context value: {e}"))
        })?;
        self.data.insert(key.into(), json_value);
        Ok(())
    }

    /// Get a typed value from the context
    pub fn get_typed<T: for<'de> Deserialize<'de>>(&self, key: &str) -> crate::Result<Option<T>> {
        match self.data.get(key) {
            None => Ok(None),
            Some(value) => {
                let typed = serde_json::from_value(value.clone()).map_err(|e| {
                    crate::Error::ProcessingFailed(format!(
                        "Failed to deserialize context value: {e}"
                    ))
                })?;
                Ok(Some(typed))
            }
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_basic() {
        let mut ctx = Context::new();
        assert!(ctx.is_empty());

        ctx.insert("key", serde_json::json!("value"));
        assert_eq!(ctx.len(), 1);
        assert!(ctx.contains_key("key"));

        ctx.remove("key");
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_builder_chain() {
        let ctx = Context::new()
            .with_session_id("sess-123")
            .with_timezone("Asia/Tokyo");

        assert_eq!(ctx.session_id(), Some("sess-123"));
        assert_eq!(ctx.timezone(), Some("Asia/Tokyo"));
    }

    #[test]
    fn test_tool_calls_keep_order() {
        let mut ctx = Context::new();
        assert!(ctx.tool_calls().is_empty());

        ctx.record_tool_call("add_numbers");
        ctx.record_tool_call("multiply_numbers");
        ctx.record_tool_call("add_numbers");

        assert_eq!(
            ctx.tool_calls(),
            vec!["add_numbers", "multiply_numbers", "add_numbers"]
        );
    }

    #[test]
    fn test_reset_run_keeps_settings() {
        let mut ctx = Context::new().with_session_id("s");
        ctx.record_tool_call("get_weather");
        ctx.set_iterations(2);
        ctx.set_usage(RunUsage {
            input_tokens: 10,
            output_tokens: 5,
        });

        assert_eq!(ctx.iterations(), Some(2));
        assert_eq!(ctx.usage().unwrap().output_tokens, 5);

        ctx.reset_run();
        assert!(ctx.tool_calls().is_empty());
        assert_eq!(ctx.iterations(), None);
        assert_eq!(ctx.usage(), None);
        assert_eq!(ctx.session_id(), Some("s"));
    }

    #[test]
    fn test_get_typed_wrong_shape() {
        let mut ctx = Context::new();
        ctx.insert(keys::USAGE, serde_json::json!("not an object"));
        let result: crate::Result<Option<RunUsage>> = ctx.get_typed(keys::USAGE);
        assert!(result.is_err());
        assert_eq!(ctx.usage(), None);
    }
}

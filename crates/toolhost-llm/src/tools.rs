//! Tool definition types for LLM tool use

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool definition advertised to the model
///
/// Name, description and JSON Schema of one tool in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (must match the tool in ToolRegistry)
    pub name: String,

    /// Description the model reads when deciding whether to call the tool
    pub description: String,

    /// JSON schema for the tool's input parameters
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Helpers to build JSON schemas for tools
pub mod schema {
    use serde_json::{Value, json};

    /// Create a JSON schema for an object with properties
    ///
    /// # Example
    ///
    /// ```
    /// use toolhost_llm::tools::schema;
    /// use serde_json::json;
    ///
    /// let schema = schema::object(
    ///     json!({
    ///         "city": schema::string("City name"),
    ///         "days": schema::integer("Number of days"),
    ///     }),
    ///     &["city"],
    /// );
    /// assert_eq!(schema["required"][0], "city");
    /// ```
    pub fn object(properties: Value, required: &[&str]) -> Value {
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Schema for a tool that takes no arguments
    pub fn empty() -> Value {
        object(json!({}), &[])
    }

    pub fn string(description: &str) -> Value {
        json!({
            "type": "string",
            "description": description,
        })
    }

    pub fn number(description: &str) -> Value {
        json!({
            "type": "number",
            "description": description,
        })
    }

    pub fn integer(description: &str) -> Value {
        json!({
            "type": "integer",
            "description": description,
        })
    }

    pub fn boolean(description: &str) -> Value {
        json!({
            "type": "boolean",
            "description": description,
        })
    }

    pub fn array(description: &str, items: Value) -> Value {
        json!({
            "type": "array",
            "description": description,
            "items": items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_definition_creation() {
        let schema = schema::object(json!({"city": schema::string("City name")}), &["city"]);

        let tool = ToolDefinition::new("get_weather", "Current weather", schema.clone());
        assert_eq!(tool.name, "get_weather");
        assert_eq!(tool.input_schema, schema);
    }

    #[test]
    fn test_schema_builders() {
        assert_eq!(schema::string("s")["type"], "string");
        assert_eq!(schema::number("n")["type"], "number");
        assert_eq!(schema::integer("i")["type"], "integer");
        assert_eq!(schema::boolean("b")["type"], "boolean");
        assert_eq!(schema::array("a", schema::string("x"))["items"]["type"], "string");

        let empty = schema::empty();
        assert_eq!(empty["type"], "object");
        assert_eq!(empty["required"], json!([]));
    }
}

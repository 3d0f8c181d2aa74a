//! Integer arithmetic tools

use crate::FnTool;
use serde::Deserialize;
use serde_json::json;
use toolhost_core::Error;
use toolhost_llm::tools::schema;

#[derive(Debug, Deserialize)]
struct Operands {
    a: i64,
    b: i64,
}

fn operands_schema() -> serde_json::Value {
    schema::object(
        json!({
            "a": schema::integer("First integer"),
            "b": schema::integer("Second integer"),
        }),
        &["a", "b"],
    )
}

/// `add_numbers(a, b) -> a + b`
pub fn add_numbers() -> FnTool {
    FnTool::typed(
        "add_numbers",
        "Add two integers and return the sum.",
        operands_schema(),
        |p: Operands| async move {
            p.a.checked_add(p.b)
                .ok_or_else(|| Error::tool_failed("add_numbers", "integer overflow"))
        },
    )
}

/// `multiply_numbers(a, b) -> a * b`
pub fn multiply_numbers() -> FnTool {
    FnTool::typed(
        "multiply_numbers",
        "Multiply two integers and return the product.",
        operands_schema(),
        |p: Operands| async move {
            p.a.checked_mul(p.b)
                .ok_or_else(|| Error::tool_failed("multiply_numbers", "integer overflow"))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tool;

    #[tokio::test]
    async fn test_add_numbers() {
        let out = add_numbers().execute(json!({"a": 15, "b": 27})).await.unwrap();
        assert_eq!(out, json!(42));
    }

    #[tokio::test]
    async fn test_multiply_numbers() {
        let out = multiply_numbers()
            .execute(json!({"a": 8, "b": 7}))
            .await
            .unwrap();
        assert_eq!(out, json!(56));
    }

    #[tokio::test]
    async fn test_overflow_is_a_tool_failure() {
        let err = multiply_numbers()
            .execute(json!({"a": i64::MAX, "b": 2}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ToolFailed { .. }));
    }

    #[tokio::test]
    async fn test_missing_operand() {
        let err = add_numbers().execute(json!({"a": 1})).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameters { .. }));
    }

    #[test]
    fn test_schema_requires_both_operands() {
        let schema = add_numbers().input_schema();
        assert_eq!(schema["required"], json!(["a", "b"]));
        assert_eq!(schema["properties"]["a"]["type"], "integer");
    }
}

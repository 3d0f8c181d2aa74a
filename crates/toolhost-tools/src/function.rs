//! Tools built from async closures

use crate::Tool;
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::future::Future;
use std::sync::Arc;
use toolhost_core::{Error, Result};

type Handler = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// A tool whose behaviour is an async closure
///
/// # Example
///
/// ```
/// use serde::Deserialize;
/// use serde_json::json;
/// use toolhost_tools::{FnTool, Tool};
///
/// #[derive(Deserialize)]
/// struct Greet {
///     name: String,
/// }
///
/// let tool = FnTool::typed(
///     "greet",
///     "Greet someone by name",
///     json!({"type": "object", "properties": {"name": {"type": "string"}}, "required": ["name"]}),
///     |p: Greet| async move { Ok(format!("Hello, {}!", p.name)) },
/// );
///
/// let out = tokio_test::block_on(tool.execute(json!({"name": "Ada"}))).unwrap();
/// assert_eq!(out, json!("Hello, Ada!"));
/// ```
#[derive(Clone)]
pub struct FnTool {
    name: String,
    description: String,
    schema: Value,
    handler: Handler,
}

impl FnTool {
    /// Build a tool from a closure over raw JSON parameters
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: Value,
        handler: F,
    ) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            handler: Arc::new(move |params| handler(params).boxed()),
        }
    }

    /// Build a tool whose parameters deserialize into `P` and whose output
    /// serializes from `R`
    ///
    /// Parameters that do not match `P` fail with
    /// [`Error::InvalidParameters`] before the closure runs. A `null`
    /// argument is treated as an empty object.
    pub fn typed<P, R, F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: Value,
        handler: F,
    ) -> Self
    where
        P: DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        let name = name.into();
        let tool_name = name.clone();
        let handler = Arc::new(handler);

        Self {
            name,
            description: description.into(),
            schema,
            handler: Arc::new(move |params| {
                let handler = Arc::clone(&handler);
                let tool_name = tool_name.clone();
                async move {
                    let params = if params.is_null() { json!({}) } else { params };
                    let parsed: P = serde_json::from_value(params)
                        .map_err(|e| Error::invalid_parameters(&tool_name, e.to_string()))?;
                    let output = handler(parsed).await?;
                    serde_json::to_value(output)
                        .map_err(|e| Error::tool_failed(&tool_name, e.to_string()))
                }
                .boxed()
            }),
        }
    }
}

#[async_trait]
impl Tool for FnTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        (self.handler)(params).await
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        self.schema.clone()
    }
}

impl std::fmt::Debug for FnTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Pair {
        a: i64,
        b: i64,
    }

    fn subtract() -> FnTool {
        FnTool::typed(
            "subtract",
            "a - b",
            json!({"type": "object"}),
            |p: Pair| async move { Ok(p.a - p.b) },
        )
    }

    #[tokio::test]
    async fn test_typed_tool() {
        let tool = subtract();
        assert_eq!(tool.name(), "subtract");
        assert_eq!(tool.definition().description, "a - b");

        let out = tool.execute(json!({"a": 10, "b": 4})).await.unwrap();
        assert_eq!(out, json!(6));
    }

    #[tokio::test]
    async fn test_typed_tool_rejects_bad_params() {
        let err = subtract()
            .execute(json!({"a": "ten", "b": 4}))
            .await
            .unwrap_err();
        match err {
            Error::InvalidParameters { tool, .. } => assert_eq!(tool, "subtract"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_null_params_for_argument_free_tool() {
        #[derive(Deserialize)]
        struct NoArgs {}

        let tool = FnTool::typed("ping", "pong", json!({}), |_: NoArgs| async {
            Ok("pong")
        });
        assert_eq!(tool.execute(Value::Null).await.unwrap(), json!("pong"));
    }

    #[tokio::test]
    async fn test_raw_tool_errors_propagate() {
        let tool = FnTool::new("fail", "always fails", json!({}), |_| async {
            Err(Error::tool_failed("fail", "nope"))
        });
        let err = tool.execute(json!({})).await.unwrap_err();
        assert_eq!(err.to_string(), "Tool 'fail' failed: nope");
    }
}

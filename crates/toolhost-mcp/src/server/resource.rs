//! Read-only resources served over MCP

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use toolhost_core::Result;

/// A named document a server exposes under a URI
#[async_trait]
pub trait Resource: Send + Sync {
    fn uri(&self) -> &str;

    fn name(&self) -> &str;

    fn description(&self) -> Option<&str> {
        None
    }

    fn mime_type(&self) -> &str {
        "text/plain"
    }

    /// Current text of the resource
    async fn read(&self) -> Result<String>;
}

type Reader = Arc<dyn Fn() -> BoxFuture<'static, Result<String>> + Send + Sync>;

/// A resource whose contents come from an async closure
#[derive(Clone)]
pub struct FnResource {
    uri: String,
    name: String,
    description: Option<String>,
    mime_type: String,
    reader: Reader,
}

impl FnResource {
    pub fn new<F, Fut>(uri: impl Into<String>, name: impl Into<String>, reader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        Self {
            uri: uri.into(),
            name: name.into(),
            description: None,
            mime_type: "text/plain".to_string(),
            reader: Arc::new(move || reader().boxed()),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }
}

#[async_trait]
impl Resource for FnResource {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    async fn read(&self) -> Result<String> {
        (self.reader)().await
    }
}

impl std::fmt::Debug for FnResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnResource")
            .field("uri", &self.uri)
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fn_resource() {
        let resource = FnResource::new("memo://greeting", "greeting", || async {
            Ok("hello".to_string())
        })
        .with_description("A greeting");

        assert_eq!(resource.uri(), "memo://greeting");
        assert_eq!(resource.mime_type(), "text/plain");
        assert_eq!(resource.description(), Some("A greeting"));
        assert_eq!(resource.read().await.unwrap(), "hello");
    }
}

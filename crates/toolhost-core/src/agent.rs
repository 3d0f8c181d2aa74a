//! Agent trait definition

use crate::{Context, Result};
use async_trait::async_trait;

/// An agent host: takes a natural-language instruction and answers it,
/// possibly invoking tools along the way.
///
/// Implementations write run metadata (tool calls, iteration count, token
/// usage) into the supplied [`Context`].
#[async_trait]
pub trait Agent: Send + Sync {
    /// Answer a single instruction
    async fn process(&self, input: String, context: &mut Context) -> Result<String>;

    /// Get the agent's name
    fn name(&self) -> &str;

    /// Initialize the agent (optional)
    async fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Release held resources such as remote sessions (optional)
    async fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Agent for Echo {
        async fn process(&self, input: String, context: &mut Context) -> Result<String> {
            context.record_tool_call("echo");
            Ok(input)
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_default_lifecycle_hooks() {
        let mut agent = Echo;
        agent.initialize().await.unwrap();

        let mut ctx = Context::new();
        let out = agent.process("hi".to_string(), &mut ctx).await.unwrap();
        assert_eq!(out, "hi");
        assert_eq!(ctx.tool_calls(), vec!["echo".to_string()]);

        agent.shutdown().await.unwrap();
    }
}

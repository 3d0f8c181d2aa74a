//! Terminal output for the samples

use async_trait::async_trait;
use serde_json::Value;
use toolhost_runtime::{ExecutorEventHandler, ToolAgent};
use tracing::debug;

/// Prints each tool call as it happens, e.g. `[tool] add_numbers({"a":3,"b":5})`
pub struct ConsoleEventHandler;

#[async_trait]
impl ExecutorEventHandler for ConsoleEventHandler {
    async fn on_tool_start(&self, _id: &str, name: &str, input: &Value) {
        println!("[tool] {}", format_call(name, input));
    }

    async fn on_tool_done(
        &self,
        id: &str,
        name: &str,
        result: Result<&Value, &str>,
        duration_ms: u64,
    ) {
        debug!(id, tool = name, duration_ms, ok = result.is_ok(), "Tool finished");
        if let Err(e) = result {
            println!("[tool] {name} failed: {e}");
        }
    }
}

pub fn format_call(name: &str, input: &Value) -> String {
    format!("{name}({input})")
}

pub fn banner(title: &str) {
    println!("{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
    println!();
}

/// Cut `text` to `max` characters, marking the cut with `...`
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}

/// Ask each question in turn, printing question and answer
pub async fn ask_all(agent: &ToolAgent, questions: &[String]) -> anyhow::Result<()> {
    for (i, question) in questions.iter().enumerate() {
        println!("[Question {}] {question}", i + 1);
        println!("{}", "-".repeat(40));
        let outcome = agent.run(question.as_str()).await?;
        println!("\n[Answer] {}\n", outcome.text);
        debug!(
            iterations = outcome.iterations,
            tools = ?outcome.tool_calls,
            tokens = outcome.usage.total(),
            "Question answered"
        );
    }
    Ok(())
}

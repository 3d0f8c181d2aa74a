//! Message types for LLM communication
//!
//! Modelled on the Anthropic Messages API: a conversation is a list of
//! user/assistant messages whose content is either plain text or a list of
//! blocks. Tool invocations travel as `tool_use` blocks from the assistant
//! and `tool_result` blocks from the user side.

use serde::{Deserialize, Serialize};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Content block in a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text content
    Text { text: String },

    /// Tool use request from the assistant
    ToolUse {
        /// Unique ID for this tool use
        id: String,
        /// Tool name
        name: String,
        /// Tool input parameters (JSON)
        input: serde_json::Value,
    },

    /// Tool result sent back to the assistant
    ToolResult {
        /// ID of the tool use this is responding to
        tool_use_id: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

impl ContentBlock {
    /// Successful tool result block
    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error: None,
        }
    }

    /// Failed tool result block
    pub fn tool_error(tool_use_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: error.into(),
            is_error: Some(true),
        }
    }
}

/// Message content: either simple text or structured blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
}

impl Message {
    /// Create a user message with text
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(MessageContent::Text(text.into())),
        }
    }

    /// Create an assistant message with text
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(MessageContent::Text(text.into())),
        }
    }

    /// Create a message from content blocks
    pub fn blocks(role: Role, blocks: Vec<ContentBlock>) -> Self {
        Self {
            role,
            content: Some(MessageContent::Blocks(blocks)),
        }
    }

    /// Create a user message with a single tool result
    pub fn tool_result(tool_use_id: impl Into<String>, result: impl Into<String>) -> Self {
        Self::blocks(Role::User, vec![ContentBlock::tool_result(tool_use_id, result)])
    }

    /// Create a user message with a single error tool result
    pub fn tool_error(tool_use_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self::blocks(Role::User, vec![ContentBlock::tool_error(tool_use_id, error)])
    }

    /// Create a user message carrying several tool results
    ///
    /// All results answering one assistant turn go into a single message.
    pub fn tool_results(results: Vec<ContentBlock>) -> Self {
        Self::blocks(Role::User, results)
    }

    /// Concatenated text content of the message
    pub fn text(&self) -> Option<String> {
        match &self.content {
            Some(MessageContent::Text(s)) => Some(s.clone()),
            Some(MessageContent::Blocks(blocks)) => {
                let parts: Vec<&str> = blocks
                    .iter()
                    .filter_map(|b| match b {
                        ContentBlock::Text { text } if !text.is_empty() => Some(text.as_str()),
                        _ => None,
                    })
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("\n"))
                }
            }
            None => None,
        }
    }

    /// Extract tool use requests from assistant messages
    pub fn tool_uses(&self) -> Vec<&ContentBlock> {
        match &self.content {
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .filter(|b| matches!(b, ContentBlock::ToolUse { .. }))
                .collect(),
            _ => vec![],
        }
    }

    /// Check if this message contains any tool uses
    pub fn has_tool_uses(&self) -> bool {
        !self.tool_uses().is_empty()
    }

    /// The message with its tool use blocks removed
    ///
    /// Returns `None` when nothing else is left.
    pub fn without_tool_uses(self) -> Option<Self> {
        match self.content {
            Some(MessageContent::Blocks(blocks)) => {
                let kept: Vec<ContentBlock> = blocks
                    .into_iter()
                    .filter(|b| !matches!(b, ContentBlock::ToolUse { .. }))
                    .collect();
                (!kept.is_empty()).then(|| Self::blocks(self.role, kept))
            }
            content => Some(Self {
                role: self.role,
                content,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_message() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text().as_deref(), Some("Hello"));
    }

    #[test]
    fn test_text_joins_blocks() {
        let msg = Message::blocks(
            Role::Assistant,
            vec![
                ContentBlock::Text {
                    text: "Checking.".into(),
                },
                ContentBlock::ToolUse {
                    id: "t1".into(),
                    name: "get_weather".into(),
                    input: json!({"city": "Tokyo"}),
                },
                ContentBlock::Text {
                    text: "Done.".into(),
                },
            ],
        );
        assert_eq!(msg.text().as_deref(), Some("Checking.\nDone."));
        assert!(msg.has_tool_uses());
        assert_eq!(msg.tool_uses().len(), 1);
    }

    #[test]
    fn test_without_tool_uses() {
        let msg = Message::blocks(
            Role::Assistant,
            vec![
                ContentBlock::Text {
                    text: "Let me check.".into(),
                },
                ContentBlock::ToolUse {
                    id: "t1".into(),
                    name: "get_weather".into(),
                    input: json!({"city": "To"}),
                },
            ],
        );
        let stripped = msg.without_tool_uses().unwrap();
        assert!(!stripped.has_tool_uses());
        assert_eq!(stripped.text().as_deref(), Some("Let me check."));

        let only_call = Message::blocks(
            Role::Assistant,
            vec![ContentBlock::ToolUse {
                id: "t2".into(),
                name: "get_weather".into(),
                input: json!({}),
            }],
        );
        assert!(only_call.without_tool_uses().is_none());
        assert_eq!(
            Message::assistant("plain").without_tool_uses(),
            Some(Message::assistant("plain"))
        );
    }

    #[test]
    fn test_tool_result_wire_format() {
        let msg = Message::tool_error("toolu_1", "boom");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({
                "role": "user",
                "content": [{
                    "type": "tool_result",
                    "tool_use_id": "toolu_1",
                    "content": "boom",
                    "is_error": true
                }]
            })
        );

        let ok = serde_json::to_value(Message::tool_result("toolu_2", "42")).unwrap();
        assert!(ok["content"][0].get("is_error").is_none());
    }

    #[test]
    fn test_parse_assistant_blocks() {
        let msg: Message = serde_json::from_value(json!({
            "role": "assistant",
            "content": [
                {"type": "tool_use", "id": "toolu_9", "name": "add_numbers", "input": {"a": 1, "b": 2}}
            ]
        }))
        .unwrap();
        match msg.tool_uses()[0] {
            ContentBlock::ToolUse { name, input, .. } => {
                assert_eq!(name, "add_numbers");
                assert_eq!(input["b"], 2);
            }
            other => panic!("unexpected block: {other:?}"),
        }
    }
}

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::ToolDefinition;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Message content in the dialogue driver's wire shape; tool use and tool
/// results are structured blocks rather than plain text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    ToolUse { id: String, name: String, input: Value },
    ToolResult { tool_use_id: String, content: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl ChatMessage {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self { role: Role::User, content: vec![ContentBlock::Text { text: text.into() }] }
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: vec![ContentBlock::Text { text: text.into() }] }
    }

    pub fn assistant_tool_use(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentBlock::ToolUse { id: id.into(), name: name.into(), input }],
        }
    }

    /// Tool results travel back to the driver as a user-role message.
    pub fn tool_result(tool_use_id: impl Into<String>, result: &Value) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::ToolResult {
                tool_use_id: tool_use_id.into(),
                content: result.to_string(),
            }],
        }
    }
}

/// One driver round trip resolves to either a final answer or a request
/// to run a tool and report back.
#[derive(Clone, Debug, PartialEq)]
pub enum DriverTurn {
    FinalText(String),
    ToolRequest { id: String, name: String, input: Value },
}

/// The external conversational decision-maker. Implementations wrap a
/// chat-completion API; tests substitute scripted fakes.
#[async_trait]
pub trait DialogueDriver: Send + Sync {
    async fn next_turn(
        &self,
        system_prompt: &str,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<DriverTurn>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ChatMessage, ContentBlock, Role};

    #[test]
    fn tool_result_is_a_user_message_with_serialized_payload() {
        let message = ChatMessage::tool_result("toolu_01", &json!({"eligible": true}));
        assert_eq!(message.role, Role::User);
        match &message.content[0] {
            ContentBlock::ToolResult { tool_use_id, content } => {
                assert_eq!(tool_use_id, "toolu_01");
                assert_eq!(content, r#"{"eligible":true}"#);
            }
            other => panic!("unexpected block: {other:?}"),
        }
    }

    #[test]
    fn content_blocks_serialize_with_type_tags() {
        let block = ContentBlock::ToolUse {
            id: "toolu_02".to_string(),
            name: "scan_benefit_programs".to_string(),
            input: json!({"categories": []}),
        };
        let raw = serde_json::to_value(&block).expect("serialize");
        assert_eq!(raw["type"], "tool_use");
        assert_eq!(raw["name"], "scan_benefit_programs");
    }
}

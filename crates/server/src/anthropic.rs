//! Anthropic Messages API client implementing the dialogue-driver seam.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use navigator_agent::{ChatMessage, DialogueDriver, DriverTurn, ToolDefinition};
use navigator_core::config::AnthropicConfig;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const FALLBACK_REPLY: &str =
    "I'm sorry, I wasn't able to put together a response. Could you try asking again?";

#[derive(Debug, Error)]
pub enum DriverBuildError {
    #[error("anthropic.api_key is not configured")]
    MissingApiKey,
    #[error("http client construction failed: {0}")]
    Http(#[source] reqwest::Error),
}

pub struct AnthropicDriver {
    client: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicDriver {
    pub fn from_config(config: &AnthropicConfig) -> Result<Self, DriverBuildError> {
        let api_key = config.api_key.clone().ok_or(DriverBuildError::MissingApiKey)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(DriverBuildError::Http)?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    stop_reason: Option<String>,
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text { text: String },
    ToolUse { id: String, name: String, input: Value },
    #[serde(other)]
    Unrecognized,
}

#[async_trait]
impl DialogueDriver for AnthropicDriver {
    async fn next_turn(
        &self,
        system_prompt: &str,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<DriverTurn> {
        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": system_prompt,
            "messages": messages,
            "tools": tools,
        });

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .context("anthropic request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!("anthropic returned {status}: {detail}"));
        }

        let parsed: MessagesResponse =
            response.json().await.context("anthropic response body was not valid JSON")?;
        debug!(stop_reason = ?parsed.stop_reason, blocks = parsed.content.len(), "driver turn");

        if parsed.stop_reason.as_deref() == Some("tool_use") {
            for block in parsed.content {
                if let ResponseBlock::ToolUse { id, name, input } = block {
                    return Ok(DriverTurn::ToolRequest { id, name, input });
                }
            }
            return Err(anyhow!("stop_reason was tool_use but no tool_use block was present"));
        }

        let text = parsed
            .content
            .into_iter()
            .find_map(|block| match block {
                ResponseBlock::Text { text } => Some(text),
                _ => None,
            })
            .unwrap_or_else(|| FALLBACK_REPLY.to_string());

        Ok(DriverTurn::FinalText(text))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{MessagesResponse, ResponseBlock};

    #[test]
    fn parses_a_text_completion() {
        let raw = json!({
            "id": "msg_01",
            "stop_reason": "end_turn",
            "content": [{ "type": "text", "text": "Hola Maria" }]
        });
        let parsed: MessagesResponse = serde_json::from_value(raw).expect("parse");
        assert_eq!(parsed.stop_reason.as_deref(), Some("end_turn"));
        assert!(matches!(&parsed.content[0], ResponseBlock::Text { text } if text == "Hola Maria"));
    }

    #[test]
    fn parses_a_tool_use_turn_with_leading_text() {
        let raw = json!({
            "stop_reason": "tool_use",
            "content": [
                { "type": "text", "text": "Let me check." },
                {
                    "type": "tool_use",
                    "id": "toolu_01",
                    "name": "calculate_eligibility",
                    "input": { "household_id": "PARENT_001" }
                }
            ]
        });
        let parsed: MessagesResponse = serde_json::from_value(raw).expect("parse");
        let tool_use = parsed
            .content
            .iter()
            .find(|block| matches!(block, ResponseBlock::ToolUse { .. }))
            .expect("tool_use block");
        match tool_use {
            ResponseBlock::ToolUse { id, name, input } => {
                assert_eq!(id, "toolu_01");
                assert_eq!(name, "calculate_eligibility");
                assert_eq!(input["household_id"], "PARENT_001");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn unrecognized_block_types_do_not_break_parsing() {
        let raw = json!({
            "stop_reason": "end_turn",
            "content": [
                { "type": "thinking", "thinking": "..." },
                { "type": "text", "text": "done" }
            ]
        });
        let parsed: MessagesResponse = serde_json::from_value(raw).expect("parse");
        assert_eq!(parsed.content.len(), 2);
        assert!(matches!(parsed.content[0], ResponseBlock::Unrecognized));
    }
}

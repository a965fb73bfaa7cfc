//! OpenAI API data models for request/response handling.
//!
//! This module contains types that match the OpenAI chat completions wire format.
//! Domain types live in `agent-shim-core`; this module handles the API layer mapping.

use agent_shim_core::{CompletionOutput, MessageRole, ShimError};
use serde::{Deserialize, Serialize};

/// Value of `owned_by` in `/v1/models`.
pub const OWNED_BY: &str = "agent-shim";

// =============================================================================
// Chat Completion Request Types
// =============================================================================

/// Request to /v1/chat/completions endpoint.
///
/// Sampling parameters are accepted for client compatibility but have no
/// effect on the backend command.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model name; echoed back, never used for routing.
    #[serde(default)]
    pub model: Option<String>,
    /// Array of chat messages.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature (0-2).
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Top-p sampling parameter.
    #[serde(default)]
    pub top_p: Option<f32>,
    /// Maximum tokens to generate.
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Whether to stream the response. Streaming is not supported.
    #[serde(default)]
    pub stream: bool,
    /// Stop sequences (string or array).
    #[serde(default)]
    pub stop: Option<serde_json::Value>,
}

/// A single chat message as sent by clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user", "assistant", "tool" or anything else.
    pub role: String,
    /// Message content (may be null or an array of content parts).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
}

/// Message content: plain text or a list of typed parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One part of a multi-part message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPart {
    pub r#type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl MessageContent {
    /// Flatten to text. Text parts are joined by newlines; other parts are dropped.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter(|p| p.r#type == "text")
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl From<&ChatMessage> for agent_shim_core::ChatMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self::new(
            MessageRole::parse(&msg.role),
            msg.content
                .as_ref()
                .map(MessageContent::to_text)
                .unwrap_or_default(),
        )
    }
}

impl ChatCompletionRequest {
    /// Messages converted to the domain representation.
    #[must_use]
    pub fn domain_messages(&self) -> Vec<agent_shim_core::ChatMessage> {
        self.messages.iter().map(Into::into).collect()
    }
}

// =============================================================================
// Chat Completion Response Types
// =============================================================================

/// Response from /v1/chat/completions endpoint (non-streaming).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChatChoice>,
    pub usage: Usage,
}

/// A single chat completion choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    pub index: u32,
    pub message: AssistantMessage,
    pub finish_reason: String,
}

/// The assistant message inside a choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub role: String,
    pub content: String,
}

/// Token usage statistics.
///
/// Counts are whitespace-separated words, an approximation rather than
/// tokenizer output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    /// Approximate usage by counting whitespace-separated words.
    #[must_use]
    pub fn approximate(prompt: &str, completion: &str) -> Self {
        let count = |text: &str| u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX);
        let prompt_tokens = count(prompt);
        let completion_tokens = count(completion);
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

impl ChatCompletionResponse {
    /// Wrap backend output in a chat completion envelope.
    #[must_use]
    pub fn from_output(model: impl Into<String>, output: &CompletionOutput) -> Self {
        Self {
            id: format!("chatcmpl-{}", uuid::Uuid::new_v4()),
            object: "chat.completion".to_string(),
            created: chrono::Utc::now().timestamp(),
            model: model.into(),
            choices: vec![ChatChoice {
                index: 0,
                message: AssistantMessage {
                    role: "assistant".to_string(),
                    content: output.content.clone(),
                },
                finish_reason: "stop".to_string(),
            }],
            usage: Usage::approximate(&output.prompt, &output.content),
        }
    }
}

// =============================================================================
// Models Endpoint Types
// =============================================================================

/// Response from /v1/models endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub object: String,
    pub data: Vec<ModelInfo>,
}

impl ModelsResponse {
    /// The single configured backend, as a one-entry list.
    pub fn single(model_name: impl Into<String>, created: i64) -> Self {
        Self {
            object: "list".to_string(),
            data: vec![ModelInfo {
                id: model_name.into(),
                object: "model".to_string(),
                created,
                owned_by: OWNED_BY.to_string(),
            }],
        }
    }
}

/// Information about a single model (OpenAI format).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub owned_by: String,
}

// =============================================================================
// Error Response Types
// =============================================================================

/// Error response matching OpenAI format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail within an error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(message: impl Into<String>, error_type: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                r#type: error_type.into(),
                code: None,
            },
        }
    }

    /// Create an error response with a code.
    pub fn with_code(
        message: impl Into<String>,
        error_type: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                r#type: error_type.into(),
                code: Some(code.into()),
            },
        }
    }

    /// Create an error response for an unparsable request body.
    pub fn invalid_request(reason: impl std::fmt::Display) -> Self {
        Self::new(
            format!("Invalid request body: {reason}"),
            "invalid_request_error",
        )
    }
}

impl From<&ShimError> for ErrorResponse {
    fn from(err: &ShimError) -> Self {
        match err.code() {
            Some(code) => Self::with_code(err.to_string(), err.error_type(), code),
            None => Self::new(err.to_string(), err.error_type()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_shim_core::FailureReason;
    use std::time::Duration;

    #[test]
    fn test_request_deserialize_minimal() {
        let request: ChatCompletionRequest = serde_json::from_str(
            r#"{"model": "cli-agent", "messages": [{"role": "user", "content": "Hello!"}]}"#,
        )
        .unwrap();

        assert_eq!(request.model.as_deref(), Some("cli-agent"));
        assert_eq!(request.messages.len(), 1);
        assert!(!request.stream);
        assert!(request.temperature.is_none());
    }

    #[test]
    fn test_request_ignores_unknown_fields() {
        let request: ChatCompletionRequest = serde_json::from_str(
            r#"{
                "messages": [],
                "temperature": 0.2,
                "stop": "END",
                "tools": [{"type": "function"}],
                "user": "someone"
            }"#,
        )
        .unwrap();
        assert!(request.model.is_none());
        assert_eq!(request.temperature, Some(0.2));
    }

    #[test]
    fn test_content_parts_are_flattened() {
        let request: ChatCompletionRequest = serde_json::from_str(
            r#"{"messages": [{"role": "user", "content": [
                {"type": "text", "text": "line one"},
                {"type": "image_url", "image_url": {"url": "http://x"}},
                {"type": "text", "text": "line two"}
            ]}]}"#,
        )
        .unwrap();

        let messages = request.domain_messages();
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, "line one\nline two");
    }

    #[test]
    fn test_null_content_becomes_empty() {
        let request: ChatCompletionRequest =
            serde_json::from_str(r#"{"messages": [{"role": "assistant", "content": null}]}"#)
                .unwrap();
        assert_eq!(request.domain_messages()[0].content, "");
    }

    #[test]
    fn test_usage_is_word_count() {
        let usage = Usage::approximate("what is  rust?", "a systems\nlanguage");
        assert_eq!(usage.prompt_tokens, 3);
        assert_eq!(usage.completion_tokens, 3);
        assert_eq!(usage.total_tokens, 6);
    }

    #[test]
    fn test_response_envelope_shape() {
        let output = CompletionOutput {
            content: "hello".to_string(),
            prompt: "say hello".to_string(),
            elapsed: Duration::from_millis(10),
        };
        let response = ChatCompletionResponse::from_output("my-model", &output);
        let json = serde_json::to_value(&response).unwrap();

        assert!(json["id"].as_str().unwrap().starts_with("chatcmpl-"));
        assert_eq!(json["object"], "chat.completion");
        assert_eq!(json["model"], "my-model");
        assert!(json["created"].as_i64().unwrap() > 0);
        assert_eq!(json["choices"][0]["index"], 0);
        assert_eq!(json["choices"][0]["message"]["role"], "assistant");
        assert_eq!(json["choices"][0]["message"]["content"], "hello");
        assert_eq!(json["choices"][0]["finish_reason"], "stop");
        assert_eq!(json["usage"]["total_tokens"], 3);
    }

    #[test]
    fn test_models_response_single_entry() {
        let json = serde_json::to_value(ModelsResponse::single("cli-agent", 42)).unwrap();
        assert_eq!(json["object"], "list");
        assert_eq!(json["data"].as_array().unwrap().len(), 1);
        assert_eq!(json["data"][0]["id"], "cli-agent");
        assert_eq!(json["data"][0]["object"], "model");
        assert_eq!(json["data"][0]["owned_by"], "agent-shim");
    }

    #[test]
    fn test_error_response_from_shim_error() {
        let err = ShimError::CommandFailed {
            reason: FailureReason::TimedOut(Duration::from_secs(2)),
            stderr: String::new(),
        };
        let response = ErrorResponse::from(&err);
        assert_eq!(response.error.r#type, "command_failed");
        assert_eq!(response.error.code.as_deref(), Some("timed_out"));

        let json = serde_json::to_value(ErrorResponse::from(&ShimError::Configuration(
            "bad".to_string(),
        )))
        .unwrap();
        assert_eq!(json["error"]["type"], "configuration_error");
        assert!(json["error"].get("code").is_none());
    }
}

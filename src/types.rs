//! Shared types for the Ollama client.
//!
//! These mirror the Ollama native API (`/api/chat`, `/api/tags`, `/api/pull`),
//! used for both request building and response parsing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Request Types ───────────────────────────────────────────────────────────

/// Message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A single message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Tool definition sent in the request.
///
/// Passed through to the service opaquely — the client does not interpret
/// the parameter schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub r#type: String,
    pub function: FunctionDefinition,
}

/// Function definition within a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// A `function`-type tool from its parts.
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            r#type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// Per-request sampling options (`options` object in the request body).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SamplingOptions {
    pub temperature: f32,
    /// Response token cap; Ollama's name for max output tokens.
    pub num_predict: u32,
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    pub options: SamplingOptions,
}

/// Request body for `POST /api/pull`.
#[derive(Debug, Clone, Serialize)]
pub struct PullRequest {
    pub model: String,
    pub stream: bool,
}

// ─── Response Types ──────────────────────────────────────────────────────────

/// A tool call requested by the model.
///
/// `arguments` is a JSON object (not a string) in Ollama's native format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub function: FunctionCall,
}

/// Function call details within a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: serde_json::Value,
}

/// The assistant message within a chat response or stream chunk.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    pub role: Role,
    /// May be empty when the model responded with tool calls only.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCall>>,
}

/// Full reply from a non-streaming `POST /api/chat`.
///
/// The duration/counter fields are Ollama's own metadata; the client relays
/// them without interpretation.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub message: ResponseMessage,
    pub done: bool,
    #[serde(default)]
    pub done_reason: Option<String>,
    #[serde(default)]
    pub total_duration: Option<u64>,
    #[serde(default)]
    pub load_duration: Option<u64>,
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    #[serde(default)]
    pub eval_count: Option<u64>,
    #[serde(default)]
    pub eval_duration: Option<u64>,
}

/// One NDJSON line of a streaming `POST /api/chat` reply.
///
/// Intermediate lines carry an incremental `message.content` fragment; the
/// final line has `done: true` and, like the intermediates, may carry an
/// empty content field.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub message: Option<ResponseMessage>,
    #[serde(default)]
    pub done: bool,
    /// In-band error reported by the service mid-stream.
    #[serde(default)]
    pub error: Option<String>,
}

/// Reply from `GET /api/tags` — the local model registry.
#[derive(Debug, Clone, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

/// A single model descriptor from the registry.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
}

/// One NDJSON line of a streaming `POST /api/pull` reply.
#[derive(Debug, Clone, Deserialize)]
pub struct PullLine {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub completed: Option<u64>,
    /// In-band error (e.g. unknown model name).
    #[serde(default)]
    pub error: Option<String>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn request(tools: Option<Vec<ToolDefinition>>) -> ChatRequest {
        ChatRequest {
            model: "mistral:7b".to_string(),
            messages: vec![ChatMessage::user("hi")],
            stream: false,
            tools,
            options: SamplingOptions {
                temperature: 0.7,
                num_predict: 2048,
            },
        }
    }

    #[test]
    fn test_tools_omitted_when_none() {
        let json = serde_json::to_string(&request(None)).unwrap();
        assert!(!json.contains("tools"), "tools should be omitted when None");
        assert!(json.contains("\"num_predict\":2048"));
    }

    #[test]
    fn test_tools_forwarded_when_some() {
        let tool = ToolDefinition::function(
            "get_weather",
            "Current weather for a city",
            serde_json::json!({
                "type": "object",
                "properties": {"city": {"type": "string"}},
                "required": ["city"]
            }),
        );
        let json = serde_json::to_value(&request(Some(vec![tool]))).unwrap();
        assert_eq!(json["tools"][0]["type"], "function");
        assert_eq!(json["tools"][0]["function"]["name"], "get_weather");
        assert_eq!(
            json["tools"][0]["function"]["parameters"]["required"][0],
            "city"
        );
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let msg = ChatMessage::system("Be terse");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"Be terse"}"#);
    }

    #[test]
    fn test_chat_response_deserializes() {
        let body = r#"{
            "model": "mistral:7b",
            "created_at": "2025-01-12T10:32:05.123456Z",
            "message": {"role": "assistant", "content": "Hi."},
            "done": true,
            "done_reason": "stop",
            "total_duration": 812345678,
            "eval_count": 4
        }"#;
        let resp: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.message.content, "Hi.");
        assert_eq!(resp.message.role, Role::Assistant);
        assert!(resp.done);
        assert_eq!(resp.eval_count, Some(4));
        assert!(resp.message.tool_calls.is_none());
    }

    #[test]
    fn test_chat_response_with_tool_calls() {
        let body = r#"{
            "model": "llama3",
            "created_at": "2025-01-12T10:32:05Z",
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [{
                    "function": {
                        "name": "get_weather",
                        "arguments": {"city": "Berlin"}
                    }
                }]
            },
            "done": true
        }"#;
        let resp: ChatResponse = serde_json::from_str(body).unwrap();
        let calls = resp.message.tool_calls.unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.name, "get_weather");
        assert_eq!(calls[0].function.arguments["city"], "Berlin");
    }

    #[test]
    fn test_tags_response_missing_models_defaults_empty() {
        let tags: TagsResponse = serde_json::from_str("{}").unwrap();
        assert!(tags.models.is_empty());
    }
}

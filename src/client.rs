//! Ollama inference client.
//!
//! Thin adapter over the Ollama native HTTP API. Every method is a direct
//! pass-through: build the request from the fixed configuration, send it,
//! relay the result. Generation and chat failures are logged and propagated;
//! the availability and pull checks are logged and collapsed to a boolean.

use futures::{Stream, StreamExt};
use reqwest::Client as HttpClient;

use crate::config::OllamaConfig;
use crate::errors::OllamaError;
use crate::streaming::{ndjson_lines, parse_chat_stream};
use crate::types::{
    ChatMessage, ChatRequest, ChatResponse, PullLine, PullRequest, SamplingOptions, TagsResponse,
    ToolDefinition,
};

/// Client for a locally hosted Ollama inference server.
///
/// Holds an immutable [`OllamaConfig`] and a `reqwest::Client`. The HTTP
/// client is internally reference-counted, so an `OllamaClient` can be
/// cloned and shared across tasks; no internal timeout is enforced — callers
/// needing bounded latency wrap calls in `tokio::time::timeout`.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: HttpClient,
    config: OllamaConfig,
}

impl OllamaClient {
    /// Create a client from a validated configuration.
    ///
    /// Does NOT check connectivity — that happens on the first request.
    pub fn new(config: OllamaConfig) -> Result<Self, OllamaError> {
        config.validate()?;

        let http = HttpClient::builder()
            .build()
            .map_err(|e| OllamaError::ConnectionFailed {
                endpoint: config.host.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        tracing::info!(model = %config.model, host = %config.host, "Ollama client initialized");
        Ok(Self { http, config })
    }

    /// Client against a stock local install (`mistral:7b` at `localhost:11434`).
    pub fn with_defaults() -> Result<Self, OllamaError> {
        Self::new(OllamaConfig::default())
    }

    /// The configured model name.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// The configured server base URL.
    pub fn host(&self) -> &str {
        &self.config.host
    }

    // ─── Generation ──────────────────────────────────────────────────────

    /// Generate a complete response for a prompt.
    ///
    /// An optional system message is placed before the user message. Returns
    /// the full response text; transport and service errors are logged and
    /// propagated unchanged. No retry, no backoff.
    pub async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<String, OllamaError> {
        let messages = build_messages(prompt, system);
        let body = self.chat_request(messages, None, false);

        match self.send_chat(&body).await {
            Ok(response) => {
                let answer = response.message.content;
                tracing::debug!(chars = answer.len(), "received LLM response");
                Ok(answer)
            }
            Err(e) => {
                tracing::error!(error = %e, "LLM generation failed");
                Err(e)
            }
        }
    }

    /// Generate a response as a stream of incremental text fragments.
    ///
    /// The stream is finite and non-restartable: it yields fragments until
    /// the service signals completion, and a new call produces a new stream.
    /// Dropping it abandons consumption. Request-time and mid-stream errors
    /// are logged and propagated.
    pub async fn generate_stream(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<impl Stream<Item = Result<String, OllamaError>>, OllamaError> {
        let messages = build_messages(prompt, system);
        let body = self.chat_request(messages, None, true);

        let response = match self.post_chat(&body).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "LLM streaming request failed");
                return Err(e);
            }
        };

        Ok(parse_chat_stream(response).inspect(|item| {
            if let Err(e) = item {
                tracing::error!(error = %e, "LLM stream failed mid-response");
            }
        }))
    }

    // ─── Chat ────────────────────────────────────────────────────────────

    /// Run one turn of a multi-turn chat.
    ///
    /// The conversation and optional tool definitions are forwarded to the
    /// service unchanged (`tools` is omitted from the request body when
    /// absent). Returns the raw structured response so callers can inspect
    /// tool-call requests. Errors are logged and propagated.
    pub async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<Vec<ToolDefinition>>,
    ) -> Result<ChatResponse, OllamaError> {
        let body = self.chat_request(messages, tools, false);

        match self.send_chat(&body).await {
            Ok(response) => Ok(response),
            Err(e) => {
                tracing::error!(error = %e, "LLM chat failed");
                Err(e)
            }
        }
    }

    // ─── Model management ────────────────────────────────────────────────

    /// Check whether the configured model is present in the local registry.
    ///
    /// Queries `GET /api/tags` and compares model names. Any transport or
    /// decode failure is logged and reported as `false` — this method never
    /// propagates an error.
    pub async fn check_model_availability(&self) -> bool {
        let tags = match self.fetch_tags().await {
            Ok(tags) => tags,
            Err(e) => {
                tracing::error!(error = %e, "model availability check failed");
                return false;
            }
        };

        let available = registry_contains(&self.config.model, &tags);
        if !available {
            let names: Vec<&str> = tags.models.iter().map(|m| m.name.as_str()).collect();
            tracing::warn!(
                model = %self.config.model,
                available = ?names,
                "configured model not available"
            );
        }
        available
    }

    /// Pull (download) the configured model if absent.
    ///
    /// Streams `POST /api/pull` progress lines, logging each at debug level.
    /// Returns `true` only when the download finishes with `status: "success"`;
    /// any failure — transport, decode, or an in-band error line — is logged
    /// and reported as `false`. This method never propagates an error.
    pub async fn pull_model(&self) -> bool {
        tracing::info!(model = %self.config.model, "pulling model");

        match self.run_pull().await {
            Ok(()) => {
                tracing::info!(model = %self.config.model, "model pulled successfully");
                true
            }
            Err(e) => {
                tracing::error!(model = %self.config.model, error = %e, "model pull failed");
                false
            }
        }
    }

    // ─── Request plumbing ────────────────────────────────────────────────

    /// Build a `/api/chat` request body from the fixed configuration.
    fn chat_request(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<Vec<ToolDefinition>>,
        stream: bool,
    ) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages,
            stream,
            tools,
            options: SamplingOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        }
    }

    /// POST `/api/chat` and return the raw HTTP response on 2xx.
    async fn post_chat(&self, body: &ChatRequest) -> Result<reqwest::Response, OllamaError> {
        let url = format!("{}/api/chat", self.config.base_url());

        tracing::debug!(
            url = %url,
            model = %body.model,
            message_count = body.messages.len(),
            has_tools = body.tools.is_some(),
            stream = body.stream,
            "sending chat request"
        );

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| OllamaError::ConnectionFailed {
                endpoint: url.clone(),
                reason: e.to_string(),
            })?;

        error_for_status(response).await
    }

    /// POST `/api/chat` non-streaming and decode the reply.
    async fn send_chat(&self, body: &ChatRequest) -> Result<ChatResponse, OllamaError> {
        let response = self.post_chat(body).await?;
        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| OllamaError::MalformedResponse {
                reason: format!("failed to decode chat response: {e}"),
            })
    }

    /// GET `/api/tags` and decode the model registry.
    async fn fetch_tags(&self) -> Result<TagsResponse, OllamaError> {
        let url = format!("{}/api/tags", self.config.base_url());

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| OllamaError::ConnectionFailed {
                endpoint: url.clone(),
                reason: e.to_string(),
            })?;

        let response = error_for_status(response).await?;
        response
            .json::<TagsResponse>()
            .await
            .map_err(|e| OllamaError::MalformedResponse {
                reason: format!("failed to decode tags response: {e}"),
            })
    }

    /// POST `/api/pull` and consume the progress stream to completion.
    async fn run_pull(&self) -> Result<(), OllamaError> {
        let url = format!("{}/api/pull", self.config.base_url());
        let body = PullRequest {
            model: self.config.model.clone(),
            stream: true,
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| OllamaError::ConnectionFailed {
                endpoint: url.clone(),
                reason: e.to_string(),
            })?;

        let response = error_for_status(response).await?;

        let mut lines = Box::pin(ndjson_lines(Box::pin(response.bytes_stream())));
        let mut succeeded = false;

        while let Some(line) = lines.next().await {
            let progress = process_pull_line(&line?)?;
            tracing::debug!(
                status = progress.status.as_deref().unwrap_or(""),
                completed = progress.completed.unwrap_or(0),
                total = progress.total.unwrap_or(0),
                "pull progress"
            );
            if progress.status.as_deref() == Some("success") {
                succeeded = true;
            }
        }

        if succeeded {
            Ok(())
        } else {
            Err(OllamaError::StreamError {
                reason: "pull stream ended without success status".into(),
            })
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Build the message sequence for a single-prompt request.
///
/// The system message, when present, is placed strictly before the user
/// message; without one the sequence is exactly one user message.
fn build_messages(prompt: &str, system: Option<&str>) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system {
        messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(prompt));
    messages
}

/// Whether the registry lists a model with exactly this name.
fn registry_contains(model: &str, tags: &TagsResponse) -> bool {
    tags.models.iter().any(|m| m.name == model)
}

/// Parse one `/api/pull` progress line, surfacing in-band errors.
fn process_pull_line(line: &str) -> Result<PullLine, OllamaError> {
    let mut progress: PullLine =
        serde_json::from_str(line).map_err(|e| OllamaError::StreamError {
            reason: format!("failed to parse pull progress: {e} (line: {line})"),
        })?;

    if let Some(error) = progress.error.take() {
        return Err(OllamaError::StreamError { reason: error });
    }
    Ok(progress)
}

/// Map a non-2xx response to `HttpError`, reading the body for context.
async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, OllamaError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(OllamaError::HttpError {
        status: status.as_u16(),
        body,
    })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ModelEntry, Role};

    fn tags(names: &[&str]) -> TagsResponse {
        TagsResponse {
            models: names
                .iter()
                .map(|n| ModelEntry {
                    name: n.to_string(),
                    size: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_build_messages_without_system() {
        let messages = build_messages("Hello", None);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "Hello");
    }

    #[test]
    fn test_build_messages_system_precedes_user() {
        let messages = build_messages("Hello", Some("Be terse"));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, "Be terse");
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "Hello");
    }

    #[test]
    fn test_registry_contains_configured_model() {
        let tags = tags(&["llama3", "mistral:7b"]);
        assert!(registry_contains("mistral:7b", &tags));
    }

    #[test]
    fn test_registry_missing_configured_model() {
        let tags = tags(&["llama3"]);
        assert!(!registry_contains("phi3", &tags));
    }

    #[test]
    fn test_registry_requires_exact_name() {
        let tags = tags(&["mistral:7b-instruct"]);
        assert!(!registry_contains("mistral:7b", &tags));
    }

    #[test]
    fn test_process_pull_line_progress() {
        let line = r#"{"status":"downloading","total":1000,"completed":250}"#;
        let progress = process_pull_line(line).unwrap();
        assert_eq!(progress.status.as_deref(), Some("downloading"));
        assert_eq!(progress.completed, Some(250));
    }

    #[test]
    fn test_process_pull_line_error() {
        let line = r#"{"error":"pull model manifest: file does not exist"}"#;
        let result = process_pull_line(line);
        assert!(matches!(result, Err(OllamaError::StreamError { .. })));
    }

    #[test]
    fn test_process_pull_line_success() {
        let progress = process_pull_line(r#"{"status":"success"}"#).unwrap();
        assert_eq!(progress.status.as_deref(), Some("success"));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = OllamaConfig::default().with_temperature(2.0);
        let result = OllamaClient::new(config);
        assert!(matches!(result, Err(OllamaError::InvalidConfig { .. })));
    }

    #[test]
    fn test_accessors() {
        let client = OllamaClient::with_defaults().unwrap();
        assert_eq!(client.model(), "mistral:7b");
        assert_eq!(client.host(), "http://localhost:11434");
    }

    #[test]
    fn test_chat_request_carries_config() {
        let config = OllamaConfig::for_model("llama3")
            .with_temperature(0.3)
            .with_max_tokens(128);
        let client = OllamaClient::new(config).unwrap();
        let body = client.chat_request(vec![ChatMessage::user("hi")], None, true);
        assert_eq!(body.model, "llama3");
        assert!(body.stream);
        assert_eq!(body.options.temperature, 0.3);
        assert_eq!(body.options.num_predict, 128);
        assert!(body.tools.is_none());
    }
}

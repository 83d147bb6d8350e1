//! Generation backend client
//!
//! Talks to an OpenAI-compatible chat-completions endpoint (OpenAI, Gemini's
//! OpenAI-compat surface, vLLM, Ollama, ...). Structured-output mode is a
//! best-effort hint, not a guarantee; callers keep a recovery path for
//! non-compliant replies.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::SummaryConfig;

/// Generation backend client errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Empty completion in response")]
    EmptyResponse,
}

/// Output constraint for a completion request
pub enum ResponseMode {
    /// Ask the backend to validate its output against a named JSON schema
    JsonSchema { name: &'static str, schema: Value },
    /// Instruction-constrained free text
    Text,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageBody,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client
pub struct LlmClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl LlmClient {
    pub fn new(cfg: &SummaryConfig) -> Result<Self, LlmError> {
        // The generation call is the only unbounded-latency dependency, so
        // the timeout lives on the client itself.
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
        })
    }

    /// One completion round-trip; returns the raw assistant text.
    pub async fn complete(
        &self,
        system: &str,
        user: &str,
        mode: ResponseMode,
    ) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            response_format: response_format(mode),
        };

        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!(url = %url, model = %self.model, "Querying generation backend");

        let mut request = self.http_client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError(status.as_u16(), error_text));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

fn response_format(mode: ResponseMode) -> Option<Value> {
    match mode {
        ResponseMode::JsonSchema { name, schema } => Some(serde_json::json!({
            "type": "json_schema",
            "json_schema": {
                "name": name,
                "strict": true,
                "schema": schema,
            },
        })),
        ResponseMode::Text => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = LlmClient::new(&SummaryConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn strict_mode_builds_json_schema_format() {
        let format = response_format(ResponseMode::JsonSchema {
            name: "RollUp",
            schema: serde_json::json!({"type": "object"}),
        })
        .unwrap();

        assert_eq!(format["type"], "json_schema");
        assert_eq!(format["json_schema"]["name"], "RollUp");
        assert_eq!(format["json_schema"]["strict"], true);
    }

    #[test]
    fn free_form_omits_response_format() {
        assert!(response_format(ResponseMode::Text).is_none());

        let body = ChatRequest {
            model: "m",
            messages: vec![ChatMessage { role: "system", content: "s" }],
            response_format: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("response_format").is_none());
    }

    #[test]
    fn trailing_slash_in_base_url_is_trimmed() {
        let cfg = SummaryConfig {
            base_url: "http://localhost:11434/v1/".to_string(),
            ..SummaryConfig::default()
        };
        let client = LlmClient::new(&cfg).unwrap();
        assert_eq!(client.base_url, "http://localhost:11434/v1");
    }
}

//! Gemini `generateContent` client.

use std::time::Duration;

use tracing::debug;

use crate::config::LlmConfig;

use super::{CompletionBackend, LlmError};

/// Blocking client for the Gemini REST API.
pub struct GeminiClient {
    api_base: String,
    model: String,
    api_key: String,
    agent: ureq::Agent,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            // Accept both "gemini-1.5-flash" and "models/gemini-1.5-flash".
            model: config
                .model
                .trim_start_matches("models/")
                .to_string(),
            api_key: api_key.into(),
            agent,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, self.model)
    }
}

impl CompletionBackend for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
        });
        let body_str = serde_json::to_string(&body).map_err(|e| LlmError::RequestFailed {
            message: format!("JSON serialize error: {e}"),
        })?;

        debug!(model = %self.model, prompt_len = prompt.len(), "sending generateContent");

        let resp = self
            .agent
            .post(&self.endpoint())
            .set("Content-Type", "application/json")
            .set("x-goog-api-key", &self.api_key)
            .send_string(&body_str)
            .map_err(|e| match e {
                ureq::Error::Status(code, resp) => LlmError::Status {
                    code,
                    message: resp.into_string().unwrap_or_default(),
                },
                ureq::Error::Transport(t) => LlmError::RequestFailed {
                    message: t.to_string(),
                },
            })?;

        let text = resp.into_string().map_err(|e| LlmError::ParseError {
            message: format!("failed to read response body: {e}"),
        })?;
        parse_generate_response(&text)
    }
}

/// Concatenate the text parts of the first candidate.
pub(crate) fn parse_generate_response(body: &str) -> Result<String, LlmError> {
    let json: serde_json::Value =
        serde_json::from_str(body).map_err(|e| LlmError::ParseError {
            message: format!("JSON parse error: {e}"),
        })?;

    let Some(parts) = json["candidates"][0]["content"]["parts"].as_array() else {
        return Err(LlmError::EmptyResponse);
    };

    let text: String = parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect::<Vec<_>>()
        .join("");
    let text = text.trim();
    if text.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text.to_string())
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

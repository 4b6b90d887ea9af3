//! Text-generation backends.
//!
//! The retrieval pipeline only needs `generate(prompt) -> text`; that seam is
//! [`CompletionBackend`]. [`gemini::GeminiClient`] implements it over the
//! Gemini REST API.

pub mod gemini;

use miette::Diagnostic;
use thiserror::Error;

pub use gemini::GeminiClient;

/// Errors from the LLM subsystem.
#[derive(Debug, Error, Diagnostic)]
pub enum LlmError {
    #[error("LLM request failed: {message}")]
    #[diagnostic(
        code(mosdac::llm::request_failed),
        help("Check network connectivity and that the API endpoint is reachable.")
    )]
    RequestFailed { message: String },

    #[error("LLM API returned HTTP {code}: {message}")]
    #[diagnostic(
        code(mosdac::llm::status),
        help(
            "401/403 usually means GEMINI_API_KEY is wrong; 404 an unknown model name; \
             429 a quota limit (retried with backoff)."
        )
    )]
    Status { code: u16, message: String },

    #[error("failed to parse LLM response: {message}")]
    #[diagnostic(
        code(mosdac::llm::parse_error),
        help("The API returned an unexpected response format.")
    )]
    ParseError { message: String },

    #[error("LLM returned no text")]
    #[diagnostic(
        code(mosdac::llm::empty_response),
        help("The prompt may have been blocked by the provider's safety filters.")
    )]
    EmptyResponse,
}

impl LlmError {
    /// Transport failures, rate limiting and server errors may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed { .. } => true,
            Self::Status { code, .. } => *code == 429 || *code >= 500,
            Self::ParseError { .. } | Self::EmptyResponse => false,
        }
    }
}

/// Anything that turns a prompt into generated text.
pub trait CompletionBackend: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(LlmError::RequestFailed { message: "reset".into() }.is_retryable());
        assert!(LlmError::Status { code: 429, message: String::new() }.is_retryable());
        assert!(LlmError::Status { code: 503, message: String::new() }.is_retryable());
        assert!(!LlmError::Status { code: 400, message: String::new() }.is_retryable());
        assert!(!LlmError::EmptyResponse.is_retryable());
    }
}

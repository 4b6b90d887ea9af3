//! Retrieval-augmented question answering over the knowledge graph.
//!
//! A query flows through keyword derivation, graph lookup, prompt assembly and
//! completion ([`pipeline::RagChatbot`]). Every failure on that path becomes an
//! [`AskResponse`] with [`AskStatus::Error`]; nothing is propagated.

pub mod history;
pub mod pipeline;

use serde::{Deserialize, Serialize};

pub use history::{ConversationHistory, ConversationTurn};
pub use pipeline::{PipelineOptions, RagChatbot};

/// How search keywords are derived from a user query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordStrategy {
    /// Ask the LLM for a comma-separated keyword list (one extra round trip).
    #[default]
    Llm,
    /// Use the trimmed query itself as the only keyword.
    Literal,
}

impl std::str::FromStr for KeywordStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "llm" => Ok(Self::Llm),
            "literal" => Ok(Self::Literal),
            other => Err(format!("unknown keyword strategy \"{other}\" (expected llm or literal)")),
        }
    }
}

/// Outcome of one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AskStatus {
    Success,
    Error,
}

/// Result of [`RagChatbot::ask`], serialized as
/// `{"response": ..., "status": "success"|"error", "suggestions": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    pub response: String,
    pub status: AskStatus,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl AskResponse {
    pub fn success(response: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self {
            response: response.into(),
            status: AskStatus::Success,
            suggestions,
        }
    }

    pub fn error(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            status: AskStatus::Error,
            suggestions: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == AskStatus::Success
    }
}

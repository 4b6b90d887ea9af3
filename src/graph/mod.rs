//! Knowledge graph of extracted facts.
//!
//! - **In-memory layer** ([`KnowledgeGraph`]): `petgraph` directed graph whose
//!   nodes are entity strings and whose edges carry a predicate label
//! - **Persistence** ([`persist`]): bincode snapshot of the edge set, plus the
//!   build-and-save entry point used at startup
//!
//! Consumers that only read the graph go through the [`KnowledgeBase`] trait so
//! the retrieval pipeline can be tested against a fake.

pub mod index;
pub mod persist;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use index::KnowledgeGraph;
pub use persist::{build_graph, load_graph};

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, crate::error::GraphError>;

/// A triple (subject, predicate, object) extracted from one sentence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// Edge data stored on petgraph edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
    pub predicate: String,
}

impl From<&Triple> for EdgeData {
    fn from(t: &Triple) -> Self {
        Self {
            predicate: t.predicate.clone(),
        }
    }
}

impl fmt::Display for EdgeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.predicate)
    }
}

/// Read access to a fact store, as needed by the retrieval pipeline.
pub trait KnowledgeBase: Send + Sync {
    /// Facts whose subject or object contains `keyword`, case-insensitively.
    fn search(&self, keyword: &str) -> Vec<Triple>;

    /// Entity names one hop away from entities matching `keyword`.
    fn related(&self, keyword: &str, limit: usize) -> Vec<String>;
}

impl KnowledgeBase for KnowledgeGraph {
    fn search(&self, keyword: &str) -> Vec<Triple> {
        KnowledgeGraph::search(self, keyword)
    }

    fn related(&self, keyword: &str, limit: usize) -> Vec<String> {
        KnowledgeGraph::related(self, keyword, limit)
    }
}

/// Render facts as a numbered list for an LLM prompt.
///
/// Empty input renders as the empty string, not as a bare header.
pub fn to_prompt_text(triples: &[Triple]) -> String {
    if triples.is_empty() {
        return String::new();
    }
    let lines: Vec<String> = triples
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}. {t}.", i + 1))
        .collect();
    format!("Facts:\n{}", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_text_of_nothing_is_empty() {
        assert_eq!(to_prompt_text(&[]), "");
    }

    #[test]
    fn prompt_text_is_numbered() {
        let triples = vec![
            Triple::new("ISRO", "launches", "Chandrayaan"),
            Triple::new("Chandrayaan", "orbits", "Moon"),
        ];
        assert_eq!(
            to_prompt_text(&triples),
            "Facts:\n1. ISRO launches Chandrayaan.\n2. Chandrayaan orbits Moon."
        );
    }
}

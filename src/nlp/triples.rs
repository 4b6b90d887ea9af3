//! Subject–predicate–object extraction over parsed sentences.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::graph::Triple;

use super::parser::HeuristicParser;
use super::{DependencyParser, PosTag, Sentence};

/// Which token supplies the predicate of an extracted triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredicateStrategy {
    /// Surface text of the sentence's `ROOT` token.
    #[default]
    Root,
    /// Lemma of the first `VERB`-tagged token.
    Verb,
}

impl std::str::FromStr for PredicateStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "root" => Ok(Self::Root),
            "verb" => Ok(Self::Verb),
            other => Err(format!("unknown predicate strategy \"{other}\" (expected root or verb)")),
        }
    }
}

/// Heuristic triple extractor: one triple per sentence at most.
pub struct TripleExtractor {
    parser: Arc<dyn DependencyParser>,
    strategy: PredicateStrategy,
}

impl TripleExtractor {
    pub fn new(parser: Arc<dyn DependencyParser>) -> Self {
        Self {
            parser,
            strategy: PredicateStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: PredicateStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> PredicateStrategy {
        self.strategy
    }

    /// Extract triples from arbitrary text, in sentence order.
    ///
    /// Input longer than the parser limit is processed in chunks cut at line
    /// or sentence boundaries. A chunk the parser rejects contributes nothing.
    pub fn extract_triples(&self, text: &str) -> Vec<Triple> {
        let mut triples = Vec::new();

        for (i, chunk) in split_chunks(text, self.parser.max_length()).into_iter().enumerate() {
            match self.parser.parse(chunk) {
                Ok(sentences) => {
                    triples.extend(sentences.iter().filter_map(|s| self.extract_from_sentence(s)));
                }
                Err(e) => warn!(chunk = i, error = %e, "parse failed, chunk skipped"),
            }
        }

        debug!(count = triples.len(), strategy = ?self.strategy, "triples extracted");
        triples
    }

    /// The triple for one sentence, if subject, predicate and object are all found.
    ///
    /// Subject is the first token whose dependency label contains `subj`,
    /// object the first whose label contains `obj` (`dobj`, `pobj`, ...).
    pub fn extract_from_sentence(&self, sentence: &Sentence) -> Option<Triple> {
        let subject = sentence.tokens.iter().find(|t| t.dep.contains("subj"))?;
        let object = sentence.tokens.iter().find(|t| t.dep.contains("obj"))?;
        let predicate = match self.strategy {
            PredicateStrategy::Root => sentence.root().map(|t| t.text.as_str()),
            PredicateStrategy::Verb => sentence
                .tokens
                .iter()
                .find(|t| t.pos == PosTag::Verb)
                .map(|t| t.lemma.as_str()),
        }?;

        if subject.text.is_empty() || predicate.is_empty() || object.text.is_empty() {
            return None;
        }
        Some(Triple::new(&subject.text, predicate, &object.text))
    }
}

impl Default for TripleExtractor {
    fn default() -> Self {
        Self::new(Arc::new(HeuristicParser::new()))
    }
}

impl std::fmt::Debug for TripleExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TripleExtractor")
            .field("max_length", &self.parser.max_length())
            .field("strategy", &self.strategy)
            .finish()
    }
}

/// Split `text` into pieces of at most `max` bytes, preferring to cut after a
/// newline, then after a sentence end.
fn split_chunks(text: &str, max: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.len() > max {
        let mut cut = max;
        while cut > 0 && !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        if cut == 0 {
            cut = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }

        let window = &rest[..cut];
        let split = window
            .rfind('\n')
            .map(|i| i + 1)
            .or_else(|| window.rfind(". ").map(|i| i + 2))
            .unwrap_or(cut);

        chunks.push(&rest[..split]);
        rest = &rest[split..];
    }

    if !rest.is_empty() {
        chunks.push(rest);
    }
    chunks
}

//! Dependency parsing and relation-triple extraction.
//!
//! - **Parser seam** ([`DependencyParser`]): turns text into sentences of
//!   POS-tagged tokens carrying a dependency label and head.
//! - **Built-in parser** ([`parser::HeuristicParser`]): lexicon + rule based,
//!   labels with the Universal Dependencies / ClearNLP names (`nsubj`, `dobj`,
//!   `pobj`, `ROOT`, ...).
//! - **Extractor** ([`triples::TripleExtractor`]): scans each parsed sentence
//!   for one subject, one predicate and one object.

pub mod lexicon;
pub mod parser;
pub mod triples;

use crate::error::NlpError;

/// Result type for NLP operations.
pub type NlpResult<T> = std::result::Result<T, NlpError>;

/// Coarse part-of-speech tag (Universal POS tag set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PosTag {
    Noun,
    Propn,
    Pron,
    Verb,
    Aux,
    Adj,
    Adv,
    Adp,
    Det,
    Num,
    Cconj,
    Sconj,
    Part,
    Punct,
    Other,
}

impl PosTag {
    /// Whether the tag can head a noun phrase.
    pub fn is_nominal(self) -> bool {
        matches!(self, Self::Noun | Self::Propn | Self::Pron | Self::Num)
    }
}

impl std::fmt::Display for PosTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Self::Noun => "NOUN",
            Self::Propn => "PROPN",
            Self::Pron => "PRON",
            Self::Verb => "VERB",
            Self::Aux => "AUX",
            Self::Adj => "ADJ",
            Self::Adv => "ADV",
            Self::Adp => "ADP",
            Self::Det => "DET",
            Self::Num => "NUM",
            Self::Cconj => "CCONJ",
            Self::Sconj => "SCONJ",
            Self::Part => "PART",
            Self::Punct => "PUNCT",
            Self::Other => "X",
        };
        f.write_str(tag)
    }
}

/// A parsed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Surface text as it appears in the sentence.
    pub text: String,
    /// Base form (lowercase).
    pub lemma: String,
    pub pos: PosTag,
    /// Dependency relation to `head`, e.g. `nsubj`, `dobj`, `ROOT`.
    pub dep: String,
    /// Index of the governing token within the sentence (self for `ROOT`).
    pub head: usize,
}

/// A parsed sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub text: String,
    pub tokens: Vec<Token>,
}

impl Sentence {
    /// The token labelled `ROOT`, if any.
    pub fn root(&self) -> Option<&Token> {
        self.tokens.iter().find(|t| t.dep == "ROOT")
    }
}

/// Anything that can dependency-parse English text.
pub trait DependencyParser: Send + Sync {
    /// Longest input, in bytes, a single `parse` call accepts.
    fn max_length(&self) -> usize;

    /// Segment `text` into sentences and parse each one.
    fn parse(&self, text: &str) -> NlpResult<Vec<Sentence>>;
}

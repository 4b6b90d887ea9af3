//! Rich diagnostic error types for the mosdac-kg pipeline.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so operators know exactly
//! what went wrong and how to fix it.
//!
//! Not every failure reaches the caller: per-page crawl failures are logged and
//! skipped, triple extraction degrades to an empty result, and the query pipeline
//! converts its failures into a structured error answer. Only startup problems
//! (missing credentials, no graph and no corpus) are meant to be fatal.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::llm::LlmError;

/// Top-level error type for the mosdac-kg pipeline.
#[derive(Debug, Error, Diagnostic)]
pub enum KgError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Corpus(#[from] CorpusError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Nlp(#[from] NlpError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Fetch errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum FetchError {
    #[error("HTTP {status} from {url}: the server is throttling or refusing us")]
    #[diagnostic(
        code(mosdac::fetch::throttled),
        help(
            "The host answered 429 or 403. The request is retried with backoff; \
             if it keeps failing, raise the politeness delay or crawl later."
        )
    )]
    Throttled { url: String, status: u16 },

    #[error("HTTP {status} from {url}")]
    #[diagnostic(
        code(mosdac::fetch::status),
        help("The page returned a non-success status and is skipped. No retry is attempted.")
    )]
    Status { url: String, status: u16 },

    #[error("transport error fetching {url}: {message}")]
    #[diagnostic(
        code(mosdac::fetch::transport),
        help(
            "DNS, TLS, connect or timeout failure. Check network connectivity \
             and that the host is reachable."
        )
    )]
    Transport { url: String, message: String },

    #[error("failed to read response body from {url}: {message}")]
    #[diagnostic(
        code(mosdac::fetch::body),
        help("The connection dropped or the body was not valid text.")
    )]
    Body { url: String, message: String },

    #[error("response body from {url} exceeds {limit} bytes")]
    #[diagnostic(
        code(mosdac::fetch::too_large),
        help("The page is skipped. Raise the body size cap if such pages are wanted.")
    )]
    TooLarge { url: String, limit: u64 },

    #[error("invalid URL: \"{url}\"")]
    #[diagnostic(
        code(mosdac::fetch::invalid_url),
        help("URLs must be absolute and start with http:// or https://.")
    )]
    InvalidUrl { url: String },
}

impl FetchError {
    /// Whether another attempt may succeed.
    ///
    /// Throttling (429/403) and network-level failures are retryable; every
    /// other HTTP status and an oversized body are terminal for that URL.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Throttled { .. } | Self::Transport { .. } | Self::Body { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Corpus errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CorpusError {
    #[error("corpus I/O error at {path}: {source}")]
    #[diagnostic(
        code(mosdac::corpus::io),
        help(
            "Check that the data directory exists, has correct permissions, \
             and that the disk is not full."
        )
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no pages were crawled; refusing to write an empty corpus to {path}")]
    #[diagnostic(
        code(mosdac::corpus::empty),
        help(
            "Every page failed or was too short. Check the base URL, the crawl \
             depth and the logs for fetch errors."
        )
    )]
    Empty { path: String },
}

// ---------------------------------------------------------------------------
// NLP errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum NlpError {
    #[error("input of {len} characters exceeds the parser limit of {max}")]
    #[diagnostic(
        code(mosdac::nlp::too_long),
        help("Split the text into smaller chunks before parsing.")
    )]
    InputTooLong { len: usize, max: usize },

    #[error("dependency parse failed: {message}")]
    #[diagnostic(code(mosdac::nlp::parse))]
    Parse { message: String },
}

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("graph file not found: {path}")]
    #[diagnostic(
        code(mosdac::graph::not_found),
        help("Build the graph from a corpus with `mosdac build`.")
    )]
    NotFound { path: String },

    #[error("graph I/O error at {path}: {source}")]
    #[diagnostic(
        code(mosdac::graph::io),
        help(
            "A filesystem operation failed. Check that the data directory exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("graph serialization error at {path}: {message}")]
    #[diagnostic(
        code(mosdac::graph::serde),
        help(
            "The graph file is corrupt or was written by an incompatible version. \
             Delete it and rebuild with `mosdac build`."
        )
    )]
    Serialization { path: String, message: String },

    #[error("neither a graph at {graph_path} nor a corpus at {corpus_path} exists")]
    #[diagnostic(
        code(mosdac::graph::no_data),
        help("Run `mosdac crawl` first to produce the corpus.")
    )]
    NoData {
        graph_path: String,
        corpus_path: String,
    },
}

/// Convenience alias for functions returning mosdac-kg results.
pub type KgResult<T> = std::result::Result<T, KgError>;

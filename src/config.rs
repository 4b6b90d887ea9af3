//! Runtime configuration.
//!
//! Resolution order: built-in defaults, then an optional TOML file, then
//! environment variables, then command-line flags (applied by the binary).
//! The Gemini API key is only ever read from the environment.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chat::KeywordStrategy;
use crate::nlp::triples::PredicateStrategy;

/// Environment variable holding the Gemini API key.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Errors from loading or validating configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("required credential {var} is not set")]
    #[diagnostic(
        code(mosdac::config::missing_credential),
        help("Export {var} or add it to a .env file in the working directory.")
    )]
    MissingCredential { var: String },

    #[error("failed to read config file: {path}")]
    #[diagnostic(
        code(mosdac::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    #[diagnostic(
        code(mosdac::config::parse),
        help("Check the TOML syntax and the section names ([crawl], [paths], [retrieval], [llm]).")
    )]
    Parse { path: String, message: String },

    #[error("invalid value for {var}: \"{value}\"")]
    #[diagnostic(code(mosdac::config::invalid_value))]
    InvalidValue { var: String, value: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Crawler settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Seed URL; only links on the same host are followed.
    pub base_url: String,
    /// Maximum link hops from the seed.
    pub depth: usize,
    pub politeness_delay_ms: u64,
    /// Pages with less extracted text than this are dropped.
    pub min_content_chars: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.mosdac.gov.in".into(),
            depth: 1,
            politeness_delay_ms: 500,
            min_content_chars: 50,
            timeout_secs: 5,
            user_agent: concat!("mosdac-kg/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

/// On-disk locations of the corpus and the persisted graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub corpus: PathBuf,
    pub graph: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            corpus: PathBuf::from("data/mosdac_data.txt"),
            graph: PathBuf::from("data/kg_graph.bin"),
        }
    }
}

/// Extraction and retrieval settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Maximum facts returned per keyword search.
    pub search_limit: usize,
    pub history_turns: usize,
    pub max_suggestions: usize,
    pub keyword_strategy: KeywordStrategy,
    pub predicate_strategy: PredicateStrategy,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            search_limit: 5,
            history_turns: 3,
            max_suggestions: 3,
            keyword_strategy: KeywordStrategy::default(),
            predicate_strategy: PredicateStrategy::default(),
        }
    }
}

/// Completion backend settings (the key lives in the environment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".into(),
            api_base: "https://generativelanguage.googleapis.com".into(),
            timeout_secs: 60,
        }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawl: CrawlConfig,
    pub paths: DataPaths,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
}

impl Config {
    /// Defaults, overlaid with `path` if given, overlaid with the process environment.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env_from(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML file; missing sections and keys keep their defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Overlay settings from environment-style variables supplied by `lookup`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("CRAWL_BASE_URL") {
            self.crawl.base_url = v;
        }
        if let Some(v) = get("CRAWL_DEPTH") {
            self.crawl.depth = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: "CRAWL_DEPTH".into(),
                value: v.clone(),
            })?;
        }
        if let Some(v) = get("SCRAPER_OUTPUT_PATH") {
            self.paths.corpus = PathBuf::from(v);
        }
        if let Some(v) = get("KG_GRAPH_PATH") {
            self.paths.graph = PathBuf::from(v);
        }
        if let Some(v) = get("KEYWORD_STRATEGY") {
            self.retrieval.keyword_strategy =
                v.parse().map_err(|_| ConfigError::InvalidValue {
                    var: "KEYWORD_STRATEGY".into(),
                    value: v.clone(),
                })?;
        }
        if let Some(v) = get("GEMINI_MODEL") {
            self.llm.model = v;
        }
        Ok(())
    }

    /// The Gemini API key from the process environment.
    pub fn gemini_api_key() -> ConfigResult<String> {
        Self::gemini_api_key_from(|key| std::env::var(key).ok())
    }

    pub fn gemini_api_key_from<F>(lookup: F) -> ConfigResult<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(GEMINI_API_KEY_VAR)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::MissingCredential {
                var: GEMINI_API_KEY_VAR.into(),
            })
    }
}

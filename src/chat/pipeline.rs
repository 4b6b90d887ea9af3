//! The per-query retrieval pipeline.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::RetrievalConfig;
use crate::graph::{KnowledgeBase, Triple, to_prompt_text};
use crate::llm::{CompletionBackend, LlmError};
use crate::retry::RetryPolicy;

use super::{AskResponse, ConversationHistory, KeywordStrategy};

/// Knobs for [`RagChatbot`].
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub keyword_strategy: KeywordStrategy,
    /// Turns of history included in each prompt.
    pub history_turns: usize,
    pub max_suggestions: usize,
    /// Applied to every LLM call.
    pub retry: RetryPolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            keyword_strategy: KeywordStrategy::default(),
            history_turns: 3,
            max_suggestions: 3,
            retry: RetryPolicy::default(),
        }
    }
}

impl From<&RetrievalConfig> for PipelineOptions {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            keyword_strategy: config.keyword_strategy,
            history_turns: config.history_turns,
            max_suggestions: config.max_suggestions,
            retry: RetryPolicy::default(),
        }
    }
}

/// Retrieval-augmented chatbot. Owns one conversation history, so each
/// session gets its own instance; the knowledge base may be shared.
pub struct RagChatbot {
    knowledge: Arc<dyn KnowledgeBase>,
    backend: Arc<dyn CompletionBackend>,
    history: ConversationHistory,
    options: PipelineOptions,
}

impl RagChatbot {
    pub fn new(knowledge: Arc<dyn KnowledgeBase>, backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            knowledge,
            backend,
            history: ConversationHistory::new(),
            options: PipelineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Answer a query. Never fails: errors come back as
    /// [`AskStatus::Error`](super::AskStatus::Error) and leave history untouched.
    pub fn ask(&mut self, query: &str) -> AskResponse {
        let query = query.trim();
        if query.is_empty() {
            return AskResponse::error("Please enter a question.");
        }
        info!(%query, "processing query");

        match self.answer(query) {
            Ok((answer, keywords)) => {
                self.history.add_turn(query, answer.as_str());
                let suggestions = self.suggestions(&keywords);
                AskResponse::success(answer, suggestions)
            }
            Err(e) => {
                error!(%query, error = %e, "query failed");
                AskResponse::error(format!("Error: {e}"))
            }
        }
    }

    fn answer(&self, query: &str) -> Result<(String, Vec<String>), LlmError> {
        let keywords = self.derive_keywords(query)?;
        let facts = self.retrieve(&keywords);
        debug!(?keywords, facts = facts.len(), "retrieved facts");

        let prompt = self.build_prompt(query, &to_prompt_text(&facts));
        let answer = self.complete("answer", &prompt)?;
        Ok((answer, keywords))
    }

    fn complete(&self, label: &str, prompt: &str) -> Result<String, LlmError> {
        self.options
            .retry
            .run(label, |_| self.backend.generate(prompt), LlmError::is_retryable)
    }

    /// Search keywords for `query`, per the configured strategy.
    pub fn derive_keywords(&self, query: &str) -> Result<Vec<String>, LlmError> {
        match self.options.keyword_strategy {
            KeywordStrategy::Literal => Ok(vec![query.trim().to_string()]),
            KeywordStrategy::Llm => {
                let prompt = format!(
                    "Extract the key search terms from the question below: names of \
                     satellites, instruments, missions, organisations, data products or \
                     geophysical parameters.\n\
                     Reply with a comma-separated list of terms and nothing else.\n\n\
                     Question: {query}"
                );
                let reply = self.complete("keywords", &prompt)?;
                Ok(parse_keywords(&reply))
            }
        }
    }

    /// Search the graph for each keyword and concatenate the hits.
    pub fn retrieve(&self, keywords: &[String]) -> Vec<Triple> {
        keywords
            .iter()
            .flat_map(|k| self.knowledge.search(k))
            .collect()
    }

    /// Assemble the completion prompt from facts, recent history and the query.
    pub fn build_prompt(&self, query: &str, facts: &str) -> String {
        let mut prompt = String::from(
            "You are a scientific assistant for the MOSDAC portal, specializing in \
             meteorological and oceanographic satellite data.\n\
             Use the facts below, taken from the MOSDAC knowledge graph, to add specific \
             detail to your answer. They enrich your general knowledge; they do not \
             replace it. Do not invent technical facts (specifications, product names, \
             dates, figures) found neither in the facts nor in your general knowledge.\n",
        );
        if !facts.is_empty() {
            prompt.push('\n');
            prompt.push_str(facts);
            prompt.push('\n');
        }
        let context = self.get_recent_context();
        if !context.is_empty() {
            prompt.push_str("\nRecent conversation:\n");
            prompt.push_str(&context);
        }
        prompt.push_str(&format!("\nUser: {query}\nBot:"));
        prompt
    }

    /// Follow-up questions about entities adjacent to the keywords.
    fn suggestions(&self, keywords: &[String]) -> Vec<String> {
        let max = self.options.max_suggestions;
        let mut nodes: Vec<String> = Vec::new();
        for keyword in keywords {
            for node in self.knowledge.related(keyword, max) {
                if nodes.len() == max {
                    break;
                }
                if !nodes.contains(&node) {
                    nodes.push(node);
                }
            }
        }
        nodes.into_iter().map(|n| format!("What is {n}?")).collect()
    }

    /// Recent history as prompt context.
    pub fn get_recent_context(&self) -> String {
        self.history.recent_context(self.options.history_turns)
    }

    pub fn clear_history(&mut self) {
        info!("clearing chat history");
        self.history.clear();
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }
}

impl std::fmt::Debug for RagChatbot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagChatbot")
            .field("turns", &self.history.len())
            .field("options", &self.options)
            .finish()
    }
}

/// Split a comma-separated LLM reply into trimmed, non-empty keywords.
pub fn parse_keywords(reply: &str) -> Vec<String> {
    reply
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

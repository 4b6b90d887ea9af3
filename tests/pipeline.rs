//! End-to-end: crawl an in-memory site, build the graph, answer questions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mosdac_kg::bootstrap::load_or_build;
use mosdac_kg::chat::{AskStatus, KeywordStrategy, PipelineOptions, RagChatbot};
use mosdac_kg::config::DataPaths;
use mosdac_kg::crawler::corpus::{read_corpus, write_corpus};
use mosdac_kg::crawler::{CrawlOptions, Crawler};
use mosdac_kg::error::FetchError;
use mosdac_kg::fetch::{FetchResult, FetchedPage, Fetcher};
use mosdac_kg::graph::{Triple, to_prompt_text};
use mosdac_kg::llm::{CompletionBackend, LlmError};
use mosdac_kg::nlp::triples::TripleExtractor;
use mosdac_kg::retry::RetryPolicy;

struct MemorySite {
    pages: HashMap<String, String>,
}

impl MemorySite {
    fn mosdac() -> Self {
        let mut pages = HashMap::new();
        pages.insert(
            "https://mosdac.test/".to_string(),
            "<html><head><script>var tracking = 1;</script></head><body>\
             <p>ISRO launches Chandrayaan. Chandrayaan orbits Moon.</p>\
             <a href=\"/about#team\">About</a>\
             <a href=\"https://elsewhere.test/\">Partner</a>\
             <a href=\"/docs/manual.pdf\">Manual</a>\
             </body></html>"
                .to_string(),
        );
        pages.insert(
            "https://mosdac.test/about".to_string(),
            "<html><body><p>INSAT-3D observes clouds over India. \
             The portal provides satellite data.</p></body></html>"
                .to_string(),
        );
        Self { pages }
    }
}

impl Fetcher for MemorySite {
    fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        let body = self.pages.get(url).ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })?;
        Ok(FetchedPage::direct(url, body.clone()))
    }
}

/// Answers keyword prompts with a fixed list and everything else with a
/// canned answer; records prompts.
struct StubLlm {
    keywords: String,
    prompts: Mutex<Vec<String>>,
}

impl StubLlm {
    fn new(keywords: &str) -> Arc<Self> {
        Arc::new(Self {
            keywords: keywords.to_string(),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

impl CompletionBackend for StubLlm {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if prompt.contains("comma-separated") {
            Ok(self.keywords.clone())
        } else {
            Ok("Chandrayaan orbits the Moon.".to_string())
        }
    }
}

fn crawl_into(dir: &std::path::Path) -> DataPaths {
    let crawler = Crawler::new(
        MemorySite::mosdac(),
        CrawlOptions {
            depth: 1,
            politeness_delay: Duration::ZERO,
            min_content_chars: 30,
        },
    );
    let pages = crawler.crawl("https://mosdac.test/", None);
    let paths = DataPaths {
        corpus: dir.join("data").join("mosdac_data.txt"),
        graph: dir.join("data").join("kg_graph.bin"),
    };
    write_corpus(&pages, &paths.corpus).unwrap();
    paths
}

#[test]
fn crawl_stays_on_site_and_writes_corpus() {
    let dir = tempfile::TempDir::new().unwrap();
    let paths = crawl_into(dir.path());

    let pages = read_corpus(&paths.corpus).unwrap();
    let urls: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(urls, vec!["https://mosdac.test/", "https://mosdac.test/about"]);
    assert!(pages[0].text.starts_with("ISRO launches Chandrayaan."));
    assert!(!pages[0].text.contains("tracking"));
}

#[test]
fn corpus_to_graph_to_prompt() {
    let dir = tempfile::TempDir::new().unwrap();
    let paths = crawl_into(dir.path());

    let kg = load_or_build(&paths, &TripleExtractor::default()).unwrap();
    assert!(paths.graph.exists());

    let triples = kg.triples();
    assert!(triples.contains(&Triple::new("ISRO", "launches", "Chandrayaan")));
    assert!(triples.contains(&Triple::new("Chandrayaan", "orbits", "Moon")));
    assert!(triples.contains(&Triple::new("INSAT-3D", "observes", "clouds")));

    let hits = kg.search("Moon");
    assert_eq!(hits, vec![Triple::new("Chandrayaan", "orbits", "Moon")]);
    assert_eq!(to_prompt_text(&hits), "Facts:\n1. Chandrayaan orbits Moon.");

    for keyword in ["isro", "CHANDRAYAAN", "insat"] {
        let hits = kg.search(keyword);
        assert!(!hits.is_empty());
        assert!(hits.len() <= kg.search_limit());
        assert!(hits.iter().all(|t| {
            t.subject.to_lowercase().contains(&keyword.to_lowercase())
                || t.object.to_lowercase().contains(&keyword.to_lowercase())
        }));
    }
}

#[test]
fn ask_uses_graph_facts_and_tracks_history() {
    let dir = tempfile::TempDir::new().unwrap();
    let paths = crawl_into(dir.path());
    let kg = Arc::new(load_or_build(&paths, &TripleExtractor::default()).unwrap());

    let llm = StubLlm::new("Chandrayaan, Moon");
    let mut bot = RagChatbot::new(kg, llm.clone()).with_options(PipelineOptions {
        keyword_strategy: KeywordStrategy::Llm,
        retry: RetryPolicy::immediate(3),
        ..PipelineOptions::default()
    });

    let response = bot.ask("What does Chandrayaan orbit?");
    assert_eq!(response.status, AskStatus::Success);
    assert_eq!(response.response, "Chandrayaan orbits the Moon.");
    assert_eq!(response.suggestions, vec!["What is Moon?"]);
    assert_eq!(bot.history().len(), 1);

    let prompts = llm.prompts.lock().unwrap().clone();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("Chandrayaan orbits Moon."));
    assert!(prompts[1].contains("User: What does Chandrayaan orbit?"));

    bot.clear_history();
    assert_eq!(bot.get_recent_context(), "");
}

#[test]
fn ask_json_contract() {
    let dir = tempfile::TempDir::new().unwrap();
    let paths = crawl_into(dir.path());
    let kg = Arc::new(load_or_build(&paths, &TripleExtractor::default()).unwrap());

    let mut bot = RagChatbot::new(kg, StubLlm::new("")).with_options(PipelineOptions {
        keyword_strategy: KeywordStrategy::Literal,
        retry: RetryPolicy::immediate(1),
        ..PipelineOptions::default()
    });

    let json = serde_json::to_value(bot.ask("ISRO")).unwrap();
    assert_eq!(json["status"], "success");
    assert!(json["response"].is_string());
    assert!(json["suggestions"].is_array());
}

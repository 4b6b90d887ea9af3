//! mosdac CLI: crawl the portal, build the knowledge graph, ask questions.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};

use mosdac_kg::bootstrap::{load_or_build, rebuild_from_corpus};
use mosdac_kg::chat::{KeywordStrategy, PipelineOptions, RagChatbot};
use mosdac_kg::config::Config;
use mosdac_kg::crawler::corpus::write_corpus;
use mosdac_kg::crawler::{CrawlOptions, Crawler};
use mosdac_kg::error::{CorpusError, GraphError, KgResult};
use mosdac_kg::fetch::HttpFetcher;
use mosdac_kg::graph::{KnowledgeGraph, load_graph, to_prompt_text};
use mosdac_kg::llm::GeminiClient;
use mosdac_kg::nlp::triples::TripleExtractor;

#[derive(Parser)]
#[command(name = "mosdac", version, about = "MOSDAC portal crawler, knowledge graph and chat assistant")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Corpus file (overrides config and SCRAPER_OUTPUT_PATH).
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    /// Persisted graph file (overrides config and KG_GRAPH_PATH).
    #[arg(long, global = true)]
    graph: Option<PathBuf>,

    /// Also append logs to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the portal and write the text corpus.
    Crawl {
        /// Seed URL.
        #[arg(long)]
        base_url: Option<String>,

        /// Maximum link hops from the seed.
        #[arg(long)]
        depth: Option<usize>,
    },

    /// Rebuild the knowledge graph from the corpus and persist it.
    Build,

    /// Search the graph for facts mentioning a keyword.
    Search {
        keyword: String,

        /// Maximum facts to return.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Answer one question and print the JSON result.
    Ask {
        query: String,

        /// Keyword derivation: llm or literal.
        #[arg(long)]
        keywords: Option<KeywordStrategy>,
    },

    /// Interactive chat session.
    Chat {
        /// Keyword derivation: llm or literal.
        #[arg(long)]
        keywords: Option<KeywordStrategy>,
    },

    /// Show data paths and graph statistics.
    Info,

    /// Export all facts.
    Export {
        #[arg(long, value_enum, default_value = "json")]
        format: ExportFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Dot,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(corpus) = cli.corpus {
        config.paths.corpus = corpus;
    }
    if let Some(graph) = cli.graph {
        config.paths.graph = graph;
    }

    match cli.command {
        Commands::Crawl { base_url, depth } => {
            let base_url = base_url.unwrap_or_else(|| config.crawl.base_url.clone());
            let fetcher = HttpFetcher::new(
                Duration::from_secs(config.crawl.timeout_secs),
                &config.crawl.user_agent,
            );
            let crawler = Crawler::new(fetcher, CrawlOptions::from(&config.crawl));
            let pages = crawler.crawl(&base_url, depth);

            if pages.is_empty() {
                return Err(CorpusError::Empty {
                    path: config.paths.corpus.display().to_string(),
                }
                .into());
            }
            write_corpus(&pages, &config.paths.corpus)?;
            println!(
                "Crawled {} pages into {}",
                pages.len(),
                config.paths.corpus.display()
            );
        }

        Commands::Build => {
            let kg = rebuild_from_corpus(
                &config.paths.corpus,
                &config.paths.graph,
                &extractor(&config),
            )?;
            println!(
                "Built graph: {} nodes, {} triples -> {}",
                kg.node_count(),
                kg.triple_count(),
                config.paths.graph.display()
            );
        }

        Commands::Search { keyword, limit } => {
            let mut kg = open_graph(&config)?;
            if let Some(limit) = limit {
                kg = kg.with_search_limit(limit);
            }
            let facts = kg.search(&keyword);
            if facts.is_empty() {
                println!("No facts mention \"{keyword}\".");
            } else {
                println!("{}", to_prompt_text(&facts));
            }
        }

        Commands::Ask { query, keywords } => {
            let mut bot = chatbot(&config, keywords)?;
            let response = bot.ask(&query);
            let json = serde_json::to_string_pretty(&response).into_diagnostic()?;
            println!("{json}");
        }

        Commands::Chat { keywords } => {
            let mut bot = chatbot(&config, keywords)?;
            println!("MOSDAC assistant. Type /clear to reset the conversation, exit to quit.");

            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            let mut line = String::new();
            loop {
                print!("> ");
                stdout.flush().into_diagnostic()?;
                line.clear();
                if stdin.lock().read_line(&mut line).into_diagnostic()? == 0 {
                    break;
                }

                match line.trim() {
                    "" => continue,
                    "exit" | "quit" => break,
                    "/clear" => {
                        bot.clear_history();
                        println!("History cleared.");
                    }
                    query => {
                        let response = bot.ask(query);
                        println!("{}", response.response);
                        for suggestion in &response.suggestions {
                            println!("  try: {suggestion}");
                        }
                    }
                }
            }
        }

        Commands::Info => {
            let paths = &config.paths;
            println!("corpus: {} ({})", paths.corpus.display(), presence(&paths.corpus));
            println!("graph:  {} ({})", paths.graph.display(), presence(&paths.graph));
            match load_graph(&paths.graph) {
                Ok(kg) => {
                    println!("  nodes:   {}", kg.node_count());
                    println!("  triples: {}", kg.triple_count());
                }
                Err(GraphError::NotFound { .. }) => println!("  not built yet; run `mosdac build`"),
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Export { format } => {
            let kg = open_graph(&config)?;
            match format {
                ExportFormat::Json => {
                    let json = serde_json::to_string_pretty(&kg.triples()).into_diagnostic()?;
                    println!("{json}");
                }
                ExportFormat::Dot => print!("{}", kg.to_dot()),
            }
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays clean for JSON output.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).into_diagnostic()?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .into_diagnostic()?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::io::stderr.and(Mutex::new(file)))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn extractor(config: &Config) -> TripleExtractor {
    TripleExtractor::default().with_strategy(config.retrieval.predicate_strategy)
}

fn open_graph(config: &Config) -> KgResult<KnowledgeGraph> {
    let kg = load_or_build(&config.paths, &extractor(config))?;
    Ok(kg.with_search_limit(config.retrieval.search_limit))
}

/// Startup for the query commands: credentials first, then the graph.
fn chatbot(config: &Config, keywords: Option<KeywordStrategy>) -> Result<RagChatbot> {
    let api_key = Config::gemini_api_key()?;
    let kg = open_graph(config)?;
    let backend = GeminiClient::new(&config.llm, api_key);

    let mut options = PipelineOptions::from(&config.retrieval);
    if let Some(strategy) = keywords {
        options.keyword_strategy = strategy;
    }
    Ok(RagChatbot::new(Arc::new(kg), Arc::new(backend)).with_options(options))
}

fn presence(path: &Path) -> &'static str {
    if path.exists() { "present" } else { "missing" }
}

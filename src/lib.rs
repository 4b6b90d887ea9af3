// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # mosdac-kg
//!
//! Crawls the MOSDAC satellite-data portal, distills its pages into a
//! knowledge graph of subject–predicate–object facts, and answers questions by
//! feeding matching facts to an LLM.
//!
//! ## Architecture
//!
//! - **Crawler** (`crawler`, `fetch`, `text`): depth-bounded single-site crawl
//!   with retry/backoff, visible-text extraction, flat-file corpus
//! - **Extraction** (`nlp`): dependency parsing and one-triple-per-sentence
//!   extraction
//! - **Knowledge graph** (`graph`): `petgraph` directed graph with keyword
//!   search and bincode persistence
//! - **Retrieval** (`chat`, `llm`): keyword derivation, fact lookup, prompt
//!   assembly and completion over a pluggable backend
//!
//! ## Library usage
//!
//! ```no_run
//! use mosdac_kg::graph::{build_graph, to_prompt_text};
//! use mosdac_kg::nlp::triples::TripleExtractor;
//!
//! let extractor = TripleExtractor::default();
//! let triples = extractor.extract_triples("ISRO launches Chandrayaan. Chandrayaan orbits Moon.");
//! let kg = build_graph(&triples, std::path::Path::new("data/kg_graph.bin")).unwrap();
//! println!("{}", to_prompt_text(&kg.search("Moon")));
//! ```

pub mod bootstrap;
pub mod chat;
pub mod config;
pub mod crawler;
pub mod error;
pub mod fetch;
pub mod graph;
pub mod llm;
pub mod nlp;
pub mod retry;
pub mod text;

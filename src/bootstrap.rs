//! Startup: obtain a knowledge graph from disk or from the crawled corpus.

use std::path::Path;

use tracing::{info, warn};

use crate::config::DataPaths;
use crate::crawler::corpus::read_corpus;
use crate::error::{GraphError, KgResult};
use crate::graph::{KnowledgeGraph, Triple, build_graph, load_graph};
use crate::nlp::triples::TripleExtractor;

/// Load the persisted graph, or rebuild it from the corpus.
///
/// A graph file that is missing or unreadable triggers a rebuild when the
/// corpus exists. With neither usable, startup fails: [`GraphError::NoData`]
/// if both files are absent, otherwise the load error.
pub fn load_or_build(paths: &DataPaths, extractor: &TripleExtractor) -> KgResult<KnowledgeGraph> {
    match load_graph(&paths.graph) {
        Ok(kg) => return Ok(kg),
        Err(GraphError::NotFound { .. }) if !paths.corpus.exists() => {
            return Err(GraphError::NoData {
                graph_path: paths.graph.display().to_string(),
                corpus_path: paths.corpus.display().to_string(),
            }
            .into());
        }
        Err(GraphError::NotFound { .. }) => {
            info!(graph = %paths.graph.display(), "no persisted graph, building from corpus");
        }
        Err(e) if paths.corpus.exists() => {
            warn!(graph = %paths.graph.display(), error = %e, "graph unreadable, rebuilding from corpus");
        }
        Err(e) => return Err(e.into()),
    }

    rebuild_from_corpus(&paths.corpus, &paths.graph, extractor)
}

/// Extract triples from every page of the corpus, then build and persist the graph.
pub fn rebuild_from_corpus(
    corpus_path: &Path,
    graph_path: &Path,
    extractor: &TripleExtractor,
) -> KgResult<KnowledgeGraph> {
    let pages = read_corpus(corpus_path)?;
    let triples: Vec<Triple> = pages
        .iter()
        .flat_map(|page| extractor.extract_triples(&page.text))
        .collect();
    info!(pages = pages.len(), triples = triples.len(), "corpus processed");

    Ok(build_graph(&triples, graph_path)?)
}

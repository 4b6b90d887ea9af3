//! Graph persistence: bincode snapshot of nodes and labelled edges.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::GraphError;

use super::{GraphResult, KnowledgeGraph, Triple};

const SNAPSHOT_VERSION: u32 = 1;

/// On-disk form of a [`KnowledgeGraph`].
#[derive(Debug, Serialize, Deserialize)]
struct GraphSnapshot {
    version: u32,
    nodes: Vec<String>,
    /// (subject node, object node, predicate), in edge order.
    edges: Vec<(u32, u32, String)>,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> GraphError + '_ {
    move |source| GraphError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn serde_error(path: &Path, message: impl Into<String>) -> GraphError {
    GraphError::Serialization {
        path: path.display().to_string(),
        message: message.into(),
    }
}

impl KnowledgeGraph {
    fn snapshot(&self) -> GraphSnapshot {
        let nodes = self.nodes();
        let position: std::collections::HashMap<&str, u32> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i as u32))
            .collect();
        let edges = self
            .triples()
            .into_iter()
            .filter_map(|t| {
                let s = *position.get(t.subject.as_str())?;
                let o = *position.get(t.object.as_str())?;
                Some((s, o, t.predicate))
            })
            .collect();
        GraphSnapshot {
            version: SNAPSHOT_VERSION,
            nodes,
            edges,
        }
    }

    /// Persist the graph to `path`, creating parent directories as needed.
    ///
    /// The file is written next to its destination and renamed into place.
    pub fn save(&self, path: &Path) -> GraphResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }

        let encoded = bincode::serialize(&self.snapshot())
            .map_err(|e| serde_error(path, format!("failed to serialize graph: {e}")))?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, encoded).map_err(io_error(&tmp))?;
        fs::rename(&tmp, path).map_err(io_error(path))?;

        info!(
            path = %path.display(),
            nodes = self.node_count(),
            triples = self.triple_count(),
            "graph saved"
        );
        Ok(())
    }

    /// Load a graph persisted by [`save`](Self::save).
    pub fn load(path: &Path) -> GraphResult<Self> {
        if !path.exists() {
            return Err(GraphError::NotFound {
                path: path.display().to_string(),
            });
        }

        let bytes = fs::read(path).map_err(io_error(path))?;
        let snapshot: GraphSnapshot = bincode::deserialize(&bytes)
            .map_err(|e| serde_error(path, format!("failed to deserialize graph: {e}")))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(serde_error(
                path,
                format!("unsupported snapshot version {}", snapshot.version),
            ));
        }

        let mut kg = KnowledgeGraph::new();
        for (s, o, predicate) in &snapshot.edges {
            let (Some(subject), Some(object)) = (
                snapshot.nodes.get(*s as usize),
                snapshot.nodes.get(*o as usize),
            ) else {
                return Err(serde_error(path, format!("edge refers to missing node ({s}, {o})")));
            };
            kg.insert_triple(&Triple::new(subject.as_str(), predicate.as_str(), object.as_str()));
        }

        info!(
            path = %path.display(),
            nodes = kg.node_count(),
            triples = kg.triple_count(),
            "graph loaded"
        );
        Ok(kg)
    }
}

/// Load a persisted graph; [`GraphError::NotFound`] when `path` does not exist.
pub fn load_graph(path: &Path) -> GraphResult<KnowledgeGraph> {
    KnowledgeGraph::load(path)
}

/// Build a graph from triples in order and persist it to `path`.
///
/// A save failure is logged and returned; the caller never gets an unsaved graph.
pub fn build_graph(triples: &[Triple], path: &Path) -> GraphResult<KnowledgeGraph> {
    let kg = KnowledgeGraph::from_triples(triples);
    info!(
        input = triples.len(),
        nodes = kg.node_count(),
        triples = kg.triple_count(),
        "graph built"
    );
    if let Err(e) = kg.save(path) {
        error!(path = %path.display(), error = %e, "failed to persist graph");
        return Err(e);
    }
    Ok(kg)
}

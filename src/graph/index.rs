//! In-memory knowledge graph.
//!
//! Uses `petgraph` for the graph structure and a `HashMap` for node lookups
//! by entity name. Built once, then shared read-only.

use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

use super::{EdgeData, Triple};

/// Default cap on the number of facts one search returns.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Directed graph: one node per distinct entity string, at most one edge per
/// ordered (subject, object) pair.
///
/// Inserting a second triple for an existing (subject, object) pair replaces
/// the edge's predicate.
#[derive(Clone)]
pub struct KnowledgeGraph {
    graph: DiGraph<String, EdgeData>,
    /// Entity name → NodeIndex.
    node_index: HashMap<String, NodeIndex>,
    /// Lowercased entity names, indexed by `NodeIndex::index()`.
    lowered: Vec<String>,
    search_limit: usize,
}

impl KnowledgeGraph {
    /// Create a new empty knowledge graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_index: HashMap::new(),
            lowered: Vec::new(),
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Build a graph from triples, in order.
    pub fn from_triples(triples: &[Triple]) -> Self {
        let mut kg = Self::new();
        for triple in triples {
            kg.insert_triple(triple);
        }
        kg
    }

    /// Set the search result cap (at least 1).
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit.max(1);
        self
    }

    pub fn search_limit(&self) -> usize {
        self.search_limit
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(idx) = self.node_index.get(name) {
            return *idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.node_index.insert(name.to_string(), idx);
        self.lowered.push(name.to_lowercase());
        idx
    }

    /// Insert a triple as an edge subject → object.
    ///
    /// Returns `false` (and stores nothing) when an endpoint or the predicate
    /// is empty.
    pub fn insert_triple(&mut self, triple: &Triple) -> bool {
        if triple.subject.is_empty() || triple.object.is_empty() || triple.predicate.is_empty() {
            debug!(?triple, "skipping triple with an empty field");
            return false;
        }
        let subj_idx = self.ensure_node(&triple.subject);
        let obj_idx = self.ensure_node(&triple.object);
        self.graph.update_edge(subj_idx, obj_idx, EdgeData::from(triple));
        true
    }

    fn triple_of(&self, edge: petgraph::graph::EdgeReference<'_, EdgeData>) -> Triple {
        Triple {
            subject: self.graph[edge.source()].clone(),
            predicate: edge.weight().predicate.clone(),
            object: self.graph[edge.target()].clone(),
        }
    }

    /// Facts whose subject or object contains `keyword` (case-insensitive),
    /// in edge insertion order, at most [`search_limit`](Self::search_limit).
    ///
    /// A blank keyword matches nothing.
    pub fn search(&self, keyword: &str) -> Vec<Triple> {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return vec![];
        }

        let hit: Vec<bool> = self.lowered.iter().map(|n| n.contains(&keyword)).collect();
        self.graph
            .edge_references()
            .filter(|e| hit[e.source().index()] || hit[e.target().index()])
            .take(self.search_limit)
            .map(|e| self.triple_of(e))
            .collect()
    }

    /// Distinct successors of every node whose name contains `keyword`,
    /// in node order, at most `limit`.
    pub fn related(&self, keyword: &str, limit: usize) -> Vec<String> {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() || limit == 0 {
            return vec![];
        }

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for idx in self.graph.node_indices() {
            if !self.lowered[idx.index()].contains(&keyword) {
                continue;
            }
            // petgraph yields neighbors newest-edge first; restore insertion order.
            let mut neighbors: Vec<NodeIndex> = self
                .graph
                .neighbors_directed(idx, Direction::Outgoing)
                .collect();
            neighbors.reverse();
            for n in neighbors {
                let name = &self.graph[n];
                if seen.insert(name.as_str()) {
                    out.push(name.clone());
                    if out.len() == limit {
                        return out;
                    }
                }
            }
        }
        out
    }

    /// Every fact in the graph, in edge insertion order.
    pub fn triples(&self) -> Vec<Triple> {
        self.graph
            .edge_references()
            .map(|e| self.triple_of(e))
            .collect()
    }

    /// All entity names, in insertion order.
    pub fn nodes(&self) -> Vec<String> {
        self.graph.node_weights().cloned().collect()
    }

    /// Check if an entity exists.
    pub fn has_node(&self, name: &str) -> bool {
        self.node_index.contains_key(name)
    }

    /// Predicate of the edge subject → object, if any.
    pub fn predicate_between(&self, subject: &str, object: &str) -> Option<&str> {
        let s = *self.node_index.get(subject)?;
        let o = *self.node_index.get(object)?;
        let edge = self.graph.find_edge(s, o)?;
        Some(self.graph[edge].predicate.as_str())
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of triples (edges).
    pub fn triple_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }

    /// Graphviz DOT rendering with predicates as edge labels.
    pub fn to_dot(&self) -> String {
        format!("{}", Dot::new(&self.graph))
    }
}

impl Default for KnowledgeGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KnowledgeGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeGraph")
            .field("nodes", &self.node_count())
            .field("triples", &self.triple_count())
            .field("search_limit", &self.search_limit)
            .finish()
    }
}

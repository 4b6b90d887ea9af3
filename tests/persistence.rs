//! Graph persistence and startup bootstrap.

use std::fs;

use mosdac_kg::bootstrap::{load_or_build, rebuild_from_corpus};
use mosdac_kg::config::DataPaths;
use mosdac_kg::crawler::PageRecord;
use mosdac_kg::crawler::corpus::write_corpus;
use mosdac_kg::error::{GraphError, KgError};
use mosdac_kg::graph::{KnowledgeGraph, Triple, build_graph, load_graph};
use mosdac_kg::nlp::triples::TripleExtractor;

fn paths(dir: &tempfile::TempDir) -> DataPaths {
    DataPaths {
        corpus: dir.path().join("mosdac_data.txt"),
        graph: dir.path().join("kg_graph.bin"),
    }
}

fn write_text_corpus(paths: &DataPaths, text: &str) {
    write_corpus(
        &[PageRecord {
            url: "https://mosdac.test/".into(),
            text: text.into(),
        }],
        &paths.corpus,
    )
    .unwrap();
}

#[test]
fn build_and_load_round_trip() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("kg_graph.bin");
    let triples = vec![
        Triple::new("ISRO", "launches", "Chandrayaan"),
        Triple::new("Chandrayaan", "orbits", "Moon"),
        Triple::new("Oceansat-2", "measures", "winds"),
        Triple::new("Scatterometer", "measures", "winds"),
    ];

    let built = build_graph(&triples, &path).unwrap();
    let loaded = load_graph(&path).unwrap();

    assert_eq!(loaded.triples(), built.triples());
    assert_eq!(loaded.node_count(), built.node_count());
    assert_eq!(loaded.triple_count(), 4);
}

#[test]
fn round_trip_keeps_last_write_on_duplicate_pairs() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("kg_graph.bin");
    build_graph(
        &[
            Triple::new("ISRO", "builds", "Chandrayaan"),
            Triple::new("ISRO", "launches", "Chandrayaan"),
        ],
        &path,
    )
    .unwrap();

    let loaded = load_graph(&path).unwrap();
    assert_eq!(loaded.triples(), vec![Triple::new("ISRO", "launches", "Chandrayaan")]);
}

#[test]
fn empty_graph_round_trips() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("kg_graph.bin");
    KnowledgeGraph::new().save(&path).unwrap();
    assert!(load_graph(&path).unwrap().is_empty());
}

#[test]
fn bootstrap_builds_from_corpus_when_graph_missing() {
    let dir = tempfile::TempDir::new().unwrap();
    let paths = paths(&dir);
    write_text_corpus(&paths, "ISRO launches Chandrayaan. Chandrayaan orbits Moon.");

    let kg = load_or_build(&paths, &TripleExtractor::default()).unwrap();
    assert_eq!(kg.triple_count(), 2);
    assert!(paths.graph.exists());
}

#[test]
fn bootstrap_prefers_persisted_graph() {
    let dir = tempfile::TempDir::new().unwrap();
    let paths = paths(&dir);
    write_text_corpus(&paths, "ISRO launches Chandrayaan.");
    build_graph(&[Triple::new("Megha-Tropiques", "studies", "rainfall")], &paths.graph).unwrap();

    let kg = load_or_build(&paths, &TripleExtractor::default()).unwrap();
    assert_eq!(kg.triples(), vec![Triple::new("Megha-Tropiques", "studies", "rainfall")]);
}

#[test]
fn bootstrap_rebuilds_over_corrupt_graph() {
    let dir = tempfile::TempDir::new().unwrap();
    let paths = paths(&dir);
    write_text_corpus(&paths, "ISRO launches Chandrayaan.");
    fs::write(&paths.graph, b"\x00\x01 not a graph").unwrap();

    let kg = load_or_build(&paths, &TripleExtractor::default()).unwrap();
    assert_eq!(kg.triples(), vec![Triple::new("ISRO", "launches", "Chandrayaan")]);
    assert_eq!(load_graph(&paths.graph).unwrap().triple_count(), 1);
}

#[test]
fn bootstrap_without_data_is_fatal() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = load_or_build(&paths(&dir), &TripleExtractor::default()).unwrap_err();
    assert!(matches!(err, KgError::Graph(GraphError::NoData { .. })));
}

#[test]
fn explicit_rebuild_replaces_persisted_graph() {
    let dir = tempfile::TempDir::new().unwrap();
    let paths = paths(&dir);
    build_graph(&[Triple::new("old", "fact", "here")], &paths.graph).unwrap();
    write_text_corpus(&paths, "Chandrayaan orbits Moon.");

    rebuild_from_corpus(&paths.corpus, &paths.graph, &TripleExtractor::default()).unwrap();
    assert_eq!(
        load_graph(&paths.graph).unwrap().triples(),
        vec![Triple::new("Chandrayaan", "orbits", "Moon")]
    );
}

//! Benchmarks for extraction and graph search.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use mosdac_kg::graph::{KnowledgeGraph, Triple, to_prompt_text};
use mosdac_kg::nlp::triples::TripleExtractor;

const CORPUS_PARAGRAPH: &str = "INSAT-3D observes clouds over India. \
    The imager measures sea surface temperature. \
    Oceansat-2 carries a scatterometer. \
    The scatterometer measures ocean winds. \
    MOSDAC distributes satellite data to researchers. \
    ISRO launches Chandrayaan. Chandrayaan orbits Moon.\n";

fn synthetic_graph(n: usize) -> KnowledgeGraph {
    let triples: Vec<Triple> = (0..n)
        .map(|i| {
            Triple::new(
                format!("Satellite-{}", i % 50),
                "measures",
                format!("parameter-{i}"),
            )
        })
        .collect();
    KnowledgeGraph::from_triples(&triples)
}

fn bench_extract(c: &mut Criterion) {
    let extractor = TripleExtractor::default();
    let text = CORPUS_PARAGRAPH.repeat(20);

    c.bench_function("extract_140_sentences", |bench| {
        bench.iter(|| black_box(extractor.extract_triples(black_box(&text))))
    });
}

fn bench_search(c: &mut Criterion) {
    let kg = synthetic_graph(10_000);

    c.bench_function("search_10k_edges_hit", |bench| {
        bench.iter(|| black_box(kg.search(black_box("satellite-7"))))
    });
    c.bench_function("search_10k_edges_miss", |bench| {
        bench.iter(|| black_box(kg.search(black_box("chandrayaan"))))
    });
}

fn bench_prompt(c: &mut Criterion) {
    let kg = synthetic_graph(1_000);
    let facts = kg.search("satellite-1");

    c.bench_function("prompt_text_5", |bench| {
        bench.iter(|| black_box(to_prompt_text(black_box(&facts))))
    });
}

criterion_group!(benches, bench_extract, bench_search, bench_prompt);
criterion_main!(benches);

//! Criterion benchmarks for indexing and search throughput.

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};

use bantam::document::Document;
use bantam::engine::SearchEngine;
use bantam::search::Page;

const CATEGORIES: [&str; 4] = ["Electronics", "Books", "Clothing", "Toys"];

fn generate_products(count: usize) -> Vec<Document> {
    (0..count)
        .map(|i| {
            Document::builder(format!("{i}"))
                .add_text("name", format!("Product {i}"))
                .add_text("category", CATEGORIES[i % CATEGORIES.len()])
                .build()
        })
        .collect()
}

fn populated_engine(count: usize) -> SearchEngine {
    let engine = SearchEngine::in_memory().unwrap();
    engine.batch_index(generate_products(count)).unwrap();
    engine
}

fn bench_batch_indexing(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_indexing");
    for count in [1_000usize, 10_000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("{count}_docs"), |b| {
            let docs = generate_products(count);
            b.iter(|| {
                let engine = SearchEngine::in_memory().unwrap();
                engine.batch_index(black_box(docs.clone())).unwrap();
                black_box(engine.doc_count())
            });
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let engine = populated_engine(10_000);
    let mut group = c.benchmark_group("search");

    let queries = [
        ("term", "category:Electronics"),
        ("boolean", "category:Electronics AND name:Product*"),
        ("phrase", "name:\"Product 42\""),
        ("wildcard", "name:Product*"),
    ];
    for (label, query) in queries {
        group.bench_function(label, |b| {
            b.iter(|| {
                black_box(
                    engine
                        .search(black_box(query), Page { from: 0, size: 10 })
                        .unwrap(),
                )
            });
        });
    }
    group.finish();
}

fn bench_single_doc_updates(c: &mut Criterion) {
    let mut group = c.benchmark_group("updates");
    group.bench_function("reindex_one_of_1000", |b| {
        let engine = populated_engine(1_000);
        b.iter(|| {
            engine
                .index(
                    Document::builder("42")
                        .add_text("name", "Product 42 revised")
                        .add_text("category", "Electronics")
                        .build(),
                )
                .unwrap();
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_batch_indexing,
    bench_search,
    bench_single_doc_updates
);
criterion_main!(benches);

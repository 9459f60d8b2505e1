//! Durability tests over the file-backed storage.

use std::fs;

use bantam::document::Document;
use bantam::engine::SearchEngine;
use bantam::search::Page;

fn product(id: &str, name: &str, category: &str) -> Document {
    Document::builder(id)
        .add_text("name", name)
        .add_text("category", category)
        .build()
}

#[test]
fn reopened_index_serves_the_same_results() {
    let dir = tempfile::tempdir().unwrap();
    {
        let engine = SearchEngine::create_in_dir(dir.path()).unwrap();
        engine.index(product("1", "Product 1", "Electronics")).unwrap();
        engine.index(product("2", "Product 2", "Books")).unwrap();
        engine.delete("2").unwrap();
        engine.close().unwrap();
    }

    let engine = SearchEngine::open_dir(dir.path()).unwrap();
    assert_eq!(engine.doc_count(), 1);

    let results = engine.search("category:Electronics", Page::default()).unwrap();
    assert_eq!(results.total_hits, 1);
    assert_eq!(results.hits[0].id, "1");
    assert_eq!(results.hits[0].fields.get("name").unwrap(), "Product 1");

    assert_eq!(
        engine.search("category:Books", Page::default()).unwrap().total_hits,
        0
    );
}

#[test]
fn every_commit_is_durable_without_close() {
    let dir = tempfile::tempdir().unwrap();
    {
        let engine = SearchEngine::create_in_dir(dir.path()).unwrap();
        engine.index(product("1", "Product 1", "Electronics")).unwrap();
        // No close: the commit itself must have persisted.
    }

    let engine = SearchEngine::open_dir(dir.path()).unwrap();
    assert_eq!(engine.doc_count(), 1);
}

#[test]
fn stale_partial_segment_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    {
        let engine = SearchEngine::create_in_dir(dir.path()).unwrap();
        engine.index(product("1", "Product 1", "Electronics")).unwrap();
    }

    // A crash mid-commit leaves a temporary segment behind; opening must
    // use the last complete one.
    fs::write(dir.path().join("segment.tmp"), b"garbage from a dead writer").unwrap();

    let engine = SearchEngine::open_dir(dir.path()).unwrap();
    assert_eq!(engine.doc_count(), 1);
    assert_eq!(
        engine
            .search("category:Electronics", Page::default())
            .unwrap()
            .total_hits,
        1
    );
}

#[test]
fn opening_a_directory_without_a_segment_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(SearchEngine::open_dir(dir.path()).is_err());
}

#[test]
fn reopening_continues_ordinal_assignment() {
    let dir = tempfile::tempdir().unwrap();
    {
        let engine = SearchEngine::create_in_dir(dir.path()).unwrap();
        engine.index(product("1", "Product 1", "Electronics")).unwrap();
        engine.index(product("2", "Product 2", "Books")).unwrap();
    }

    let engine = SearchEngine::open_dir(dir.path()).unwrap();
    engine.index(product("3", "Product 3", "Toys")).unwrap();
    engine.index(product("1", "Product 1 v2", "Toys")).unwrap();

    assert_eq!(engine.doc_count(), 3);
    let results = engine.search("category:Toys", Page::default()).unwrap();
    let ids: Vec<&str> = results.hits.iter().map(|hit| hit.id.as_str()).collect();
    assert_eq!(ids, ["3", "1"]);
}

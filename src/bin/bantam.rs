//! Command-line front end: seed a demo catalog, bulk index it, and search.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::Rng;

use bantam::document::Document;
use bantam::engine::SearchEngine;
use bantam::search::Page;

const CATEGORIES: [&str; 4] = ["Electronics", "Books", "Clothing", "Toys"];

#[derive(Parser)]
#[command(name = "bantam", version, about = "A small full-text search engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a product catalog as JSON lines.
    Seed {
        /// Number of products to generate.
        #[arg(long, default_value_t = 100_000)]
        count: u64,
        /// Output file, one JSON document per line.
        #[arg(long, default_value = "products.jsonl")]
        out: PathBuf,
    },
    /// Bulk index a JSON lines file into an index directory.
    Index {
        /// Index directory, created if absent.
        #[arg(long, env = "BANTAM_DIR", default_value = "bantam.idx")]
        dir: PathBuf,
        /// Input file produced by `seed`, or any file of document JSON lines.
        #[arg(long, default_value = "products.jsonl")]
        input: PathBuf,
    },
    /// Run a query against an existing index.
    Search {
        /// Index directory.
        #[arg(long, env = "BANTAM_DIR", default_value = "bantam.idx")]
        dir: PathBuf,
        /// Query string, e.g. 'category:Electronics AND name:Product*'.
        query: String,
        /// Number of leading hits to skip.
        #[arg(long, default_value_t = 0)]
        from: usize,
        /// Page size; 0 means the default of 50.
        #[arg(long, default_value_t = 10)]
        size: usize,
        /// Give up after this many milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
}

fn main() -> anyhow::Result<()> {
    match Cli::parse().command {
        Command::Seed { count, out } => seed(count, &out),
        Command::Index { dir, input } => index(&dir, &input),
        Command::Search {
            dir,
            query,
            from,
            size,
            timeout_ms,
        } => search(&dir, &query, from, size, timeout_ms),
    }
}

fn seed(count: u64, out: &PathBuf) -> anyhow::Result<()> {
    let file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    let mut writer = BufWriter::new(file);
    let mut rng = rand::rng();
    for i in 0..count {
        let doc = Document::builder(format!("{}", i + 1))
            .add_text("name", format!("Product {}", i + 1))
            .add_text("category", CATEGORIES[(i as usize) % CATEGORIES.len()])
            .add_text("price", format!("{}", rng.random_range(1..=500)))
            .build();
        serde_json::to_writer(&mut writer, &doc)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    println!("wrote {count} documents to {}", out.display());
    Ok(())
}

fn index(dir: &PathBuf, input: &PathBuf) -> anyhow::Result<()> {
    let file = File::open(input).with_context(|| format!("opening {}", input.display()))?;
    let reader = BufReader::new(file);
    let docs = reader.lines().filter_map(|line| match line {
        Ok(line) if line.trim().is_empty() => None,
        Ok(line) => serde_json::from_str::<Document>(&line).ok(),
        Err(_) => None,
    });

    let started = Instant::now();
    let engine = SearchEngine::open_or_create_dir(dir)?;
    let indexed = engine.batch_index(docs)?;
    engine.close()?;
    println!(
        "indexed {indexed} documents into {} in {:.2?}",
        dir.display(),
        started.elapsed()
    );
    Ok(())
}

fn search(
    dir: &PathBuf,
    query: &str,
    from: usize,
    size: usize,
    timeout_ms: Option<u64>,
) -> anyhow::Result<()> {
    let engine = SearchEngine::open_dir(dir)?;
    let deadline = timeout_ms.map(|ms| Instant::now() + Duration::from_millis(ms));
    let started = Instant::now();
    let results = engine.search_with_deadline(query, Page { from, size }, deadline)?;
    let took = started.elapsed();
    println!("{}", serde_json::to_string_pretty(&results)?);
    println!(
        "{} of {} hits in {:.2?}",
        results.hits.len(),
        results.total_hits,
        took
    );
    Ok(())
}

//! # Corpus Engine Main Driver
//!
//! ## Purpose
//! Command line entry point for the Greek corpus engine. Loads corpus entries
//! and the thematic division forest from JSON files, then runs one of the
//! engine operations and prints the result as JSON.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration file, command line arguments, JSON corpus files
//! - **Output**: Pretty-printed JSON on stdout, structured logs on stderr
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Load corpus entries (and divisions where the action needs them)
//! 4. Run the requested action (reindex, search, classify, book-map, analytics)
//! 5. Serialize the result to stdout

use anyhow::{bail, Context, Result};
use clap::{Arg, Command};
use std::path::Path;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use greek_corpus_engine::{
    analytics,
    classify::{DivisionForest, ThematicDivision},
    config::Config,
    Entry, GroupMode, LemmaSearcher, Lemmatizer,
};

fn main() -> Result<()> {
    // Parse command line arguments
    let matches = Command::new("corpus-engine")
        .version("1.0.0")
        .author("Greek Corpus Team")
        .about("Text normalization, lemma search and thematic classification for a Greek corpus")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("entries")
                .short('e')
                .long("entries")
                .value_name("FILE")
                .help("Corpus entries JSON file")
                .default_value("entries.json"),
        )
        .arg(
            Arg::new("divisions")
                .short('d')
                .long("divisions")
                .value_name("FILE")
                .help("Thematic divisions JSON file")
                .default_value("divisions.json"),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("MODE")
                .help("Grouping mode: school or author")
                .value_parser(["school", "author"]),
        )
        .arg(
            Arg::new("reindex")
                .long("reindex")
                .help("Rebuild lemma indices and word counts, writing entries back out")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Output file for --reindex (defaults to the entries file)"),
        )
        .arg(
            Arg::new("search")
                .short('s')
                .long("search")
                .value_name("QUERY")
                .help("Search the corpus for a Greek word or phrase"),
        )
        .arg(
            Arg::new("classify")
                .long("classify")
                .help("Aggregate the corpus over the thematic division forest")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("book-map")
                .long("book-map")
                .help("Emit the per-book, per-chapter dominant group map")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("analytics")
                .long("analytics")
                .help("Emit corpus-wide roll-ups and the lemma frequency ranking")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    // Load configuration
    let config_path = matches.get_one::<String>("config").expect("has default");
    let mut config = Config::from_file(config_path)?;

    if let Some(mode) = matches.get_one::<String>("mode") {
        config.grouping.mode = match mode.as_str() {
            "author" => GroupMode::Author,
            _ => GroupMode::School,
        };
    }

    // Initialize logging
    init_logging(&config)?;
    info!("Configuration loaded from: {}", config_path);

    let entries_path = matches.get_one::<String>("entries").expect("has default");
    let mut entries = load_entries(entries_path)?;
    info!("Loaded {} corpus entries from {}", entries.len(), entries_path);

    if matches.get_flag("reindex") {
        let lemmatizer = Lemmatizer::new()?;
        let reindexed = lemmatizer.reindex_all(&mut entries)?;
        info!("Reindexed {} entries", reindexed);
        let output = matches
            .get_one::<String>("output")
            .unwrap_or(entries_path);
        write_entries(output, &entries)?;
        println!("{{\"reindexed\": {}}}", reindexed);
        return Ok(());
    }

    if let Some(query) = matches.get_one::<String>("search") {
        let searcher = LemmaSearcher::new()?;
        let hits = searcher.search(query, &entries);
        info!("Query matched {} of {} entries", hits.len(), entries.len());
        print_json(&hits)?;
        return Ok(());
    }

    if matches.get_flag("classify") {
        let divisions_path = matches.get_one::<String>("divisions").expect("has default");
        let forest = load_forest(divisions_path)?;
        let reports = forest.aggregate(&entries, config.grouping.mode);
        print_json(&reports)?;
        return Ok(());
    }

    if matches.get_flag("book-map") {
        let map = analytics::book_map(
            &entries,
            config.grouping.mode,
            config.grouping.author_share_threshold,
        );
        print_json(&map)?;
        return Ok(());
    }

    if matches.get_flag("analytics") {
        let lemmatizer = Lemmatizer::new()?;
        let summary = analytics::corpus_analytics(&entries);
        let top = analytics::lemma_frequency(&lemmatizer, &entries, config.analytics.top_lemmas);
        let combined = serde_json::json!({
            "summary": summary,
            "top_lemmas": top,
        });
        print_json(&combined)?;
        return Ok(());
    }

    bail!("No action requested; pass one of --reindex, --search, --classify, --book-map, --analytics")
}

/// Initialize logging and tracing
fn init_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_new(&config.logging.level)
        .with_context(|| format!("Invalid log level: {}", config.logging.level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .init();

    Ok(())
}

fn load_entries(path: &str) -> Result<Vec<Entry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read entries file {}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse entries file {}", path))
}

fn load_forest(path: &str) -> Result<DivisionForest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read divisions file {}", path))?;
    let divisions: Vec<ThematicDivision> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse divisions file {}", path))?;
    info!("Loaded {} thematic divisions from {}", divisions.len(), path);
    Ok(DivisionForest::new(divisions)?)
}

fn write_entries(path: &str, entries: &[Entry]) -> Result<()> {
    let json = serde_json::to_string_pretty(entries)?;
    std::fs::write(Path::new(path), json)
        .with_context(|| format!("Failed to write entries file {}", path))?;
    info!("Wrote {} entries to {}", entries.len(), path);
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

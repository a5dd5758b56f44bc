//! Partscout CLI - parts catalog search tool

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use partscout_core::{analyze_query, load_catalog, CompiledDictionary, SearchEngine};

#[derive(Parser)]
#[command(name = "partscout")]
#[command(about = "Dictionary-driven parts catalog search")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a catalog
    Search {
        /// Search query
        query: String,

        /// Path to the catalog snapshot (JSON array of items)
        #[arg(short, long)]
        catalog: PathBuf,

        /// Path to a dictionary document (builtin dictionary if omitted)
        #[arg(short, long)]
        dictionary: Option<PathBuf>,

        /// Number of results to return
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show how a query is normalized, tokenized, and expanded
    Analyze {
        /// Query to analyze
        query: String,

        /// Path to a dictionary document (builtin dictionary if omitted)
        #[arg(short, long)]
        dictionary: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Validate a dictionary document
    Check {
        /// Path to a dictionary document (builtin dictionary if omitted)
        #[arg(short, long)]
        dictionary: Option<PathBuf>,
    },

    /// Show index statistics for a catalog
    Stats {
        /// Path to the catalog snapshot
        #[arg(short, long)]
        catalog: PathBuf,

        /// Path to a dictionary document (builtin dictionary if omitted)
        #[arg(short, long)]
        dictionary: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Search {
            query,
            catalog,
            dictionary,
            limit,
            format,
        } => {
            run_search(&query, &catalog, dictionary.as_deref(), limit, &format)?;
        }

        Commands::Analyze {
            query,
            dictionary,
            format,
        } => {
            let dict = load_dictionary(dictionary.as_deref())?;
            let analysis = analyze_query(&dict, &query);

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                println!("\n=== Analysis for: \"{}\" ===\n", query);
                println!("Normalized description: {}", analysis.normalized_description);
                println!("Normalized part number: {}", analysis.normalized_part_number);
                println!("Tokens:                 {}", analysis.raw_tokens.join(" "));
                println!("Expanded tokens:        {}", sorted(&analysis.expanded_tokens));
                println!("Dimensions:             {}", sorted(&analysis.dimensions));
            }
        }

        Commands::Check { dictionary } => {
            run_check(dictionary.as_deref())?;
        }

        Commands::Stats {
            catalog,
            dictionary,
        } => {
            let dict = load_dictionary(dictionary.as_deref())?;
            let items = load_catalog(&catalog)?;
            let engine = SearchEngine::build(Arc::new(dict), &items);
            let stats = engine.stats();

            println!("\n=== Index Statistics ===");
            println!("Items indexed:       {}", stats.items);
            println!("Empty descriptions:  {}", stats.empty_descriptions);
            println!("Distinct tokens:     {}", stats.distinct_tokens);
            println!("Distinct dimensions: {}", stats.distinct_dimensions);
            println!("With category hint:  {}", stats.categorized);
        }
    }

    Ok(())
}

fn load_dictionary(path: Option<&std::path::Path>) -> Result<CompiledDictionary> {
    match path {
        Some(path) => CompiledDictionary::load(path),
        None => Ok(CompiledDictionary::builtin()),
    }
}

fn run_search(
    query: &str,
    catalog: &std::path::Path,
    dictionary: Option<&std::path::Path>,
    limit: usize,
    format: &str,
) -> Result<()> {
    let dict = load_dictionary(dictionary)?;
    let items = load_catalog(catalog)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.set_message(format!("Indexing {} items...", items.len()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let engine = SearchEngine::build(Arc::new(dict), &items);
    spinner.finish_and_clear();

    let mut hits = engine.search(query);
    hits.truncate(limit);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    println!("\n=== Search Results for: \"{}\" ===\n", query);
    if hits.is_empty() {
        println!("No matches.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        println!(
            "{}. {} (score: {})",
            i + 1,
            hit.item.part_number.bold(),
            hit.score.to_string().green()
        );
        println!("   {}", hit.item.description);
        if !hit.matched_tokens.is_empty() {
            println!("   Tokens: {}", hit.matched_tokens.join(", "));
        }
        if !hit.matched_dimensions.is_empty() {
            println!("   Dimensions: {}", hit.matched_dimensions.join(", "));
        }
        if let Some(ref category) = hit.matched_category {
            println!("   Category: {}", category.cyan());
        }
        if hit.part_number_matched {
            println!("   {}", "Part number match".yellow());
        }
        println!();
    }

    Ok(())
}

fn run_check(dictionary: Option<&std::path::Path>) -> Result<()> {
    let dict = match dictionary {
        Some(path) => {
            CompiledDictionary::load(path).context("Dictionary failed validation")?
        }
        None => CompiledDictionary::builtin(),
    };

    println!("\n{} Dictionary '{}' is valid", "✓".green(), dict.version);
    println!("  Synonym tables:  {}", dict.table_count());
    println!("  Linked tokens:   {}", dict.graph.token_count());
    println!("  Synonym edges:   {}", dict.graph.edge_count());
    println!("  Stopwords:       {}", dict.stopwords.len());
    println!("  Templates:       {}", dict.extractor.template_count());
    for name in dict.extractor.template_names() {
        println!("    - {}", name);
    }
    println!("  Category rules:  {}", dict.categories.len());

    Ok(())
}

fn sorted(set: &std::collections::HashSet<String>) -> String {
    let mut values: Vec<&str> = set.iter().map(String::as_str).collect();
    values.sort_unstable();
    values.join(" ")
}

//! Help-Harvest main entry point
//!
//! This is the command-line interface for crawling a help centre and
//! chunking the crawled pages.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use help_harvest::chunker::{ChunkParser, HtmlChunker, OpenAiChunker};
use help_harvest::config::{load_config_with_hash, Config};
use help_harvest::crawler::Crawler;
use help_harvest::output::{
    load_report, print_report, read_record, write_crawl_output, write_transform_output, CrawlData,
    DATA_FILE,
};
use help_harvest::transform::transform;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Help-Harvest: a documentation-site dataset builder
///
/// Help-Harvest crawls a help centre breadth-first from a single seed,
/// then splits each article into size-bounded text chunks ready for
/// embedding.
#[derive(Parser, Debug)]
#[command(name = "help-harvest")]
#[command(version)]
#[command(about = "Crawl a help centre and chunk it for embedding", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the site and write the raw page corpus
    Crawl {
        /// Path to TOML configuration file
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Seed URL (overrides the configured seed)
        #[arg(long)]
        seed: Option<String>,

        /// Output directory (overrides output.raw-dir)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Chunk a crawled corpus
    Chunk {
        /// Path to TOML configuration file
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Crawl data file (defaults to data.json in output.raw-dir)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output directory (overrides output.processed-dir)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Chunking backend
        #[arg(long, value_enum, default_value_t = ParserKind::Html)]
        parser: ParserKind,

        /// Only chunk these URLs (repeatable)
        #[arg(long = "url", value_name = "URL")]
        urls: Vec<String>,
    },

    /// Print statistics from a crawl or transform report
    Stats {
        /// Path to report.json or data.json
        #[arg(value_name = "REPORT")]
        report: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ParserKind {
    /// Local structural chunker
    Html,
    /// OpenAI-compatible chat model
    Openai,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Crawl {
            config,
            seed,
            output,
        } => handle_crawl(&config, seed, output).await,
        Command::Chunk {
            config,
            input,
            output,
            parser,
            urls,
        } => handle_chunk(&config, input, output, parser, urls).await,
        Command::Stats { report } => handle_stats(&report),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("help_harvest=info,warn"),
            1 => EnvFilter::new("help_harvest=debug,info"),
            2 => EnvFilter::new("help_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads and validates the configuration, logging its hash
fn load(path: &Path) -> Result<Config> {
    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Handles the `crawl` subcommand
async fn handle_crawl(config_path: &Path, seed: Option<String>, output: Option<PathBuf>) -> Result<()> {
    let config = load(config_path)?;
    let seed = seed.unwrap_or_else(|| config.site.seed_url());
    let output = output.unwrap_or_else(|| PathBuf::from(&config.output.raw_dir));

    let mut crawler = Crawler::new(&config).context("Failed to initialise crawler")?;
    let outcome = crawler.run(&seed).await.context("Crawl failed")?;

    tracing::info!(
        "Crawl finished: {} visited, {} failed, {} skipped",
        outcome.state.visited_count(),
        outcome.state.failed_count(),
        outcome.state.skipped_count()
    );

    let data = outcome.into_data();
    write_crawl_output(&output, &data)
        .with_context(|| format!("Failed to write crawl output to {}", output.display()))?;
    tracing::info!("Crawl output written to {}", output.display());

    Ok(())
}

/// Handles the `chunk` subcommand
async fn handle_chunk(
    config_path: &Path,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    parser_kind: ParserKind,
    urls: Vec<String>,
) -> Result<()> {
    let config = load(config_path)?;
    let input = input.unwrap_or_else(|| Path::new(&config.output.raw_dir).join(DATA_FILE));
    let output = output.unwrap_or_else(|| PathBuf::from(&config.output.processed_dir));

    let parser: Box<dyn ChunkParser> = match parser_kind {
        ParserKind::Html => Box::new(HtmlChunker::from_config(&config.chunker)),
        ParserKind::Openai => Box::new(
            OpenAiChunker::from_config(&config).context("Failed to set up the remote chunker")?,
        ),
    };

    let corpus: CrawlData = read_record(&input)
        .with_context(|| format!("Failed to read crawl data from {}", input.display()))?;
    tracing::info!("Loaded {} pages from {}", corpus.results.len(), input.display());

    let targets = (!urls.is_empty()).then_some(urls.as_slice());
    let outcome = transform(&corpus, parser.as_ref(), targets).await;

    tracing::info!(
        "Transform finished: {} pages chunked into {} chunks, {} skipped",
        outcome.chunks.len(),
        outcome.chunk_count(),
        outcome.skipped.len()
    );

    let data = outcome.into_data();
    write_transform_output(&output, &data)
        .with_context(|| format!("Failed to write transform output to {}", output.display()))?;
    tracing::info!("Transform output written to {}", output.display());

    Ok(())
}

/// Handles the `stats` subcommand
fn handle_stats(path: &Path) -> Result<()> {
    let report = load_report(path)
        .with_context(|| format!("Failed to load report from {}", path.display()))?;
    print_report(&report);
    Ok(())
}

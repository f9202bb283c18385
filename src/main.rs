//! Sumi-Graph main entry point
//!
//! This is the command-line interface for the Sumi-Graph extraction engine.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use sumi_graph::config::{load_settings, ExtractorKind, GraphConfigBuilder, Settings};
use sumi_graph::extractor;
use sumi_graph::graph::{Graph, GraphBuilder, NodeFactory, StrategyKind};
use sumi_graph::output::{render, write_result, OutputFormat};
use sumi_graph::FetcherRegistry;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Sumi-Graph: graph-driven web content extraction
///
/// Fetches one page, a list of pages, the results of a search or a bounded
/// crawl, extracts content from each page following the prompt and prints a
/// combined result.
#[derive(Parser, Debug)]
#[command(name = "sumi-graph")]
#[command(version = "1.0.0")]
#[command(about = "Graph-driven web content extraction", long_about = None)]
struct Cli {
    /// Target URL, or a comma-separated list of URLs
    #[arg(value_name = "URL")]
    url: String,

    /// What to extract from each page
    #[arg(short, long)]
    prompt: String,

    /// Strategy (smart, multi, search); inferred from the URL when omitted
    #[arg(short = 't', long = "type", value_name = "STRATEGY")]
    strategy: Option<StrategyKind>,

    /// Follow links this many levels below the seed page
    #[arg(long)]
    max_depth: Option<u32>,

    /// Cap on pages crawled or search results visited
    #[arg(long)]
    max_pages: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Pause between paced requests in milliseconds
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Maximum paced requests per second
    #[arg(long, value_name = "RPS")]
    rate_limit: Option<u32>,

    /// Render pages with a WebDriver browser
    #[arg(long)]
    js: bool,

    /// Only follow links whose whole URL matches this regex
    #[arg(long, value_name = "REGEX")]
    link_pattern: Option<String>,

    /// Extract only the text under this CSS selector
    #[arg(long, value_name = "CSS")]
    selector: Option<String>,

    /// Model override for the LLM extractor
    #[arg(long)]
    model: Option<String>,

    /// Sampling temperature override for the LLM extractor
    #[arg(long)]
    temperature: Option<f32>,

    /// Reply length override for the LLM extractor
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Extra request header (NAME:VALUE), repeatable
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE")]
    headers: Vec<String>,

    /// Re-extract links from every crawled page, not only the seed
    #[arg(long)]
    follow_nested: bool,

    /// Disable the in-memory page cache
    #[arg(long)]
    no_cache: bool,

    /// Path to TOML settings file
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Output format (text, markdown, json)
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Write the result to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Validate settings and show the selected strategy without fetching
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let settings = match &cli.settings {
        Some(path) => {
            tracing::info!("Loading settings from: {}", path.display());
            load_settings(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?
        }
        None => Settings::default(),
    };

    let kind = StrategyKind::resolve(cli.strategy, &cli.url);
    let config = request_config(&cli, &settings)?;

    if cli.dry_run {
        return handle_dry_run(&cli, kind, config, &settings);
    }

    let registry = FetcherRegistry::standard(&settings).context("failed to build fetchers")?;
    let extractor =
        extractor::from_settings(&settings.extractor).context("failed to build extractor")?;

    let cancel = CancellationToken::new();
    let factory = NodeFactory::new(Arc::new(registry), extractor).with_cancellation(cancel.clone());
    let builder = GraphBuilder::new(factory).with_defaults(settings.defaults.clone());
    let graph = builder
        .for_request(&cli.url, Some(kind), config)
        .context("invalid request")?;

    // Cancel the running graph on Ctrl-C
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling");
            cancel.cancel();
        }
    });

    let result = handle_run(graph.as_ref()).await;

    match &cli.output {
        Some(path) => write_result(&result, cli.format, path)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{}", render(&result, cli.format)?),
    }

    if !result.success {
        anyhow::bail!(
            "scrape failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only the result.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_graph=info,warn"),
            1 => EnvFilter::new("sumi_graph=debug,info"),
            2 => EnvFilter::new("sumi_graph=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Collects every request setting except the URL
fn request_config(cli: &Cli, settings: &Settings) -> anyhow::Result<GraphConfigBuilder> {
    if settings.extractor.kind == ExtractorKind::Llm && cli.prompt.trim().is_empty() {
        anyhow::bail!("--prompt cannot be empty with the llm extractor");
    }

    let mut builder = GraphConfigBuilder::from_defaults(&settings.defaults)
        .prompt(cli.prompt.as_str())
        .follow_nested_links(cli.follow_nested);

    if let Some(depth) = cli.max_depth {
        builder = builder.max_depth(depth);
    }
    if let Some(pages) = cli.max_pages {
        builder = builder.max_pages(pages);
    }
    if let Some(timeout) = cli.timeout {
        builder = builder.timeout_secs(timeout);
    }
    if let Some(delay) = cli.delay_ms {
        builder = builder.delay_millis(delay);
    }
    if let Some(rps) = cli.rate_limit {
        builder = builder.rate_limit(rps);
    }
    if cli.js {
        builder = builder.enable_javascript(true);
    }
    if cli.no_cache {
        builder = builder.enable_cache(false);
    }
    if let Some(pattern) = &cli.link_pattern {
        builder = builder.link_pattern(pattern.as_str());
    }
    if let Some(selector) = &cli.selector {
        builder = builder.css_selector(selector.as_str());
    }
    if let Some(model) = &cli.model {
        builder = builder.model(model.as_str());
    }
    if let Some(temperature) = cli.temperature {
        builder = builder.temperature(temperature);
    }
    if let Some(max_tokens) = cli.max_tokens {
        builder = builder.max_tokens(max_tokens);
    }
    for header in &cli.headers {
        let (name, value) = header
            .split_once(':')
            .with_context(|| format!("header '{}' is not NAME:VALUE", header))?;
        builder = builder.header(name.trim(), value.trim());
    }

    Ok(builder)
}

/// Handles the --dry-run mode: validates the request and shows what would run
fn handle_dry_run(
    cli: &Cli,
    kind: StrategyKind,
    config: GraphConfigBuilder,
    settings: &Settings,
) -> anyhow::Result<()> {
    let urls = match kind {
        StrategyKind::Multi => sumi_graph::url::split_url_list(&cli.url),
        _ => vec![cli.url.trim().to_string()],
    };

    let mut validated = Vec::with_capacity(urls.len());
    for url in &urls {
        validated.push(
            config
                .clone()
                .url(url.as_str())
                .build()
                .with_context(|| format!("invalid request for {}", url))?,
        );
    }

    println!("=== Sumi-Graph Dry Run ===\n");
    println!("Strategy: {}", kind);
    println!("URLs ({}):", validated.len());
    for config in &validated {
        println!("  - {}", config.url());
    }

    if let Some(config) = validated.first() {
        println!("\nRequest:");
        println!("  Max depth: {}", config.max_depth());
        println!("  Max pages: {}", config.max_pages());
        println!("  Timeout: {:?}", config.timeout());
        println!("  Pacing interval: {:?}", config.pacing_interval());
        println!("  JavaScript: {}", config.enable_javascript());
        if let Some(pattern) = config.link_pattern() {
            println!("  Link pattern: {}", pattern);
        }
        if let Some(selector) = config.css_selector() {
            println!("  CSS selector: {}", selector);
        }
    }

    println!("\nExtractor: {:?}", settings.extractor.kind);
    println!("WebDriver: {}", settings.browser.webdriver_url);
    println!("\n✓ Request is valid");

    Ok(())
}

/// Runs the selected strategy
async fn handle_run(graph: &dyn Graph) -> sumi_graph::ScrapeResult {
    tracing::info!("Starting {} strategy for {}", graph.name(), graph.config().url());

    let result = graph.run().await;

    if result.success {
        tracing::info!("Scrape completed in {:?}", result.duration);
    } else {
        tracing::error!(
            "Scrape failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
    result
}

//! Graph strategies
//!
//! - [`SmartGraph`]: one page, Fetch → Extract (or Fetch → DeepExtract when
//!   `max_depth > 0`)
//! - [`SmartMultiGraph`]: the single-page pipeline over an explicit URL list
//! - [`SearchGraph`]: a search results page, then the single-page pipeline
//!   over its first `max_pages` result links
//!
//! Fan-out strategies always report success for the combined result; per-page
//! failures are embedded in the combined content.

use crate::config::GraphConfig;
use crate::crawler::RateLimiter;
use crate::graph::engine::GraphEngine;
use crate::graph::factory::NodeFactory;
use crate::graph::node::{GraphNode, NodeOutput};
use crate::output::ScrapeResult;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Instant;

/// Separator between entries of a combined fan-out document
pub const ENTRY_SEPARATOR: &str = "\n\n---\n\n";

/// A runnable strategy
#[async_trait]
pub trait Graph: Send + Sync {
    /// Strategy tag recorded in result metadata
    fn name(&self) -> &'static str;

    fn config(&self) -> &GraphConfig;

    /// Runs the strategy from its config
    async fn run(&self) -> ScrapeResult;

    /// Runs the strategy with `input` in place of the root's config input
    ///
    /// Passing a [`NodeOutput::Page`] skips the initial fetch.
    async fn run_with_input(&self, input: NodeOutput) -> ScrapeResult;
}

/// Builds the standard single-page tree for `config`
pub fn standard_tree(config: &GraphConfig, factory: &NodeFactory) -> GraphNode {
    let fetch = GraphNode::new("Fetch Page", factory.fetch_node())
        .with_input(NodeOutput::Config(config.clone()));

    let extract = if config.max_depth() > 0 {
        GraphNode::new("Deep Extract", factory.deep_extract_node(config))
    } else {
        GraphNode::new("Extract Content", factory.extract_node(config))
    };

    fetch.with_child(extract)
}

/// Result returned without doing any work when the page cap is zero
fn capped_out(config: &GraphConfig, strategy: &'static str) -> ScrapeResult {
    tracing::info!("Page cap is 0; {} strategy produces no output", strategy);
    let url = Some(config.url().to_string()).filter(|u| !u.is_empty());
    ScrapeResult::empty(url, std::time::Duration::ZERO).with_metadata("strategy", strategy)
}

/// Single-page strategy
#[derive(Debug, Clone)]
pub struct SmartGraph {
    config: GraphConfig,
    factory: NodeFactory,
    engine: GraphEngine,
}

impl SmartGraph {
    pub fn new(config: GraphConfig, factory: NodeFactory) -> Self {
        Self {
            config,
            factory,
            engine: GraphEngine::new(),
        }
    }

    pub fn build_graph(&self) -> GraphNode {
        standard_tree(&self.config, &self.factory)
    }

    async fn execute(&self, mut tree: GraphNode) -> ScrapeResult {
        if self.config.max_pages() == 0 {
            return capped_out(&self.config, self.name());
        }

        tracing::info!("Running smart graph for {}", self.config.url());
        self.engine
            .execute_graph(&mut tree)
            .await
            .with_metadata("strategy", self.name())
    }
}

#[async_trait]
impl Graph for SmartGraph {
    fn name(&self) -> &'static str {
        "smart"
    }

    fn config(&self) -> &GraphConfig {
        &self.config
    }

    async fn run(&self) -> ScrapeResult {
        self.execute(self.build_graph()).await
    }

    async fn run_with_input(&self, input: NodeOutput) -> ScrapeResult {
        self.execute(self.build_graph().with_input(input)).await
    }
}

/// One fan-out entry: the page URL and its single-page result
struct FanOutEntry {
    url: String,
    result: ScrapeResult,
}

/// Runs the single-page pipeline over `urls` in order, pacing each run
///
/// Returns `None` if cancelled between pages.
async fn fan_out(
    factory: &NodeFactory,
    configs: Vec<GraphConfig>,
    pacing: &RateLimiter,
) -> Option<Vec<FanOutEntry>> {
    let mut entries = Vec::with_capacity(configs.len());

    for (i, config) in configs.into_iter().enumerate() {
        if pacing.acquire(factory.cancel_token()).await.is_err() {
            tracing::warn!("Fan-out cancelled after {} pages", i);
            return None;
        }

        tracing::info!("Running page {}: {}", i + 1, config.url());
        let url = config.url().to_string();
        let result = SmartGraph::new(config, factory.clone()).run().await;
        if !result.success {
            tracing::warn!(
                "Page {} failed: {}",
                url,
                result.error.as_deref().unwrap_or("no content")
            );
        }
        entries.push(FanOutEntry { url, result });
    }

    if factory.cancel_token().is_cancelled() {
        return None;
    }
    Some(entries)
}

/// Concatenates fan-out entries into one always-successful result
fn combine(
    strategy: &'static str,
    label: &str,
    entries: &[FanOutEntry],
    started: Instant,
) -> ScrapeResult {
    let sections: Vec<String> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let result = &entry.result;
            let body = match &result.error {
                Some(error) if result.content.is_empty() => format!("[failed: {}]", error),
                _ if result.content.is_empty() && !result.pages.is_empty() => result
                    .pages
                    .iter()
                    .map(|record| format!("[{}] {}", record.url, record.data.to_text()))
                    .collect::<Vec<_>>()
                    .join("\n"),
                _ => result.content.clone(),
            };
            format!("{} {}: {}\n{}", label, i + 1, entry.url, body)
        })
        .collect();

    let failed = entries.iter().filter(|e| !e.result.success).count();
    let pages: Vec<Value> = entries
        .iter()
        .map(|e| {
            json!({
                "url": e.url,
                "success": e.result.success,
                "error": e.result.error,
            })
        })
        .collect();

    let mut result = ScrapeResult::empty(None, started.elapsed())
        .with_metadata("strategy", strategy)
        .with_metadata("pages", entries.len() as u64)
        .with_metadata("failed", failed as u64)
        .with_metadata("results", Value::Array(pages));
    result.content = sections.join(ENTRY_SEPARATOR);
    result
}

fn cancelled(strategy: &'static str, started: Instant) -> ScrapeResult {
    ScrapeResult::failed(None, crate::ScrapeError::Cancelled.to_string(), started.elapsed())
        .with_metadata("strategy", strategy)
}

/// Multi-URL strategy
#[derive(Debug, Clone)]
pub struct SmartMultiGraph {
    config: GraphConfig,
    urls: Vec<String>,
    factory: NodeFactory,
}

impl SmartMultiGraph {
    /// `config` supplies every setting except the URL, which comes from `urls`
    pub fn new(config: GraphConfig, urls: Vec<String>, factory: NodeFactory) -> Self {
        Self {
            config,
            urls,
            factory,
        }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }
}

#[async_trait]
impl Graph for SmartMultiGraph {
    fn name(&self) -> &'static str {
        "multi"
    }

    fn config(&self) -> &GraphConfig {
        &self.config
    }

    async fn run(&self) -> ScrapeResult {
        let started = Instant::now();
        if self.config.max_pages() == 0 {
            return capped_out(&self.config, self.name());
        }

        tracing::info!("Running multi graph for {} URLs", self.urls.len());
        let configs = self.urls.iter().map(|url| self.config.for_url(url)).collect();
        let pacing = RateLimiter::new(self.config.pacing_interval());

        match fan_out(&self.factory, configs, &pacing).await {
            Some(entries) => combine(self.name(), "URL", &entries, started),
            None => cancelled(self.name(), started),
        }
    }

    /// Runs the single-page pipeline once over the supplied input
    async fn run_with_input(&self, input: NodeOutput) -> ScrapeResult {
        SmartGraph::new(self.config.clone(), self.factory.clone())
            .run_with_input(input)
            .await
            .with_metadata("strategy", self.name())
    }
}

/// Search-result fan-out strategy
#[derive(Debug, Clone)]
pub struct SearchGraph {
    config: GraphConfig,
    factory: NodeFactory,
    engine: GraphEngine,
}

impl SearchGraph {
    pub fn new(config: GraphConfig, factory: NodeFactory) -> Self {
        Self {
            config,
            factory,
            engine: GraphEngine::new(),
        }
    }

    /// Fetch → {Extract, Extract Links}
    pub fn build_graph(&self) -> GraphNode {
        GraphNode::new("Fetch Search Results", self.factory.fetch_node())
            .with_input(NodeOutput::Config(self.config.clone()))
            .with_child(GraphNode::new(
                "Extract Content",
                self.factory.extract_node(&self.config),
            ))
            .with_child(GraphNode::new(
                "Extract Search Result Links",
                self.factory.extract_links_node(&self.config),
            ))
    }

    async fn execute(&self, mut tree: GraphNode) -> ScrapeResult {
        let started = Instant::now();
        if self.config.max_pages() == 0 {
            return capped_out(&self.config, self.name());
        }

        tracing::info!("Running search graph for {}", self.config.url());
        let search = self
            .engine
            .execute_graph(&mut tree)
            .await
            .with_metadata("strategy", self.name());

        if !search.success || search.links.is_empty() {
            tracing::info!("Search page yielded no usable links");
            return search;
        }

        let take = search.links.len().min(self.config.max_pages() as usize);
        let targets: Vec<String> = search.links[..take].to_vec();
        let configs = targets.iter().map(|url| self.config.for_page(url)).collect();
        let pacing = RateLimiter::primed(self.config.pacing_interval());

        match fan_out(&self.factory, configs, &pacing).await {
            Some(entries) => {
                let mut result = combine(self.name(), "Result", &entries, started);
                result.url = search.url;
                result.links = targets;
                result
            }
            None => cancelled(self.name(), started),
        }
    }
}

#[async_trait]
impl Graph for SearchGraph {
    fn name(&self) -> &'static str {
        "search"
    }

    fn config(&self) -> &GraphConfig {
        &self.config
    }

    async fn run(&self) -> ScrapeResult {
        self.execute(self.build_graph()).await
    }

    /// Uses `input` as the search results page, then fans out as usual
    async fn run_with_input(&self, input: NodeOutput) -> ScrapeResult {
        self.execute(self.build_graph().with_input(input)).await
    }
}

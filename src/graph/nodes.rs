//! Node variants
//!
//! - [`FetchNode`]: config to page, through the fetcher registry
//! - [`ExtractNode`]: page to extracted data
//! - [`ExtractLinksNode`]: page to its filtered link list
//! - [`DeepExtractNode`]: page to deep-crawl records
//! - [`DelayNode`]: pauses, then passes its input through

use crate::config::GraphConfig;
use crate::crawler::{extract_page_links, DeepCrawler, FetcherRegistry, PageContent};
use crate::extractor::ContentExtractor;
use crate::graph::node::{Node, NodeOutput};
use crate::url::filter_links;
use crate::ScrapeError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Requires a successful page as input
fn successful_page<'a>(node: &str, input: &'a NodeOutput) -> Result<&'a PageContent, ScrapeError> {
    match input {
        NodeOutput::Page(page) if page.success => Ok(page),
        NodeOutput::Page(page) => Err(ScrapeError::UpstreamFailed {
            url: page.url.clone(),
            message: page.failure_message(),
        }),
        other => Err(ScrapeError::UnexpectedInput {
            node: node.to_string(),
            expected: "page",
            found: other.kind(),
        }),
    }
}

/// Fetches the page described by its config input
///
/// A page given as input is passed through untouched, which lets callers
/// inject pre-fetched content in place of a fetch.
pub struct FetchNode {
    registry: Arc<FetcherRegistry>,
    cancel: CancellationToken,
}

impl FetchNode {
    pub fn new(registry: Arc<FetcherRegistry>, cancel: CancellationToken) -> Self {
        Self { registry, cancel }
    }
}

#[async_trait]
impl Node for FetchNode {
    async fn run(&self, input: &NodeOutput) -> Result<NodeOutput, ScrapeError> {
        match input {
            NodeOutput::Config(config) => {
                let page = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => return Err(ScrapeError::Cancelled),
                    page = self.registry.fetch(config) => page?,
                };
                Ok(NodeOutput::Page(page))
            }
            NodeOutput::Page(page) => {
                tracing::debug!("Using supplied content for {}", page.url);
                Ok(NodeOutput::Page(page.clone()))
            }
            other => Err(ScrapeError::UnexpectedInput {
                node: "fetch".to_string(),
                expected: "config",
                found: other.kind(),
            }),
        }
    }

    fn failure(&self, output: &NodeOutput) -> Option<String> {
        output
            .as_page()
            .filter(|page| !page.success)
            .map(PageContent::failure_message)
    }
}

/// Runs the content extractor over its page input
pub struct ExtractNode {
    extractor: Arc<dyn ContentExtractor>,
    config: GraphConfig,
    cancel: CancellationToken,
}

impl ExtractNode {
    pub fn new(
        extractor: Arc<dyn ContentExtractor>,
        config: GraphConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            extractor,
            config,
            cancel,
        }
    }
}

#[async_trait]
impl Node for ExtractNode {
    async fn run(&self, input: &NodeOutput) -> Result<NodeOutput, ScrapeError> {
        let page = successful_page("extract", input)?;

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ScrapeError::Cancelled),
            extracted = self.extractor.extract(page, &self.config) => Ok(extracted?.into()),
        }
    }
}

/// Lists the page's links that pass the config's link filter
///
/// Links keep page order and are deduplicated.
pub struct ExtractLinksNode {
    config: GraphConfig,
}

impl ExtractLinksNode {
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Node for ExtractLinksNode {
    async fn run(&self, input: &NodeOutput) -> Result<NodeOutput, ScrapeError> {
        let page = successful_page("extract-links", input)?;
        let base = if page.url.is_empty() {
            self.config.url()
        } else {
            page.url.as_str()
        };

        let links = extract_page_links(&page.html, base);
        let links = filter_links(&links, self.config.link_filter());
        tracing::debug!("Found {} links on {}", links.len(), base);

        Ok(NodeOutput::Links(links))
    }
}

/// Extracts its page input, then crawls the pages it links to
pub struct DeepExtractNode {
    crawler: DeepCrawler,
    config: GraphConfig,
}

impl DeepExtractNode {
    pub fn new(crawler: DeepCrawler, config: GraphConfig) -> Self {
        Self { crawler, config }
    }
}

#[async_trait]
impl Node for DeepExtractNode {
    async fn run(&self, input: &NodeOutput) -> Result<NodeOutput, ScrapeError> {
        let page = successful_page("deep-extract", input)?;
        let report = self.crawler.crawl(page, &self.config).await?;
        Ok(NodeOutput::Records(report.records))
    }
}

/// Waits, then passes its input through unchanged
///
/// The wait ends early with [`ScrapeError::Cancelled`] if the token fires.
pub struct DelayNode {
    delay: Duration,
    cancel: CancellationToken,
}

impl DelayNode {
    pub fn new(delay: Duration, cancel: CancellationToken) -> Self {
        Self { delay, cancel }
    }
}

#[async_trait]
impl Node for DelayNode {
    async fn run(&self, input: &NodeOutput) -> Result<NodeOutput, ScrapeError> {
        if !self.delay.is_zero() {
            tracing::info!("Delaying for {} ms", self.delay.as_millis());
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(ScrapeError::Cancelled),
                _ = tokio::time::sleep(self.delay) => {}
            }
        }
        Ok(input.clone())
    }
}

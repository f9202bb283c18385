//! Scripted collaborators shared by the integration tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use sumi_graph::config::GraphConfig;
use sumi_graph::extractor::{ContentExtractor, ExtractError, Extracted};
use sumi_graph::graph::NodeFactory;
use sumi_graph::{FetcherRegistry, PageContent, PageFetcher};
use tokio_util::sync::CancellationToken;

/// Serves canned pages by exact URL and records every request
#[derive(Clone, Default)]
pub struct ScriptedFetcher {
    pages: HashMap<String, PageContent>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a successful page
    pub fn page(mut self, url: &str, html: &str, text: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            PageContent {
                url: url.to_string(),
                html: html.to_string(),
                text: text.to_string(),
                status_code: Some(200),
                success: true,
                ..PageContent::default()
            },
        );
        self
    }

    /// Adds a page whose fetch fails
    pub fn failing(mut self, url: &str, error: &str) -> Self {
        self.pages
            .insert(url.to_string(), PageContent::failed(url, error));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn supports(&self, _config: &GraphConfig) -> bool {
        true
    }

    async fn fetch(&self, config: &GraphConfig) -> PageContent {
        self.calls.lock().unwrap().push(config.url().to_string());
        self.pages
            .get(config.url())
            .cloned()
            .unwrap_or_else(|| PageContent::failed(config.url(), "HTTP 404 Not Found"))
    }
}

/// Returns the page text with a fixed suffix
pub struct SuffixExtractor(pub &'static str);

#[async_trait]
impl ContentExtractor for SuffixExtractor {
    fn name(&self) -> &'static str {
        "suffix"
    }

    async fn extract(
        &self,
        page: &PageContent,
        _config: &GraphConfig,
    ) -> Result<Extracted, ExtractError> {
        Ok(Extracted::Text(format!("{}{}", page.text, self.0)))
    }
}

/// Always fails
pub struct BrokenExtractor;

#[async_trait]
impl ContentExtractor for BrokenExtractor {
    fn name(&self) -> &'static str {
        "broken"
    }

    async fn extract(
        &self,
        _page: &PageContent,
        _config: &GraphConfig,
    ) -> Result<Extracted, ExtractError> {
        Err(ExtractError::EmptyResponse)
    }
}

/// Builds a node factory around a single fetcher
pub fn factory(
    fetcher: ScriptedFetcher,
    extractor: impl ContentExtractor + 'static,
) -> NodeFactory {
    let mut registry = FetcherRegistry::new();
    registry.register(fetcher);
    NodeFactory::new(Arc::new(registry), Arc::new(extractor))
}

/// Same as [`factory`], with an explicit cancellation token
pub fn cancellable_factory(
    fetcher: ScriptedFetcher,
    extractor: impl ContentExtractor + 'static,
    cancel: CancellationToken,
) -> NodeFactory {
    factory(fetcher, extractor).with_cancellation(cancel)
}

/// Markup with one anchor per link
pub fn links_html(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a href="{}">link</a>"#, link))
        .collect();
    format!("<html><body>{}</body></html>", anchors)
}

/// Config builder with pacing disabled
pub fn config(url: &str) -> sumi_graph::GraphConfigBuilder {
    GraphConfig::builder()
        .url(url)
        .prompt("extract")
        .delay_millis(0)
}

use crate::config::GraphConfig;
use crate::crawler::{DeepCrawler, FetcherRegistry};
use crate::extractor::ContentExtractor;
use crate::graph::nodes::{DeepExtractNode, DelayNode, ExtractLinksNode, ExtractNode, FetchNode};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Creates nodes wired to the shared registry, extractor and cancellation token
///
/// The registry and extractor hold no per-crawl state, so one factory can
/// serve any number of concurrent runs.
#[derive(Clone)]
pub struct NodeFactory {
    registry: Arc<FetcherRegistry>,
    extractor: Arc<dyn ContentExtractor>,
    cancel: CancellationToken,
}

impl NodeFactory {
    pub fn new(registry: Arc<FetcherRegistry>, extractor: Arc<dyn ContentExtractor>) -> Self {
        Self {
            registry,
            extractor,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `cancel` to abort every node this factory creates
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn registry(&self) -> &Arc<FetcherRegistry> {
        &self.registry
    }

    pub fn fetch_node(&self) -> FetchNode {
        FetchNode::new(self.registry.clone(), self.cancel.clone())
    }

    pub fn extract_node(&self, config: &GraphConfig) -> ExtractNode {
        ExtractNode::new(self.extractor.clone(), config.clone(), self.cancel.clone())
    }

    pub fn extract_links_node(&self, config: &GraphConfig) -> ExtractLinksNode {
        ExtractLinksNode::new(config.clone())
    }

    pub fn deep_extract_node(&self, config: &GraphConfig) -> DeepExtractNode {
        let crawler = DeepCrawler::new(
            self.registry.clone(),
            self.extractor.clone(),
            self.cancel.clone(),
        );
        DeepExtractNode::new(crawler, config.clone())
    }

    pub fn delay_node(&self, delay: Duration) -> DelayNode {
        DelayNode::new(delay, self.cancel.clone())
    }
}

impl std::fmt::Debug for NodeFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeFactory")
            .field("registry", &self.registry)
            .field("extractor", &self.extractor.name())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

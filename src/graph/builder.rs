//! Strategy selection and construction

use crate::config::{GraphConfig, GraphConfigBuilder, RequestDefaults};
use crate::graph::factory::NodeFactory;
use crate::graph::strategy::{Graph, SearchGraph, SmartGraph, SmartMultiGraph};
use crate::url::{is_search_results_url, split_url_list};
use crate::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Which strategy runs a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Smart,
    Multi,
    Search,
}

impl StrategyKind {
    /// Infers the strategy from the request's URL field
    ///
    /// Search-engine result URLs select `Search`, a comma-separated list
    /// selects `Multi`, anything else `Smart`.
    pub fn infer(url_field: &str) -> Self {
        if is_search_results_url(url_field.trim()) {
            Self::Search
        } else if url_field.contains(',') {
            Self::Multi
        } else {
            Self::Smart
        }
    }

    /// An explicit kind wins over inference
    pub fn resolve(explicit: Option<Self>, url_field: &str) -> Self {
        explicit.unwrap_or_else(|| Self::infer(url_field))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Smart => "smart",
            Self::Multi => "multi",
            Self::Search => "search",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smart" | "single" => Ok(Self::Smart),
            "multi" => Ok(Self::Multi),
            "search" => Ok(Self::Search),
            other => Err(format!("unknown strategy '{}'", other)),
        }
    }
}

/// Entry point for building strategies around one node factory
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    factory: NodeFactory,
    defaults: RequestDefaults,
}

impl GraphBuilder {
    pub fn new(factory: NodeFactory) -> Self {
        Self {
            factory,
            defaults: RequestDefaults::default(),
        }
    }

    /// Uses `defaults` as the starting point of every config this builder creates
    pub fn with_defaults(mut self, defaults: RequestDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn factory(&self) -> &NodeFactory {
        &self.factory
    }

    /// A config builder preloaded with this builder's defaults
    pub fn config(&self) -> GraphConfigBuilder {
        GraphConfigBuilder::from_defaults(&self.defaults)
    }

    pub fn smart(&self, config: GraphConfig) -> SmartGraph {
        SmartGraph::new(config, self.factory.clone())
    }

    pub fn smart_multi(&self, config: GraphConfig, urls: Vec<String>) -> SmartMultiGraph {
        SmartMultiGraph::new(config, urls, self.factory.clone())
    }

    pub fn search(&self, config: GraphConfig) -> SearchGraph {
        SearchGraph::new(config, self.factory.clone())
    }

    /// Builds the strategy for a request
    ///
    /// # Arguments
    ///
    /// * `url_field` - One URL, or a comma-separated list for the multi strategy
    /// * `kind` - Explicit strategy; inferred from `url_field` when `None`
    /// * `config` - Every setting but the URL
    ///
    /// # Returns
    ///
    /// * `Ok(Box<dyn Graph>)` - Ready-to-run strategy
    /// * `Err(ConfigError)` - A URL or setting failed validation
    pub fn for_request(
        &self,
        url_field: &str,
        kind: Option<StrategyKind>,
        config: GraphConfigBuilder,
    ) -> Result<Box<dyn Graph>, ConfigError> {
        let kind = StrategyKind::resolve(kind, url_field);
        tracing::debug!("Selected {} strategy for '{}'", kind, url_field);

        match kind {
            StrategyKind::Multi => {
                let urls = split_url_list(url_field);
                let first = urls
                    .first()
                    .ok_or_else(|| ConfigError::Validation("no URLs given".to_string()))?;

                for url in &urls[1..] {
                    config.clone().url(url.as_str()).build()?;
                }
                let config = config.url(first.as_str()).build()?;
                Ok(Box::new(self.smart_multi(config, urls)))
            }
            StrategyKind::Search => {
                let config = config.url(url_field.trim()).build()?;
                Ok(Box::new(self.search(config)))
            }
            StrategyKind::Smart => {
                let config = config.url(url_field.trim()).build()?;
                Ok(Box::new(self.smart(config)))
            }
        }
    }
}

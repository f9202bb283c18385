//! Sumi-Graph: graph-driven web content extraction
//!
//! This crate composes small trees of execution steps (fetch, extract,
//! deep-extract, delay), runs them to completion and reduces them into a
//! single [`ScrapeResult`]. Strategies on top of the engine cover single
//! pages, explicit URL lists, search-result fan-out and bounded recursive
//! crawls.

pub mod config;
pub mod crawler;
pub mod extractor;
pub mod graph;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Graph operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Fetch failed for {url}: {message}")]
    FetchFailed { url: String, message: String },

    #[error("No fetcher available for {url}")]
    NoFetcher { url: String },

    #[error("Extraction failed: {0}")]
    Extraction(#[from] extractor::ExtractError),

    #[error("Upstream fetch failed for {url}: {message}")]
    UpstreamFailed { url: String, message: String },

    #[error("Node '{node}' expected {expected} input, got {found}")]
    UnexpectedInput {
        node: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScrapeError {
    /// Returns true if this error must abort the enclosing graph run
    ///
    /// Everything else is recorded on the node that raised it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid link pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Sumi-Graph operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{GraphConfig, GraphConfigBuilder, Settings};
pub use crawler::{FetcherRegistry, PageContent, PageFetcher};
pub use extractor::{ContentExtractor, Extracted};
pub use graph::{Graph, GraphBuilder, GraphEngine, StrategyKind};
pub use output::ScrapeResult;
pub use state::NodeState;

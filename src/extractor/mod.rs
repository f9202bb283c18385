//! Content extraction from fetched pages
//!
//! An extractor turns one successful [`PageContent`] into an [`Extracted`]
//! value, guided by the prompt carried on the request config.

mod llm;
mod text;

pub use llm::LlmExtractor;
pub use text::TextExtractor;

use crate::config::{ExtractorKind, ExtractorSettings, GraphConfig};
use crate::crawler::PageContent;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while extracting content from a page
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Extractor misconfigured: {0}")]
    Config(String),

    #[error("Invalid CSS selector: {0}")]
    Selector(String),

    #[error("Model request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Model request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Model API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Model returned no choices")]
    EmptyResponse,
}

/// What an extractor produced for one page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Extracted {
    Text(String),
    Structured(Map<String, Value>),
    Links(Vec<String>),
}

impl Extracted {
    /// Returns true when there is nothing worth reporting
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Structured(map) => map.is_empty(),
            Self::Links(links) => links.is_empty(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Structured(_) => "structured",
            Self::Links(_) => "links",
        }
    }

    /// Flattens the value into text for combined reports
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(map) => serde_json::to_string_pretty(map).unwrap_or_default(),
            Self::Links(links) => links.join("\n"),
        }
    }
}

/// Turns page content into extracted data
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// Short tag identifying this extractor in logs
    fn name(&self) -> &'static str;

    /// Extracts from `page`, following the prompt, model and selector in `config`
    async fn extract(
        &self,
        page: &PageContent,
        config: &GraphConfig,
    ) -> Result<Extracted, ExtractError>;
}

/// Builds the extractor selected in settings
///
/// # Returns
///
/// * `Ok(Arc<dyn ContentExtractor>)` - Ready-to-share extractor
/// * `Err(ExtractError)` - The LLM extractor is selected but cannot be configured
pub fn from_settings(settings: &ExtractorSettings) -> Result<Arc<dyn ContentExtractor>, ExtractError> {
    match settings.kind {
        ExtractorKind::Text => Ok(Arc::new(TextExtractor::new())),
        ExtractorKind::Llm => Ok(Arc::new(LlmExtractor::from_settings(settings)?)),
    }
}

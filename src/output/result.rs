use crate::crawler::CrawlRecord;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::time::Duration;

/// Aggregate outcome of one top-level strategy run
///
/// Built once per run and not modified afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeResult {
    /// Request URL, when the run targeted a single one
    pub url: Option<String>,

    /// Primary textual content
    pub content: String,

    pub structured_data: Map<String, Value>,

    /// Discovered links
    pub links: Vec<String>,

    /// Deep-crawl records, seed first
    pub pages: Vec<CrawlRecord>,

    /// Strategy name, per-node outcomes and fan-out counts
    pub metadata: Map<String, Value>,

    pub success: bool,

    pub error: Option<String>,

    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,

    pub extracted_at: DateTime<Utc>,
}

impl ScrapeResult {
    /// An empty, successful result
    pub fn empty(url: Option<String>, duration: Duration) -> Self {
        Self {
            url,
            content: String::new(),
            structured_data: Map::new(),
            links: Vec::new(),
            pages: Vec::new(),
            metadata: Map::new(),
            success: true,
            error: None,
            duration,
            extracted_at: Utc::now(),
        }
    }

    /// A failed result carrying only the error and elapsed time
    pub fn failed(url: Option<String>, error: impl Into<String>, duration: Duration) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::empty(url, duration)
        }
    }

    /// Adds or replaces one metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Returns true if the run produced no content of any shape
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
            && self.structured_data.is_empty()
            && self.links.is_empty()
            && self.pages.is_empty()
    }

    /// Strategy recorded in metadata, if any
    pub fn strategy(&self) -> Option<&str> {
        self.metadata.get("strategy").and_then(Value::as_str)
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

use serde::Serialize;
use std::collections::BTreeMap;

/// Result of one fetch
///
/// Produced once per fetch and read-only afterwards. Fetchers never raise:
/// a failed fetch is a `PageContent` with `success == false` and an error
/// message.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageContent {
    /// URL the page was requested with
    pub url: String,

    /// Raw markup as received (or rendered)
    pub html: String,

    /// Visible plain text of the document
    pub text: String,

    /// Page title, if present
    pub title: Option<String>,

    /// HTTP status code, when the fetcher can observe one
    pub status_code: Option<u16>,

    /// Response headers (lowercased names)
    pub headers: BTreeMap<String, String>,

    /// Content-Type header value
    pub content_type: Option<String>,

    pub success: bool,

    pub error: Option<String>,
}

impl PageContent {
    /// Builds a failed page for the given URL
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Human-readable reason this page failed
    pub fn failure_message(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| "fetch reported failure".to_string())
    }
}

//! Static HTML fetcher
//!
//! Plain HTTP GET plus markup parsing. This is the default strategy for any
//! request that does not ask for script rendering.

use crate::config::{GraphConfig, HttpSettings};
use crate::crawler::fetcher::{build_http_client, PageFetcher};
use crate::crawler::page::PageContent;
use crate::crawler::parser::parse_html;
use crate::ScrapeError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::Client;
use std::collections::BTreeMap;
use url::Url;

/// Fetches pages over plain HTTP without executing scripts
#[derive(Debug, Clone)]
pub struct HtmlFetcher {
    client: Client,
    max_body_bytes: usize,
}

impl HtmlFetcher {
    /// Creates a fetcher with its own HTTP client
    pub fn new(settings: &HttpSettings) -> Result<Self, ScrapeError> {
        Ok(Self {
            client: build_http_client(settings)?,
            max_body_bytes: settings.max_body_bytes,
        })
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, max_body_bytes: usize) -> Self {
        Self {
            client,
            max_body_bytes,
        }
    }

    /// Performs the request, surfacing transport problems as errors
    async fn try_fetch(&self, config: &GraphConfig) -> Result<PageContent, ScrapeError> {
        let target = Url::parse(config.url())?;

        let mut request = self.client.get(target.clone()).timeout(config.timeout());
        for (name, value) in config.headers() {
            request = request.header(name.as_str(), value.as_str());
        }

        let mut response = request.send().await?;
        let status = response.status();
        let final_url = response.url().clone();
        let headers = header_map(response.headers());
        let content_type = headers.get(CONTENT_TYPE.as_str()).cloned();

        if !status.is_success() {
            return Ok(PageContent {
                url: config.url().to_string(),
                status_code: Some(status.as_u16()),
                headers,
                content_type,
                success: false,
                error: Some(format!("HTTP {}", status)),
                ..PageContent::default()
            });
        }

        if let Some(length) = response.content_length() {
            if length > self.max_body_bytes as u64 {
                return Err(self.body_too_large(config, &format!("{} bytes", length)));
            }
        }

        // Stop reading as soon as the limit is passed
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(self.body_too_large(config, "streamed body"));
            }
            body.extend_from_slice(&chunk);
        }

        let html = String::from_utf8_lossy(&body).into_owned();
        let parsed = parse_html(&html, &final_url);

        Ok(PageContent {
            url: config.url().to_string(),
            html,
            text: parsed.text,
            title: parsed.title,
            status_code: Some(status.as_u16()),
            headers,
            content_type,
            success: true,
            error: None,
        })
    }

    fn body_too_large(&self, config: &GraphConfig, size: &str) -> ScrapeError {
        ScrapeError::FetchFailed {
            url: config.url().to_string(),
            message: format!(
                "response body ({}) exceeds limit of {} bytes",
                size, self.max_body_bytes
            ),
        }
    }
}

#[async_trait]
impl PageFetcher for HtmlFetcher {
    fn name(&self) -> &'static str {
        "html"
    }

    fn supports(&self, config: &GraphConfig) -> bool {
        !config.enable_javascript()
    }

    async fn fetch(&self, config: &GraphConfig) -> PageContent {
        match self.try_fetch(config).await {
            Ok(page) => {
                if let Some(error) = &page.error {
                    tracing::warn!("Fetch of {} failed: {}", config.url(), error);
                }
                page
            }
            Err(e) => {
                tracing::error!("Failed to fetch HTML from {}: {}", config.url(), e);
                let message = match e {
                    ScrapeError::Reqwest(ref inner) if inner.is_timeout() => {
                        format!("Request timeout after {:?}", config.timeout())
                    }
                    other => other.to_string(),
                };
                PageContent::failed(config.url(), message)
            }
        }
    }
}

/// Copies response headers into an ordered map
fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

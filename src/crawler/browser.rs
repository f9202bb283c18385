//! Script-rendering fetcher
//!
//! Drives a WebDriver session so pages that build their content with
//! JavaScript can be scraped. Used only when a config explicitly enables
//! script rendering.

use crate::config::GraphConfig;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::page::PageContent;
use crate::crawler::parser::parse_html;
use crate::ScrapeError;
use async_trait::async_trait;
use fantoccini::ClientBuilder;
use url::Url;

/// Renders pages in a browser reached over WebDriver
#[derive(Debug, Clone)]
pub struct BrowserFetcher {
    webdriver_url: String,
}

impl BrowserFetcher {
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
        }
    }

    /// Opens a session, loads the page and reads the rendered document
    async fn render(&self, config: &GraphConfig) -> Result<PageContent, ScrapeError> {
        let target = Url::parse(config.url())?;
        let browser_error = |message: String| ScrapeError::FetchFailed {
            url: config.url().to_string(),
            message,
        };

        if !config.headers().is_empty() {
            tracing::debug!(
                "WebDriver sessions cannot set request headers; ignoring {} header(s)",
                config.headers().len()
            );
        }

        let client = ClientBuilder::native()
            .connect(&self.webdriver_url)
            .await
            .map_err(|e| browser_error(format!("WebDriver connection failed: {}", e)))?;

        let rendered = async {
            client.goto(target.as_str()).await?;
            let source = client.source().await?;
            let title = client.title().await?;
            Ok::<_, fantoccini::error::CmdError>((source, title))
        }
        .await;

        if let Err(e) = client.close().await {
            tracing::debug!("Failed to close WebDriver session: {}", e);
        }

        let (html, title) = rendered.map_err(|e| browser_error(e.to_string()))?;
        let parsed = parse_html(&html, &target);
        let title = Some(title.trim().to_string())
            .filter(|t| !t.is_empty())
            .or(parsed.title);

        Ok(PageContent {
            url: config.url().to_string(),
            html,
            text: parsed.text,
            title,
            status_code: None,
            success: true,
            ..PageContent::default()
        })
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    fn name(&self) -> &'static str {
        "browser"
    }

    fn supports(&self, config: &GraphConfig) -> bool {
        config.enable_javascript()
    }

    async fn fetch(&self, config: &GraphConfig) -> PageContent {
        match tokio::time::timeout(config.timeout(), self.render(config)).await {
            Ok(Ok(page)) => page,
            Ok(Err(e)) => {
                tracing::error!("Failed to fetch with JS from {}: {}", config.url(), e);
                PageContent::failed(config.url(), e.to_string())
            }
            Err(_) => {
                tracing::error!(
                    "Rendering {} exceeded timeout of {:?}",
                    config.url(),
                    config.timeout()
                );
                PageContent::failed(
                    config.url(),
                    format!("Rendering timed out after {:?}", config.timeout()),
                )
            }
        }
    }
}

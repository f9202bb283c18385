//! Page fetcher contract and capability dispatch
//!
//! Fetch strategies are registered in order on a [`FetcherRegistry`]. For each
//! request the registry picks the first fetcher whose `supports` predicate
//! accepts the config; a fallback fetcher, if registered, is consulted only
//! after every regular fetcher declined.

use crate::config::{GraphConfig, HttpSettings, Settings};
use crate::crawler::browser::BrowserFetcher;
use crate::crawler::cache::PageCache;
use crate::crawler::html::HtmlFetcher;
use crate::crawler::page::PageContent;
use crate::ScrapeError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// One way of turning a config into page content
///
/// Implementations must never fail outright: any network, parse or timeout
/// problem is reported as a [`PageContent`] with `success == false`.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Short tag identifying this strategy in logs and metadata
    fn name(&self) -> &'static str;

    /// Returns true if this fetcher can serve the given config
    fn supports(&self, config: &GraphConfig) -> bool;

    /// Fetches the page described by `config`
    async fn fetch(&self, config: &GraphConfig) -> PageContent;
}

/// Ordered, first-match-wins list of fetch strategies
#[derive(Clone, Default)]
pub struct FetcherRegistry {
    fetchers: Vec<Arc<dyn PageFetcher>>,
    fallback: Option<Arc<dyn PageFetcher>>,
    cache: Option<Arc<PageCache>>,
}

impl FetcherRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the standard registry: script rendering first, static HTML as fallback
    ///
    /// # Arguments
    ///
    /// * `settings` - HTTP and browser settings
    ///
    /// # Returns
    ///
    /// * `Ok(FetcherRegistry)` - Registry with both fetchers and a page cache
    /// * `Err(ScrapeError)` - The HTTP client could not be built
    pub fn standard(settings: &Settings) -> Result<Self, ScrapeError> {
        let mut registry = Self::new().with_cache(PageCache::default());
        registry.register(BrowserFetcher::new(&settings.browser.webdriver_url));
        registry.register_fallback(HtmlFetcher::new(&settings.http)?);
        Ok(registry)
    }

    /// Appends a fetcher after the ones already registered
    pub fn register(&mut self, fetcher: impl PageFetcher + 'static) -> &mut Self {
        self.fetchers.push(Arc::new(fetcher));
        self
    }

    /// Sets the fetcher consulted after every registered one declined
    ///
    /// A later call replaces the previous fallback.
    pub fn register_fallback(&mut self, fetcher: impl PageFetcher + 'static) -> &mut Self {
        self.fallback = Some(Arc::new(fetcher));
        self
    }

    /// Enables in-memory page caching for configs with `enable_cache` set
    pub fn with_cache(mut self, cache: PageCache) -> Self {
        self.cache = Some(Arc::new(cache));
        self
    }

    /// Names of the registered fetchers in consultation order
    pub fn names(&self) -> Vec<&'static str> {
        self.fetchers
            .iter()
            .chain(self.fallback.iter())
            .map(|f| f.name())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fetchers.is_empty() && self.fallback.is_none()
    }

    /// Selects the first fetcher that supports the config
    pub fn select(&self, config: &GraphConfig) -> Option<&Arc<dyn PageFetcher>> {
        self.fetchers
            .iter()
            .chain(self.fallback.iter())
            .find(|fetcher| fetcher.supports(config))
    }

    /// Fetches a page with the selected fetcher
    ///
    /// Selection always happens first; the cache is only consulted for
    /// pages the selected fetcher itself produced.
    ///
    /// # Returns
    ///
    /// * `Ok(PageContent)` - The fetcher's result, which may itself report failure
    /// * `Err(ScrapeError::NoFetcher)` - No registered fetcher supports the config
    pub async fn fetch(&self, config: &GraphConfig) -> Result<PageContent, ScrapeError> {
        let fetcher = self.select(config).ok_or_else(|| ScrapeError::NoFetcher {
            url: config.url().to_string(),
        })?;

        let cache = self.cache.as_ref().filter(|_| config.enable_cache());
        if let Some(page) = cache.and_then(|c| c.get(fetcher.name(), config)) {
            tracing::debug!("Cache hit for {} ({})", config.url(), fetcher.name());
            return Ok(page);
        }

        tracing::debug!("Fetching {} with {} fetcher", config.url(), fetcher.name());
        let page = fetcher.fetch(config).await;

        if let Some(cache) = cache {
            if page.success {
                cache.insert(fetcher.name(), config, page.clone());
            }
        }

        Ok(page)
    }
}

impl fmt::Debug for FetcherRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetcherRegistry")
            .field("fetchers", &self.names())
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

/// Builds the HTTP client shared by static fetches
///
/// Per-request timeouts come from each config; the client only carries the
/// connection-level limits.
pub fn build_http_client(settings: &HttpSettings) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(settings.user_agent.clone())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

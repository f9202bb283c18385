//! Deep crawl coordination
//!
//! The [`DeepCrawler`] extends one already-fetched seed page into a bounded
//! crawl of the pages it links to. It owns a single visited set and an
//! explicit `(url, depth)` work queue, and isolates per-page failures: a page
//! that cannot be fetched or extracted is logged and skipped, never fatal.
//! Only cancellation aborts the crawl.

use crate::config::GraphConfig;
use crate::crawler::fetcher::FetcherRegistry;
use crate::crawler::page::PageContent;
use crate::crawler::parser::extract_page_links;
use crate::crawler::scheduler::RateLimiter;
use crate::extractor::{ContentExtractor, Extracted};
use crate::state::VisitedSet;
use crate::url::filter_links;
use crate::ScrapeError;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// One page's contribution to a deep crawl
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlRecord {
    pub url: String,
    pub depth: u32,
    pub data: Extracted,
}

/// Outcome of a deep crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Extracted records, seed first, in visit order
    pub records: Vec<CrawlRecord>,

    /// Every URL fetched or scheduled, seed first
    pub visited: Vec<String>,
}

/// Bounded recursive link-following crawl
pub struct DeepCrawler {
    registry: Arc<FetcherRegistry>,
    extractor: Arc<dyn ContentExtractor>,
    cancel: CancellationToken,
}

impl DeepCrawler {
    pub fn new(
        registry: Arc<FetcherRegistry>,
        extractor: Arc<dyn ContentExtractor>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            registry,
            extractor,
            cancel,
        }
    }

    /// Crawls outward from an already-fetched seed page
    ///
    /// The seed is extracted at depth 0 and always recorded. When
    /// `max_depth > 0`, the seed's links (filtered by the link pattern,
    /// deduplicated in page order) are visited at depth 1 until either
    /// `max_pages` records exist or `max_pages` links have been tried. With
    /// `follow_nested_links` set, links found on those pages are queued
    /// depth-first at the next depth, up to `max_depth`.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Records in visit order plus the visited URLs
    /// * `Err(ScrapeError::Extraction)` - The seed page could not be extracted
    /// * `Err(ScrapeError::Cancelled)` - The crawl was cancelled
    pub async fn crawl(
        &self,
        seed: &PageContent,
        config: &GraphConfig,
    ) -> Result<CrawlReport, ScrapeError> {
        let max_pages = config.max_pages() as usize;
        let mut visited = VisitedSet::seeded(config.url());
        let mut records = Vec::new();

        if max_pages == 0 {
            tracing::debug!("Page cap is 0, skipping crawl of {}", config.url());
            return Ok(CrawlReport {
                records,
                visited: visited.urls().to_vec(),
            });
        }

        let data = self.extract_cancellable(seed, config).await?;
        records.push(CrawlRecord {
            url: config.url().to_string(),
            depth: 0,
            data,
        });

        let mut queue: VecDeque<(String, u32)> = VecDeque::new();
        if config.max_depth() > 0 {
            let links = self.discover_links(seed, config);
            tracing::debug!("Seed {} yielded {} candidate links", config.url(), links.len());
            queue.extend(links.into_iter().map(|link| (link, 1)));
        }

        let limiter = RateLimiter::primed(config.pacing_interval());

        while let Some((url, depth)) = queue.pop_front() {
            if records.len() >= max_pages || visited.len() > max_pages {
                tracing::debug!("Crawl bounds reached at {} records", records.len());
                break;
            }

            if !visited.insert(&url) {
                tracing::debug!("Skipping already visited {}", url);
                continue;
            }

            limiter.acquire(&self.cancel).await?;

            let page_config = config.for_page(&url);
            let page = match self.fetch_cancellable(&page_config).await {
                Ok(page) if page.success => page,
                Ok(page) => {
                    tracing::warn!("Skipping {}: {}", url, page.failure_message());
                    continue;
                }
                Err(ScrapeError::Cancelled) => return Err(ScrapeError::Cancelled),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", url, e);
                    continue;
                }
            };

            let data = match self.extract_cancellable(&page, &page_config).await {
                Ok(data) => data,
                Err(ScrapeError::Cancelled) => return Err(ScrapeError::Cancelled),
                Err(e) => {
                    tracing::warn!("Extraction failed for {}: {}", url, e);
                    continue;
                }
            };

            tracing::info!("Crawled {} at depth {}", url, depth);
            records.push(CrawlRecord {
                url: url.clone(),
                depth,
                data,
            });

            if config.follow_nested_links() && depth < config.max_depth() {
                let nested = self.discover_links(&page, config);
                for link in nested.into_iter().rev() {
                    if !visited.contains(&link) {
                        queue.push_front((link, depth + 1));
                    }
                }
            }
        }

        tracing::info!(
            "Deep crawl of {} finished with {} records, {} URLs visited",
            config.url(),
            records.len(),
            visited.len()
        );

        Ok(CrawlReport {
            records,
            visited: visited.urls().to_vec(),
        })
    }

    /// Absolute links of `page` that pass the config's link filter
    fn discover_links(&self, page: &PageContent, config: &GraphConfig) -> Vec<String> {
        let base = if page.url.is_empty() {
            config.url()
        } else {
            page.url.as_str()
        };
        let links = extract_page_links(&page.html, base);
        filter_links(&links, config.link_filter())
    }

    async fn fetch_cancellable(&self, config: &GraphConfig) -> Result<PageContent, ScrapeError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ScrapeError::Cancelled),
            page = self.registry.fetch(config) => page,
        }
    }

    async fn extract_cancellable(
        &self,
        page: &PageContent,
        config: &GraphConfig,
    ) -> Result<Extracted, ScrapeError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ScrapeError::Cancelled),
            data = self.extractor.extract(page, config) => Ok(data?),
        }
    }
}

//! Crawler module for page fetching and link following
//!
//! This module contains the fetch side of the engine:
//! - The `PageFetcher` contract and the first-match `FetcherRegistry`
//! - Static HTML and script-rendering fetchers
//! - HTML parsing, text selection and link extraction
//! - Request pacing and the bounded deep crawl

mod browser;
mod cache;
mod coordinator;
mod fetcher;
mod html;
mod page;
mod parser;
mod scheduler;

pub use browser::BrowserFetcher;
pub use cache::{PageCache, DEFAULT_CACHE_CAPACITY};
pub use coordinator::{CrawlRecord, CrawlReport, DeepCrawler};
pub use fetcher::{build_http_client, FetcherRegistry, PageFetcher};
pub use html::HtmlFetcher;
pub use page::PageContent;
pub use parser::{extract_page_links, parse_html, select_text, ParsedPage};
pub use scheduler::RateLimiter;

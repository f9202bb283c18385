use crate::config::GraphConfig;
use crate::crawler::page::PageContent;
use crate::url::visit_key;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Default number of pages kept in memory
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// In-memory store of successfully fetched pages
///
/// Entries are keyed by the fetcher that produced them, the normalised URL
/// and the request headers, so a page fetched one way is never served for a
/// request that would have been fetched another way. When full, the oldest
/// entry is evicted first.
#[derive(Debug)]
pub struct PageCache {
    capacity: usize,
    inner: Mutex<CacheInner>,
}

#[derive(Debug, Default)]
struct CacheInner {
    pages: HashMap<String, PageContent>,
    order: VecDeque<String>,
}

impl PageCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    pub fn get(&self, fetcher: &str, config: &GraphConfig) -> Option<PageContent> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.pages.get(&cache_key(fetcher, config)).cloned()
    }

    pub fn insert(&self, fetcher: &str, config: &GraphConfig, page: PageContent) {
        if self.capacity == 0 {
            return;
        }

        let key = cache_key(fetcher, config);
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if inner.pages.insert(key.clone(), page).is_none() {
            inner.order.push_back(key);
        }

        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.pages.remove(&oldest);
            }
        }
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fetcher name, normalised URL and headers, newline-separated
fn cache_key(fetcher: &str, config: &GraphConfig) -> String {
    let mut key = format!("{}\n{}", fetcher, visit_key(config.url()));
    for (name, value) in config.headers() {
        key.push('\n');
        key.push_str(&name.to_ascii_lowercase());
        key.push(':');
        key.push_str(value);
    }
    key
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

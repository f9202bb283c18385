use crate::url::visit_key;
use std::collections::HashSet;

/// URLs already fetched or scheduled within one deep crawl
///
/// Keys are normalized with [`visit_key`], so `https://a.com/x/` and
/// `https://a.com/x#top` count as the same visit. Insertion order is kept
/// for reporting.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    keys: HashSet<String>,
    order: Vec<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set with the seed URL already marked
    pub fn seeded(seed: &str) -> Self {
        let mut visited = Self::new();
        visited.insert(seed);
        visited
    }

    /// Marks a URL as visited
    ///
    /// Returns false if it was already present.
    pub fn insert(&mut self, url: &str) -> bool {
        let key = visit_key(url);
        if self.keys.insert(key.clone()) {
            self.order.push(key);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.keys.contains(&visit_key(url))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Normalized URLs in the order they were marked
    pub fn urls(&self) -> &[String] {
        &self.order
    }
}

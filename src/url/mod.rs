//! URL handling module for Sumi-Graph
//!
//! This module provides URL normalization for visited-set keys, the
//! link-inclusion filter and the helpers used to infer a strategy from a
//! request URL.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, is_search_results_url};
pub use matcher::{filter_links, LinkFilter};
pub use normalize::{normalize_url, visit_key};

/// Splits a comma-separated URL field into its trimmed, non-empty parts
///
/// # Examples
///
/// ```
/// use sumi_graph::url::split_url_list;
///
/// let urls = split_url_list("https://a.example.com, https://b.example.com,");
/// assert_eq!(urls, vec!["https://a.example.com", "https://b.example.com"]);
/// ```
pub fn split_url_list(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

use crate::ConfigError;
use regex::Regex;

/// Link-inclusion filter compiled from a configured pattern
///
/// The pattern must match the whole URL, not a substring of it.
///
/// # Examples
///
/// ```
/// use sumi_graph::url::LinkFilter;
///
/// let filter = LinkFilter::new(r"https://example\.com/blog/.*").unwrap();
/// assert!(filter.matches("https://example.com/blog/post-1"));
/// assert!(!filter.matches("https://example.com/about"));
/// assert!(!filter.matches("see https://example.com/blog/post-1"));
/// ```
#[derive(Debug, Clone)]
pub struct LinkFilter {
    pattern: String,
    regex: Regex,
}

impl LinkFilter {
    /// Compiles a link pattern
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))
            .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as configured
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns true if the whole URL matches the pattern
    pub fn matches(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }
}

/// Applies an optional filter, keeping the first occurrence of each link
///
/// Order of first appearance is preserved.
pub fn filter_links(links: &[String], filter: Option<&LinkFilter>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();

    links
        .iter()
        .filter(|link| filter.map_or(true, |f| f.matches(link)))
        .filter(|link| seen.insert(link.as_str()))
        .cloned()
        .collect()
}

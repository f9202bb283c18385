use url::Url;

/// Hosts of known search engines and the path prefix of their result pages
const SEARCH_ENDPOINTS: &[(&str, &str)] = &[
    ("google.com", "/search"),
    ("bing.com", "/search"),
    ("duckduckgo.com", "/html"),
    ("search.yahoo.com", "/search"),
];

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_graph::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if the URL points at a search engine's results page
///
/// The host must be the engine's domain or a subdomain of it, so `www.`
/// prefixes match. Unparseable input is never a search URL.
pub fn is_search_results_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return false;
    };
    let Some(host) = extract_domain(&parsed) else {
        return false;
    };

    SEARCH_ENDPOINTS.iter().any(|(engine, path)| {
        let on_engine = host == *engine || host.ends_with(&format!(".{}", engine));
        on_engine && parsed.path().starts_with(path)
    })
}

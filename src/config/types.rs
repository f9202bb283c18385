use crate::config::validation::validate_graph_config;
use crate::url::LinkFilter;
use crate::ConfigError;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;

/// Default maximum recursion depth for a request
pub const DEFAULT_MAX_DEPTH: u32 = 0;

/// Default total page cap for a request
pub const DEFAULT_MAX_PAGES: u32 = 10;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default pause between crawl requests in milliseconds
pub const DEFAULT_DELAY_MILLIS: u64 = 1000;

/// Parameters for one crawl or page request
///
/// A `GraphConfig` can only be produced by [`GraphConfigBuilder::build`] or
/// derived from an existing config, and has no setters afterwards. Graphs and
/// nodes receive it by reference on every call.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub(crate) url: String,
    pub(crate) prompt: String,
    pub(crate) model: Option<String>,
    pub(crate) temperature: Option<f32>,
    pub(crate) max_tokens: Option<u32>,
    pub(crate) enable_javascript: bool,
    pub(crate) headers: BTreeMap<String, String>,
    pub(crate) max_depth: u32,
    pub(crate) max_pages: u32,
    pub(crate) timeout: Duration,
    pub(crate) delay: Duration,
    pub(crate) rate_limit: Option<u32>,
    pub(crate) link_filter: Option<LinkFilter>,
    pub(crate) css_selector: Option<String>,
    pub(crate) enable_cache: bool,
    pub(crate) follow_nested_links: bool,
    pub(crate) metadata: Map<String, Value>,
}

impl GraphConfig {
    /// Starts a builder populated with the request defaults
    pub fn builder() -> GraphConfigBuilder {
        GraphConfigBuilder::new()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Model override handed to the content extractor
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Sampling temperature override for model-backed extraction
    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    /// Reply length override for model-backed extraction
    pub fn max_tokens(&self) -> Option<u32> {
        self.max_tokens
    }

    pub fn enable_javascript(&self) -> bool {
        self.enable_javascript
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn rate_limit(&self) -> Option<u32> {
        self.rate_limit
    }

    pub fn link_filter(&self) -> Option<&LinkFilter> {
        self.link_filter.as_ref()
    }

    pub fn link_pattern(&self) -> Option<&str> {
        self.link_filter.as_ref().map(LinkFilter::pattern)
    }

    pub fn css_selector(&self) -> Option<&str> {
        self.css_selector.as_deref()
    }

    pub fn enable_cache(&self) -> bool {
        self.enable_cache
    }

    pub fn follow_nested_links(&self) -> bool {
        self.follow_nested_links
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Minimum spacing between two paced requests
    ///
    /// This is the configured delay, widened to `1s / rate_limit` when a
    /// requests-per-second limit is set and is stricter.
    pub fn pacing_interval(&self) -> Duration {
        match self.rate_limit {
            Some(rps) if rps > 0 => self.delay.max(Duration::from_secs(1) / rps),
            _ => self.delay,
        }
    }

    /// Derives the config for one URL of a multi-URL request
    ///
    /// Everything but the URL is inherited.
    pub fn for_url(&self, url: &str) -> GraphConfig {
        GraphConfig {
            url: url.trim().to_string(),
            ..self.clone()
        }
    }

    /// Derives the config for a single page visited on behalf of this one
    ///
    /// Only the per-page constants (prompt, model settings, JavaScript flag,
    /// timeout, headers, selector, cache flag) carry over. The derived config never
    /// recurses.
    pub fn for_page(&self, url: &str) -> GraphConfig {
        GraphConfig {
            url: url.trim().to_string(),
            prompt: self.prompt.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            enable_javascript: self.enable_javascript,
            headers: self.headers.clone(),
            max_depth: 0,
            max_pages: DEFAULT_MAX_PAGES,
            timeout: self.timeout,
            delay: Duration::from_millis(DEFAULT_DELAY_MILLIS),
            rate_limit: None,
            link_filter: None,
            css_selector: self.css_selector.clone(),
            enable_cache: self.enable_cache,
            follow_nested_links: false,
            metadata: Map::new(),
        }
    }
}

/// Builder for [`GraphConfig`]
#[derive(Debug, Clone)]
pub struct GraphConfigBuilder {
    url: String,
    prompt: String,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    enable_javascript: bool,
    headers: BTreeMap<String, String>,
    max_depth: u32,
    max_pages: u32,
    timeout_secs: u64,
    delay_millis: u64,
    rate_limit: Option<u32>,
    link_pattern: Option<String>,
    css_selector: Option<String>,
    enable_cache: bool,
    follow_nested_links: bool,
    metadata: Map<String, Value>,
}

impl Default for GraphConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphConfigBuilder {
    pub fn new() -> Self {
        Self {
            url: String::new(),
            prompt: String::new(),
            model: None,
            temperature: None,
            max_tokens: None,
            enable_javascript: false,
            headers: BTreeMap::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_pages: DEFAULT_MAX_PAGES,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            delay_millis: DEFAULT_DELAY_MILLIS,
            rate_limit: None,
            link_pattern: None,
            css_selector: None,
            enable_cache: true,
            follow_nested_links: false,
            metadata: Map::new(),
        }
    }

    /// Seeds the builder from the `[defaults]` section of a settings file
    pub fn from_defaults(defaults: &RequestDefaults) -> Self {
        let mut builder = Self::new()
            .max_depth(defaults.max_depth)
            .max_pages(defaults.max_pages)
            .timeout_secs(defaults.timeout)
            .delay_millis(defaults.delay_millis)
            .enable_javascript(defaults.enable_javascript)
            .enable_cache(defaults.enable_cache);
        builder.headers = defaults.headers.clone();
        builder
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn enable_javascript(mut self, enabled: bool) -> Self {
        self.enable_javascript = enabled;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn timeout_secs(mut self, timeout: u64) -> Self {
        self.timeout_secs = timeout;
        self
    }

    pub fn delay_millis(mut self, delay: u64) -> Self {
        self.delay_millis = delay;
        self
    }

    /// Caps paced requests at this many per second
    pub fn rate_limit(mut self, requests_per_second: u32) -> Self {
        self.rate_limit = Some(requests_per_second);
        self
    }

    /// Only links matching this regex (whole URL) are followed
    pub fn link_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.link_pattern = Some(pattern.into());
        self
    }

    pub fn css_selector(mut self, selector: impl Into<String>) -> Self {
        self.css_selector = Some(selector.into());
        self
    }

    pub fn enable_cache(mut self, enabled: bool) -> Self {
        self.enable_cache = enabled;
        self
    }

    /// Re-extract links from every crawled page instead of the seed only
    pub fn follow_nested_links(mut self, enabled: bool) -> Self {
        self.follow_nested_links = enabled;
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Validates the collected fields and freezes them into a config
    pub fn build(self) -> Result<GraphConfig, ConfigError> {
        let link_filter = match self.link_pattern.as_deref() {
            Some(pattern) => Some(LinkFilter::new(pattern)?),
            None => None,
        };

        let config = GraphConfig {
            url: self.url.trim().to_string(),
            prompt: self.prompt,
            model: self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            enable_javascript: self.enable_javascript,
            headers: self.headers,
            max_depth: self.max_depth,
            max_pages: self.max_pages,
            timeout: Duration::from_secs(self.timeout_secs),
            delay: Duration::from_millis(self.delay_millis),
            rate_limit: self.rate_limit,
            link_filter,
            css_selector: self.css_selector,
            enable_cache: self.enable_cache,
            follow_nested_links: self.follow_nested_links,
            metadata: self.metadata,
        };

        validate_graph_config(&config)?;
        Ok(config)
    }
}

/// Settings file for the command-line entry point
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub defaults: RequestDefaults,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub browser: BrowserSettings,
    #[serde(default)]
    pub extractor: ExtractorSettings,
}

/// Request defaults applied before command-line overrides
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RequestDefaults {
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Pause between crawl requests (milliseconds)
    #[serde(default = "default_delay_millis")]
    pub delay_millis: u64,

    #[serde(default)]
    pub enable_javascript: bool,

    #[serde(default = "default_true")]
    pub enable_cache: bool,

    /// Extra request headers sent with every fetch
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_pages: DEFAULT_MAX_PAGES,
            timeout: DEFAULT_TIMEOUT_SECS,
            delay_millis: DEFAULT_DELAY_MILLIS,
            enable_javascript: false,
            enable_cache: true,
            headers: BTreeMap::new(),
        }
    }
}

/// Static HTTP fetcher settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HttpSettings {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum accepted body size (bytes)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Script-rendering fetcher settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BrowserSettings {
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
        }
    }
}

/// Which content extractor the CLI wires in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    #[default]
    Text,
    Llm,
}

/// Content extractor settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtractorSettings {
    #[serde(default)]
    pub kind: ExtractorKind,

    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Page text beyond this many characters is cut before prompting
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            kind: ExtractorKind::default(),
            base_url: default_llm_base_url(),
            api_key_env: default_api_key_env(),
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

fn default_max_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_delay_millis() -> u64 {
    DEFAULT_DELAY_MILLIS
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36".to_string()
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_max_input_chars() -> usize {
    20_000
}

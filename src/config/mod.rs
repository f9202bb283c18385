//! Configuration module for Sumi-Graph
//!
//! Two kinds of configuration live here:
//! - [`GraphConfig`]: the immutable parameter bundle for one crawl or page request
//! - [`Settings`]: the optional TOML file the command-line entry point reads
//!
//! # Example
//!
//! ```
//! use sumi_graph::config::GraphConfig;
//!
//! let config = GraphConfig::builder()
//!     .url("https://example.com")
//!     .prompt("List the article headlines")
//!     .max_depth(1)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.max_pages(), 10);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserSettings, ExtractorKind, ExtractorSettings, GraphConfig, GraphConfigBuilder,
    HttpSettings, RequestDefaults, Settings, DEFAULT_DELAY_MILLIS, DEFAULT_MAX_DEPTH,
    DEFAULT_MAX_PAGES, DEFAULT_TIMEOUT_SECS,
};

// Re-export parser functions
pub use parser::{load_settings, parse_settings};

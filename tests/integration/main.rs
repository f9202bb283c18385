//! Integration tests for sumi-graph
//!
//! Scripted fetchers drive the engine and strategies; wiremock servers stand
//! in for real sites and the model API.

mod crawl_tests;
mod extractor_tests;
mod fetcher_tests;
mod graph_tests;
mod support;

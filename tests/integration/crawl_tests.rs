//! End-to-end crawls against mock sites
//!
//! These tests wire the standard fetcher registry and the text extractor
//! together exactly as the command-line tool does, then run strategies
//! against wiremock servers.

use std::sync::Arc;
use std::time::{Duration, Instant};
use sumi_graph::config::Settings;
use sumi_graph::extractor::{Extracted, TextExtractor};
use sumi_graph::graph::{GraphBuilder, NodeFactory, StrategyKind};
use sumi_graph::FetcherRegistry;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn builder() -> GraphBuilder {
    let registry = FetcherRegistry::standard(&Settings::default()).unwrap();
    GraphBuilder::new(NodeFactory::new(
        Arc::new(registry),
        Arc::new(TextExtractor::new()),
    ))
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!("<html><body>{}</body></html>", body),
            "text/html",
        ))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_deep_crawl_follows_matching_links() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<p>Home</p><a href="/docs/a">A</a><a href="/blog/c">C</a><a href="/docs/b">B</a>"#,
    )
    .await;
    mount_page(&server, "/docs/a", "<p>Doc A</p>").await;
    mount_page(&server, "/docs/b", "<p>Doc B</p>").await;
    mount_page(&server, "/blog/c", "<p>Blog C</p>").await;

    let seed = format!("{}/", server.uri());
    let builder = builder();
    let config = builder
        .config()
        .prompt("collect")
        .max_depth(1)
        .delay_millis(0)
        .link_pattern(format!("{}/docs/.*", regex::escape(&server.uri())));

    let graph = builder
        .for_request(&seed, Some(StrategyKind::Smart), config)
        .unwrap();
    let result = graph.run().await;

    assert!(result.success, "error: {:?}", result.error);
    let urls: Vec<&str> = result.pages.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            seed.clone(),
            format!("{}/docs/a", server.uri()),
            format!("{}/docs/b", server.uri()),
        ]
    );
    assert_eq!(result.pages[1].depth, 1);
    assert_eq!(result.pages[1].data, Extracted::Text("Doc A".to_string()));
}

#[tokio::test]
async fn test_deep_crawl_skips_server_errors() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/down">Down</a><a href="/up">Up</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/up", "<p>Still here</p>").await;

    let builder = builder();
    let config = builder.config().max_depth(1).delay_millis(0);
    let graph = builder
        .for_request(&format!("{}/", server.uri()), None, config)
        .unwrap();
    let result = graph.run().await;

    assert!(result.success);
    assert_eq!(result.pages.len(), 2);
    assert_eq!(result.pages[1].url, format!("{}/up", server.uri()));
}

#[tokio::test]
async fn test_multi_over_mock_pages() {
    let server = MockServer::start().await;
    mount_page(&server, "/one", "<p>First page</p>").await;
    mount_page(&server, "/two", "<p>Second page</p>").await;

    let urls = format!("{0}/one, {0}/two, {0}/three", server.uri());
    let builder = builder();
    let graph = builder
        .for_request(&urls, None, builder.config().delay_millis(0))
        .unwrap();
    assert_eq!(graph.name(), "multi");

    let result = graph.run().await;

    assert!(result.success);
    let sections: Vec<&str> = result.content.split("\n\n---\n\n").collect();
    assert_eq!(sections.len(), 3);
    assert_eq!(
        sections[0],
        format!("URL 1: {}/one\nFirst page", server.uri())
    );
    assert!(sections[2].contains("[failed: HTTP 404 Not Found]"));
    assert_eq!(result.metadata["failed"], 1);
}

#[tokio::test]
async fn test_deep_crawl_is_paced() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/1">1</a><a href="/2">2</a><a href="/3">3</a>"#,
    )
    .await;
    for route in ["/1", "/2", "/3"] {
        mount_page(&server, route, "<p>page</p>").await;
    }

    let builder = builder();
    let config = builder.config().max_depth(1).delay_millis(150);
    let graph = builder
        .for_request(&format!("{}/", server.uri()), None, config)
        .unwrap();

    let started = Instant::now();
    let result = graph.run().await;

    assert_eq!(result.pages.len(), 4);
    assert!(started.elapsed() >= Duration::from_millis(3 * 150));
}

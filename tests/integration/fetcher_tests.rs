//! HTTP fetching against mock servers

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use sumi_graph::config::{load_settings, GraphConfig, HttpSettings, Settings};
use sumi_graph::crawler::{build_http_client, HtmlFetcher};
use sumi_graph::{FetcherRegistry, PageFetcher};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page_config(url: &str) -> GraphConfig {
    GraphConfig::builder().url(url).build().unwrap()
}

fn fetcher() -> HtmlFetcher {
    HtmlFetcher::new(&HttpSettings::default()).unwrap()
}

#[tokio::test]
async fn test_fetch_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><head><title>Article</title></head><body><p>Body text</p></body></html>",
            "text/html; charset=utf-8",
        ))
        .mount(&server)
        .await;

    let url = format!("{}/article", server.uri());
    let page = fetcher().fetch(&page_config(&url)).await;

    assert!(page.success);
    assert_eq!(page.url, url);
    assert_eq!(page.title.as_deref(), Some("Article"));
    assert!(page.text.contains("Body text"));
    assert_eq!(page.status_code, Some(200));
    assert!(page.content_type.unwrap().starts_with("text/html"));
}

#[tokio::test]
async fn test_fetch_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let page = fetcher()
        .fetch(&page_config(&format!("{}/missing", server.uri())))
        .await;

    assert!(!page.success);
    assert_eq!(page.status_code, Some(404));
    assert_eq!(page.error.as_deref(), Some("HTTP 404 Not Found"));
}

#[tokio::test]
async fn test_fetch_sends_request_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("x-api-token", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>ok</p>", "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let config = GraphConfig::builder()
        .url(server.uri())
        .header("x-api-token", "secret")
        .build()
        .unwrap();
    let page = fetcher().fetch(&config).await;

    assert!(page.success);
}

#[tokio::test]
async fn test_fetch_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<p>late</p>", "text/html")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = GraphConfig::builder()
        .url(server.uri())
        .timeout_secs(1)
        .build()
        .unwrap();
    let page = fetcher().fetch(&config).await;

    assert!(!page.success);
    assert!(page.error.unwrap().starts_with("Request timeout after"));
}

#[tokio::test]
async fn test_fetch_rejects_oversized_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>far too long</p>", "text/html"))
        .mount(&server)
        .await;

    let client = build_http_client(&HttpSettings::default()).unwrap();
    let page = HtmlFetcher::with_client(client, 10)
        .fetch(&page_config(&server.uri()))
        .await;

    assert!(!page.success);
    assert!(page.error.unwrap().contains("exceeds limit"));
}

#[tokio::test]
async fn test_body_limit_is_checked_before_reading() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("x".repeat(256 * 1024), "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/exact"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("y".repeat(1024), "text/html"))
        .mount(&server)
        .await;

    let client = build_http_client(&HttpSettings::default()).unwrap();
    let fetcher = HtmlFetcher::with_client(client, 1024);

    let large = fetcher
        .fetch(&page_config(&format!("{}/large", server.uri())))
        .await;
    assert!(!large.success);
    assert!(large.error.unwrap().contains("exceeds limit of 1024 bytes"));

    let exact = fetcher
        .fetch(&page_config(&format!("{}/exact", server.uri())))
        .await;
    assert!(exact.success);
    assert_eq!(exact.html.len(), 1024);
}

#[tokio::test]
async fn test_standard_registry_caches_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cached"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>once</p>", "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let registry = Arc::new(FetcherRegistry::standard(&Settings::default()).unwrap());
    let config = page_config(&format!("{}/cached", server.uri()));

    let first = registry.fetch(&config).await.unwrap();
    let second = registry.fetch(&config).await.unwrap();

    assert!(first.success);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_cache_can_be_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>twice</p>", "text/html"))
        .expect(2)
        .mount(&server)
        .await;

    let registry = FetcherRegistry::standard(&Settings::default()).unwrap();
    let config = GraphConfig::builder()
        .url(server.uri())
        .enable_cache(false)
        .build()
        .unwrap();

    registry.fetch(&config).await.unwrap();
    registry.fetch(&config).await.unwrap();
}

#[tokio::test]
async fn test_settings_file_configures_fetching() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[defaults]
max-pages = 4
timeout = 5

[http]
user-agent = "sumi-test/1.0"
"#
    )
    .unwrap();

    let settings = load_settings(file.path()).unwrap();
    assert_eq!(settings.defaults.max_pages, 4);
    assert_eq!(settings.http.user_agent, "sumi-test/1.0");

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "sumi-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>agent</p>", "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let page = HtmlFetcher::new(&settings.http)
        .unwrap()
        .fetch(&page_config(&server.uri()))
        .await;
    assert!(page.success);
}

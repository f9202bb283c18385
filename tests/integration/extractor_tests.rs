//! Model-backed extraction against a mock chat-completions API

use serde_json::json;
use sumi_graph::config::GraphConfig;
use sumi_graph::extractor::{ExtractError, LlmExtractor};
use sumi_graph::{ContentExtractor, Extracted, PageContent};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page() -> PageContent {
    PageContent {
        url: "https://shop.example.com/item".to_string(),
        html: "<p>Widget costs 5 EUR</p>".to_string(),
        text: "Widget costs 5 EUR".to_string(),
        success: true,
        ..PageContent::default()
    }
}

fn config() -> GraphConfig {
    GraphConfig::builder()
        .url("https://shop.example.com/item")
        .prompt("product name and price")
        .build()
        .unwrap()
}

fn reply(content: &str) -> serde_json::Value {
    json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
}

#[tokio::test]
async fn test_object_reply_becomes_structured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(reply("```json\n{\"name\": \"Widget\", \"price\": 5}\n```")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let extractor = LlmExtractor::new("test-key").with_base_url(server.uri());
    let extracted = extractor.extract(&page(), &config()).await.unwrap();

    match extracted {
        Extracted::Structured(map) => {
            assert_eq!(map["name"], "Widget");
            assert_eq!(map["price"], 5);
        }
        other => panic!("expected structured data, got {:?}", other),
    }
}

#[tokio::test]
async fn test_request_carries_model_override() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "model": "tiny-model" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("Widget, 5 EUR")))
        .expect(1)
        .mount(&server)
        .await;

    let config = GraphConfig::builder()
        .url("https://shop.example.com/item")
        .prompt("summary")
        .model("tiny-model")
        .build()
        .unwrap();
    let extracted = LlmExtractor::new("k")
        .with_base_url(server.uri())
        .extract(&page(), &config)
        .await
        .unwrap();

    assert_eq!(extracted, Extracted::Text("Widget, 5 EUR".to_string()));
}

#[tokio::test]
async fn test_api_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let result = LlmExtractor::new("k")
        .with_base_url(server.uri())
        .extract(&page(), &config())
        .await;

    match result {
        Err(ExtractError::Api { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "overloaded");
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_choices() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let result = LlmExtractor::new("k")
        .with_base_url(server.uri())
        .extract(&page(), &config())
        .await;

    assert!(matches!(result, Err(ExtractError::EmptyResponse)));
}

#[tokio::test]
async fn test_stalled_model_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(reply("too late"))
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = GraphConfig::builder()
        .url("https://shop.example.com/item")
        .prompt("summary")
        .timeout_secs(1)
        .build()
        .unwrap();

    let started = std::time::Instant::now();
    let result = LlmExtractor::new("k")
        .with_base_url(server.uri())
        .extract(&page(), &config)
        .await;

    assert!(started.elapsed() < std::time::Duration::from_secs(4));
    match result {
        Err(ExtractError::Timeout(limit)) => assert_eq!(limit.as_secs(), 1),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_request_carries_sampling_overrides() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "temperature": 0.5, "max_tokens": 64 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("short")))
        .expect(1)
        .mount(&server)
        .await;

    let config = GraphConfig::builder()
        .url("https://shop.example.com/item")
        .prompt("summary")
        .temperature(0.5)
        .max_tokens(64)
        .build()
        .unwrap();
    let extracted = LlmExtractor::new("k")
        .with_base_url(server.uri())
        .extract(&page(), &config)
        .await
        .unwrap();

    assert_eq!(extracted, Extracted::Text("short".to_string()));
}

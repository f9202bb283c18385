//! Engine and strategy behaviour against scripted fetchers and extractors

use crate::support::{
    cancellable_factory, config, factory, links_html, BrokenExtractor, ScriptedFetcher,
    SuffixExtractor,
};
use sumi_graph::extractor::Extracted;
use sumi_graph::graph::{Graph, NodeOutput, SearchGraph, SmartGraph, SmartMultiGraph};
use sumi_graph::{NodeState, PageContent};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_single_page_scenario() {
    let fetcher = ScriptedFetcher::new().page("https://example.com", "<p>hello</p>", "hello");
    let graph = SmartGraph::new(
        config("https://example.com").max_pages(10).build().unwrap(),
        factory(fetcher, SuffixExtractor("-extracted")),
    );

    let result = graph.run().await;

    assert!(result.success);
    assert_eq!(result.content, "hello-extracted");
    assert_eq!(result.url.as_deref(), Some("https://example.com"));
    assert_eq!(result.strategy(), Some("smart"));
}

#[tokio::test]
async fn test_depth_selects_pipeline() {
    let shallow = SmartGraph::new(
        config("https://example.com").max_depth(0).build().unwrap(),
        factory(ScriptedFetcher::new(), SuffixExtractor("")),
    );
    let tree = shallow.build_graph();
    assert_eq!(tree.name(), "Fetch Page");
    assert_eq!(tree.children().len(), 1);
    assert_eq!(tree.children()[0].name(), "Extract Content");

    let deep = SmartGraph::new(
        config("https://example.com").max_depth(1).build().unwrap(),
        factory(ScriptedFetcher::new(), SuffixExtractor("")),
    );
    assert_eq!(deep.build_graph().children()[0].name(), "Deep Extract");
}

#[tokio::test]
async fn test_root_fetch_failure() {
    let fetcher = ScriptedFetcher::new().failing("https://example.com", "connection refused");
    let graph = SmartGraph::new(
        config("https://example.com").build().unwrap(),
        factory(fetcher, SuffixExtractor("")),
    );

    let result = graph.run().await;

    assert!(!result.success);
    assert!(result.content.is_empty());
    assert!(result.links.is_empty());
    assert_eq!(result.error.as_deref(), Some("connection refused"));

    let nodes = result.metadata["nodes"].as_array().unwrap();
    assert_eq!(nodes[0]["state"], "failed");
    assert_eq!(nodes[1]["state"], "failed");
}

#[tokio::test]
async fn test_extraction_failure_keeps_fetch_success() {
    let fetcher = ScriptedFetcher::new().page("https://example.com", "<p>x</p>", "x");
    let graph = SmartGraph::new(
        config("https://example.com").build().unwrap(),
        factory(fetcher, BrokenExtractor),
    );

    let result = graph.run().await;

    assert!(result.success);
    assert!(result.content.is_empty());
    let nodes = result.metadata["nodes"].as_array().unwrap();
    assert_eq!(nodes[1]["state"], "failed");
    assert!(nodes[1]["error"].as_str().unwrap().contains("no choices"));
}

#[tokio::test]
async fn test_no_fetcher_available() {
    let registry = sumi_graph::FetcherRegistry::new();
    let factory = sumi_graph::graph::NodeFactory::new(
        std::sync::Arc::new(registry),
        std::sync::Arc::new(SuffixExtractor("")),
    );
    let graph = SmartGraph::new(config("https://example.com").build().unwrap(), factory);

    let result = graph.run().await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("No fetcher available"));
}

#[tokio::test]
async fn test_run_with_input_skips_fetch() {
    let fetcher = ScriptedFetcher::new();
    let calls = fetcher.clone();
    let graph = SmartGraph::new(
        config("https://example.com").build().unwrap(),
        factory(fetcher, SuffixExtractor("!")),
    );

    let page = PageContent {
        url: "https://example.com".to_string(),
        text: "supplied".to_string(),
        success: true,
        ..PageContent::default()
    };
    let result = graph.run_with_input(NodeOutput::Page(page)).await;

    assert!(result.success);
    assert_eq!(result.content, "supplied!");
    assert!(calls.calls().is_empty());
}

#[tokio::test]
async fn test_zero_page_cap_does_nothing() {
    let fetcher = ScriptedFetcher::new().page("https://example.com", "", "x");
    let calls = fetcher.clone();
    let graph = SmartGraph::new(
        config("https://example.com").max_pages(0).build().unwrap(),
        factory(fetcher, SuffixExtractor("")),
    );

    let result = graph.run().await;

    assert!(result.success);
    assert!(result.is_empty());
    assert!(calls.calls().is_empty());
}

#[tokio::test]
async fn test_cancelled_run_fails() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let fetcher = ScriptedFetcher::new().page("https://example.com", "", "x");
    let graph = SmartGraph::new(
        config("https://example.com").build().unwrap(),
        cancellable_factory(fetcher, SuffixExtractor(""), cancel),
    );

    let result = graph.run().await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Operation cancelled"));
}

#[tokio::test]
async fn test_deep_crawl_page_cap() {
    let seed = links_html(&["/p1", "/p2", "/p3", "/p4", "/p5"]);
    let mut fetcher = ScriptedFetcher::new().page("https://example.com/", &seed, "seed");
    for i in 1..=5 {
        let url = format!("https://example.com/p{}", i);
        fetcher = fetcher.page(&url, "<p>page</p>", &format!("page {}", i));
    }
    let calls = fetcher.clone();

    let graph = SmartGraph::new(
        config("https://example.com/")
            .max_depth(1)
            .max_pages(2)
            .build()
            .unwrap(),
        factory(fetcher, SuffixExtractor("")),
    );

    let result = graph.run().await;

    assert!(result.success);
    assert_eq!(result.pages.len(), 2);
    assert_eq!(result.pages[0].depth, 0);
    assert_eq!(result.pages[1].url, "https://example.com/p1");
    assert_eq!(result.pages[1].data, Extracted::Text("page 1".to_string()));
    // Seed plus at most max_pages links
    assert!(calls.calls().len() <= 3);
}

#[tokio::test]
async fn test_deep_crawl_pattern_matches_nothing() {
    let seed = links_html(&["/a", "/b"]);
    let fetcher = ScriptedFetcher::new()
        .page("https://example.com/", &seed, "seed")
        .page("https://example.com/a", "", "a")
        .page("https://example.com/b", "", "b");

    let graph = SmartGraph::new(
        config("https://example.com/")
            .max_depth(2)
            .link_pattern(r"https://other\.example/.*")
            .build()
            .unwrap(),
        factory(fetcher, SuffixExtractor("")),
    );

    let result = graph.run().await;

    assert_eq!(result.pages.len(), 1);
    assert_eq!(result.pages[0].url, "https://example.com/");
}

#[tokio::test]
async fn test_deep_crawl_isolates_failures() {
    let seed = links_html(&["/broken", "/ok"]);
    let fetcher = ScriptedFetcher::new()
        .page("https://example.com/", &seed, "seed")
        .failing("https://example.com/broken", "HTTP 500 Internal Server Error")
        .page("https://example.com/ok", "", "ok");

    let graph = SmartGraph::new(
        config("https://example.com/").max_depth(1).build().unwrap(),
        factory(fetcher, SuffixExtractor("")),
    );

    let result = graph.run().await;

    assert!(result.success);
    let urls: Vec<&str> = result.pages.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["https://example.com/", "https://example.com/ok"]);
}

#[tokio::test]
async fn test_multi_combines_in_order() {
    let fetcher = ScriptedFetcher::new()
        .page("https://a.example.com", "", "alpha")
        .failing("https://b.example.com", "HTTP 404 Not Found");
    let graph = SmartMultiGraph::new(
        config("https://a.example.com").build().unwrap(),
        vec![
            "https://a.example.com".to_string(),
            "https://b.example.com".to_string(),
        ],
        factory(fetcher, SuffixExtractor("")),
    );

    let result = graph.run().await;

    assert!(result.success);
    assert_eq!(
        result.content,
        "URL 1: https://a.example.com\nalpha\n\n---\n\nURL 2: https://b.example.com\n[failed: HTTP 404 Not Found]"
    );
    assert_eq!(result.metadata["pages"], 2);
    assert_eq!(result.metadata["failed"], 1);
}

#[tokio::test]
async fn test_multi_success_when_every_page_fails() {
    let graph = SmartMultiGraph::new(
        config("https://a.example.com").build().unwrap(),
        vec![
            "https://a.example.com".to_string(),
            "https://b.example.com".to_string(),
        ],
        factory(ScriptedFetcher::new(), SuffixExtractor("")),
    );

    let result = graph.run().await;

    assert!(result.success);
    assert_eq!(result.metadata["failed"], 2);
    assert!(result.content.contains("[failed:"));
}

#[tokio::test]
async fn test_search_without_links_returns_seed_result() {
    let fetcher = ScriptedFetcher::new().page(
        "https://search.example.com/?q=rust",
        "<p>No results</p>",
        "No results",
    );
    let calls = fetcher.clone();
    let graph = SearchGraph::new(
        config("https://search.example.com/?q=rust").build().unwrap(),
        factory(fetcher, SuffixExtractor("")),
    );

    let result = graph.run().await;

    assert!(result.success);
    assert_eq!(result.content, "No results");
    assert!(result.links.is_empty());
    assert!(result.metadata.get("pages").is_none());
    assert_eq!(calls.calls().len(), 1);
}

#[tokio::test]
async fn test_search_failure_short_circuits() {
    let fetcher = ScriptedFetcher::new().failing("https://search.example.com/?q=rust", "HTTP 503");
    let graph = SearchGraph::new(
        config("https://search.example.com/?q=rust").build().unwrap(),
        factory(fetcher, SuffixExtractor("")),
    );

    let result = graph.run().await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("HTTP 503"));
}

#[tokio::test]
async fn test_search_fans_out_over_first_results() {
    let results = links_html(&[
        "https://r1.example.com/",
        "https://r2.example.com/",
        "https://r3.example.com/",
    ]);
    let fetcher = ScriptedFetcher::new()
        .page("https://search.example.com/?q=rust", &results, "results")
        .page("https://r1.example.com/", "", "first")
        .page("https://r2.example.com/", "", "second")
        .page("https://r3.example.com/", "", "third");
    let calls = fetcher.clone();

    let graph = SearchGraph::new(
        config("https://search.example.com/?q=rust")
            .max_pages(2)
            .build()
            .unwrap(),
        factory(fetcher, SuffixExtractor("")),
    );

    let result = graph.run().await;

    assert!(result.success);
    assert_eq!(
        result.content,
        "Result 1: https://r1.example.com/\nfirst\n\n---\n\nResult 2: https://r2.example.com/\nsecond"
    );
    assert_eq!(result.links.len(), 2);
    assert!(!calls.calls().contains(&"https://r3.example.com/".to_string()));
}

#[tokio::test]
async fn test_search_with_supplied_results_page() {
    let fetcher = ScriptedFetcher::new().page("https://r1.example.com/", "", "first");
    let graph = SearchGraph::new(
        config("https://search.example.com/?q=rust").build().unwrap(),
        factory(fetcher, SuffixExtractor("")),
    );

    let page = PageContent {
        url: "https://search.example.com/?q=rust".to_string(),
        html: links_html(&["https://r1.example.com/"]),
        success: true,
        ..PageContent::default()
    };
    let result = graph.run_with_input(NodeOutput::Page(page)).await;

    assert!(result.success);
    assert!(result.content.starts_with("Result 1: https://r1.example.com/\nfirst"));
}

#[tokio::test]
async fn test_node_states_terminal_after_run() {
    let fetcher = ScriptedFetcher::new().page("https://example.com", "", "x");
    let graph = SmartGraph::new(
        config("https://example.com").build().unwrap(),
        factory(fetcher, SuffixExtractor("")),
    );

    let mut tree = graph.build_graph();
    sumi_graph::GraphEngine::new().execute_graph(&mut tree).await;

    for node in tree.preorder() {
        assert_ne!(node.state(), NodeState::Pending);
    }
}

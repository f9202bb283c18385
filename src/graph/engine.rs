//! Tree execution and result aggregation

use crate::graph::node::{GraphNode, NodeOutput};
use crate::output::ScrapeResult;
use crate::ScrapeError;
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

type TreeRun<'a> = Pin<Box<dyn Future<Output = Result<(), ScrapeError>> + Send + 'a>>;

/// Runs node trees and reduces them to a [`ScrapeResult`]
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphEngine;

impl GraphEngine {
    pub fn new() -> Self {
        Self
    }

    /// Executes a tree depth-first and aggregates its outputs
    ///
    /// Each child receives its parent's output as input. Aggregation scans the
    /// finished tree parent-before-children and keeps the first non-empty
    /// text, structured map, link list and crawl-record list. Overall success
    /// is the root's own outcome.
    ///
    /// A fatal error stops the run; the result then reports failure with the
    /// error message and elapsed time only.
    pub async fn execute_graph(&self, root: &mut GraphNode) -> ScrapeResult {
        let started = Instant::now();
        let url = request_url(root.input());

        if let Err(e) = execute_tree(root).await {
            tracing::error!("Graph execution failed: {}", e);
            return ScrapeResult::failed(url, e.to_string(), started.elapsed());
        }

        let nodes = root.preorder();
        let content = nodes.iter().find_map(|n| n.output().as_text());
        let structured = nodes.iter().find_map(|n| n.output().as_structured());
        let links = nodes.iter().find_map(|n| n.output().as_links());
        let records = nodes.iter().find_map(|n| n.output().as_records());

        let mut result = ScrapeResult::empty(url, started.elapsed());
        result.content = content.map(str::to_string).unwrap_or_default();
        result.structured_data = structured.cloned().unwrap_or_default();
        result.links = links.map(<[String]>::to_vec).unwrap_or_default();
        result.pages = records.map(<[_]>::to_vec).unwrap_or_default();
        result.success = root.state().is_success();
        result.error = root.error().map(str::to_string);
        result
            .metadata
            .insert("nodes".to_string(), root.summary());

        tracing::info!(
            "Graph finished in {:?}: {}",
            result.duration,
            if result.success { "success" } else { "failed" }
        );
        result
    }
}

/// Runs `node`, then each child with the node's output as input
fn execute_tree(node: &mut GraphNode) -> TreeRun<'_> {
    Box::pin(async move {
        node.execute().await?;

        let output = node.output().clone();
        for child in node.children_mut() {
            child.set_input(output.clone());
            execute_tree(child).await?;
        }
        Ok(())
    })
}

/// URL of the request a tree was built for, taken from the root input
fn request_url(input: &NodeOutput) -> Option<String> {
    match input {
        NodeOutput::Config(config) if !config.url().is_empty() => Some(config.url().to_string()),
        NodeOutput::Page(page) if !page.url.is_empty() => Some(page.url.clone()),
        _ => None,
    }
}

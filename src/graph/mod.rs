//! Graph module: node trees, their execution and the strategies built on them
//!
//! # Components
//!
//! - `GraphNode` / `Node`: one step of a pipeline and the tree it lives in
//! - Node variants: fetch, extract, extract-links, deep-extract, delay
//! - `NodeFactory`: wires nodes to the shared fetcher registry and extractor
//! - `GraphEngine`: depth-first execution and first-match aggregation
//! - Strategies: single-page, multi-URL and search fan-out
//! - `GraphBuilder` / `StrategyKind`: strategy selection

mod builder;
mod engine;
mod factory;
mod node;
mod nodes;
mod strategy;

pub use builder::{GraphBuilder, StrategyKind};
pub use engine::GraphEngine;
pub use factory::NodeFactory;
pub use node::{GraphNode, Node, NodeOutput};
pub use nodes::{DeepExtractNode, DelayNode, ExtractLinksNode, ExtractNode, FetchNode};
pub use strategy::{
    standard_tree, Graph, SearchGraph, SmartGraph, SmartMultiGraph, ENTRY_SEPARATOR,
};

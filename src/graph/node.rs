//! Execution nodes and the node tree
//!
//! A [`GraphNode`] wraps one [`Node`] with its identity, the input it was
//! given, the output it produced and a recorded outcome. Nodes form a tree in
//! which every child receives its parent's output as input.

use crate::config::GraphConfig;
use crate::crawler::{CrawlRecord, PageContent};
use crate::extractor::Extracted;
use crate::state::NodeState;
use crate::ScrapeError;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use uuid::Uuid;

/// Everything a node can produce or consume
#[derive(Debug, Clone, Default)]
pub enum NodeOutput {
    /// Nothing was produced (failed nodes, or before execution)
    #[default]
    Empty,
    Config(GraphConfig),
    Page(PageContent),
    Text(String),
    Structured(Map<String, Value>),
    Links(Vec<String>),
    Records(Vec<CrawlRecord>),
}

impl NodeOutput {
    /// Tag naming the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Config(_) => "config",
            Self::Page(_) => "page",
            Self::Text(_) => "text",
            Self::Structured(_) => "structured",
            Self::Links(_) => "links",
            Self::Records(_) => "records",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) if !text.is_empty() => Some(text),
            _ => None,
        }
    }

    pub fn as_structured(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Structured(map) if !map.is_empty() => Some(map),
            _ => None,
        }
    }

    pub fn as_links(&self) -> Option<&[String]> {
        match self {
            Self::Links(links) if !links.is_empty() => Some(links),
            _ => None,
        }
    }

    pub fn as_records(&self) -> Option<&[CrawlRecord]> {
        match self {
            Self::Records(records) if !records.is_empty() => Some(records),
            _ => None,
        }
    }

    pub fn as_page(&self) -> Option<&PageContent> {
        match self {
            Self::Page(page) => Some(page),
            _ => None,
        }
    }
}

impl From<Extracted> for NodeOutput {
    fn from(extracted: Extracted) -> Self {
        match extracted {
            Extracted::Text(text) => Self::Text(text),
            Extracted::Structured(map) => Self::Structured(map),
            Extracted::Links(links) => Self::Links(links),
        }
    }
}

/// One unit of work in a graph
#[async_trait]
pub trait Node: Send + Sync {
    /// Produces this node's output from its input
    ///
    /// Errors are recorded on the wrapping [`GraphNode`]; only fatal errors
    /// (see [`ScrapeError::is_fatal`]) escape the tree run.
    async fn run(&self, input: &NodeOutput) -> Result<NodeOutput, ScrapeError>;

    /// Reports a failure carried inside a successfully returned output
    fn failure(&self, _output: &NodeOutput) -> Option<String> {
        None
    }
}

/// A node plus its identity, recorded outcome and children
pub struct GraphNode {
    id: Uuid,
    name: String,
    node: Box<dyn Node>,
    input: NodeOutput,
    output: NodeOutput,
    state: NodeState,
    error: Option<String>,
    children: Vec<GraphNode>,
}

impl GraphNode {
    pub fn new(name: impl Into<String>, node: impl Node + 'static) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            node: Box::new(node),
            input: NodeOutput::Empty,
            output: NodeOutput::Empty,
            state: NodeState::Pending,
            error: None,
            children: Vec::new(),
        }
    }

    /// Sets the stored input
    pub fn with_input(mut self, input: NodeOutput) -> Self {
        self.input = input;
        self
    }

    pub fn with_child(mut self, child: GraphNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_child(&mut self, child: GraphNode) {
        self.children.push(child);
    }

    pub fn set_input(&mut self, input: NodeOutput) {
        self.input = input;
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input(&self) -> &NodeOutput {
        &self.input
    }

    pub fn output(&self) -> &NodeOutput {
        &self.output
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn children(&self) -> &[GraphNode] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut [GraphNode] {
        &mut self.children
    }

    /// Runs the node against its stored input and records the outcome
    ///
    /// Always leaves the node in a terminal state. A fatal error is recorded
    /// and then returned so the caller can abort the tree.
    pub async fn execute(&mut self) -> Result<(), ScrapeError> {
        tracing::info!("Executing node '{}'", self.name);

        match self.node.run(&self.input).await {
            Ok(output) => {
                match self.node.failure(&output) {
                    Some(message) => {
                        tracing::warn!("Node '{}' failed: {}", self.name, message);
                        self.state = NodeState::Failed;
                        self.error = Some(message);
                    }
                    None => self.state = NodeState::Success,
                }
                self.output = output;
                Ok(())
            }
            Err(e) => {
                self.state = NodeState::Failed;
                self.error = Some(e.to_string());
                self.output = NodeOutput::Empty;

                if e.is_fatal() {
                    tracing::error!("Node '{}' aborted the graph: {}", self.name, e);
                    Err(e)
                } else {
                    tracing::warn!("Node '{}' failed: {}", self.name, e);
                    Ok(())
                }
            }
        }
    }

    /// All nodes in depth-first, parent-before-children order
    pub fn preorder(&self) -> Vec<&GraphNode> {
        let mut nodes = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            nodes.push(node);
            stack.extend(node.children.iter().rev());
        }
        nodes
    }

    /// Per-node outcome summary for result metadata
    pub fn summary(&self) -> Value {
        Value::Array(
            self.preorder()
                .into_iter()
                .map(|node| {
                    json!({
                        "id": node.id.to_string(),
                        "name": node.name,
                        "state": node.state.as_str(),
                        "error": node.error,
                    })
                })
                .collect(),
        )
    }
}

impl std::fmt::Debug for GraphNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("error", &self.error)
            .field("output", &self.output.kind())
            .field("children", &self.children)
            .finish()
    }
}

//! State module for tracking graph and crawl progress
//!
//! # Components
//!
//! - `NodeState`: Tracks the outcome of individual graph nodes (pending, success, failed)
//! - `VisitedSet`: Tracks which URLs one deep crawl has already fetched or scheduled

mod node_state;
mod visited;

// Re-export main types
pub use node_state::NodeState;
pub use visited::VisitedSet;

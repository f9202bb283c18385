/// Node state definitions for tracking graph execution
///
/// Every node starts out pending and must end in exactly one terminal state.
use serde::Serialize;
use std::fmt;

/// Represents the outcome of a single graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    /// Node has not been executed yet
    #[default]
    Pending,

    /// Node executed and produced its output
    Success,

    /// Node executed but its unit of work failed
    Failed,
}

impl NodeState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns true if this represents a failure
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Maps a boolean outcome onto a terminal state
    pub fn from_success(success: bool) -> Self {
        if success {
            Self::Success
        } else {
            Self::Failed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

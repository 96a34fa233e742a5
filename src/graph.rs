//! DAG-facing view types consumed from the scheduler collaborator.
//!
//! The scheduler owns the dependency graph and its wave algorithm; the
//! conflict detector only needs to look up nodes by id and read their
//! prompts. [`TaskGraph`] is that narrow seam. It is implemented for
//! `BTreeMap<NodeId, TaskNode>` so simple callers and tests need no wrapper
//! type; a real scheduler implements it on its own DAG.

use crate::singleton::SingletonKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of a DAG node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// Create a node id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A unit of work in the scheduler's DAG, as seen by the detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskNode {
    /// Node identifier.
    pub id: NodeId,
    /// Free-text prompt describing the work; read for singleton
    /// classification when no explicit tag is supplied.
    pub prompt: String,
}

impl TaskNode {
    /// Create a node.
    pub fn new(id: impl Into<NodeId>, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
        }
    }
}

/// Read access to the scheduler's DAG.
pub trait TaskGraph {
    /// Look up a node by id.
    fn node(&self, id: &NodeId) -> Option<&TaskNode>;

    /// All node ids in the graph, in a stable order.
    fn node_ids(&self) -> Vec<NodeId>;
}

impl TaskGraph for BTreeMap<NodeId, TaskNode> {
    fn node(&self, id: &NodeId) -> Option<&TaskNode> {
        self.get(id)
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.keys().cloned().collect()
    }
}

/// Decomposer output for one node: what it is predicted to touch.
///
/// `predicted_files` is a heuristic, not a guarantee; a node with no entry
/// contributes nothing to file-conflict analysis. An explicit `singleton`
/// tag overrides prompt classification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subtask {
    /// File paths this node is expected to touch.
    #[serde(default)]
    pub predicted_files: Vec<String>,

    /// Explicit singleton tag from the decomposer, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singleton: Option<SingletonKind>,
}

/// Per-node subtask records, keyed by node id.
pub type SubtaskMap = BTreeMap<NodeId, Subtask>;

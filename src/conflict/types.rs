//! Conflict report structures.

use crate::graph::NodeId;
use crate::singleton::SingletonKind;
use serde::{Deserialize, Serialize};

/// What kind of conflict was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Two or more nodes predict writes to the same file.
    File,
    /// A singleton operation collides with the rest of the wave.
    Singleton,
}

/// A conflict between two or more nodes in a candidate wave.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConflict {
    /// Conflict kind.
    pub kind: ConflictKind,

    /// Nodes involved; always at least two.
    pub node_ids: Vec<NodeId>,

    /// Contended path, for file conflicts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    /// Colliding singleton kind, for same-kind singleton conflicts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub singleton_kind: Option<SingletonKind>,

    /// Human-readable description.
    pub description: String,
}

/// Result of analyzing one candidate wave.
///
/// Recomputed on every call; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveConflictAnalysis {
    /// Whether the wave may be dispatched concurrently. A single-node wave
    /// is reported as not parallelizable: there is nothing to run alongside.
    pub parallelizable: bool,

    /// Detected conflicts, in analysis order; empty when parallelizable.
    pub conflicts: Vec<NodeConflict>,

    /// Suggested fix when conflicts exist, surfaced verbatim by the
    /// scheduler.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

//! Static wave analysis: singleton pass and file pass.

use super::types::{ConflictKind, NodeConflict, WaveConflictAnalysis};
use crate::graph::{NodeId, SubtaskMap, TaskGraph};
use crate::paths;
use crate::singleton::{self, SingletonKind};
use std::collections::{BTreeMap, BTreeSet};

/// Analyze a candidate wave for conflicts.
///
/// `subtasks` supplies predicted files and explicit singleton tags per node;
/// nodes without an entry fall back to prompt classification and contribute
/// nothing to the file pass. Waves of zero or one node are trivially
/// `{parallelizable: false, conflicts: []}`: there is nothing to
/// parallelize.
pub fn analyze_wave(
    graph: &dyn TaskGraph,
    node_ids: &[NodeId],
    subtasks: &SubtaskMap,
) -> WaveConflictAnalysis {
    if node_ids.len() <= 1 {
        return WaveConflictAnalysis {
            parallelizable: false,
            conflicts: Vec::new(),
            remediation: None,
        };
    }

    let mut conflicts = Vec::new();
    conflicts.extend(singleton_pass(graph, node_ids, subtasks));
    conflicts.extend(file_pass(node_ids, subtasks));

    let parallelizable = conflicts.is_empty();
    let remediation = if parallelizable {
        None
    } else {
        Some(suggest_remediation(&conflicts))
    };

    WaveConflictAnalysis {
        parallelizable,
        conflicts,
        remediation,
    }
}

/// Find conflicts across the whole plan, keyed by involved node.
///
/// Runs pairwise [`analyze_wave`] over every node pair; O(n²), intended for
/// planning-time validation of DAGs of tens of nodes, not the dispatch hot
/// path.
pub fn find_all_conflicts(
    graph: &dyn TaskGraph,
    subtasks: &SubtaskMap,
) -> BTreeMap<NodeId, Vec<NodeConflict>> {
    let mut by_node: BTreeMap<NodeId, Vec<NodeConflict>> = BTreeMap::new();
    let all_ids = graph.node_ids();

    for i in 0..all_ids.len() {
        for j in (i + 1)..all_ids.len() {
            let pair = [all_ids[i].clone(), all_ids[j].clone()];
            let analysis = analyze_wave(graph, &pair, subtasks);

            for conflict in analysis.conflicts {
                for node_id in &conflict.node_ids {
                    by_node
                        .entry(node_id.clone())
                        .or_default()
                        .push(conflict.clone());
                }
            }
        }
    }

    by_node
}

/// Resolve each node's singleton kind and report collisions.
///
/// Explicit subtask tags take precedence over prompt classification. Two
/// shapes are reported: several nodes of the same kind, and any singleton
/// node sharing a wave with non-singleton work.
fn singleton_pass(
    graph: &dyn TaskGraph,
    node_ids: &[NodeId],
    subtasks: &SubtaskMap,
) -> Vec<NodeConflict> {
    let mut conflicts = Vec::new();
    let mut singleton_nodes: Vec<(NodeId, SingletonKind)> = Vec::new();

    for node_id in node_ids {
        let Some(node) = graph.node(node_id) else {
            continue;
        };

        let explicit = subtasks.get(node_id).and_then(|s| s.singleton);
        let resolved = explicit.or_else(|| singleton::classify(&node.prompt));

        if let Some(kind) = resolved {
            singleton_nodes.push((node_id.clone(), kind));
        }
    }

    // Several nodes of one kind cannot share one exclusive lease.
    let mut by_kind: BTreeMap<SingletonKind, Vec<NodeId>> = BTreeMap::new();
    for (node_id, kind) in &singleton_nodes {
        by_kind.entry(*kind).or_default().push(node_id.clone());
    }

    for (kind, nodes) in by_kind {
        if nodes.len() > 1 {
            conflicts.push(NodeConflict {
                kind: ConflictKind::Singleton,
                description: format!(
                    "multiple {} tasks cannot run in parallel: {}",
                    kind,
                    join_ids(&nodes)
                ),
                node_ids: nodes,
                file_path: None,
                singleton_kind: Some(kind),
            });
        }
    }

    // A singleton operation must run alone, even alongside work touching
    // unrelated files: it is assumed to touch whole-repository state.
    if !singleton_nodes.is_empty() && node_ids.len() > singleton_nodes.len() {
        let singleton_ids: Vec<NodeId> =
            singleton_nodes.iter().map(|(id, _)| id.clone()).collect();
        let regular_ids: Vec<NodeId> = node_ids
            .iter()
            .filter(|id| !singleton_ids.contains(id))
            .cloned()
            .collect();

        let mut involved = singleton_ids.clone();
        involved.extend(regular_ids.iter().cloned());

        conflicts.push(NodeConflict {
            kind: ConflictKind::Singleton,
            node_ids: involved,
            file_path: None,
            singleton_kind: None,
            description: format!(
                "singleton tasks ({}) must run alone, not with {}",
                join_ids(&singleton_ids),
                join_ids(&regular_ids)
            ),
        });
    }

    conflicts
}

/// Report every normalized path predicted by two or more distinct nodes.
fn file_pass(node_ids: &[NodeId], subtasks: &SubtaskMap) -> Vec<NodeConflict> {
    // Claimants per path form a set: one node predicting the same file
    // twice, or under two spellings that normalize identically, is not a
    // conflict with itself.
    let mut claimants: BTreeMap<String, BTreeSet<NodeId>> = BTreeMap::new();

    for node_id in node_ids {
        let Some(subtask) = subtasks.get(node_id) else {
            continue;
        };

        for path in &subtask.predicted_files {
            claimants
                .entry(paths::normalize(path))
                .or_default()
                .insert(node_id.clone());
        }
    }

    claimants
        .into_iter()
        .filter(|(_, nodes)| nodes.len() > 1)
        .map(|(path, nodes)| {
            let nodes: Vec<NodeId> = nodes.into_iter().collect();
            NodeConflict {
                kind: ConflictKind::File,
                description: format!(
                    "file {} modified by multiple tasks: {}",
                    path,
                    join_ids(&nodes)
                ),
                node_ids: nodes,
                file_path: Some(path),
                singleton_kind: None,
            }
        })
        .collect()
}

/// Synthesize remediation text from the detected conflicts.
fn suggest_remediation(conflicts: &[NodeConflict]) -> String {
    let file_count = conflicts
        .iter()
        .filter(|c| c.kind == ConflictKind::File)
        .count();
    let singleton_count = conflicts
        .iter()
        .filter(|c| c.kind == ConflictKind::Singleton)
        .count();

    let mut suggestions = Vec::new();

    if file_count > 0 {
        suggestions.push(format!(
            "{} file(s) are claimed by multiple tasks. \
             Serialize them with dependency edges, or decompose differently \
             to avoid the file overlap.",
            file_count
        ));
    }

    if singleton_count > 0 {
        suggestions.push(format!(
            "{} singleton conflict(s) detected. Singleton operations \
             (build, lint, test, typecheck, install, deploy) must run alone; \
             isolate each one in its own wave.",
            singleton_count
        ));
    }

    suggestions.join(" ")
}

fn join_ids(ids: &[NodeId]) -> String {
    ids.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

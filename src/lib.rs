//! Shoal: file-based coordination layer for parallel agent waves.
//!
//! A multi-agent orchestrator executes a dependency graph of work items,
//! dispatching independent batches ("waves") of nodes to concurrent agent
//! processes. Those agents share no memory, only a filesystem, so this
//! crate provides the coordination primitives the orchestrator needs:
//!
//! - [`locks::FileLockManager`]: lease-based Read/Write mutual exclusion
//!   over arbitrary resource paths, persisted one record per path so leases
//!   survive restarts and crashed holders expire by TTL.
//! - [`singleton::SingletonCoordinator`]: the same lease model keyed by a
//!   closed set of whole-repository operations (build, lint, test,
//!   typecheck, install, deploy), plus a [`singleton::classify`] heuristic
//!   that infers the operation kind from a free-text prompt.
//! - [`conflict::analyze_wave`]: static pre-dispatch analysis deciding
//!   whether a wave's members can safely run in parallel, combining
//!   predicted-file overlap with singleton collisions.
//!
//! Construct one manager per process over a shared store directory and pass
//! it by handle to every caller; there are no ambient globals. `acquire`
//! never blocks: a denial is a normal return value and retry policy stays
//! with the orchestrator.

pub mod conflict;
pub mod error;
pub mod graph;
pub mod locks;
pub mod owner;
pub mod paths;
pub mod singleton;
pub mod store;

mod sweep;

pub use conflict::{ConflictKind, NodeConflict, WaveConflictAnalysis, analyze_wave, find_all_conflicts};
pub use error::{Result, ShoalError};
pub use graph::{NodeId, Subtask, SubtaskMap, TaskGraph, TaskNode};
pub use locks::{FileLock, FileLockConfig, FileLockManager, LockContention, LockDecision, LockMode};
pub use singleton::{
    SingletonConfig, SingletonCoordinator, SingletonDecision, SingletonKind, SingletonLease,
    classify,
};
pub use store::{FsLeaseStore, LeaseStore, MemoryLeaseStore};

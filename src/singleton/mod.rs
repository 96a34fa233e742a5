//! Singleton task coordination for shoal.
//!
//! Some operations touch whole-repository state (lockfiles, build caches,
//! deployment targets) and must never run twice concurrently, no matter
//! which files the competing tasks predicted. This module provides
//! lease-based exclusion keyed by a closed set of operation kinds (build,
//! lint, test, typecheck, install, deploy) plus a heuristic classifier that
//! infers the kind from a free-text task prompt.
//!
//! The lease model mirrors [`crate::locks`]: TTL expiry, lazy and swept
//! reclamation, and one durable record per kind in a separate storage
//! namespace. The default TTL is longer because these operations run long.
//! There is no Read/Write distinction; a singleton lease is always
//! exclusive.

mod classify;
mod manager;
mod types;

#[cfg(test)]
mod tests;

pub use classify::classify;
pub use manager::SingletonCoordinator;
pub use types::{SingletonConfig, SingletonDecision, SingletonKind, SingletonLease};

//! File lock manager for shoal.
//!
//! This module implements lease-based mutual exclusion over arbitrary
//! resource paths so parallel agents, independent OS processes sharing only
//! a filesystem, never write the same file concurrently:
//! - At most one Write lease per path; Read leases may coexist with each
//!   other but never with a Write lease.
//! - Every lease carries a TTL. A holder that crashes without releasing is
//!   reclaimed lazily on the next read and actively by a background sweep.
//! - Every grant/release is mirrored to one durable record per path, so a
//!   restarted process rediscovers leases held by still-running peers.
//!
//! # Lease Records
//!
//! Records are JSON files in the manager's store directory, named by a
//! filesystem-safe encoding of the normalized path. Each record holds
//! `{path, owner, acquired_at, ttl_ms, mode}`.
//!
//! # Contention
//!
//! `acquire` never blocks and a denial is a normal return value carrying the
//! current owner and estimated time-to-expiry; retry and backoff policy stays
//! with the orchestrator.

mod manager;
mod types;


pub use manager::FileLockManager;
pub use types::{FileLock, FileLockConfig, LockContention, LockDecision, LockMode};

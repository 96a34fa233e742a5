//! Lock lease records, decisions, and configuration.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Access mode for a file lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockMode {
    /// Shared access; compatible with other Read leases.
    Read,
    /// Exclusive access; compatible with nothing.
    Write,
}

impl std::fmt::Display for LockMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockMode::Read => write!(f, "read"),
            LockMode::Write => write!(f, "write"),
        }
    }
}

/// A file lease held by an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileLock {
    /// Normalized path being leased.
    pub path: String,

    /// Opaque id of the holder (agent or task id).
    pub owner: String,

    /// When the lease was acquired (RFC3339).
    pub acquired_at: DateTime<Utc>,

    /// Lease lifetime in milliseconds.
    pub ttl_ms: u64,

    /// Access mode.
    pub mode: LockMode,
}

impl FileLock {
    /// When this lease expires.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.acquired_at + ChronoDuration::milliseconds(self.ttl_ms as i64)
    }

    /// Whether the lease has outlived its TTL.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at()
    }

    /// Estimated time until expiry; zero once expired.
    pub fn remaining(&self) -> Duration {
        (self.expires_at() - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

/// Outcome of a lease acquisition attempt.
///
/// A denial is expected contention, not a failure; callers branch on it to
/// wait, fail, or reschedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockDecision {
    /// The lease was granted.
    Granted,
    /// Another agent holds a conflicting lease.
    Denied {
        /// Current lease holder.
        owner: String,
        /// Estimated time until the holder's lease expires.
        remaining: Duration,
        /// Human-readable denial reason.
        reason: String,
    },
}

impl LockDecision {
    /// Whether the lease was granted.
    pub fn is_granted(&self) -> bool {
        matches!(self, LockDecision::Granted)
    }
}

/// A held lease that would block a batch of planned accesses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockContention {
    /// Normalized path of the contended resource.
    pub path: String,
    /// Current lease holder.
    pub owner: String,
    /// Estimated time until the holder's lease expires.
    pub remaining: Duration,
}

/// Configuration for [`super::FileLockManager`].
#[derive(Debug, Clone)]
pub struct FileLockConfig {
    /// Directory holding durable lease records.
    pub store_dir: PathBuf,

    /// TTL applied when `acquire` is called without one. Default: 5 minutes.
    pub default_ttl: Duration,

    /// How often the background sweep reclaims expired leases.
    /// Default: 30 seconds.
    pub sweep_interval: Duration,

    /// Whether to run the background sweep at all. Default: true.
    pub auto_sweep: bool,
}

impl FileLockConfig {
    /// Configuration with defaults, storing records under `store_dir`.
    pub fn new(store_dir: impl Into<PathBuf>) -> Self {
        Self {
            store_dir: store_dir.into(),
            default_ttl: Duration::from_secs(5 * 60),
            sweep_interval: Duration::from_secs(30),
            auto_sweep: true,
        }
    }
}

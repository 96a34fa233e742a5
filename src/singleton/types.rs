//! Singleton lease records, decisions, and configuration.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Operations that must run alone across all parallel agents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SingletonKind {
    /// Compile or bundle the project.
    Build,
    /// Run the linter over the codebase.
    Lint,
    /// Run the test suite.
    Test,
    /// Run the type checker.
    Typecheck,
    /// Install or update dependencies.
    Install,
    /// Deploy the project.
    Deploy,
}

impl SingletonKind {
    /// Stable lowercase name, used as the durable storage key.
    pub fn as_str(&self) -> &'static str {
        match self {
            SingletonKind::Build => "build",
            SingletonKind::Lint => "lint",
            SingletonKind::Test => "test",
            SingletonKind::Typecheck => "typecheck",
            SingletonKind::Install => "install",
            SingletonKind::Deploy => "deploy",
        }
    }
}

impl std::fmt::Display for SingletonKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An exclusive lease on a singleton operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingletonLease {
    /// Operation kind; at most one lease per kind.
    pub kind: SingletonKind,

    /// Opaque id of the holder (agent or task id).
    pub owner: String,

    /// When the lease was acquired (RFC3339).
    pub acquired_at: DateTime<Utc>,

    /// Lease lifetime in milliseconds.
    pub ttl_ms: u64,

    /// What the holder is doing, for denial messages and inspection.
    pub description: String,
}

impl SingletonLease {
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

/// Outcome of a singleton acquisition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingletonDecision {
    /// The lease was granted.
    Granted,
    /// Another agent is already running this operation.
    Denied {
        /// Current lease holder.
        owner: String,
        /// Description of the running operation.
        running: String,
        /// Estimated time until the holder's lease expires.
        remaining: Duration,
        /// Human-readable denial reason.
        reason: String,
    },
}

impl SingletonDecision {
    /// Whether the lease was granted.
    pub fn is_granted(&self) -> bool {
        matches!(self, SingletonDecision::Granted)
    }
}

/// Configuration for [`super::SingletonCoordinator`].
#[derive(Debug, Clone)]
pub struct SingletonConfig {
    /// Directory holding durable lease records. Must be distinct from the
    /// file lock manager's directory.
    pub store_dir: PathBuf,

    /// TTL applied when `acquire` is called without one. Longer than the
    /// file-lock default because singleton operations run long.
    /// Default: 10 minutes.
    pub default_ttl: Duration,

    /// How often the background sweep reclaims expired leases.
    /// Default: 30 seconds.
    pub sweep_interval: Duration,

    /// Whether to run the background sweep at all. Default: true.
    pub auto_sweep: bool,
}

impl SingletonConfig {
    /// Configuration with defaults, storing records under `store_dir`.
    pub fn new(store_dir: impl Into<PathBuf>) -> Self {
        Self {
            store_dir: store_dir.into(),
            default_ttl: Duration::from_secs(10 * 60),
            sweep_interval: Duration::from_secs(30),
            auto_sweep: true,
        }
    }
}

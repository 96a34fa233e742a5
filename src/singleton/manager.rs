//! Singleton lease acquisition, release, and expiry sweeping.

use super::types::{SingletonConfig, SingletonDecision, SingletonKind, SingletonLease};
use crate::error::{Result, ShoalError};
use crate::store::{FsLeaseStore, LeaseStore};
use crate::sweep::{self, SweeperHandle};
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Ensures each singleton operation runs at most once across parallel
/// agents.
///
/// Structurally a sibling of [`crate::locks::FileLockManager`], but keyed by
/// the closed [`SingletonKind`] enumeration: the key space is small, the
/// default TTL is longer, and denials carry the running task's description.
pub struct SingletonCoordinator {
    inner: Arc<SingletonState>,
    _sweeper: Option<SweeperHandle>,
}

struct SingletonState {
    leases: Mutex<BTreeMap<SingletonKind, SingletonLease>>,
    store: Box<dyn LeaseStore>,
    default_ttl: Duration,
}

impl SingletonCoordinator {
    /// Create a coordinator persisting leases under `config.store_dir`.
    ///
    /// Non-expired records reload so operations started by still-running
    /// peers survive a restart; expired or unparseable records are deleted
    /// on sight.
    pub fn new(config: SingletonConfig) -> Result<Self> {
        let store = FsLeaseStore::open(&config.store_dir)?;
        Self::with_store(Box::new(store), config)
    }

    /// Create a coordinator over an arbitrary [`LeaseStore`].
    pub fn with_store(store: Box<dyn LeaseStore>, config: SingletonConfig) -> Result<Self> {
        let inner = Arc::new(SingletonState {
            leases: Mutex::new(BTreeMap::new()),
            store,
            default_ttl: config.default_ttl,
        });

        inner.load()?;

        let sweeper = if config.auto_sweep {
            let target = Arc::downgrade(&inner);
            Some(sweep::spawn(config.sweep_interval, move || {
                sweep_target(&target)
            }))
        } else {
            None
        };

        Ok(Self {
            inner,
            _sweeper: sweeper,
        })
    }

    /// Attempt to acquire the exclusive lease for `kind`.
    ///
    /// `description` records what the holder is doing and is echoed back to
    /// denied competitors. `ttl` of `None` applies the configured default.
    /// Never blocks.
    pub fn acquire(
        &self,
        kind: SingletonKind,
        owner: &str,
        description: &str,
        ttl: Option<Duration>,
    ) -> Result<SingletonDecision> {
        let mut leases = self.inner.leases.lock();

        if let Some(existing) = leases.get(&kind)
            && !existing.is_expired()
        {
            return Ok(SingletonDecision::Denied {
                owner: existing.owner.clone(),
                running: existing.description.clone(),
                remaining: existing.remaining(),
                reason: format!("{} is already running (owner: {})", kind, existing.owner),
            });
        }

        let lease = SingletonLease {
            kind,
            owner: owner.to_string(),
            acquired_at: Utc::now(),
            ttl_ms: ttl.unwrap_or(self.inner.default_ttl).as_millis() as u64,
            description: description.to_string(),
        };

        self.inner.store.put(kind.as_str(), &to_json(&lease)?)?;
        leases.insert(kind, lease);

        Ok(SingletonDecision::Granted)
    }

    /// Release the lease for `kind`.
    ///
    /// Returns `Ok(true)` only when `owner` is the recorded holder of a
    /// tracked (possibly already-expired) lease.
    pub fn release(&self, kind: SingletonKind, owner: &str) -> Result<bool> {
        let mut leases = self.inner.leases.lock();

        match leases.get(&kind) {
            None => Ok(false),
            Some(lease) if lease.owner != owner => Ok(false),
            Some(_) => {
                leases.remove(&kind);
                self.inner.store.delete(kind.as_str())?;
                Ok(true)
            }
        }
    }

    /// Whether a non-expired lease exists for `kind`.
    pub fn is_running(&self, kind: SingletonKind) -> bool {
        let leases = self.inner.leases.lock();
        leases.get(&kind).is_some_and(|lease| !lease.is_expired())
    }

    /// The holder of the non-expired lease for `kind`, if any.
    pub fn owner_of(&self, kind: SingletonKind) -> Option<String> {
        let leases = self.inner.leases.lock();

        leases
            .get(&kind)
            .filter(|lease| !lease.is_expired())
            .map(|lease| lease.owner.clone())
    }

    /// Snapshot of all non-expired singleton leases, ordered by kind.
    pub fn active_tasks(&self) -> Vec<SingletonLease> {
        let leases = self.inner.leases.lock();

        leases
            .values()
            .filter(|lease| !lease.is_expired())
            .cloned()
            .collect()
    }

    /// Release every lease held by `owner`, returning how many were
    /// released. Used when an agent exits or is killed.
    pub fn release_all(&self, owner: &str) -> usize {
        let mut leases = self.inner.leases.lock();

        let held: Vec<SingletonKind> = leases
            .iter()
            .filter(|(_, lease)| lease.owner == owner)
            .map(|(kind, _)| *kind)
            .collect();

        for kind in &held {
            leases.remove(kind);
            if let Err(e) = self.inner.store.delete(kind.as_str()) {
                warn!(kind = %kind, error = %e, "failed to delete singleton record during release_all");
            }
        }

        held.len()
    }

    /// Delete every expired lease and its durable record, returning how many
    /// were reclaimed. Called by the background sweep on a fixed interval.
    pub fn sweep_expired(&self) -> usize {
        self.inner.sweep_expired()
    }
}

impl SingletonState {
    fn load(&self) -> Result<()> {
        let mut leases = self.leases.lock();

        for (key, value) in self.store.list_all()? {
            let lease: SingletonLease = match serde_json::from_str(&value) {
                Ok(lease) => lease,
                Err(e) => {
                    // One bad record must not block recovery of the rest.
                    warn!(kind = %key, error = %e, "discarding unparseable singleton record");
                    if let Err(e) = self.store.delete(&key) {
                        warn!(kind = %key, error = %e, "failed to delete corrupt singleton record");
                    }
                    continue;
                }
            };

            if lease.is_expired() {
                debug!(kind = %key, owner = %lease.owner, "dropping expired singleton record at load");
                self.store.delete(&key)?;
                continue;
            }

            leases.insert(lease.kind, lease);
        }

        Ok(())
    }

    fn sweep_expired(&self) -> usize {
        let mut leases = self.leases.lock();

        let expired: Vec<SingletonKind> = leases
            .iter()
            .filter(|(_, lease)| lease.is_expired())
            .map(|(kind, _)| *kind)
            .collect();

        for kind in &expired {
            leases.remove(kind);
            if let Err(e) = self.store.delete(kind.as_str()) {
                warn!(kind = %kind, error = %e, "failed to delete expired singleton record");
            }
        }

        if !expired.is_empty() {
            info!(count = expired.len(), "reclaimed expired singleton leases");
        }

        expired.len()
    }
}

/// Sweep callback target; returns false once the coordinator is gone.
fn sweep_target(target: &Weak<SingletonState>) -> bool {
    match target.upgrade() {
        Some(state) => {
            state.sweep_expired();
            true
        }
        None => false,
    }
}

fn to_json(lease: &SingletonLease) -> Result<String> {
    serde_json::to_string_pretty(lease)
        .map_err(|e| ShoalError::Serialize(format!("failed to serialize singleton record: {}", e)))
}

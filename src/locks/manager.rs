//! Lease acquisition, release, and expiry sweeping.

use super::types::{FileLock, FileLockConfig, LockContention, LockDecision, LockMode};
use crate::error::{Result, ShoalError};
use crate::paths;
use crate::store::{FsLeaseStore, LeaseStore};
use crate::sweep::{self, SweeperHandle};
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Coordinates file access across parallel agents.
///
/// One instance per process; construct it over the shared store directory
/// and pass it by handle to every caller. All state mutations serialize on
/// an internal mutex. Cross-process agreement relies on the shared durable
/// store; the narrow check-then-write race between two processes racing for
/// the same lease is an accepted limitation at the target scale.
pub struct FileLockManager {
    inner: Arc<LockState>,
    _sweeper: Option<SweeperHandle>,
}

struct LockState {
    leases: Mutex<HashMap<String, FileLock>>,
    store: Box<dyn LeaseStore>,
    default_ttl: Duration,
}

impl FileLockManager {
    /// Create a manager persisting leases under `config.store_dir`.
    ///
    /// Non-expired records found in the store are reloaded so leases held by
    /// still-running peers survive a restart; expired or unparseable records
    /// are deleted on sight.
    pub fn new(config: FileLockConfig) -> Result<Self> {
        let store = FsLeaseStore::open(&config.store_dir)?;
        Self::with_store(Box::new(store), config)
    }

    /// Create a manager over an arbitrary [`LeaseStore`].
    pub fn with_store(store: Box<dyn LeaseStore>, config: FileLockConfig) -> Result<Self> {
        let inner = Arc::new(LockState {
            leases: Mutex::new(HashMap::new()),
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

    /// Attempt to acquire a lease on `path`.
    ///
    /// Granted when no non-expired lease exists, or when the existing lease
    /// and the request are both Read. `ttl` of `None` applies the configured
    /// default. Never blocks.
    pub fn acquire(
        &self,
        path: &str,
        owner: &str,
        mode: LockMode,
        ttl: Option<Duration>,
    ) -> Result<LockDecision> {
        let key = paths::normalize(path);
        let mut leases = self.inner.leases.lock();

        if let Some(existing) = leases.get(&key)
            && !existing.is_expired()
        {
            // Multiple readers may share a lease; one durable record per
            // path, so the extra readers are not recorded.
            if mode == LockMode::Read && existing.mode == LockMode::Read {
                return Ok(LockDecision::Granted);
            }

            return Ok(LockDecision::Denied {
                owner: existing.owner.clone(),
                remaining: existing.remaining(),
                reason: format!("{} locked by {} for {}", key, existing.owner, existing.mode),
            });
        }

        let lock = FileLock {
            path: key.clone(),
            owner: owner.to_string(),
            acquired_at: Utc::now(),
            ttl_ms: ttl.unwrap_or(self.inner.default_ttl).as_millis() as u64,
            mode,
        };

        self.inner.store.put(&key, &to_json(&lock)?)?;
        leases.insert(key, lock);

        Ok(LockDecision::Granted)
    }

    /// Release the lease on `path`.
    ///
    /// Returns `Ok(true)` only when `owner` is the recorded holder of a
    /// tracked (possibly already-expired) lease. `Ok(false)` means no such
    /// lease or not the owner; one agent must never release another's lease.
    pub fn release(&self, path: &str, owner: &str) -> Result<bool> {
        let key = paths::normalize(path);
        let mut leases = self.inner.leases.lock();

        match leases.get(&key) {
            None => Ok(false),
            Some(lock) if lock.owner != owner => Ok(false),
            Some(_) => {
                leases.remove(&key);
                self.inner.store.delete(&key)?;
                Ok(true)
            }
        }
    }

    /// Whether a non-expired lease exists on `path`.
    pub fn is_locked(&self, path: &str) -> bool {
        let key = paths::normalize(path);
        let leases = self.inner.leases.lock();

        leases.get(&key).is_some_and(|lock| !lock.is_expired())
    }

    /// The holder of the non-expired lease on `path`, if any.
    pub fn lock_owner(&self, path: &str) -> Option<String> {
        let key = paths::normalize(path);
        let leases = self.inner.leases.lock();

        leases
            .get(&key)
            .filter(|lock| !lock.is_expired())
            .map(|lock| lock.owner.clone())
    }

    /// Side-effect-free pre-flight over a batch of paths.
    ///
    /// A held lease conflicts when either the planned access or the lease is
    /// Write. Read over Read is compatible and not reported.
    pub fn check_conflicts(&self, planned: &[&str], mode: LockMode) -> Vec<LockContention> {
        let leases = self.inner.leases.lock();
        let mut contentions = Vec::new();

        for path in planned {
            let key = paths::normalize(path);

            if let Some(lock) = leases.get(&key)
                && !lock.is_expired()
                && (mode == LockMode::Write || lock.mode == LockMode::Write)
            {
                contentions.push(LockContention {
                    path: key,
                    owner: lock.owner.clone(),
                    remaining: lock.remaining(),
                });
            }
        }

        contentions
    }

    /// Release every lease held by `owner`, returning how many were
    /// released. Used when an agent exits or is killed.
    pub fn release_all(&self, owner: &str) -> usize {
        let mut leases = self.inner.leases.lock();

        let held: Vec<String> = leases
            .iter()
            .filter(|(_, lock)| lock.owner == owner)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &held {
            leases.remove(key);
            if let Err(e) = self.inner.store.delete(key) {
                warn!(path = %key, error = %e, "failed to delete lease record during release_all");
            }
        }

        held.len()
    }

    /// Snapshot of all non-expired leases.
    pub fn active_locks(&self) -> Vec<FileLock> {
        let leases = self.inner.leases.lock();

        let mut active: Vec<FileLock> = leases
            .values()
            .filter(|lock| !lock.is_expired())
            .cloned()
            .collect();

        active.sort_by(|a, b| a.path.cmp(&b.path));
        active
    }

    /// Delete every expired lease and its durable record, returning how many
    /// were reclaimed. Called by the background sweep on a fixed interval.
    pub fn sweep_expired(&self) -> usize {
        self.inner.sweep_expired()
    }
}

impl LockState {
    fn load(&self) -> Result<()> {
        let mut leases = self.leases.lock();

        for (key, value) in self.store.list_all()? {
            let lock: FileLock = match serde_json::from_str(&value) {
                Ok(lock) => lock,
                Err(e) => {
                    // One bad record must not block recovery of the rest.
                    warn!(path = %key, error = %e, "discarding unparseable lease record");
                    if let Err(e) = self.store.delete(&key) {
                        warn!(path = %key, error = %e, "failed to delete corrupt lease record");
                    }
                    continue;
                }
            };

            if lock.is_expired() {
                debug!(path = %key, owner = %lock.owner, "dropping expired lease record at load");
                self.store.delete(&key)?;
                continue;
            }

            leases.insert(paths::normalize(&lock.path), lock);
        }

        Ok(())
    }

    fn sweep_expired(&self) -> usize {
        let mut leases = self.leases.lock();

        let expired: Vec<String> = leases
            .iter()
            .filter(|(_, lock)| lock.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            leases.remove(key);
            if let Err(e) = self.store.delete(key) {
                warn!(path = %key, error = %e, "failed to delete expired lease record");
            }
        }

        if !expired.is_empty() {
            info!(count = expired.len(), "reclaimed expired file leases");
        }

        expired.len()
    }
}

/// Sweep callback target; returns false once the manager is gone.
fn sweep_target(target: &Weak<LockState>) -> bool {
    match target.upgrade() {
        Some(state) => {
            state.sweep_expired();
            true
        }
        None => false,
    }
}

fn to_json(lock: &FileLock) -> Result<String> {
    serde_json::to_string_pretty(lock)
        .map_err(|e| ShoalError::Serialize(format!("failed to serialize lease record: {}", e)))
}

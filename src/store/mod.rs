//! Durable lease storage.
//!
//! Both lease managers mirror their in-memory state to a durable store so a
//! restarted process can rediscover leases held by still-running peers. The
//! store is a deliberately small key/value interface so the backing medium
//! (one file per lease, or an in-memory map for tests) can be swapped
//! without touching lock semantics.
//!
//! # Keys and Values
//!
//! Keys are logical lease keys: a normalized file path for file locks, or a
//! literal kind name (`build`, `test`, ...) for singleton leases. Values are
//! serialized lease records; the store treats them as opaque strings. Each
//! key maps to at most one record at a time.

mod fs;
mod memory;

#[cfg(test)]
mod tests;

pub use fs::FsLeaseStore;
pub use memory::MemoryLeaseStore;

use crate::error::Result;

/// Durable key/value storage for lease records.
pub trait LeaseStore: Send + Sync {
    /// Fetch the record stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any existing record.
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the record stored under `key`. Deleting a missing key is not
    /// an error.
    fn delete(&self, key: &str) -> Result<()>;

    /// List every stored `(key, value)` pair.
    fn list_all(&self) -> Result<Vec<(String, String)>>;
}

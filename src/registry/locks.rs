//! Per-key async locks.

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A table of lazily created mutexes, one per key.
///
/// Holders of the same key run one at a time; different keys never block
/// each other.
#[derive(Debug)]
pub struct KeyedLocks<K: Eq + Hash> {
    inner: Arc<DashMap<K, Arc<Mutex<()>>>>,
}

impl<K: Eq + Hash> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// The mutex guarding `key`, created on first use.
    pub fn lock_for(&self, key: K) -> Arc<Mutex<()>> {
        self.inner
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }

    /// Number of keys that have been locked at least once.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<K: Eq + Hash> Clone for KeyedLocks<K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K: Eq + Hash> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

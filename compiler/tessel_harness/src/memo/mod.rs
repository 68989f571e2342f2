//! Single-flight memoization cache.
//!
//! Each key maps to an `Arc<OnceLock<V>>`. The map shard is only locked long
//! enough to fetch or insert the cell; the computation itself runs on the
//! cell, so callers asking for other keys never wait on it and callers asking
//! for the same key block until the winner stores its value.
//!
//! `compute` must not ask the same memo for its own key.

use std::hash::Hash;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;

/// Keyed cache whose entries are computed at most once per process.
///
/// Entries are never evicted.
pub struct Memo<K, V> {
    cells: DashMap<K, Arc<OnceLock<V>>, FxBuildHasher>,
}

impl<K, V> Default for Memo<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Memo {
            cells: DashMap::with_hasher(FxBuildHasher),
        }
    }
}

impl<K, V> Memo<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, computing it on first access.
    pub fn get_or_compute(&self, key: &K, compute: impl FnOnce() -> V) -> V {
        self.cell(key).get_or_init(compute).clone()
    }

    /// The cached value, if some caller already finished computing it.
    pub fn get(&self, key: &K) -> Option<V> {
        self.cells.get(key).and_then(|cell| cell.value().get().cloned())
    }

    /// Number of keys seen, including ones still being computed.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn cell(&self, key: &K) -> Arc<OnceLock<V>> {
        if let Some(cell) = self.cells.get(key) {
            return Arc::clone(&cell);
        }
        Arc::clone(&self.cells.entry(key.clone()).or_default())
    }
}

#[cfg(test)]
mod tests;

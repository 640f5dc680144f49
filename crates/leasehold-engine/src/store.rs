//! # Keyed In-Memory Store
//!
//! Thread-safe, cloneable map used for the catalog records that are not
//! partitioned per flat (towers, amenities, users).

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

/// Thread-safe, cloneable in-memory key-value store ordered by key.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not
/// `tokio::sync`) and no lock is held across `.await` points.
/// `parking_lot::RwLock` is non-poisonable: a panicking writer does not
/// permanently corrupt the store.
#[derive(Debug)]
pub struct Store<K: Ord + Copy, V: Clone> {
    data: Arc<RwLock<BTreeMap<K, V>>>,
}

impl<K: Ord + Copy, V: Clone> Clone for Store<K, V> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<K: Ord + Copy, V: Clone> Store<K, V> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: K, value: V) -> Option<V> {
        self.data.write().insert(id, value)
    }

    /// Insert a record after `check` has seen every existing record, all
    /// under one write lock. Nothing is inserted when `check` fails.
    pub fn insert_checked<E>(
        &self,
        id: K,
        value: V,
        check: impl FnOnce(&V, &BTreeMap<K, V>) -> Result<(), E>,
    ) -> Result<V, E> {
        let mut guard = self.data.write();
        check(&value, &guard)?;
        guard.insert(id, value.clone());
        Ok(value)
    }

    /// Retrieve a record by key.
    pub fn get(&self, id: &K) -> Option<V> {
        self.data.read().get(id).cloned()
    }

    /// All records in key order.
    pub fn list(&self) -> Vec<V> {
        self.data.read().values().cloned().collect()
    }

    /// Records matching `pred`, in key order.
    pub fn filter(&self, pred: impl Fn(&V) -> bool) -> Vec<V> {
        self.data.read().values().filter(|v| pred(v)).cloned().collect()
    }

    /// Atomically read-validate-update a record.
    ///
    /// The closure receives a `&mut V` and the rest of the map is not
    /// visible. It runs under a single write lock, so there is no window
    /// between the read and the update.
    ///
    /// Returns `None` if the record doesn't exist.
    pub fn try_update<R, E>(
        &self,
        id: &K,
        f: impl FnOnce(&mut V) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(id).map(f)
    }

    /// Apply `f` to every record under one write lock.
    pub fn update_all(&self, mut f: impl FnMut(&mut V)) {
        for value in self.data.write().values_mut() {
            f(value);
        }
    }

    /// Remove a record by key.
    pub fn remove(&self, id: &K) -> Option<V> {
        self.data.write().remove(id)
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &K) -> bool {
        self.data.read().contains_key(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Ord + Copy, V: Clone> Default for Store<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

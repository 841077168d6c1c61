//! Per-key async mutexes.
//!
//! The file store has no transactional read-modify-write, so writers to the
//! same key take turns here. Entries are dropped from the table as soon as
//! nobody holds or waits on them.

use std::{collections::HashMap, hash::Hash, sync::Arc};

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

pub struct KeyedLocks<K> {
    table: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

pub struct KeyGuard<'a, K: Eq + Hash + Clone> {
    owner: &'a KeyedLocks<K>,
    key: K,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(HashMap::new()),
        }
    }

    pub async fn lock(&self, key: &K) -> KeyGuard<'_, K> {
        let slot = {
            let mut table = self.table.lock();
            // A waiter cancelled after the last release leaves an entry nobody removes.
            table.retain(|_, slot| Arc::strong_count(slot) > 1);
            Arc::clone(table.entry(key.clone()).or_default())
        };
        let guard = slot.lock_owned().await;
        KeyGuard {
            owner: self,
            key: key.clone(),
            guard: Some(guard),
        }
    }

    /// Number of keys currently locked or awaited.
    pub fn active(&self) -> usize {
        self.table.lock().len()
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> Drop for KeyGuard<'_, K> {
    fn drop(&mut self) {
        // Release first, then check whether the table's copy is the last one.
        drop(self.guard.take());
        let mut table = self.owner.table.lock();
        let idle = table
            .get(&self.key)
            .is_some_and(|slot| Arc::strong_count(slot) == 1);
        if idle {
            table.remove(&self.key);
        }
    }
}

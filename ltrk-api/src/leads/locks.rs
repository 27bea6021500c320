//! Per-dedup-key serialization
//!
//! Concurrent ingestions for the same key could both observe the same chain
//! before either inserts, producing two owned rows or a duplicated tier. The
//! read-decide-insert sequence therefore runs under an async mutex scoped to
//! the policy's lock key. The partial unique index in storage remains the
//! backstop for writers outside this process.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Map of lock key -> mutex. Entries are created on first use and never shed;
/// cardinality is bounded by the number of distinct leads.
pub struct KeyLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the mutex for `key`, waiting if another task holds it.
    /// The guard releases on drop.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

impl Default for KeyLocks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn same_key_serializes() {
        let locks = Arc::new(KeyLocks::new());
        let in_flight = Arc::new(AtomicUsize::new(0));
        let overlap_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let in_flight = in_flight.clone();
            let overlap_seen = overlap_seen.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire("08123|p1").await;
                if in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
                    overlap_seen.fetch_add(1, Ordering::SeqCst);
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(overlap_seen.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn different_keys_do_not_block_each_other() {
        let locks = KeyLocks::new();
        let guard_a = locks.acquire("08123|p1").await;
        // Acquiring a different key must not deadlock while `guard_a` is held
        let guard_b = locks.acquire("08999|p1").await;
        drop(guard_a);
        drop(guard_b);
    }
}

use std::sync::Arc;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// A per-`_id` mutex table: lazily creates a fair FIFO mutex for each key and
/// hands out a scoped guard. Entries live in `entries` for the process
/// lifetime -- cheap and bounded by the hot working set of `_id`s.
///
/// `acquire` on distinct keys never blocks each other; `acquire` on the same
/// key serialises callers in arrival order, because `tokio::sync::Mutex`
/// queues waiters FIFO.
pub struct KeyLock {
    entries: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyLock {
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }

    /// Acquires the mutex for `id`, waiting for any current holder to
    /// release. The returned guard releases the lock when dropped.
    pub async fn acquire(&self, id: &str) -> OwnedMutexGuard<()> {
        let mutex = self
            .entries
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }
}

impl Default for KeyLock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn distinct_keys_run_concurrently() {
        let lock = Arc::new(KeyLock::new());
        let a = lock.acquire("a").await;
        let b = lock.acquire("b").await;
        drop(a);
        drop(b);
    }

    #[tokio::test]
    async fn same_key_serialises_waiters() {
        let lock = Arc::new(KeyLock::new());
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let guard = lock.acquire("x").await;

        let lock2 = lock.clone();
        let order2 = order.clone();
        let waiter = tokio::spawn(async move {
            let _g = lock2.acquire("x").await;
            order2.lock().unwrap().push(2);
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        order.lock().unwrap().push(1);
        drop(guard);

        waiter.await.unwrap();
        assert_eq!(*order.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn many_concurrent_ids_do_not_serialise() {
        let lock = Arc::new(KeyLock::new());
        let counter = Arc::new(AtomicU32::new(0));
        let mut handles = Vec::new();
        for i in 0..50 {
            let lock = lock.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                let _g = lock.acquire(&format!("id-{i}")).await;
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 50);
    }
}

//! Shared Cache Module
//!
//! Thread-safe handle over an [`LruCache`] for use across async tasks.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::cache::{CacheStats, LruCache};
use crate::error::Result;

// == Shared LRU Cache ==
/// Cloneable handle to a single [`LruCache`] guarded by a mutex.
///
/// Each method holds the lock for exactly one cache operation, so the
/// value map and the recency list are never observed half-updated.
/// Values are cloned out; the lock is never held across an `.await`
/// outside this type.
#[derive(Debug)]
pub struct SharedLruCache<K, V> {
    inner: Arc<Mutex<LruCache<K, V>>>,
}

impl<K, V> Clone for SharedLruCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> SharedLruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(Mutex::new(LruCache::new(capacity)?)),
        })
    }

    // == Get ==
    /// Returns a clone of the cached value and promotes the key.
    pub async fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().await.get(key).cloned()
    }

    // == Put ==
    /// Inserts or replaces a value, returning the evicted entry if any.
    pub async fn put(&self, key: K, value: V) -> Option<(K, V)> {
        self.inner.lock().await.put(key, value)
    }

    // == Update ==
    /// Applies `f` to the cached value in place when the key is present.
    ///
    /// The read and the write happen under one lock acquisition. The key is
    /// promoted. Returns whether an entry was updated.
    pub async fn update<Q, F>(&self, key: &Q, f: F) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce(&V) -> V,
    {
        let mut cache = self.inner.lock().await;
        let updated = match cache.peek(key) {
            Some(current) => f(current),
            None => return false,
        };
        cache.put(key.to_owned(), updated);
        true
    }

    // == Remove ==
    pub async fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().await.remove(key)
    }

    // == Length ==
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        self.inner.lock().await.stats()
    }

    pub async fn capacity(&self) -> usize {
        self.inner.lock().await.capacity()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_shared_zero_capacity_rejected() {
        let result = SharedLruCache::<String, String>::new(0);
        assert!(matches!(result, Err(AppError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_shared_clones_see_same_entries() {
        let cache = SharedLruCache::<String, u32>::new(4).unwrap();
        let other = cache.clone();

        cache.put("a".to_string(), 1).await;

        assert_eq!(other.get("a").await, Some(1));
        assert_eq!(other.len().await, 1);
    }

    #[tokio::test]
    async fn test_shared_update_present_and_absent() {
        let cache = SharedLruCache::<String, u32>::new(2).unwrap();
        cache.put("a".to_string(), 1).await;

        assert!(cache.update("a", |v| v + 10).await);
        assert!(!cache.update("missing", |v| v + 10).await);

        assert_eq!(cache.get("a").await, Some(11));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_shared_update_promotes() {
        let cache = SharedLruCache::<String, u32>::new(2).unwrap();
        cache.put("a".to_string(), 1).await;
        cache.put("b".to_string(), 2).await;

        cache.update("a", |v| *v).await;
        let evicted = cache.put("c".to_string(), 3).await;

        assert_eq!(evicted, Some(("b".to_string(), 2)));
    }

    #[tokio::test]
    async fn test_shared_concurrent_puts_respect_capacity() {
        let cache = SharedLruCache::<u32, u32>::new(16).unwrap();

        let mut handles = Vec::new();
        for task in 0..8u32 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..100u32 {
                    let key = task * 1000 + i;
                    cache.put(key, i).await;
                    cache.get(&key).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stats = cache.stats().await;
        assert_eq!(cache.len().await, 16);
        assert_eq!(stats.total_entries, 16);
        assert_eq!(stats.evictions, 800 - 16);
    }
}

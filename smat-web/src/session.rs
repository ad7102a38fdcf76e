//! Token-keyed stores for login sessions and report results
//!
//! Handlers only see the [`TokenStore`] trait. The in-memory implementation
//! keeps everything in an `Arc<RwLock<HashMap>>`; last write per token wins
//! and nothing is evicted unless a TTL is configured. With a TTL, expired
//! entries go on access or on the next [`spawn_purge_task`] sweep.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

/// Random bytes per session token
const TOKEN_BYTES: usize = 32;

/// Generate a URL-safe random session token
pub fn new_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[async_trait]
pub trait TokenStore<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, token: &str) -> Option<V>;

    /// Insert or replace the value for `token`
    async fn set(&self, token: &str, value: V);

    /// Remove and return the value for `token`
    async fn delete(&self, token: &str) -> Option<V>;

    /// Drop every expired entry; returns how many were removed
    async fn purge_expired(&self) -> usize;
}

/// Shortest sweep period accepted by [`spawn_purge_task`]
const MIN_PURGE_INTERVAL: Duration = Duration::from_millis(10);

/// Sweep `store` for expired entries every `every` until the runtime stops
pub fn spawn_purge_task<V>(
    store: Arc<dyn TokenStore<V>>,
    every: Duration,
    name: &'static str,
) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every.max(MIN_PURGE_INTERVAL));
        loop {
            ticker.tick().await;
            let removed = store.purge_expired().await;
            if removed > 0 {
                debug!(store = name, removed, "Purged expired entries");
            }
        }
    })
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// In-process store with optional time-to-live
#[derive(Debug, Clone)]
pub struct InMemoryTokenStore<V> {
    entries: Arc<RwLock<HashMap<String, Entry<V>>>>,
    ttl: Option<Duration>,
}

impl<V> Default for InMemoryTokenStore<V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl: None,
        }
    }
}

impl<V> InMemoryTokenStore<V> {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            ..Self::default()
        }
    }

    fn is_expired(&self, entry: &Entry<V>) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.stored_at.elapsed() >= ttl)
    }

    /// Number of stored entries, expired ones included until purged
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl<V> TokenStore<V> for InMemoryTokenStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, token: &str) -> Option<V> {
        {
            let entries = self.entries.read().await;
            match entries.get(token) {
                None => return None,
                Some(entry) if !self.is_expired(entry) => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        // Expired: purge on access
        let mut entries = self.entries.write().await;
        if entries.get(token).is_some_and(|e| self.is_expired(e)) {
            entries.remove(token);
            debug!("Expired token entry purged");
        }
        None
    }

    async fn set(&self, token: &str, value: V) {
        self.entries.write().await.insert(
            token.to_string(),
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    async fn delete(&self, token: &str) -> Option<V> {
        let removed = self.entries.write().await.remove(token)?;
        if self.is_expired(&removed) {
            None
        } else {
            Some(removed.value)
        }
    }

    async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry));
        before - entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique_and_url_safe() {
        let a = new_token();
        let b = new_token();
        assert_ne!(a, b);
        // 32 bytes, unpadded base64
        assert_eq!(a.len(), 43);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let store: InMemoryTokenStore<String> = InMemoryTokenStore::default();
        assert_eq!(store.get("t1").await, None);

        store.set("t1", "faiz".to_string()).await;
        assert_eq!(store.get("t1").await, Some("faiz".to_string()));

        assert_eq!(store.delete("t1").await, Some("faiz".to_string()));
        assert_eq!(store.get("t1").await, None);
        assert_eq!(store.delete("t1").await, None);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store: InMemoryTokenStore<u32> = InMemoryTokenStore::default();
        store.set("t", 1).await;
        store.set("t", 2).await;
        assert_eq!(store.get("t").await, Some(2));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_ttl_expiry_purges_on_access() {
        let store: InMemoryTokenStore<u32> = InMemoryTokenStore::new(Some(Duration::from_millis(20)));
        store.set("t", 7).await;
        assert_eq!(store.get("t").await, Some(7));

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(store.get("t").await, None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store: InMemoryTokenStore<u32> = InMemoryTokenStore::new(Some(Duration::from_millis(20)));
        store.set("a", 1).await;
        store.set("b", 2).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        store.set("c", 3).await;

        assert_eq!(store.purge_expired().await, 2);
        assert_eq!(store.get("c").await, Some(3));
    }

    #[tokio::test]
    async fn test_purge_task_sweeps_expired_entries() {
        let store: InMemoryTokenStore<u32> = InMemoryTokenStore::new(Some(Duration::from_millis(20)));
        store.set("a", 1).await;
        store.set("b", 2).await;

        let handle = spawn_purge_task(
            Arc::new(store.clone()) as Arc<dyn TokenStore<u32>>,
            Duration::from_millis(10),
            "test",
        );
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Swept without any get() touching the tokens
        assert!(store.is_empty().await);
        handle.abort();
    }

    #[tokio::test]
    async fn test_no_ttl_never_expires() {
        let store: InMemoryTokenStore<u32> = InMemoryTokenStore::new(None);
        store.set("t", 1).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(store.get("t").await, Some(1));
    }
}

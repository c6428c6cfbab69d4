use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug)]
struct CacheEntry {
    body: String,
    expires_at: Instant,
}

/// Process-local TTL cache of upstream response bodies. Keys must not embed
/// the API token so that entries survive token rotation.
#[derive(Debug, Default)]
pub struct ResponseCache {
    map: RwLock<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let guard = self.map.read().await;
        let entry = guard.get(key)?;
        if Instant::now() <= entry.expires_at {
            return Some(entry.body.clone());
        }
        None
    }

    pub async fn put(&self, key: String, body: &str, ttl: Duration) {
        let entry = CacheEntry {
            body: body.to_string(),
            expires_at: Instant::now() + ttl,
        };
        let mut guard = self.map.write().await;
        guard.insert(key, entry);
    }
}

// core/src/memory/cache.rs

use crate::error::CacheError;
use crate::ports::CartCache;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry {
  payload: String,
  expires_at: Instant,
}

/// Process-local cart cache with per-entry expiry. Expired entries read as a
/// clean miss and are evicted lazily.
#[derive(Debug, Default)]
pub struct InMemoryCartCache {
  entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryCartCache {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn contains(&self, key: &str) -> bool {
    self
      .entries
      .read()
      .get(key)
      .is_some_and(|entry| entry.expires_at > Instant::now())
  }

  pub fn len(&self) -> usize {
    let now = Instant::now();
    self.entries.read().values().filter(|e| e.expires_at > now).count()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Overwrites an entry directly, bypassing the cart codec.
  pub fn insert_raw(&self, key: &str, payload: &str, ttl: Duration) {
    self.entries.write().insert(
      key.to_string(),
      Entry {
        payload: payload.to_string(),
        expires_at: Instant::now() + ttl,
      },
    );
  }
}

#[async_trait]
impl CartCache for InMemoryCartCache {
  async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
    let now = Instant::now();
    {
      let entries = self.entries.read();
      match entries.get(key) {
        Some(entry) if entry.expires_at > now => return Ok(Some(entry.payload.clone())),
        Some(_) => {}
        None => return Ok(None),
      }
    }
    self.entries.write().remove(key);
    Ok(None)
  }

  async fn set(&self, key: &str, payload: &str, ttl: Duration) -> Result<(), CacheError> {
    self.insert_raw(key, payload, ttl);
    Ok(())
  }

  async fn delete(&self, key: &str) -> Result<(), CacheError> {
    self.entries.write().remove(key);
    Ok(())
  }
}

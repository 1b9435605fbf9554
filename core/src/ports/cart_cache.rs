// core/src/ports/cart_cache.rs

use crate::error::CacheError;
use async_trait::async_trait;
use std::time::Duration;

/// Key/value cache holding serialized cart item lists.
///
/// `get` distinguishes a clean miss (`Ok(None)`) from an unhealthy backend
/// (`Err`). Nothing stored here is authoritative.
#[async_trait]
pub trait CartCache: Send + Sync {
  async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

  async fn set(&self, key: &str, payload: &str, ttl: Duration) -> Result<(), CacheError>;

  async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

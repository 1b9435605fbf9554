// core/src/cache.rs

//! Cart cache policy: key layout, expiry, payload codec, and read tagging.
//!
//! Entries are dropped on every write to a cart's items and rebuilt by the
//! next read; nothing patches a cached list in place.

use crate::error::CartError;
use crate::models::CartItem;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

pub const CART_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const CART_KEY_PREFIX: &str = "cart:";

pub fn cart_cache_key(cart_id: Uuid) -> String {
  format!("{}{}", CART_KEY_PREFIX, cart_id)
}

pub fn encode_items(items: &[CartItem]) -> Result<String, CartError> {
  serde_json::to_string(items).map_err(|e| CartError::Internal(format!("Failed to serialize cart items: {}", e)))
}

/// A payload that does not decode is reported, never treated as a miss.
pub fn decode_items(cache_key: &str, payload: &str) -> Result<Vec<CartItem>, CartError> {
  serde_json::from_str(payload).map_err(|source| CartError::CacheCorruption {
    cache_key: cache_key.to_string(),
    source,
  })
}

/// Where a list of cart items was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSource {
  Cache,
  Store,
  /// The cache errored (not a clean miss); the store answered and the cache
  /// was left alone.
  StoreCacheUnavailable,
}

impl ItemSource {
  pub fn message(&self) -> &'static str {
    match self {
      ItemSource::Cache => "Cart items fetched from cache",
      ItemSource::Store => "Cart items fetched from store",
      ItemSource::StoreCacheUnavailable => "Cart items fetched from store (cache unavailable)",
    }
  }
}

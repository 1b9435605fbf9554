// tests/cache_fallback_tests.rs
mod common;
use common::*;
use serial_test::serial;
use std::sync::Arc;
use std::time::{Duration, Instant};
use storefront::memory::InMemoryStore;
use storefront::{CartCache, CartService, ItemSource, Principal, Role};
use storefront_server::cache::RedisCartCache;
use uuid::Uuid;

// Nothing listens on port 1.
const UNREACHABLE_REDIS: &str = "redis://127.0.0.1:1";

#[actix_web::test]
#[serial]
async fn test_unreachable_redis_does_not_block_startup() {
  setup_tracing();
  let started = Instant::now();
  let cache = RedisCartCache::connect(UNREACHABLE_REDIS, Duration::from_millis(300))
    .await
    .expect("a well-formed URL builds the cache");
  assert!(started.elapsed() < Duration::from_secs(5), "took {:?}", started.elapsed());
  assert!(!cache.is_connected());

  // Calls fail fast until the reconnect interval has passed.
  let started = Instant::now();
  assert!(cache.get("cart:any").await.is_err());
  assert!(cache.delete("cart:any").await.is_err());
  assert!(started.elapsed() < Duration::from_secs(1), "took {:?}", started.elapsed());
}

#[actix_web::test]
#[serial]
async fn test_malformed_redis_url_is_an_error() {
  setup_tracing();
  assert!(RedisCartCache::connect("not a url", Duration::from_millis(100)).await.is_err());
}

#[actix_web::test]
#[serial]
async fn test_cart_served_from_store_while_redis_is_down() {
  setup_tracing();
  let mug = product("mug", 1200, 5);
  let store = Arc::new(InMemoryStore::with_products([mug.clone()]));
  let cache = Arc::new(
    RedisCartCache::connect(UNREACHABLE_REDIS, Duration::from_millis(300))
      .await
      .expect("cache"),
  );
  let carts = CartService::new(store.clone(), store.clone(), cache);
  let user = Principal {
    user_id: Uuid::new_v4(),
    role: Role::User,
  };

  carts.add_or_update_item(user, mug.id, 2).await.unwrap();
  let listed = carts.list_items(user).await.unwrap();
  assert_eq!(listed.source, ItemSource::StoreCacheUnavailable);
  assert_eq!(listed.items.len(), 1);
  assert_eq!(listed.items[0].quantity, 2);
}

// tests/cart_service_tests.rs
mod common;
use common::*;
use serial_test::serial;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use storefront::memory::{InMemoryCartCache, InMemoryStore};
use storefront::{cart_cache_key, CartCache, CartError, CartService, CartStore, ItemSource, ItemWrite, Principal};
use uuid::Uuid;

#[tokio::test]
#[serial]
async fn test_create_cart_is_idempotent() {
  setup_tracing();
  let h = Harness::empty();
  let user = shopper();

  let first = h.carts.create_cart(user).await.unwrap();
  assert!(first.was_created());
  assert_eq!(first.cart().user_id, user.user_id);

  let second = h.carts.create_cart(user).await.unwrap();
  assert!(!second.was_created());
  assert_eq!(second.cart().id, first.cart().id);
  assert_eq!(h.store.cart_count(), 1);
}

#[tokio::test]
#[serial]
async fn test_add_item_provisions_cart_lazily() {
  setup_tracing();
  let mug = product("mug", 5);
  let h = Harness::new([mug.clone()]);
  let user = shopper();

  let written = h.carts.add_or_update_item(user, mug.id, 2).await.unwrap();
  assert!(matches!(written, ItemWrite::Created { .. }));
  assert_eq!(written.item().quantity, 2);

  let cart = h.store.cart_by_user(user.user_id).await.unwrap();
  assert_eq!(written.item().cart_id, cart.id);
}

#[tokio::test]
#[serial]
async fn test_add_over_stock_leaves_quantity_untouched() {
  setup_tracing();
  let mug = product("mug", 5);
  let h = Harness::new([mug.clone()]);
  let user = shopper();

  h.carts.add_or_update_item(user, mug.id, 3).await.unwrap();
  let err = h.carts.add_or_update_item(user, mug.id, 3).await.unwrap_err();
  match err {
    CartError::OutOfStock {
      product_id,
      requested,
      available,
    } => {
      assert_eq!(product_id, mug.id);
      assert_eq!(requested, 6);
      assert_eq!(available, 5);
    }
    other => panic!("Expected OutOfStock, got {:?}", other),
  }

  let cart = h.store.cart_by_user(user.user_id).await.unwrap();
  assert_eq!(h.store.item(cart.id, mug.id).await.unwrap().quantity, 3);
}

#[tokio::test]
#[serial]
async fn test_add_up_to_exact_stock_is_allowed() {
  setup_tracing();
  let mug = product("mug", 5);
  let h = Harness::new([mug.clone()]);
  let user = shopper();

  h.carts.add_or_update_item(user, mug.id, 3).await.unwrap();
  let written = h.carts.add_or_update_item(user, mug.id, 2).await.unwrap();
  match written {
    ItemWrite::Updated { item, previous_quantity } => {
      assert_eq!(previous_quantity, 3);
      assert_eq!(item.quantity, 5);
    }
    other => panic!("Expected Updated, got {:?}", other),
  }

  let cart = h.store.cart_by_user(user.user_id).await.unwrap();
  let items = h.store.list_items(cart.id).await.unwrap();
  assert_eq!(items.len(), 1);
  assert_eq!(items[0].quantity, 5);
}

#[tokio::test]
#[serial]
async fn test_first_add_over_stock_inserts_nothing() {
  setup_tracing();
  let lamp = product("lamp", 2);
  let h = Harness::new([lamp.clone()]);

  let err = h.carts.add_or_update_item(shopper(), lamp.id, 3).await.unwrap_err();
  assert!(matches!(err, CartError::OutOfStock { requested: 3, .. }));
  assert_eq!(h.store.live_item_count(), 0);
}

#[tokio::test]
#[serial]
async fn test_unknown_product_is_rejected() {
  setup_tracing();
  let h = Harness::empty();
  let missing = Uuid::new_v4();

  let err = h.carts.add_or_update_item(shopper(), missing, 1).await.unwrap_err();
  match err {
    CartError::ProductNotFound { product_id } => assert_eq!(product_id, missing),
    other => panic!("Expected ProductNotFound, got {:?}", other),
  }
  assert_eq!(h.store.live_item_count(), 0);
}

#[tokio::test]
#[serial]
async fn test_non_positive_quantity_rejected_before_store_access() {
  setup_tracing();
  let mug = product("mug", 5);
  let h = Harness::new([mug.clone()]);

  for quantity in [0, -4] {
    let err = h.carts.add_or_update_item(shopper(), mug.id, quantity).await.unwrap_err();
    assert!(matches!(err, CartError::Validation(_)), "got {:?}", err);
  }
  assert_eq!(h.counting.total_calls(), 0);
  assert_eq!(h.store.cart_count(), 0);
}

#[tokio::test]
#[serial]
async fn test_remove_missing_item_is_noop_success() {
  setup_tracing();
  let h = Harness::empty();
  let user = shopper();
  h.carts.create_cart(user).await.unwrap();

  h.carts.remove_item(user, Uuid::new_v4()).await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_remove_item_drops_cart_keyed_cache_entry() {
  setup_tracing();
  let mug = product("mug", 5);
  let h = Harness::new([mug.clone()]);
  let user = shopper();

  h.carts.add_or_update_item(user, mug.id, 1).await.unwrap();
  let listed = h.carts.list_items(user).await.unwrap();
  let key = cart_cache_key(listed.cart_id);
  assert!(h.cache.inner.contains(&key));

  h.carts.remove_item(user, mug.id).await.unwrap();
  assert!(!h.cache.inner.contains(&key));
  assert!(h.carts.list_items(user).await.unwrap().items.is_empty());
}

#[tokio::test]
#[serial]
async fn test_list_items_store_then_cache() {
  setup_tracing();
  let mug = product("mug", 5);
  let h = Harness::new([mug.clone()]);
  let user = shopper();
  h.carts.add_or_update_item(user, mug.id, 2).await.unwrap();

  let first = h.carts.list_items(user).await.unwrap();
  assert_eq!(first.source, ItemSource::Store);
  assert_eq!(first.items.len(), 1);
  assert_eq!(h.counting.list_calls(), 1);
  assert!(h.cache.inner.contains(&cart_cache_key(first.cart_id)));

  let second = h.carts.list_items(user).await.unwrap();
  assert_eq!(second.source, ItemSource::Cache);
  assert_eq!(second.items, first.items);
  assert_eq!(h.counting.list_calls(), 1);
}

#[tokio::test]
#[serial]
async fn test_write_after_read_never_serves_stale_snapshot() {
  setup_tracing();
  let mug = product("mug", 10);
  let h = Harness::new([mug.clone()]);
  let user = shopper();

  h.carts.add_or_update_item(user, mug.id, 1).await.unwrap();
  h.carts.list_items(user).await.unwrap();
  assert_eq!(h.carts.list_items(user).await.unwrap().source, ItemSource::Cache);

  h.carts.add_or_update_item(user, mug.id, 4).await.unwrap();
  let after = h.carts.list_items(user).await.unwrap();
  assert_eq!(after.source, ItemSource::Store);
  assert_eq!(after.items[0].quantity, 5);
}

#[tokio::test]
#[serial]
async fn test_cache_outage_falls_back_to_store() {
  setup_tracing();
  let mug = product("mug", 5);
  let h = Harness::new([mug.clone()]);
  let user = shopper();

  h.cache.fail_everything();
  // The write succeeds even though invalidation fails.
  h.carts.add_or_update_item(user, mug.id, 2).await.unwrap();

  let listed = h.carts.list_items(user).await.unwrap();
  assert_eq!(listed.source, ItemSource::StoreCacheUnavailable);
  assert_eq!(listed.items[0].quantity, 2);
  // No repopulation attempt against an unhealthy cache.
  assert_eq!(h.cache.sets.load(Ordering::SeqCst), 0);

  h.carts.remove_item(user, mug.id).await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_failed_cache_population_is_not_fatal() {
  setup_tracing();
  let mug = product("mug", 5);
  let h = Harness::new([mug.clone()]);
  let user = shopper();
  h.carts.add_or_update_item(user, mug.id, 2).await.unwrap();

  h.cache.fail_set.store(true, Ordering::SeqCst);
  let listed = h.carts.list_items(user).await.unwrap();
  assert_eq!(listed.source, ItemSource::Store);
  assert_eq!(h.cache.sets.load(Ordering::SeqCst), 1);
  assert!(h.cache.inner.is_empty());
}

#[tokio::test]
#[serial]
async fn test_corrupt_cache_entry_is_an_error() {
  setup_tracing();
  let h = Harness::empty();
  let user = shopper();
  let cart = h.carts.create_cart(user).await.unwrap().cart().clone();
  h.cache.inner.insert_raw(&cart_cache_key(cart.id), "{garbage", Duration::from_secs(60));

  let err = h.carts.list_items(user).await.unwrap_err();
  assert!(matches!(err, CartError::CacheCorruption { .. }), "got {:?}", err);
  assert_eq!(h.counting.list_calls(), 0);
}

#[tokio::test]
#[serial]
async fn test_list_without_cart_is_cart_missing() {
  setup_tracing();
  let h = Harness::empty();
  let user = shopper();

  let err = h.carts.list_items(user).await.unwrap_err();
  match err {
    CartError::CartMissing { user_id } => assert_eq!(user_id, user.user_id),
    other => panic!("Expected CartMissing, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_store_failure_surfaces_as_store_error() {
  setup_tracing();
  let mug = product("mug", 5);
  let h = Harness::new([mug.clone()]);
  h.counting.fail_writes.store(true, Ordering::SeqCst);

  let err = h.carts.add_or_update_item(shopper(), mug.id, 1).await.unwrap_err();
  assert!(matches!(err, CartError::Store { .. }), "got {:?}", err);
}

#[tokio::test]
#[serial]
async fn test_admin_operations_require_admin_role() {
  setup_tracing();
  let mug = product("mug", 5);
  let h = Harness::new([mug.clone()]);
  let owner = shopper();
  h.carts.add_or_update_item(owner, mug.id, 1).await.unwrap();

  let intruder = shopper();
  let err = h.carts.cart_for_user(intruder, owner.user_id).await.unwrap_err();
  assert!(matches!(err, CartError::Forbidden(_)));
  let err = h.carts.delete_cart_for_user(intruder, owner.user_id).await.unwrap_err();
  assert!(matches!(err, CartError::Forbidden(_)));
  assert_eq!(h.store.live_item_count(), 1);
}

#[tokio::test]
#[serial]
async fn test_admin_can_view_and_delete_cart() {
  setup_tracing();
  let mug = product("mug", 5);
  let h = Harness::new([mug.clone()]);
  let owner = shopper();
  let admin = Principal::admin(Uuid::new_v4());
  h.carts.add_or_update_item(owner, mug.id, 2).await.unwrap();
  let listed = h.carts.list_items(owner).await.unwrap();

  let snapshot = h.carts.cart_for_user(admin, owner.user_id).await.unwrap();
  assert_eq!(snapshot.cart.user_id, owner.user_id);
  assert_eq!(snapshot.items.len(), 1);

  h.carts.delete_cart_for_user(admin, owner.user_id).await.unwrap();
  assert!(!h.cache.inner.contains(&cart_cache_key(listed.cart_id)));
  assert_eq!(h.store.live_item_count(), 0);

  let err = h.carts.cart_for_user(admin, owner.user_id).await.unwrap_err();
  assert!(matches!(err, CartError::NotFound(_)));

  // A fresh cart can be provisioned after deletion.
  assert!(h.carts.create_cart(owner).await.unwrap().was_created());
}

#[tokio::test]
#[serial]
async fn test_custom_cache_ttl_is_applied() {
  setup_tracing();
  let mug = product("mug", 5);
  let store = Arc::new(InMemoryStore::with_products([mug.clone()]));
  let cache = Arc::new(InMemoryCartCache::new());
  let service = CartService::new(store.clone(), store.clone(), cache.clone()).with_cache_ttl(Duration::from_millis(30));
  assert_eq!(service.cache_ttl(), Duration::from_millis(30));
  let user = shopper();

  service.add_or_update_item(user, mug.id, 1).await.unwrap();
  let listed = service.list_items(user).await.unwrap();
  assert!(cache.get(&cart_cache_key(listed.cart_id)).await.unwrap().is_some());

  tokio::time::sleep(Duration::from_millis(60)).await;
  assert_eq!(service.list_items(user).await.unwrap().source, ItemSource::Store);
}

#[tokio::test]
#[serial]
async fn test_concurrent_creates_yield_one_live_cart() {
  setup_tracing();
  let h = Arc::new(Harness::empty());
  let user = shopper();

  let mut handles = Vec::new();
  for _ in 0..8 {
    let h = h.clone();
    handles.push(tokio::spawn(async move { h.carts.create_cart(user).await }));
  }
  let mut ids = Vec::new();
  for handle in handles {
    ids.push(handle.await.unwrap().unwrap().cart().id);
  }
  ids.dedup();
  assert_eq!(ids.len(), 1);
  assert_eq!(h.store.cart_count(), 1);
}

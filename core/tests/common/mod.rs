// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use storefront::memory::{InMemoryCartCache, InMemoryStore};
use storefront::{
  CacheError, Cart, CartCache, CartItem, CartService, CartStore, CheckoutService, FlowError, Principal, Product,
  StockLedger, StoreError,
};
use tracing::Level;
use uuid::Uuid;

// --- Tracing ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Error type for workflow tests ---
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Flow error: {0}")]
  Flow(String),

  #[error("Test handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(fe: FlowError) -> Self {
    TestError::Flow(format!("{:?}", fe))
  }
}

// --- Fixtures ---
pub fn product(name: &str, stock_quantity: i32) -> Product {
  Product {
    id: Uuid::new_v4(),
    name: name.to_string(),
    price_cents: 1999,
    stock_quantity,
  }
}

pub fn priced_product(name: &str, price_cents: i64, stock_quantity: i32) -> Product {
  Product {
    price_cents,
    ..product(name, stock_quantity)
  }
}

pub fn shopper() -> Principal {
  Principal::user(Uuid::new_v4())
}

// --- Cache that can be told to fail ---
#[derive(Default)]
pub struct FlakyCache {
  pub inner: InMemoryCartCache,
  pub fail_get: AtomicBool,
  pub fail_set: AtomicBool,
  pub fail_delete: AtomicBool,
  pub gets: AtomicUsize,
  pub sets: AtomicUsize,
  pub deletes: AtomicUsize,
}

impl FlakyCache {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn fail_everything(&self) {
    self.fail_get.store(true, Ordering::SeqCst);
    self.fail_set.store(true, Ordering::SeqCst);
    self.fail_delete.store(true, Ordering::SeqCst);
  }

  pub fn heal(&self) {
    self.fail_get.store(false, Ordering::SeqCst);
    self.fail_set.store(false, Ordering::SeqCst);
    self.fail_delete.store(false, Ordering::SeqCst);
  }

  fn outage(op: &str) -> CacheError {
    CacheError::unavailable(anyhow::anyhow!("simulated cache outage during {}", op))
  }
}

#[async_trait]
impl CartCache for FlakyCache {
  async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
    self.gets.fetch_add(1, Ordering::SeqCst);
    if self.fail_get.load(Ordering::SeqCst) {
      return Err(Self::outage("get"));
    }
    self.inner.get(key).await
  }

  async fn set(&self, key: &str, payload: &str, ttl: Duration) -> Result<(), CacheError> {
    self.sets.fetch_add(1, Ordering::SeqCst);
    if self.fail_set.load(Ordering::SeqCst) {
      return Err(Self::outage("set"));
    }
    self.inner.set(key, payload, ttl).await
  }

  async fn delete(&self, key: &str) -> Result<(), CacheError> {
    self.deletes.fetch_add(1, Ordering::SeqCst);
    if self.fail_delete.load(Ordering::SeqCst) {
      return Err(Self::outage("delete"));
    }
    self.inner.delete(key).await
  }
}

// --- Store wrapper that counts calls ---
pub struct CountingStore {
  pub inner: Arc<InMemoryStore>,
  pub calls: AtomicUsize,
  pub list_calls: AtomicUsize,
  pub fail_writes: AtomicBool,
}

impl CountingStore {
  pub fn new(inner: Arc<InMemoryStore>) -> Self {
    Self {
      inner,
      calls: AtomicUsize::new(0),
      list_calls: AtomicUsize::new(0),
      fail_writes: AtomicBool::new(false),
    }
  }

  pub fn total_calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  pub fn list_calls(&self) -> usize {
    self.list_calls.load(Ordering::SeqCst)
  }

  fn tick(&self) {
    self.calls.fetch_add(1, Ordering::SeqCst);
  }

  fn write_guard(&self) -> Result<(), StoreError> {
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(StoreError::backend(anyhow::anyhow!("simulated write failure")));
    }
    Ok(())
  }
}

#[async_trait]
impl CartStore for CountingStore {
  async fn cart_by_user(&self, user_id: Uuid) -> Result<Cart, StoreError> {
    self.tick();
    self.inner.cart_by_user(user_id).await
  }

  async fn create_cart(&self, user_id: Uuid) -> Result<(), StoreError> {
    self.tick();
    self.write_guard()?;
    self.inner.create_cart(user_id).await
  }

  async fn delete_cart(&self, cart_id: Uuid) -> Result<(), StoreError> {
    self.tick();
    self.write_guard()?;
    self.inner.delete_cart(cart_id).await
  }

  async fn item(&self, cart_id: Uuid, product_id: Uuid) -> Result<CartItem, StoreError> {
    self.tick();
    self.inner.item(cart_id, product_id).await
  }

  async fn create_item(&self, item: &CartItem) -> Result<(), StoreError> {
    self.tick();
    self.write_guard()?;
    self.inner.create_item(item).await
  }

  async fn update_item(&self, item: &CartItem) -> Result<(), StoreError> {
    self.tick();
    self.write_guard()?;
    self.inner.update_item(item).await
  }

  async fn delete_item(&self, cart_id: Uuid, product_id: Uuid) -> Result<(), StoreError> {
    self.tick();
    self.write_guard()?;
    self.inner.delete_item(cart_id, product_id).await
  }

  async fn list_items(&self, cart_id: Uuid) -> Result<Vec<CartItem>, StoreError> {
    self.tick();
    self.list_calls.fetch_add(1, Ordering::SeqCst);
    self.inner.list_items(cart_id).await
  }
}

#[async_trait]
impl StockLedger for CountingStore {
  async fn product(&self, product_id: Uuid) -> Result<Option<Product>, StoreError> {
    self.tick();
    self.inner.product(product_id).await
  }
}

// --- Wired services ---
pub struct Harness {
  pub store: Arc<InMemoryStore>,
  pub counting: Arc<CountingStore>,
  pub cache: Arc<FlakyCache>,
  pub carts: CartService,
  pub checkout: CheckoutService,
}

impl Harness {
  pub fn empty() -> Self {
    Self::new(Vec::<Product>::new())
  }

  pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
    let store = Arc::new(InMemoryStore::with_products(products));
    let counting = Arc::new(CountingStore::new(store.clone()));
    let cache = Arc::new(FlakyCache::new());
    let carts = CartService::new(counting.clone(), counting.clone(), cache.clone());
    let checkout = CheckoutService::new(counting.clone(), counting.clone(), store.clone(), cache.clone());
    Self {
      store,
      counting,
      cache,
      carts,
      checkout,
    }
  }
}

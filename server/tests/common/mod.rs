// tests/common/mod.rs
#![allow(dead_code)]
#![allow(unused_macros, unused_imports)]

use once_cell::sync::Lazy;
use std::sync::Arc;
use storefront::memory::InMemoryStore;
use storefront::Product;
use storefront_server::config::AppConfig;
use storefront_server::state::AppState;
use tracing::Level;
use uuid::Uuid;

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

pub fn memory_config() -> AppConfig {
  AppConfig::from_lookup(|name| match name {
    "STORAGE_BACKEND" => Some("memory".to_string()),
    _ => None,
  })
  .expect("memory config")
}

pub fn product(name: &str, price_cents: i64, stock_quantity: i32) -> Product {
  Product {
    id: Uuid::new_v4(),
    name: name.to_string(),
    price_cents,
    stock_quantity,
  }
}

/// App state over a fresh in-memory store holding `products`.
pub fn memory_state(products: Vec<Product>) -> (AppState, Arc<InMemoryStore>) {
  let store = Arc::new(InMemoryStore::with_products(products));
  (AppState::in_memory(memory_config(), store.clone()), store)
}

macro_rules! init_app {
  ($state:expr) => {
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(actix_web::web::Data::new($state.clone()))
        .configure(storefront_server::web::configure_app_routes),
    )
    .await
  };
}

/// Sends `$req` and returns `(status, json body)`.
macro_rules! call_json {
  ($app:expr, $req:expr) => {{
    let resp = actix_web::test::call_service(&$app, $req.to_request()).await;
    let status = resp.status();
    let body: serde_json::Value = actix_web::test::read_body_json(resp).await;
    (status, body)
  }};
}

pub(crate) use call_json;
pub(crate) use init_app;

pub fn as_user(req: actix_web::test::TestRequest, user_id: Uuid) -> actix_web::test::TestRequest {
  req.insert_header(("X-User-ID", user_id.to_string()))
}

pub fn as_admin(req: actix_web::test::TestRequest, user_id: Uuid) -> actix_web::test::TestRequest {
  as_user(req, user_id).insert_header(("X-User-Role", "admin"))
}

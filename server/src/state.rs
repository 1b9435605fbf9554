// server/src/state.rs

use crate::cache::RedisCartCache;
use crate::config::{AppConfig, StorageBackend};
use crate::db::{seed, InMemoryUserRepository, PgStore, PgUserRepository, ProductCatalog, UserRepository};
use crate::errors::{AppError, Result};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use storefront::memory::{InMemoryCartCache, InMemoryStore};
use storefront::{CartService, CheckoutService};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
  pub config: Arc<AppConfig>,
  pub carts: Arc<CartService>,
  pub checkout: Arc<CheckoutService>,
  pub users: Arc<dyn UserRepository>,
  pub catalog: Arc<dyn ProductCatalog>,
}

impl AppState {
  pub async fn build(config: AppConfig) -> Result<Self> {
    match config.storage_backend {
      StorageBackend::Memory => Ok(Self::in_memory(config, Arc::new(InMemoryStore::new()))),
      StorageBackend::Postgres => Self::postgres(config).await,
    }
  }

  /// Wires every port to in-process adapters sharing `store`.
  pub fn in_memory(config: AppConfig, store: Arc<InMemoryStore>) -> Self {
    if config.seed_db {
      seed::seed_memory(&store);
    }
    let cache = Arc::new(InMemoryCartCache::new());
    let carts = CartService::new(store.clone(), store.clone(), cache.clone()).with_cache_ttl(config.cart_cache_ttl);
    let checkout = CheckoutService::new(store.clone(), store.clone(), store.clone(), cache);
    info!("Using in-memory storage backend.");

    Self {
      config: Arc::new(config),
      carts: Arc::new(carts),
      checkout: Arc::new(checkout),
      users: Arc::new(InMemoryUserRepository::new()),
      catalog: store,
    }
  }

  async fn postgres(config: AppConfig) -> Result<Self> {
    let database_url = config
      .database_url
      .as_deref()
      .ok_or_else(|| AppError::Config("DATABASE_URL is required for the postgres backend".to_string()))?;

    let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;
    info!("Successfully connected to the database.");

    if config.run_migrations {
      sqlx::migrate!("./migrations").run(&pool).await?;
      info!("Database migrations applied.");
    }
    if config.seed_db {
      seed::seed_postgres(&pool).await?;
    }

    // Only a malformed REDIS_URL is fatal; an unreachable server degrades cart reads to the store.
    let cache = Arc::new(RedisCartCache::connect(&config.redis_url, config.redis_connect_timeout).await?);
    let store = Arc::new(PgStore::new(pool.clone()));
    let carts = CartService::new(store.clone(), store.clone(), cache.clone()).with_cache_ttl(config.cart_cache_ttl);
    let checkout = CheckoutService::new(store.clone(), store.clone(), store.clone(), cache);

    Ok(Self {
      config: Arc::new(config),
      carts: Arc::new(carts),
      checkout: Arc::new(checkout),
      users: Arc::new(PgUserRepository::new(pool)),
      catalog: store,
    })
  }
}

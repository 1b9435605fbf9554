// server/src/db/catalog.rs

use crate::db::pg::{PgStore, ProductRow, PRODUCT_COLUMNS};
use async_trait::async_trait;
use storefront::memory::InMemoryStore;
use storefront::{Product, StockLedger, StoreError};
use uuid::Uuid;

/// Read access to the product catalog for the public product endpoints.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
  async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

  async fn find_product(&self, product_id: Uuid) -> Result<Option<Product>, StoreError>;
}

#[async_trait]
impl ProductCatalog for PgStore {
  async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
    let rows: Vec<ProductRow> = sqlx::query_as(&format!("SELECT {} FROM products ORDER BY name ASC", PRODUCT_COLUMNS))
      .fetch_all(self.pool())
      .await
      .map_err(StoreError::backend)?;
    Ok(rows.into_iter().map(Product::from).collect())
  }

  async fn find_product(&self, product_id: Uuid) -> Result<Option<Product>, StoreError> {
    self.product(product_id).await
  }
}

#[async_trait]
impl ProductCatalog for InMemoryStore {
  async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
    Ok(self.products())
  }

  async fn find_product(&self, product_id: Uuid) -> Result<Option<Product>, StoreError> {
    self.product(product_id).await
  }
}

// core/src/ports/stock_ledger.rs

use crate::error::StoreError;
use crate::models::Product;
use async_trait::async_trait;
use uuid::Uuid;

/// Read-only view of product availability.
#[async_trait]
pub trait StockLedger: Send + Sync {
  /// `Ok(None)` when the product does not exist.
  async fn product(&self, product_id: Uuid) -> Result<Option<Product>, StoreError>;
}

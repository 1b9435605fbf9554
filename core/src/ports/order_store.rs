// core/src/ports/order_store.rs

use crate::error::StoreError;
use crate::models::{NewOrder, Order};
use async_trait::async_trait;

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Atomically: inserts the order and its lines, decrements stock for each
  /// line with a conditional update, and clears the cart's items.
  ///
  /// A line whose stock no longer covers its quantity fails the whole
  /// placement with `StoreError::Conflict` and nothing is written.
  async fn place_order(&self, order: NewOrder) -> Result<Order, StoreError>;
}

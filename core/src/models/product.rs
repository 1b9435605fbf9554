// core/src/models/product.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The slice of a catalog product the cart subsystem consults. Read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub price_cents: i64,
  pub stock_quantity: i32,
}

impl Product {
  /// Equal to stock is allowed, exceeding it is not.
  pub fn can_supply(&self, total_quantity: i32) -> bool {
    total_quantity <= self.stock_quantity
  }
}

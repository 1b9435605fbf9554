// core/src/models/cart_item.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A (cart, product, quantity) association. At most one live row exists per
/// (cart, product) pair; repeated adds bump `quantity` on that row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
  pub id: Uuid,
  pub cart_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub added_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl CartItem {
  pub fn new(cart_id: Uuid, product_id: Uuid, quantity: i32) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      cart_id,
      product_id,
      quantity,
      added_at: now,
      updated_at: now,
    }
  }

  /// Returns a copy with `quantity` replaced and `updated_at` bumped.
  pub fn with_quantity(&self, quantity: i32) -> Self {
    Self {
      quantity,
      updated_at: Utc::now(),
      ..self.clone()
    }
  }
}

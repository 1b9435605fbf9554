// core/src/models/cart.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One live cart per user. `deleted_at` is the soft-delete marker; stores
/// never return a cart whose marker is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
  pub id: Uuid,
  pub user_id: Uuid,
  pub added_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deleted_at: Option<DateTime<Utc>>,
}

impl Cart {
  pub fn new(user_id: Uuid) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      user_id,
      added_at: now,
      updated_at: now,
      deleted_at: None,
    }
  }

  pub fn is_live(&self) -> bool {
    self.deleted_at.is_none()
  }
}

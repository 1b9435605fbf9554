// core/src/ports/cart_store.rs

use crate::error::StoreError;
use crate::models::{Cart, CartItem};
use async_trait::async_trait;
use uuid::Uuid;

/// Owns cart and cart-item records.
///
/// Implementations return `StoreError::NotFound` for a clean absence so
/// callers can tell "never provisioned" from a failing backend.
#[async_trait]
pub trait CartStore: Send + Sync {
  /// The user's live cart.
  async fn cart_by_user(&self, user_id: Uuid) -> Result<Cart, StoreError>;

  /// Creates a live cart for the user. Fails with `StoreError::Conflict` if
  /// one already exists.
  async fn create_cart(&self, user_id: Uuid) -> Result<(), StoreError>;

  /// Soft-deletes the cart and its items. Deleting an absent cart is a no-op.
  async fn delete_cart(&self, cart_id: Uuid) -> Result<(), StoreError>;

  async fn item(&self, cart_id: Uuid, product_id: Uuid) -> Result<CartItem, StoreError>;

  async fn create_item(&self, item: &CartItem) -> Result<(), StoreError>;

  async fn update_item(&self, item: &CartItem) -> Result<(), StoreError>;

  /// Removing an absent item is a no-op.
  async fn delete_item(&self, cart_id: Uuid, product_id: Uuid) -> Result<(), StoreError>;

  async fn list_items(&self, cart_id: Uuid) -> Result<Vec<CartItem>, StoreError>;
}

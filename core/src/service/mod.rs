// core/src/service/mod.rs

//! Cart lifecycle, item mutation and cache-first reads.

pub mod add_item_flow;
pub mod cart_service;

pub use cart_service::{CartCreation, CartItems, CartService, CartSnapshot, ItemWrite};

use crate::error::{CacheError, CartError, StoreError};
use crate::models::Cart;
use crate::ports::{CartCache, CartStore, StockLedger};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// The collaborators a cart operation touches, cloned into each flow context.
#[derive(Clone)]
pub struct CartPorts {
  pub store: Arc<dyn CartStore>,
  pub stock: Arc<dyn StockLedger>,
  pub cache: Arc<dyn CartCache>,
}

/// Looks up the user's cart where its presence is assumed.
pub(crate) async fn resolve_cart(store: &dyn CartStore, user_id: Uuid) -> Result<Cart, CartError> {
  match store.cart_by_user(user_id).await {
    Ok(cart) => Ok(cart),
    Err(StoreError::NotFound(_)) => Err(CartError::CartMissing { user_id }),
    Err(e) => Err(CartError::store("Failed to fetch cart", e)),
  }
}

/// Returns the user's cart, creating it first if none exists.
///
/// A `Conflict` from `create_cart` means a concurrent request provisioned
/// the cart between our lookup and insert; the re-fetch picks it up.
pub(crate) async fn provision_cart(store: &dyn CartStore, user_id: Uuid) -> Result<Cart, CartError> {
  match store.cart_by_user(user_id).await {
    Ok(cart) => return Ok(cart),
    Err(StoreError::NotFound(_)) => {}
    Err(e) => return Err(CartError::store("Failed to fetch cart", e)),
  }

  debug!(%user_id, "No cart for user; provisioning one.");
  match store.create_cart(user_id).await {
    Ok(()) | Err(StoreError::Conflict(_)) => {}
    Err(e) => return Err(CartError::store("Failed to create cart", e)),
  }

  store
    .cart_by_user(user_id)
    .await
    .map_err(|e| CartError::store("Failed to fetch cart", e))
}

pub(crate) async fn invalidate_cart(cache: &dyn CartCache, cart_id: Uuid) -> Result<(), CacheError> {
  cache.delete(&crate::cache::cart_cache_key(cart_id)).await
}

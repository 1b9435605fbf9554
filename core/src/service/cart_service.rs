// core/src/service/cart_service.rs

use crate::cache::{cart_cache_key, decode_items, encode_items, ItemSource, CART_CACHE_TTL};
use crate::error::{CartError, CartResult, FlowError, StoreError};
use crate::models::{Cart, CartItem, Principal};
use crate::ports::{CartCache, CartStore, StockLedger};
use crate::service::add_item_flow::{build_add_item_flow, AddItemCtxData, ADD_ITEM_FLOW};
use crate::service::{invalidate_cart, resolve_cart, CartPorts};
use crate::workflow::{ContextData, Flow, FlowOutcome};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Result of an idempotent cart creation. Both variants are successes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartCreation {
  AlreadyExisted(Cart),
  Created(Cart),
}

impl CartCreation {
  pub fn cart(&self) -> &Cart {
    match self {
      CartCreation::AlreadyExisted(cart) | CartCreation::Created(cart) => cart,
    }
  }

  pub fn was_created(&self) -> bool {
    matches!(self, CartCreation::Created(_))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ItemWrite {
  Created { item: CartItem },
  Updated { item: CartItem, previous_quantity: i32 },
}

impl ItemWrite {
  pub fn item(&self) -> &CartItem {
    match self {
      ItemWrite::Created { item } | ItemWrite::Updated { item, .. } => item,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItems {
  pub cart_id: Uuid,
  pub items: Vec<CartItem>,
  pub source: ItemSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSnapshot {
  pub cart: Cart,
  pub items: Vec<CartItem>,
}

/// Orchestrates cart provisioning, stock-checked item writes, cache
/// invalidation on write, and cache-first reads.
///
/// Holds no per-request state; every collaborator is injected.
pub struct CartService {
  ports: CartPorts,
  cache_ttl: Duration,
  add_item_flow: Arc<Flow<AddItemCtxData, CartError>>,
}

impl CartService {
  pub fn new(store: Arc<dyn CartStore>, stock: Arc<dyn StockLedger>, cache: Arc<dyn CartCache>) -> Self {
    Self {
      ports: CartPorts { store, stock, cache },
      cache_ttl: CART_CACHE_TTL,
      add_item_flow: Arc::new(build_add_item_flow()),
    }
  }

  pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
    self.cache_ttl = cache_ttl;
    self
  }

  pub fn cache_ttl(&self) -> Duration {
    self.cache_ttl
  }

  #[instrument(name = "cart_service::create_cart", skip_all, fields(user_id = %principal.user_id), err(Display))]
  pub async fn create_cart(&self, principal: Principal) -> CartResult<CartCreation> {
    let store = self.ports.store.as_ref();
    let user_id = principal.user_id;

    match store.cart_by_user(user_id).await {
      Ok(cart) => {
        debug!(cart_id = %cart.id, "Cart already exists.");
        return Ok(CartCreation::AlreadyExisted(cart));
      }
      Err(StoreError::NotFound(_)) => {}
      Err(e) => return Err(CartError::store("Failed to fetch cart", e)),
    }

    match store.create_cart(user_id).await {
      Ok(()) => {}
      Err(StoreError::Conflict(_)) => {
        // Lost a race with a concurrent create; the winner's cart is the answer.
        let cart = store
          .cart_by_user(user_id)
          .await
          .map_err(|e| CartError::store("Failed to fetch cart", e))?;
        return Ok(CartCreation::AlreadyExisted(cart));
      }
      Err(e) => return Err(CartError::store("Failed to create cart", e)),
    }

    let cart = store
      .cart_by_user(user_id)
      .await
      .map_err(|e| CartError::store("Failed to fetch cart", e))?;
    info!(cart_id = %cart.id, "Cart created.");
    Ok(CartCreation::Created(cart))
  }

  #[instrument(
    name = "cart_service::add_or_update_item",
    skip_all,
    fields(user_id = %principal.user_id, product_id = %product_id, quantity = quantity),
    err(Display)
  )]
  pub async fn add_or_update_item(&self, principal: Principal, product_id: Uuid, quantity: i32) -> CartResult<ItemWrite> {
    let ctx_data = ContextData::new(AddItemCtxData::new(self.ports.clone(), principal, product_id, quantity));

    match self.add_item_flow.run(ctx_data.clone()).await? {
      FlowOutcome::Completed => {
        let written = ctx_data.read().written.clone();
        written.ok_or_else(|| {
          CartError::from(FlowError::MissingOutput {
            flow: ADD_ITEM_FLOW.to_string(),
            missing: "written cart item".to_string(),
          })
        })
      }
      FlowOutcome::Stopped { at_step } => Err(CartError::Internal(format!(
        "Adding the item to the cart was halted at step '{}'.",
        at_step
      ))),
    }
  }

  /// Cache-first read of the caller's cart items.
  ///
  /// A clean miss loads from the store and repopulates the cache; a cache
  /// error loads from the store and leaves the cache alone; a payload that
  /// fails to decode is an error.
  #[instrument(name = "cart_service::list_items", skip_all, fields(user_id = %principal.user_id), err(Display))]
  pub async fn list_items(&self, principal: Principal) -> CartResult<CartItems> {
    let cart = resolve_cart(self.ports.store.as_ref(), principal.user_id).await?;
    let cache_key = cart_cache_key(cart.id);

    match self.ports.cache.get(&cache_key).await {
      Ok(Some(payload)) => {
        let items = decode_items(&cache_key, &payload)?;
        debug!(cart_id = %cart.id, count = items.len(), "Cart items served from cache.");
        Ok(CartItems {
          cart_id: cart.id,
          items,
          source: ItemSource::Cache,
        })
      }
      Ok(None) => {
        let items = self.load_items(cart.id).await?;
        self.populate_cache(cart.id, &cache_key, &items).await;
        Ok(CartItems {
          cart_id: cart.id,
          items,
          source: ItemSource::Store,
        })
      }
      Err(e) => {
        warn!(cart_id = %cart.id, %cache_key, error = %e, "Cart cache unavailable; serving items from store.");
        let items = self.load_items(cart.id).await?;
        Ok(CartItems {
          cart_id: cart.id,
          items,
          source: ItemSource::StoreCacheUnavailable,
        })
      }
    }
  }

  #[instrument(name = "cart_service::remove_item", skip_all, fields(user_id = %principal.user_id, product_id = %product_id), err(Display))]
  pub async fn remove_item(&self, principal: Principal, product_id: Uuid) -> CartResult<()> {
    let cart = resolve_cart(self.ports.store.as_ref(), principal.user_id).await?;

    self
      .ports
      .store
      .delete_item(cart.id, product_id)
      .await
      .map_err(|e| CartError::store("Failed to remove cart item", e))?;

    if let Err(e) = invalidate_cart(self.ports.cache.as_ref(), cart.id).await {
      debug!(cart_id = %cart.id, error = %e, "Ignoring cart cache invalidation failure after removal.");
    }
    info!(cart_id = %cart.id, "Cart item removed.");
    Ok(())
  }

  #[instrument(name = "cart_service::cart_for_user", skip_all, fields(admin_id = %principal.user_id, user_id = %user_id), err(Display))]
  pub async fn cart_for_user(&self, principal: Principal, user_id: Uuid) -> CartResult<CartSnapshot> {
    principal.require_admin("view another user's cart")?;
    let cart = self.admin_lookup(user_id).await?;
    let items = self.load_items(cart.id).await?;
    Ok(CartSnapshot { cart, items })
  }

  #[instrument(name = "cart_service::delete_cart_for_user", skip_all, fields(admin_id = %principal.user_id, user_id = %user_id), err(Display))]
  pub async fn delete_cart_for_user(&self, principal: Principal, user_id: Uuid) -> CartResult<()> {
    principal.require_admin("delete another user's cart")?;
    let cart = self.admin_lookup(user_id).await?;

    self
      .ports
      .store
      .delete_cart(cart.id)
      .await
      .map_err(|e| CartError::store("Failed to delete cart", e))?;

    if let Err(e) = invalidate_cart(self.ports.cache.as_ref(), cart.id).await {
      debug!(cart_id = %cart.id, error = %e, "Ignoring cart cache invalidation failure after deletion.");
    }
    info!(cart_id = %cart.id, "Cart deleted by administrator.");
    Ok(())
  }

  async fn admin_lookup(&self, user_id: Uuid) -> CartResult<Cart> {
    match self.ports.store.cart_by_user(user_id).await {
      Ok(cart) => Ok(cart),
      Err(StoreError::NotFound(_)) => Err(CartError::NotFound(format!("No cart for user {}.", user_id))),
      Err(e) => Err(CartError::store("Failed to fetch cart", e)),
    }
  }

  async fn load_items(&self, cart_id: Uuid) -> CartResult<Vec<CartItem>> {
    self
      .ports
      .store
      .list_items(cart_id)
      .await
      .map_err(|e| CartError::store("Failed to fetch cart items", e))
  }

  async fn populate_cache(&self, cart_id: Uuid, cache_key: &str, items: &[CartItem]) {
    let payload = match encode_items(items) {
      Ok(payload) => payload,
      Err(e) => {
        warn!(%cart_id, error = %e, "Skipping cart cache population.");
        return;
      }
    };
    if let Err(e) = self.ports.cache.set(cache_key, &payload, self.cache_ttl).await {
      warn!(%cart_id, %cache_key, error = %e, "Failed to populate cart cache.");
    }
  }
}

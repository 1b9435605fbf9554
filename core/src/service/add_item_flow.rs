// core/src/service/add_item_flow.rs

//! The add-or-update cart item flow: validate, provision the cart, resolve
//! the product, reconcile against stock, persist, then drop the cache entry.
//!
//! The stock check and the write are separate round-trips with no lock in
//! between, so two concurrent adds for the same product can both pass the
//! check. Checkout re-validates with a conditional decrement.

use crate::cache::cart_cache_key;
use crate::error::{CartError, StoreError};
use crate::models::{Cart, CartItem, Principal, Product};
use crate::service::cart_service::ItemWrite;
use crate::service::{invalidate_cart, provision_cart, CartPorts};
use crate::workflow::{ContextData, Flow, StepControl};
use tracing::{info, warn};
use uuid::Uuid;

pub const ADD_ITEM_FLOW: &str = "cart_add_or_update_item";

#[derive(Clone)]
pub struct AddItemCtxData {
  pub ports: CartPorts,
  pub principal: Principal,
  pub product_id: Uuid,
  pub quantity: i32,
  pub cart: Option<Cart>,
  pub product: Option<Product>,
  pub written: Option<ItemWrite>,
}

impl AddItemCtxData {
  pub fn new(ports: CartPorts, principal: Principal, product_id: Uuid, quantity: i32) -> Self {
    Self {
      ports,
      principal,
      product_id,
      quantity,
      cart: None,
      product: None,
      written: None,
    }
  }
}

pub fn build_add_item_flow() -> Flow<AddItemCtxData, CartError> {
  let mut flow = Flow::<AddItemCtxData, CartError>::new(
    ADD_ITEM_FLOW,
    &[
      ("validate_quantity", false),
      ("provision_cart", false),
      ("resolve_product", false),
      ("reconcile_item_with_stock", false),
      ("invalidate_cart_cache", true),
    ],
  );

  // Runs before any store access.
  flow.on("validate_quantity", |ctx_data: ContextData<AddItemCtxData>| {
    Box::pin(async move {
      let quantity = { ctx_data.read().quantity };
      if quantity <= 0 {
        warn!(quantity, "Rejecting non-positive cart item quantity.");
        return Err(CartError::Validation("Quantity must be a positive number.".to_string()));
      }
      Ok(StepControl::Continue)
    })
  });

  flow.on("provision_cart", |ctx_data: ContextData<AddItemCtxData>| {
    Box::pin(async move {
      let (store, user_id) = {
        let guard = ctx_data.read();
        (guard.ports.store.clone(), guard.principal.user_id)
      };

      let cart = provision_cart(store.as_ref(), user_id).await?;
      ctx_data.write().cart = Some(cart);
      Ok::<_, CartError>(StepControl::Continue)
    })
  });

  flow.on("resolve_product", |ctx_data: ContextData<AddItemCtxData>| {
    Box::pin(async move {
      let (stock, product_id) = {
        let guard = ctx_data.read();
        (guard.ports.stock.clone(), guard.product_id)
      };

      match stock.product(product_id).await {
        Ok(Some(product)) => {
          ctx_data.write().product = Some(product);
          Ok(StepControl::Continue)
        }
        Ok(None) => {
          warn!(%product_id, "Product does not exist.");
          Err(CartError::ProductNotFound { product_id })
        }
        Err(e) => Err(CartError::store("Failed to fetch product", e)),
      }
    })
  });

  flow.on("reconcile_item_with_stock", |ctx_data: ContextData<AddItemCtxData>| {
    Box::pin(async move {
      let (store, cart_id, product, requested) = {
        let guard = ctx_data.read();
        (
          guard.ports.store.clone(),
          guard.cart.as_ref().map(|c| c.id),
          guard.product.clone(),
          guard.quantity,
        )
      };
      let cart_id = cart_id.ok_or_else(|| CartError::Internal("Cart was not resolved before reconciliation.".to_string()))?;
      let product =
        product.ok_or_else(|| CartError::Internal("Product was not resolved before reconciliation.".to_string()))?;

      let written = match store.item(cart_id, product.id).await {
        Ok(existing) => {
          let total = existing
            .quantity
            .checked_add(requested)
            .ok_or_else(|| CartError::Validation("Quantity is too large.".to_string()))?;
          if !product.can_supply(total) {
            warn!(%cart_id, product_id = %product.id, total, available = product.stock_quantity, "Cart item update exceeds stock.");
            return Err(CartError::OutOfStock {
              product_id: product.id,
              requested: total,
              available: product.stock_quantity,
            });
          }
          let updated = existing.with_quantity(total);
          store
            .update_item(&updated)
            .await
            .map_err(|e| CartError::store("Failed to update cart item", e))?;
          info!(%cart_id, product_id = %product.id, quantity = total, "Cart item quantity updated.");
          ItemWrite::Updated {
            item: updated,
            previous_quantity: existing.quantity,
          }
        }
        Err(StoreError::NotFound(_)) => {
          if !product.can_supply(requested) {
            warn!(%cart_id, product_id = %product.id, requested, available = product.stock_quantity, "Cart item insert exceeds stock.");
            return Err(CartError::OutOfStock {
              product_id: product.id,
              requested,
              available: product.stock_quantity,
            });
          }
          let item = CartItem::new(cart_id, product.id, requested);
          store
            .create_item(&item)
            .await
            .map_err(|e| CartError::store("Failed to add cart item", e))?;
          info!(%cart_id, product_id = %product.id, quantity = requested, "Cart item added.");
          ItemWrite::Created { item }
        }
        Err(e) => return Err(CartError::store("Failed to fetch cart item", e)),
      };

      ctx_data.write().written = Some(written);
      Ok(StepControl::Continue)
    })
  });

  // Optional: the durable write already succeeded, so a cache failure here
  // is logged and the flow still completes.
  flow.on("invalidate_cart_cache", |ctx_data: ContextData<AddItemCtxData>| {
    Box::pin(async move {
      let (cache, cart_id) = {
        let guard = ctx_data.read();
        (guard.ports.cache.clone(), guard.cart.as_ref().map(|c| c.id))
      };
      let Some(cart_id) = cart_id else {
        return Ok(StepControl::Continue);
      };

      if let Err(e) = invalidate_cart(cache.as_ref(), cart_id).await {
        warn!(%cart_id, cache_key = %cart_cache_key(cart_id), error = %e, "Failed to clear cart cache entry.");
        return Err(CartError::from(e));
      }
      Ok(StepControl::Continue)
    })
  });

  flow
}

// core/src/checkout.rs

//! Order placement: turns the caller's cart into a pending order.
//!
//! Unlike the add-item flow, stock is enforced by the `OrderStore` with a
//! conditional decrement inside one transaction, so concurrent checkouts
//! cannot oversell.

use crate::cache::cart_cache_key;
use crate::error::{CartError, CartResult, FlowError, StoreError};
use crate::models::order::generate_order_number;
use crate::models::{Cart, CartItem, NewOrder, NewOrderLine, Order, Principal};
use crate::ports::{CartCache, CartStore, OrderStore, StockLedger};
use crate::service::invalidate_cart;
use crate::workflow::{ContextData, Flow, FlowOutcome, StepControl};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub const CHECKOUT_FLOW: &str = "checkout_place_order";

#[derive(Clone)]
pub struct CheckoutPorts {
  pub store: Arc<dyn CartStore>,
  pub stock: Arc<dyn StockLedger>,
  pub orders: Arc<dyn OrderStore>,
  pub cache: Arc<dyn CartCache>,
}

#[derive(Clone)]
pub struct CheckoutCtxData {
  pub ports: CheckoutPorts,
  pub principal: Principal,
  pub cart: Option<Cart>,
  pub items: Vec<CartItem>,
  pub lines: Vec<NewOrderLine>,
  pub order: Option<Order>,
}

pub fn build_checkout_flow() -> Flow<CheckoutCtxData, CartError> {
  let mut flow = Flow::<CheckoutCtxData, CartError>::new(
    CHECKOUT_FLOW,
    &[
      ("resolve_cart", false),
      ("load_cart_items", false),
      ("price_lines", false),
      ("place_order", false),
      ("invalidate_cart_cache", true),
    ],
  );

  flow.on("resolve_cart", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, user_id) = {
        let guard = ctx_data.read();
        (guard.ports.store.clone(), guard.principal.user_id)
      };
      let cart = match store.cart_by_user(user_id).await {
        Ok(cart) => cart,
        Err(StoreError::NotFound(_)) => {
          return Err(CartError::NotFound(format!("No cart for user {}.", user_id)));
        }
        Err(e) => return Err(CartError::store("Failed to fetch cart", e)),
      };
      ctx_data.write().cart = Some(cart);
      Ok::<_, CartError>(StepControl::Continue)
    })
  });

  flow.on("load_cart_items", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, cart_id) = {
        let guard = ctx_data.read();
        (guard.ports.store.clone(), guard.cart.as_ref().map(|c| c.id))
      };
      let cart_id = cart_id.ok_or_else(|| CartError::Internal("Cart was not resolved before loading items.".to_string()))?;

      let items = store
        .list_items(cart_id)
        .await
        .map_err(|e| CartError::store("Failed to fetch cart items", e))?;
      if items.is_empty() {
        return Err(CartError::Validation("Cart is empty.".to_string()));
      }
      ctx_data.write().items = items;
      Ok(StepControl::Continue)
    })
  });

  // Prices come from the ledger at checkout time, not from the cart.
  flow.on("price_lines", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (stock, items) = {
        let guard = ctx_data.read();
        (guard.ports.stock.clone(), guard.items.clone())
      };

      let mut lines = Vec::with_capacity(items.len());
      let mut subtotal_cents: i64 = 0;
      for item in &items {
        let product = match stock.product(item.product_id).await {
          Ok(Some(product)) => product,
          Ok(None) => {
            return Err(CartError::Validation(format!(
              "Product {} in cart no longer exists.",
              item.product_id
            )))
          }
          Err(e) => return Err(CartError::store("Failed to fetch product", e)),
        };
        if !product.can_supply(item.quantity) {
          return Err(CartError::OutOfStock {
            product_id: product.id,
            requested: item.quantity,
            available: product.stock_quantity,
          });
        }
        let line = NewOrderLine {
          product_id: product.id,
          quantity: item.quantity,
          unit_price_cents: product.price_cents,
        };
        subtotal_cents = line
          .line_total_cents()
          .and_then(|total| subtotal_cents.checked_add(total))
          .ok_or_else(|| CartError::Validation("Order total is too large.".to_string()))?;
        lines.push(line);
      }
      debug!(lines = lines.len(), subtotal_cents, "Cart lines priced.");

      ctx_data.write().lines = lines;
      Ok(StepControl::Continue)
    })
  });

  flow.on("place_order", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (orders, user_id, cart_id, lines) = {
        let guard = ctx_data.read();
        (
          guard.ports.orders.clone(),
          guard.principal.user_id,
          guard.cart.as_ref().map(|c| c.id),
          guard.lines.clone(),
        )
      };
      let cart_id = cart_id.ok_or_else(|| CartError::Internal("Cart was not resolved before placing order.".to_string()))?;

      let new_order = NewOrder::from_lines(user_id, cart_id, generate_order_number(Utc::now()), lines)
        .ok_or_else(|| CartError::Validation("Order total is too large.".to_string()))?;
      let order = match orders.place_order(new_order).await {
        Ok(order) => order,
        Err(StoreError::Conflict(message)) => {
          warn!(%cart_id, %message, "Stock changed during order placement.");
          return Err(CartError::StockConflict(message));
        }
        Err(e) => return Err(CartError::store("Failed to place order", e)),
      };

      info!(order_id = %order.id, order_number = %order.order_number, total_cents = order.total_cents, "Order placed.");
      ctx_data.write().order = Some(order);
      Ok(StepControl::Continue)
    })
  });

  flow.on("invalidate_cart_cache", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (cache, cart_id) = {
        let guard = ctx_data.read();
        (guard.ports.cache.clone(), guard.cart.as_ref().map(|c| c.id))
      };
      let Some(cart_id) = cart_id else {
        return Ok(StepControl::Continue);
      };
      if let Err(e) = invalidate_cart(cache.as_ref(), cart_id).await {
        warn!(%cart_id, cache_key = %cart_cache_key(cart_id), error = %e, "Failed to clear cart cache entry after checkout.");
        return Err(CartError::from(e));
      }
      Ok(StepControl::Continue)
    })
  });

  flow
}

pub struct CheckoutService {
  ports: CheckoutPorts,
  flow: Arc<Flow<CheckoutCtxData, CartError>>,
}

impl CheckoutService {
  pub fn new(
    store: Arc<dyn CartStore>,
    stock: Arc<dyn StockLedger>,
    orders: Arc<dyn OrderStore>,
    cache: Arc<dyn CartCache>,
  ) -> Self {
    Self {
      ports: CheckoutPorts {
        store,
        stock,
        orders,
        cache,
      },
      flow: Arc::new(build_checkout_flow()),
    }
  }

  #[instrument(name = "checkout_service::place_order", skip_all, fields(user_id = %principal.user_id), err(Display))]
  pub async fn place_order(&self, principal: Principal) -> CartResult<Order> {
    let ctx_data = ContextData::new(CheckoutCtxData {
      ports: self.ports.clone(),
      principal,
      cart: None,
      items: Vec::new(),
      lines: Vec::new(),
      order: None,
    });

    match self.flow.run(ctx_data.clone()).await? {
      FlowOutcome::Completed => {
        let order = ctx_data.read().order.clone();
        order.ok_or_else(|| {
          CartError::from(FlowError::MissingOutput {
            flow: CHECKOUT_FLOW.to_string(),
            missing: "order".to_string(),
          })
        })
      }
      FlowOutcome::Stopped { at_step } => Err(CartError::Internal(format!(
        "Checkout was halted at step '{}'.",
        at_step
      ))),
    }
  }
}

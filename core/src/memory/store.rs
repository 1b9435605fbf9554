// core/src/memory/store.rs

use crate::error::StoreError;
use crate::models::{Cart, CartItem, NewOrder, Order, OrderLine, OrderStatus, Product};
use crate::ports::{CartStore, OrderStore, StockLedger};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct ItemRecord {
  item: CartItem,
  deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct StoreState {
  carts: HashMap<Uuid, Cart>,
  items: Vec<ItemRecord>,
  products: HashMap<Uuid, Product>,
  orders: Vec<Order>,
}

impl StoreState {
  fn live_item_mut(&mut self, cart_id: Uuid, product_id: Uuid) -> Option<&mut ItemRecord> {
    self
      .items
      .iter_mut()
      .find(|r| r.deleted_at.is_none() && r.item.cart_id == cart_id && r.item.product_id == product_id)
  }
}

/// Cart store, stock ledger and order store over a single locked state.
///
/// Mirrors the Postgres adapters' semantics: soft deletes, one live cart per
/// user, and an all-or-nothing conditional stock decrement on checkout.
#[derive(Debug, Default)]
pub struct InMemoryStore {
  state: RwLock<StoreState>,
}

impl InMemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
    let store = Self::new();
    for product in products {
      store.upsert_product(product);
    }
    store
  }

  pub fn upsert_product(&self, product: Product) {
    self.state.write().products.insert(product.id, product);
  }

  /// Returns `false` when the product is unknown.
  pub fn set_stock(&self, product_id: Uuid, stock_quantity: i32) -> bool {
    match self.state.write().products.get_mut(&product_id) {
      Some(product) => {
        product.stock_quantity = stock_quantity;
        true
      }
      None => false,
    }
  }

  pub fn products(&self) -> Vec<Product> {
    let mut products: Vec<Product> = self.state.read().products.values().cloned().collect();
    products.sort_by(|a, b| a.name.cmp(&b.name));
    products
  }

  pub fn orders(&self) -> Vec<Order> {
    self.state.read().orders.clone()
  }

  /// Carts including soft-deleted ones.
  pub fn cart_count(&self) -> usize {
    self.state.read().carts.len()
  }

  pub fn live_item_count(&self) -> usize {
    self.state.read().items.iter().filter(|r| r.deleted_at.is_none()).count()
  }
}

#[async_trait]
impl CartStore for InMemoryStore {
  async fn cart_by_user(&self, user_id: Uuid) -> Result<Cart, StoreError> {
    self
      .state
      .read()
      .carts
      .values()
      .find(|c| c.user_id == user_id && c.is_live())
      .cloned()
      .ok_or_else(|| StoreError::NotFound(format!("cart for user {}", user_id)))
  }

  async fn create_cart(&self, user_id: Uuid) -> Result<(), StoreError> {
    let mut state = self.state.write();
    if state.carts.values().any(|c| c.user_id == user_id && c.is_live()) {
      return Err(StoreError::Conflict(format!("user {} already has a cart", user_id)));
    }
    let cart = Cart::new(user_id);
    state.carts.insert(cart.id, cart);
    Ok(())
  }

  async fn delete_cart(&self, cart_id: Uuid) -> Result<(), StoreError> {
    let now = Utc::now();
    let mut state = self.state.write();
    match state.carts.get_mut(&cart_id) {
      Some(cart) if cart.is_live() => {
        cart.deleted_at = Some(now);
        cart.updated_at = now;
      }
      _ => return Ok(()),
    }
    for record in state.items.iter_mut().filter(|r| r.item.cart_id == cart_id && r.deleted_at.is_none()) {
      record.deleted_at = Some(now);
    }
    Ok(())
  }

  async fn item(&self, cart_id: Uuid, product_id: Uuid) -> Result<CartItem, StoreError> {
    self
      .state
      .read()
      .items
      .iter()
      .find(|r| r.deleted_at.is_none() && r.item.cart_id == cart_id && r.item.product_id == product_id)
      .map(|r| r.item.clone())
      .ok_or_else(|| StoreError::NotFound(format!("item {} in cart {}", product_id, cart_id)))
  }

  async fn create_item(&self, item: &CartItem) -> Result<(), StoreError> {
    let mut state = self.state.write();
    if state.live_item_mut(item.cart_id, item.product_id).is_some() {
      return Err(StoreError::Conflict(format!(
        "product {} already in cart {}",
        item.product_id, item.cart_id
      )));
    }
    state.items.push(ItemRecord {
      item: item.clone(),
      deleted_at: None,
    });
    Ok(())
  }

  async fn update_item(&self, item: &CartItem) -> Result<(), StoreError> {
    let mut state = self.state.write();
    match state.live_item_mut(item.cart_id, item.product_id) {
      Some(record) => {
        record.item.quantity = item.quantity;
        record.item.updated_at = item.updated_at;
        Ok(())
      }
      None => Err(StoreError::NotFound(format!(
        "item {} in cart {}",
        item.product_id, item.cart_id
      ))),
    }
  }

  async fn delete_item(&self, cart_id: Uuid, product_id: Uuid) -> Result<(), StoreError> {
    if let Some(record) = self.state.write().live_item_mut(cart_id, product_id) {
      record.deleted_at = Some(Utc::now());
    }
    Ok(())
  }

  async fn list_items(&self, cart_id: Uuid) -> Result<Vec<CartItem>, StoreError> {
    Ok(
      self
        .state
        .read()
        .items
        .iter()
        .filter(|r| r.deleted_at.is_none() && r.item.cart_id == cart_id)
        .map(|r| r.item.clone())
        .collect(),
    )
  }
}

#[async_trait]
impl StockLedger for InMemoryStore {
  async fn product(&self, product_id: Uuid) -> Result<Option<Product>, StoreError> {
    Ok(self.state.read().products.get(&product_id).cloned())
  }
}

#[async_trait]
impl OrderStore for InMemoryStore {
  async fn place_order(&self, order: NewOrder) -> Result<Order, StoreError> {
    let mut state = self.state.write();

    // Check every line before touching anything.
    for line in &order.lines {
      match state.products.get(&line.product_id) {
        Some(product) if product.can_supply(line.quantity) => {}
        Some(product) => {
          return Err(StoreError::Conflict(format!(
            "product {} has {} left, {} requested",
            product.id, product.stock_quantity, line.quantity
          )))
        }
        None => return Err(StoreError::Conflict(format!("product {} no longer exists", line.product_id))),
      }
    }

    let now = Utc::now();
    let order_id = Uuid::new_v4();
    let mut lines = Vec::with_capacity(order.lines.len());
    for line in &order.lines {
      if let Some(product) = state.products.get_mut(&line.product_id) {
        product.stock_quantity -= line.quantity;
      }
      lines.push(OrderLine {
        id: Uuid::new_v4(),
        order_id,
        product_id: line.product_id,
        quantity: line.quantity,
        unit_price_cents: line.unit_price_cents,
      });
    }

    for record in state
      .items
      .iter_mut()
      .filter(|r| r.item.cart_id == order.cart_id && r.deleted_at.is_none())
    {
      record.deleted_at = Some(now);
    }

    let placed = Order {
      id: order_id,
      user_id: order.user_id,
      order_number: order.order_number,
      status: OrderStatus::Pending,
      subtotal_cents: order.subtotal_cents,
      total_cents: order.total_cents,
      created_at: now,
      updated_at: now,
      lines,
    };
    state.orders.push(placed.clone());
    debug!(order_id = %placed.id, "Order recorded in memory.");
    Ok(placed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::NewOrderLine;

  fn product(stock: i32) -> Product {
    Product {
      id: Uuid::new_v4(),
      name: "kettle".to_string(),
      price_cents: 2500,
      stock_quantity: stock,
    }
  }

  #[tokio::test]
  async fn second_live_cart_conflicts_but_survives_soft_delete() {
    let store = InMemoryStore::new();
    let user = Uuid::new_v4();
    store.create_cart(user).await.unwrap();
    assert!(matches!(store.create_cart(user).await, Err(StoreError::Conflict(_))));

    let cart = store.cart_by_user(user).await.unwrap();
    store.delete_cart(cart.id).await.unwrap();
    assert!(store.cart_by_user(user).await.unwrap_err().is_not_found());
    store.create_cart(user).await.unwrap();
    assert_eq!(store.cart_count(), 2);
  }

  #[tokio::test]
  async fn place_order_is_all_or_nothing() {
    let plenty = product(10);
    let scarce = product(1);
    let store = InMemoryStore::with_products([plenty.clone(), scarce.clone()]);
    let order = NewOrder::from_lines(
      Uuid::new_v4(),
      Uuid::new_v4(),
      "ORD-1".to_string(),
      vec![
        NewOrderLine {
          product_id: plenty.id,
          quantity: 4,
          unit_price_cents: plenty.price_cents,
        },
        NewOrderLine {
          product_id: scarce.id,
          quantity: 2,
          unit_price_cents: scarce.price_cents,
        },
      ],
    )
    .unwrap();

    assert!(matches!(store.place_order(order).await, Err(StoreError::Conflict(_))));
    assert_eq!(store.product(plenty.id).await.unwrap().unwrap().stock_quantity, 10);
    assert!(store.orders().is_empty());
  }
}

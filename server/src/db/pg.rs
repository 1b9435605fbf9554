// server/src/db/pg.rs

use crate::db::store_error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use storefront::models::{NewOrder, OrderLine};
use storefront::{Cart, CartItem, CartStore, Order, OrderStatus, OrderStore, Product, StockLedger, StoreError};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct CartRow {
  id: Uuid,
  user_id: Uuid,
  added_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
  deleted_at: Option<DateTime<Utc>>,
}

impl From<CartRow> for Cart {
  fn from(row: CartRow) -> Self {
    Cart {
      id: row.id,
      user_id: row.user_id,
      added_at: row.added_at,
      updated_at: row.updated_at,
      deleted_at: row.deleted_at,
    }
  }
}

#[derive(Debug, FromRow)]
struct CartItemRow {
  id: Uuid,
  cart_id: Uuid,
  product_id: Uuid,
  quantity: i32,
  added_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl From<CartItemRow> for CartItem {
  fn from(row: CartItemRow) -> Self {
    CartItem {
      id: row.id,
      cart_id: row.cart_id,
      product_id: row.product_id,
      quantity: row.quantity,
      added_at: row.added_at,
      updated_at: row.updated_at,
    }
  }
}

#[derive(Debug, FromRow)]
pub(crate) struct ProductRow {
  id: Uuid,
  name: String,
  price_cents: i64,
  stock_quantity: i32,
}

impl From<ProductRow> for Product {
  fn from(row: ProductRow) -> Self {
    Product {
      id: row.id,
      name: row.name,
      price_cents: row.price_cents,
      stock_quantity: row.stock_quantity,
    }
  }
}

const CART_COLUMNS: &str = "id, user_id, added_at, updated_at, deleted_at";
const ITEM_COLUMNS: &str = "id, cart_id, product_id, quantity, added_at, updated_at";
pub(crate) const PRODUCT_COLUMNS: &str = "id, name, price_cents, stock_quantity";

/// Cart store, stock ledger and order store over one Postgres pool.
///
/// Deletes are soft (`deleted_at`); partial unique indexes keep one live
/// cart per user and one live item per (cart, product).
#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }
}

#[async_trait]
impl CartStore for PgStore {
  async fn cart_by_user(&self, user_id: Uuid) -> Result<Cart, StoreError> {
    let row: Option<CartRow> = sqlx::query_as(&format!(
      "SELECT {} FROM carts WHERE user_id = $1 AND deleted_at IS NULL",
      CART_COLUMNS
    ))
    .bind(user_id)
    .fetch_optional(&self.pool)
    .await
    .map_err(|e| store_error(e, "cart"))?;

    row
      .map(Cart::from)
      .ok_or_else(|| StoreError::NotFound(format!("cart for user {}", user_id)))
  }

  async fn create_cart(&self, user_id: Uuid) -> Result<(), StoreError> {
    let cart = Cart::new(user_id);
    sqlx::query("INSERT INTO carts (id, user_id, added_at, updated_at) VALUES ($1, $2, $3, $4)")
      .bind(cart.id)
      .bind(cart.user_id)
      .bind(cart.added_at)
      .bind(cart.updated_at)
      .execute(&self.pool)
      .await
      .map_err(|e| store_error(e, "live cart for user"))?;
    Ok(())
  }

  async fn delete_cart(&self, cart_id: Uuid) -> Result<(), StoreError> {
    let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;
    sqlx::query("UPDATE carts SET deleted_at = now(), updated_at = now() WHERE id = $1 AND deleted_at IS NULL")
      .bind(cart_id)
      .execute(&mut *tx)
      .await
      .map_err(StoreError::backend)?;
    sqlx::query("UPDATE cart_items SET deleted_at = now() WHERE cart_id = $1 AND deleted_at IS NULL")
      .bind(cart_id)
      .execute(&mut *tx)
      .await
      .map_err(StoreError::backend)?;
    tx.commit().await.map_err(StoreError::backend)
  }

  async fn item(&self, cart_id: Uuid, product_id: Uuid) -> Result<CartItem, StoreError> {
    let row: Option<CartItemRow> = sqlx::query_as(&format!(
      "SELECT {} FROM cart_items WHERE cart_id = $1 AND product_id = $2 AND deleted_at IS NULL",
      ITEM_COLUMNS
    ))
    .bind(cart_id)
    .bind(product_id)
    .fetch_optional(&self.pool)
    .await
    .map_err(|e| store_error(e, "cart item"))?;

    row
      .map(CartItem::from)
      .ok_or_else(|| StoreError::NotFound(format!("item {} in cart {}", product_id, cart_id)))
  }

  async fn create_item(&self, item: &CartItem) -> Result<(), StoreError> {
    sqlx::query(
      "INSERT INTO cart_items (id, cart_id, product_id, quantity, added_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(item.id)
    .bind(item.cart_id)
    .bind(item.product_id)
    .bind(item.quantity)
    .bind(item.added_at)
    .bind(item.updated_at)
    .execute(&self.pool)
    .await
    .map_err(|e| store_error(e, "cart item"))?;
    Ok(())
  }

  async fn update_item(&self, item: &CartItem) -> Result<(), StoreError> {
    let result = sqlx::query(
      "UPDATE cart_items SET quantity = $1, updated_at = $2 WHERE cart_id = $3 AND product_id = $4 AND deleted_at IS NULL",
    )
    .bind(item.quantity)
    .bind(item.updated_at)
    .bind(item.cart_id)
    .bind(item.product_id)
    .execute(&self.pool)
    .await
    .map_err(|e| store_error(e, "cart item"))?;

    if result.rows_affected() == 0 {
      return Err(StoreError::NotFound(format!(
        "item {} in cart {}",
        item.product_id, item.cart_id
      )));
    }
    Ok(())
  }

  async fn delete_item(&self, cart_id: Uuid, product_id: Uuid) -> Result<(), StoreError> {
    sqlx::query(
      "UPDATE cart_items SET deleted_at = now() WHERE cart_id = $1 AND product_id = $2 AND deleted_at IS NULL",
    )
    .bind(cart_id)
    .bind(product_id)
    .execute(&self.pool)
    .await
    .map_err(StoreError::backend)?;
    Ok(())
  }

  async fn list_items(&self, cart_id: Uuid) -> Result<Vec<CartItem>, StoreError> {
    let rows: Vec<CartItemRow> = sqlx::query_as(&format!(
      "SELECT {} FROM cart_items WHERE cart_id = $1 AND deleted_at IS NULL ORDER BY added_at ASC",
      ITEM_COLUMNS
    ))
    .bind(cart_id)
    .fetch_all(&self.pool)
    .await
    .map_err(StoreError::backend)?;
    Ok(rows.into_iter().map(CartItem::from).collect())
  }
}

#[async_trait]
impl StockLedger for PgStore {
  async fn product(&self, product_id: Uuid) -> Result<Option<Product>, StoreError> {
    let row: Option<ProductRow> = sqlx::query_as(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(product_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(StoreError::backend)?;
    Ok(row.map(Product::from))
  }
}

#[async_trait]
impl OrderStore for PgStore {
  #[instrument(name = "pg_store::place_order", skip_all, fields(cart_id = %order.cart_id, lines = order.lines.len()), err(Display))]
  async fn place_order(&self, order: NewOrder) -> Result<Order, StoreError> {
    let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;
    let now = Utc::now();
    let order_id = Uuid::new_v4();
    let status = OrderStatus::Pending;

    sqlx::query(
      "INSERT INTO orders (id, user_id, order_number, status, subtotal_cents, total_cents, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $7)",
    )
    .bind(order_id)
    .bind(order.user_id)
    .bind(&order.order_number)
    .bind(status.as_str())
    .bind(order.subtotal_cents)
    .bind(order.total_cents)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(|e| store_error(e, "order number"))?;

    let mut lines = Vec::with_capacity(order.lines.len());
    for line in &order.lines {
      // Conditional decrement: zero rows means stock moved under us.
      let decremented = sqlx::query(
        "UPDATE products SET stock_quantity = stock_quantity - $1, updated_at = now() \
         WHERE id = $2 AND stock_quantity >= $1",
      )
      .bind(line.quantity)
      .bind(line.product_id)
      .execute(&mut *tx)
      .await
      .map_err(StoreError::backend)?;

      if decremented.rows_affected() == 0 {
        warn!(product_id = %line.product_id, quantity = line.quantity, "Conditional stock decrement failed; rolling back.");
        // Dropping `tx` rolls back.
        return Err(StoreError::Conflict(format!(
          "insufficient stock for product {}",
          line.product_id
        )));
      }

      let line_id = Uuid::new_v4();
      sqlx::query(
        "INSERT INTO order_items (id, order_id, product_id, quantity, unit_price_cents) VALUES ($1, $2, $3, $4, $5)",
      )
      .bind(line_id)
      .bind(order_id)
      .bind(line.product_id)
      .bind(line.quantity)
      .bind(line.unit_price_cents)
      .execute(&mut *tx)
      .await
      .map_err(StoreError::backend)?;

      lines.push(OrderLine {
        id: line_id,
        order_id,
        product_id: line.product_id,
        quantity: line.quantity,
        unit_price_cents: line.unit_price_cents,
      });
    }

    sqlx::query("UPDATE cart_items SET deleted_at = now() WHERE cart_id = $1 AND deleted_at IS NULL")
      .bind(order.cart_id)
      .execute(&mut *tx)
      .await
      .map_err(StoreError::backend)?;

    tx.commit().await.map_err(StoreError::backend)?;
    debug!(%order_id, "Order committed.");

    Ok(Order {
      id: order_id,
      user_id: order.user_id,
      order_number: order.order_number,
      status,
      subtotal_cents: order.subtotal_cents,
      total_cents: order.total_cents,
      created_at: now,
      updated_at: now,
      lines,
    })
  }
}

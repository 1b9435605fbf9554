// core/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Paid,
  Shipped,
  Cancelled,
}

impl OrderStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Paid => "paid",
      OrderStatus::Shipped => "shipped",
      OrderStatus::Cancelled => "cancelled",
    }
  }

  pub fn parse(value: &str) -> Option<Self> {
    match value {
      "pending" => Some(OrderStatus::Pending),
      "paid" => Some(OrderStatus::Paid),
      "shipped" => Some(OrderStatus::Shipped),
      "cancelled" => Some(OrderStatus::Cancelled),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub unit_price_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub order_number: String,
  pub status: OrderStatus,
  pub subtotal_cents: i64,
  pub total_cents: i64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub lines: Vec<OrderLine>,
}

/// A priced cart line, ready to be persisted as an order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
  pub product_id: Uuid,
  pub quantity: i32,
  pub unit_price_cents: i64,
}

impl NewOrderLine {
  /// `None` when price times quantity overflows `i64`.
  pub fn line_total_cents(&self) -> Option<i64> {
    self.unit_price_cents.checked_mul(i64::from(self.quantity))
  }
}

/// Everything an `OrderStore` needs to place an order atomically: the order
/// header, its lines, and the cart whose items are consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
  pub user_id: Uuid,
  pub cart_id: Uuid,
  pub order_number: String,
  pub lines: Vec<NewOrderLine>,
  pub subtotal_cents: i64,
  pub total_cents: i64,
}

impl NewOrder {
  /// Totals the lines. `None` if any line total or the subtotal overflows.
  pub fn from_lines(user_id: Uuid, cart_id: Uuid, order_number: String, lines: Vec<NewOrderLine>) -> Option<Self> {
    let subtotal_cents = lines
      .iter()
      .try_fold(0i64, |acc, line| acc.checked_add(line.line_total_cents()?))?;
    Some(Self {
      user_id,
      cart_id,
      order_number,
      lines,
      subtotal_cents,
      // No discounts, tax or shipping are modelled yet.
      total_cents: subtotal_cents,
    })
  }
}

/// `ORD-YYYYMMDD-XXXXXXXX`, the suffix taken from a fresh v4 UUID.
pub fn generate_order_number(now: DateTime<Utc>) -> String {
  let suffix = Uuid::new_v4().simple().to_string();
  format!("ORD-{}-{}", now.format("%Y%m%d"), suffix[..8].to_uppercase())
}

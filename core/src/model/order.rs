// core/src/model/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{OrderId, OrderItemId, ProductId, UserId};

/// A persisted order together with its line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: OrderId,
  pub user_id: UserId,
  pub placed_at: DateTime<Utc>,
  pub items: Vec<OrderItem>,
}

impl Order {
  /// Total number of units across every line.
  pub fn total_units(&self) -> i64 {
    self.items.iter().map(|i| i64::from(i.quantity)).sum()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
  pub id: OrderItemId,
  pub order_id: OrderId,
  pub product_id: ProductId,
  pub quantity: i32,
}

/// A requested (product, quantity) pair. Quantities are validated by the workflow,
/// not by the type, so a malformed request can be reported as an argument error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
  pub product_id: ProductId,
  pub quantity: i32,
}

impl LineItem {
  pub fn new(product_id: ProductId, quantity: i32) -> Self {
    Self { product_id, quantity }
  }
}

/// A proposed order as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
  pub user_id: UserId,
  #[serde(default)]
  pub items: Vec<LineItem>,
}

impl OrderDraft {
  pub fn new(user_id: UserId, items: impl IntoIterator<Item = LineItem>) -> Self {
    Self {
      user_id,
      items: items.into_iter().collect(),
    }
  }
}

/// Replacement contents for an existing order. `id`, when given, must match the
/// order being revised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRevision {
  #[serde(default)]
  pub id: Option<OrderId>,
  pub user_id: UserId,
  #[serde(default)]
  pub items: Vec<LineItem>,
}

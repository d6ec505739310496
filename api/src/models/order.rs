// api/src/models/order.rs

use chrono::{DateTime, Utc};
use commerce_core::{Order, OrderItem};
use sqlx::FromRow;

/// `orders` header row. Items are loaded separately and attached with [`OrderRow::with_items`].
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
  pub id: i64,
  pub user_id: i64,
  pub placed_at: DateTime<Utc>,
}

impl OrderRow {
  pub fn with_items(self, items: Vec<OrderItem>) -> Order {
    Order {
      id: self.id,
      user_id: self.user_id,
      placed_at: self.placed_at,
      items,
    }
  }
}

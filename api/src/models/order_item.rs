// api/src/models/order_item.rs

use commerce_core::OrderItem;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct OrderItemRow {
  pub id: i64,
  pub order_id: i64,
  pub product_id: i64,
  pub quantity: i32,
}

impl From<OrderItemRow> for OrderItem {
  fn from(row: OrderItemRow) -> Self {
    OrderItem {
      id: row.id,
      order_id: row.order_id,
      product_id: row.product_id,
      quantity: row.quantity,
    }
  }
}

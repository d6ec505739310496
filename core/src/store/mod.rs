// core/src/store/mod.rs

//! The persistence gateway contract consumed by the order workflow.
//!
//! A [`Store`] hands out transactions; everything the workflow reads or writes goes
//! through one [`StoreTx`], so a workflow call either commits all of its effects or
//! none of them. Dropping a transaction without committing must discard its writes,
//! which is what makes a cancelled request safe.
//!
//! Implementations:
//! - [`memory::MemoryStore`]: serialised, in-process, with fault injection for tests.
//! - `PgStore` in the API crate: PostgreSQL through sqlx.

pub mod memory;

use crate::error::StoreResult;
use crate::model::{LineItem, Order, OrderId, OrderItem, Product, ProductId, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait Store: Send + Sync + 'static {
  type Tx: StoreTx;

  /// Opens a transaction with at least read-committed isolation.
  async fn begin(&self) -> StoreResult<Self::Tx>;
}

#[async_trait]
pub trait StoreTx: Send + Sized {
  async fn user_exists(&mut self, user_id: UserId) -> StoreResult<bool>;

  /// Batch-fetches products and locks their rows until the transaction ends.
  /// Ids that do not exist are simply absent from the result.
  async fn lock_products(&mut self, ids: &[ProductId]) -> StoreResult<Vec<Product>>;

  /// Removes `quantity` units from a product's stock if at least that many remain.
  /// Returns the new stock, or `None` when the guard did not hold.
  async fn debit_stock(&mut self, product_id: ProductId, quantity: i32) -> StoreResult<Option<i32>>;

  /// Returns `quantity` units to a product's stock.
  async fn credit_stock(&mut self, product_id: ProductId, quantity: i32) -> StoreResult<()>;

  /// Writes an order header and returns its assigned id.
  async fn insert_order(&mut self, user_id: UserId, placed_at: DateTime<Utc>) -> StoreResult<OrderId>;

  /// Writes the line items of an order, preserving their order.
  async fn insert_order_items(&mut self, order_id: OrderId, items: &[LineItem]) -> StoreResult<Vec<OrderItem>>;

  async fn find_order(&mut self, order_id: OrderId) -> StoreResult<Option<Order>>;

  async fn orders_for_user(&mut self, user_id: UserId) -> StoreResult<Vec<Order>>;

  async fn all_orders(&mut self) -> StoreResult<Vec<Order>>;

  /// Re-points an order at a (possibly different) owner.
  async fn update_order_owner(&mut self, order_id: OrderId, user_id: UserId) -> StoreResult<()>;

  /// Deletes every item of an order and returns what was removed.
  async fn delete_order_items(&mut self, order_id: OrderId) -> StoreResult<Vec<OrderItem>>;

  /// Deletes an order header, cascading to any remaining items. Returns false if it did not exist.
  async fn delete_order(&mut self, order_id: OrderId) -> StoreResult<bool>;

  async fn commit(self) -> StoreResult<()>;

  async fn rollback(self) -> StoreResult<()>;
}

// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use commerce_core::{
  Category, MemoryStore, NewProduct, NewUser, OrderBook, ProductId, RestockPolicy, Role, UserId,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::Level;

// --- Common Fixture ---
pub struct Fixture {
  pub store: Arc<MemoryStore>,
  pub book: OrderBook<MemoryStore>,
  pub customer: UserId,
  pub admin: UserId,
}

impl Fixture {
  pub async fn new() -> Self {
    Self::with_policy(RestockPolicy::Retain).await
  }

  pub async fn with_policy(policy: RestockPolicy) -> Self {
    let store = Arc::new(MemoryStore::new());
    let customer = store.add_user(new_user("grace", Role::Customer)).await;
    let admin = store.add_user(new_user("root", Role::Admin)).await;
    let book = OrderBook::new(store.clone()).with_restock_policy(policy);
    Self {
      store,
      book,
      customer,
      admin,
    }
  }

  /// Adds a product priced at 9.99 with the given stock.
  pub async fn product(&self, name: &str, stock: i32) -> ProductId {
    self
      .store
      .add_product(NewProduct::new(name, Decimal::new(999, 2), stock, Category::Other))
      .await
  }

  pub async fn stock(&self, product_id: ProductId) -> i32 {
    self.store.stock_of(product_id).await.expect("product exists")
  }

  /// (orders, order items) currently persisted.
  pub async fn row_counts(&self) -> (usize, usize) {
    (self.store.order_count().await, self.store.order_item_count().await)
  }
}

pub fn new_user(name: &str, role: Role) -> NewUser {
  NewUser {
    name: name.to_string(),
    email: Some(format!("{}@example.com", name)),
    credential_hash: String::new(),
    role,
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Journaling store: records the stock-touching calls a transaction makes ---
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use commerce_core::store::memory::MemoryTx;
use commerce_core::{
  LineItem, Order, OrderId, OrderItem, Product, Store, StoreResult, StoreTx,
};
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockCall {
  Lock(Vec<ProductId>),
  Debit(ProductId),
  Credit(ProductId),
}

/// Wraps a [`MemoryStore`] and journals lock, debit and credit calls per transaction.
#[derive(Clone)]
pub struct JournalStore {
  pub inner: Arc<MemoryStore>,
  pub journal: Arc<Mutex<Vec<Vec<StockCall>>>>,
}

impl JournalStore {
  pub fn new(inner: Arc<MemoryStore>) -> Self {
    Self {
      inner,
      journal: Arc::new(Mutex::new(Vec::new())),
    }
  }

  /// Calls recorded by committed transactions, one entry per transaction.
  pub fn committed(&self) -> Vec<Vec<StockCall>> {
    self.journal.lock().clone()
  }
}

#[async_trait]
impl Store for JournalStore {
  type Tx = JournalTx;

  async fn begin(&self) -> StoreResult<JournalTx> {
    Ok(JournalTx {
      inner: self.inner.begin().await?,
      calls: Vec::new(),
      journal: self.journal.clone(),
    })
  }
}

pub struct JournalTx {
  inner: MemoryTx,
  calls: Vec<StockCall>,
  journal: Arc<Mutex<Vec<Vec<StockCall>>>>,
}

#[async_trait]
impl StoreTx for JournalTx {
  async fn user_exists(&mut self, user_id: UserId) -> StoreResult<bool> {
    self.inner.user_exists(user_id).await
  }

  async fn lock_products(&mut self, ids: &[ProductId]) -> StoreResult<Vec<Product>> {
    self.calls.push(StockCall::Lock(ids.to_vec()));
    self.inner.lock_products(ids).await
  }

  async fn debit_stock(&mut self, product_id: ProductId, quantity: i32) -> StoreResult<Option<i32>> {
    self.calls.push(StockCall::Debit(product_id));
    self.inner.debit_stock(product_id, quantity).await
  }

  async fn credit_stock(&mut self, product_id: ProductId, quantity: i32) -> StoreResult<()> {
    self.calls.push(StockCall::Credit(product_id));
    self.inner.credit_stock(product_id, quantity).await
  }

  async fn insert_order(&mut self, user_id: UserId, placed_at: DateTime<Utc>) -> StoreResult<OrderId> {
    self.inner.insert_order(user_id, placed_at).await
  }

  async fn insert_order_items(&mut self, order_id: OrderId, items: &[LineItem]) -> StoreResult<Vec<OrderItem>> {
    self.inner.insert_order_items(order_id, items).await
  }

  async fn find_order(&mut self, order_id: OrderId) -> StoreResult<Option<Order>> {
    self.inner.find_order(order_id).await
  }

  async fn orders_for_user(&mut self, user_id: UserId) -> StoreResult<Vec<Order>> {
    self.inner.orders_for_user(user_id).await
  }

  async fn all_orders(&mut self) -> StoreResult<Vec<Order>> {
    self.inner.all_orders().await
  }

  async fn update_order_owner(&mut self, order_id: OrderId, user_id: UserId) -> StoreResult<()> {
    self.inner.update_order_owner(order_id, user_id).await
  }

  async fn delete_order_items(&mut self, order_id: OrderId) -> StoreResult<Vec<OrderItem>> {
    self.inner.delete_order_items(order_id).await
  }

  async fn delete_order(&mut self, order_id: OrderId) -> StoreResult<bool> {
    self.inner.delete_order(order_id).await
  }

  async fn commit(self) -> StoreResult<()> {
    self.inner.commit().await?;
    self.journal.lock().push(self.calls);
    Ok(())
  }

  async fn rollback(self) -> StoreResult<()> {
    self.inner.rollback().await
  }
}

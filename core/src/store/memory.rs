// core/src/store/memory.rs

//! An in-process [`Store`] with serialisable transactions.
//!
//! A transaction holds the table lock from `begin` until it is committed, rolled back
//! or dropped, and works on a private copy of the tables. Commit publishes the copy;
//! anything else throws it away. Foreign keys, `ON DELETE CASCADE` on order items and
//! the `stock >= 0` check are emulated so gateway-level integrity errors can be
//! exercised without a database.
//!
//! Faults can be armed per call site with [`MemoryStore::inject_fault`]; each one fires
//! once, on the next transaction that reaches that point.

use crate::error::{StoreError, StoreResult};
use crate::model::{
  LineItem, NewProduct, NewUser, Order, OrderId, OrderItem, OrderItemId, Product, ProductId, User, UserId,
};
use crate::store::{Store, StoreTx};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{event, Level};

/// Gateway call sites where a fault can be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
  LockProducts,
  DebitStock,
  InsertOrder,
  InsertOrderItems,
  DeleteOrderItems,
  Commit,
}

/// What an injected fault looks like to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
  /// Reported as an integrity violation (`StoreError::Constraint`).
  Constraint,
  /// Reported as an opaque backend failure (`StoreError::Backend`).
  Backend,
}

#[derive(Debug, Clone, Copy)]
struct OrderHeader {
  user_id: UserId,
  placed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Sequences {
  user: i64,
  product: i64,
  order: i64,
  item: i64,
}

fn bump(seq: &mut i64) -> i64 {
  *seq += 1;
  *seq
}

#[derive(Debug, Clone, Default)]
struct Tables {
  users: BTreeMap<UserId, User>,
  products: BTreeMap<ProductId, Product>,
  orders: BTreeMap<OrderId, OrderHeader>,
  items: BTreeMap<OrderItemId, OrderItem>,
  seq: Sequences,
}

impl Tables {
  fn assemble(&self, order_id: OrderId, header: &OrderHeader) -> Order {
    Order {
      id: order_id,
      user_id: header.user_id,
      placed_at: header.placed_at,
      items: self.items.values().filter(|i| i.order_id == order_id).cloned().collect(),
    }
  }
}

type FaultBoard = Arc<Mutex<HashMap<FaultPoint, FaultKind>>>;

#[derive(Clone, Default)]
pub struct MemoryStore {
  tables: Arc<AsyncMutex<Tables>>,
  faults: FaultBoard,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Arms a one-shot fault at `point`.
  pub fn inject_fault(&self, point: FaultPoint, kind: FaultKind) {
    self.faults.lock().insert(point, kind);
  }

  pub async fn add_user(&self, user: NewUser) -> UserId {
    let mut tables = self.tables.lock().await;
    let id = bump(&mut tables.seq.user);
    tables.users.insert(
      id,
      User {
        id,
        name: user.name,
        email: user.email,
        credential_hash: user.credential_hash,
        role: user.role,
      },
    );
    id
  }

  pub async fn add_product(&self, product: NewProduct) -> ProductId {
    let mut tables = self.tables.lock().await;
    let id = bump(&mut tables.seq.product);
    tables.products.insert(
      id,
      Product {
        id,
        name: product.name,
        description: product.description,
        price: product.price,
        stock: product.stock,
        category: product.category,
      },
    );
    id
  }

  /// Deletes a product row, honouring the `RESTRICT` rule from order items.
  pub async fn delete_product(&self, product_id: ProductId) -> StoreResult<bool> {
    let mut tables = self.tables.lock().await;
    if tables.items.values().any(|i| i.product_id == product_id) {
      return Err(StoreError::Constraint("order_items_product_id_fkey".to_string()));
    }
    Ok(tables.products.remove(&product_id).is_some())
  }

  pub async fn product(&self, product_id: ProductId) -> Option<Product> {
    self.tables.lock().await.products.get(&product_id).cloned()
  }

  pub async fn stock_of(&self, product_id: ProductId) -> Option<i32> {
    self.tables.lock().await.products.get(&product_id).map(|p| p.stock)
  }

  pub async fn order_count(&self) -> usize {
    self.tables.lock().await.orders.len()
  }

  pub async fn order_item_count(&self) -> usize {
    self.tables.lock().await.items.len()
  }
}

#[async_trait]
impl Store for MemoryStore {
  type Tx = MemoryTx;

  async fn begin(&self) -> StoreResult<MemoryTx> {
    let guard = self.tables.clone().lock_owned().await;
    let working = guard.clone();
    event!(Level::TRACE, "Memory transaction opened.");
    Ok(MemoryTx {
      guard,
      working,
      faults: self.faults.clone(),
    })
  }
}

pub struct MemoryTx {
  guard: OwnedMutexGuard<Tables>,
  working: Tables,
  faults: FaultBoard,
}

impl MemoryTx {
  fn trip(&self, point: FaultPoint) -> StoreResult<()> {
    match self.faults.lock().remove(&point) {
      None => Ok(()),
      Some(kind) => {
        event!(Level::DEBUG, ?point, ?kind, "Injected store fault fired.");
        Err(match kind {
          FaultKind::Constraint => StoreError::Constraint(format!("injected constraint violation at {:?}", point)),
          FaultKind::Backend => StoreError::backend(anyhow::anyhow!("injected backend failure at {:?}", point)),
        })
      }
    }
  }
}

#[async_trait]
impl StoreTx for MemoryTx {
  async fn user_exists(&mut self, user_id: UserId) -> StoreResult<bool> {
    Ok(self.working.users.contains_key(&user_id))
  }

  async fn lock_products(&mut self, ids: &[ProductId]) -> StoreResult<Vec<Product>> {
    self.trip(FaultPoint::LockProducts)?;
    // Every transaction already holds the table lock; nothing more to take here.
    Ok(ids.iter().filter_map(|id| self.working.products.get(id).cloned()).collect())
  }

  async fn debit_stock(&mut self, product_id: ProductId, quantity: i32) -> StoreResult<Option<i32>> {
    self.trip(FaultPoint::DebitStock)?;
    match self.working.products.get_mut(&product_id) {
      Some(product) if product.stock >= quantity => {
        product.stock -= quantity;
        Ok(Some(product.stock))
      }
      _ => Ok(None),
    }
  }

  async fn credit_stock(&mut self, product_id: ProductId, quantity: i32) -> StoreResult<()> {
    if let Some(product) = self.working.products.get_mut(&product_id) {
      product.stock += quantity;
      if product.stock < 0 {
        return Err(StoreError::Constraint("products_stock_check".to_string()));
      }
    }
    Ok(())
  }

  async fn insert_order(&mut self, user_id: UserId, placed_at: DateTime<Utc>) -> StoreResult<OrderId> {
    self.trip(FaultPoint::InsertOrder)?;
    if !self.working.users.contains_key(&user_id) {
      return Err(StoreError::Constraint("orders_user_id_fkey".to_string()));
    }
    let id = bump(&mut self.working.seq.order);
    self.working.orders.insert(id, OrderHeader { user_id, placed_at });
    Ok(id)
  }

  async fn insert_order_items(&mut self, order_id: OrderId, items: &[LineItem]) -> StoreResult<Vec<OrderItem>> {
    self.trip(FaultPoint::InsertOrderItems)?;
    if !self.working.orders.contains_key(&order_id) {
      return Err(StoreError::Constraint("order_items_order_id_fkey".to_string()));
    }
    let mut written = Vec::with_capacity(items.len());
    for line in items {
      if !self.working.products.contains_key(&line.product_id) {
        return Err(StoreError::Constraint("order_items_product_id_fkey".to_string()));
      }
      if line.quantity <= 0 {
        return Err(StoreError::Constraint("order_items_quantity_check".to_string()));
      }
      let id = bump(&mut self.working.seq.item);
      let item = OrderItem {
        id,
        order_id,
        product_id: line.product_id,
        quantity: line.quantity,
      };
      self.working.items.insert(id, item.clone());
      written.push(item);
    }
    Ok(written)
  }

  async fn find_order(&mut self, order_id: OrderId) -> StoreResult<Option<Order>> {
    Ok(
      self
        .working
        .orders
        .get(&order_id)
        .map(|header| self.working.assemble(order_id, header)),
    )
  }

  async fn orders_for_user(&mut self, user_id: UserId) -> StoreResult<Vec<Order>> {
    Ok(
      self
        .working
        .orders
        .iter()
        .filter(|(_, header)| header.user_id == user_id)
        .map(|(id, header)| self.working.assemble(*id, header))
        .collect(),
    )
  }

  async fn all_orders(&mut self) -> StoreResult<Vec<Order>> {
    Ok(
      self
        .working
        .orders
        .iter()
        .map(|(id, header)| self.working.assemble(*id, header))
        .collect(),
    )
  }

  async fn update_order_owner(&mut self, order_id: OrderId, user_id: UserId) -> StoreResult<()> {
    if !self.working.users.contains_key(&user_id) {
      return Err(StoreError::Constraint("orders_user_id_fkey".to_string()));
    }
    if let Some(header) = self.working.orders.get_mut(&order_id) {
      header.user_id = user_id;
    }
    Ok(())
  }

  async fn delete_order_items(&mut self, order_id: OrderId) -> StoreResult<Vec<OrderItem>> {
    self.trip(FaultPoint::DeleteOrderItems)?;
    let doomed: Vec<OrderItemId> = self
      .working
      .items
      .values()
      .filter(|i| i.order_id == order_id)
      .map(|i| i.id)
      .collect();
    Ok(doomed.iter().filter_map(|id| self.working.items.remove(id)).collect())
  }

  async fn delete_order(&mut self, order_id: OrderId) -> StoreResult<bool> {
    if self.working.orders.remove(&order_id).is_none() {
      return Ok(false);
    }
    self.working.items.retain(|_, item| item.order_id != order_id);
    Ok(true)
  }

  async fn commit(self) -> StoreResult<()> {
    self.trip(FaultPoint::Commit)?;
    let MemoryTx { mut guard, working, .. } = self;
    *guard = working;
    event!(Level::TRACE, "Memory transaction committed.");
    Ok(())
  }

  async fn rollback(self) -> StoreResult<()> {
    event!(Level::TRACE, "Memory transaction rolled back.");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{Category, Role};
  use rust_decimal::Decimal;

  fn customer() -> NewUser {
    NewUser {
      name: "ada".to_string(),
      email: None,
      credential_hash: String::new(),
      role: Role::Customer,
    }
  }

  #[tokio::test]
  async fn dropped_transaction_discards_writes() {
    let store = MemoryStore::new();
    let product = store
      .add_product(NewProduct::new("lamp", Decimal::new(1999, 2), 4, Category::Home))
      .await;

    {
      let mut tx = store.begin().await.unwrap();
      assert_eq!(tx.debit_stock(product, 3).await.unwrap(), Some(1));
    }

    assert_eq!(store.stock_of(product).await, Some(4));
  }

  #[tokio::test]
  async fn debit_guard_refuses_to_go_negative() {
    let store = MemoryStore::new();
    let product = store
      .add_product(NewProduct::new("lamp", Decimal::new(1999, 2), 2, Category::Home))
      .await;

    let mut tx = store.begin().await.unwrap();
    assert_eq!(tx.debit_stock(product, 3).await.unwrap(), None);
    assert_eq!(tx.debit_stock(product, 2).await.unwrap(), Some(0));
    tx.commit().await.unwrap();

    assert_eq!(store.stock_of(product).await, Some(0));
  }

  #[tokio::test]
  async fn order_header_requires_existing_user() {
    let store = MemoryStore::new();
    let mut tx = store.begin().await.unwrap();
    let err = tx.insert_order(42, Utc::now()).await.unwrap_err();
    assert!(matches!(err, StoreError::Constraint(ref c) if c == "orders_user_id_fkey"));
  }

  #[tokio::test]
  async fn referenced_product_cannot_be_deleted() {
    let store = MemoryStore::new();
    let user = store.add_user(customer()).await;
    let product = store
      .add_product(NewProduct::new("lamp", Decimal::new(1999, 2), 2, Category::Home))
      .await;

    let mut tx = store.begin().await.unwrap();
    let order = tx.insert_order(user, Utc::now()).await.unwrap();
    tx.insert_order_items(order, &[LineItem::new(product, 1)]).await.unwrap();
    tx.commit().await.unwrap();

    assert!(matches!(
      store.delete_product(product).await,
      Err(StoreError::Constraint(_))
    ));
  }

  #[tokio::test]
  async fn injected_fault_fires_once() {
    let store = MemoryStore::new();
    store.inject_fault(FaultPoint::Commit, FaultKind::Backend);

    let tx = store.begin().await.unwrap();
    assert!(matches!(tx.commit().await, Err(StoreError::Backend(_))));

    let tx = store.begin().await.unwrap();
    assert!(tx.commit().await.is_ok());
  }
}

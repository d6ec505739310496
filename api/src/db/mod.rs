// api/src/db/mod.rs

//! PostgreSQL implementation of the order store, plus pool setup and dev seeding.

pub mod seed;

use crate::errors::Result as AppResult;
use crate::models::{OrderItemRow, OrderRow, ProductRow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use commerce_core::{
  LineItem, Order, OrderId, OrderItem, Product, ProductId, Store, StoreError, StoreResult, StoreTx, UserId,
};
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use std::collections::HashMap;
use tracing::{event, instrument, Level};

const ORDER_ITEM_COLUMNS: &str = "id, order_id, product_id, quantity";

/// Sorts sqlx failures into the two kinds the order workflow distinguishes.
/// SQLSTATE class 23 (integrity constraint violation) becomes
/// [`StoreError::Constraint`] carrying the constraint name; everything else is a
/// backend failure.
pub fn classify(err: sqlx::Error) -> StoreError {
  if let sqlx::Error::Database(db_err) = &err {
    if db_err.code().is_some_and(|code| code.starts_with("23")) {
      let detail = db_err
        .constraint()
        .map(str::to_string)
        .unwrap_or_else(|| db_err.message().to_string());
      return StoreError::Constraint(detail);
    }
  }
  StoreError::backend(err)
}

#[instrument(name = "db::connect", skip_all, fields(max_connections = max_connections), err(Display))]
pub async fn connect(database_url: &SecretString, max_connections: u32) -> AppResult<PgPool> {
  let pool = PgPoolOptions::new()
    .max_connections(max_connections)
    .connect(database_url.expose_secret())
    .await?;
  event!(Level::INFO, "Successfully connected to the database.");
  Ok(pool)
}

#[instrument(name = "db::migrate", skip_all, err(Display))]
pub async fn migrate(pool: &PgPool) -> AppResult<()> {
  sqlx::migrate!("./migrations").run(pool).await?;
  event!(Level::INFO, "Database migrations applied.");
  Ok(())
}

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl Store for PgStore {
  type Tx = PgStoreTx;

  async fn begin(&self) -> StoreResult<PgStoreTx> {
    let tx = self.pool.begin().await.map_err(classify)?;
    Ok(PgStoreTx { tx })
  }
}

/// One open PostgreSQL transaction. Dropping it without `commit` rolls back.
pub struct PgStoreTx {
  tx: Transaction<'static, Postgres>,
}

impl PgStoreTx {
  async fn attach_items(&mut self, headers: Vec<OrderRow>) -> StoreResult<Vec<Order>> {
    if headers.is_empty() {
      return Ok(Vec::new());
    }
    let ids: Vec<OrderId> = headers.iter().map(|h| h.id).collect();
    let rows: Vec<OrderItemRow> = sqlx::query_as(&format!(
      "SELECT {} FROM order_items WHERE order_id = ANY($1) ORDER BY id",
      ORDER_ITEM_COLUMNS
    ))
    .bind(&ids)
    .fetch_all(&mut *self.tx)
    .await
    .map_err(classify)?;

    let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
    for row in rows {
      by_order.entry(row.order_id).or_default().push(row.into());
    }
    Ok(
      headers
        .into_iter()
        .map(|h| {
          let items = by_order.remove(&h.id).unwrap_or_default();
          h.with_items(items)
        })
        .collect(),
    )
  }
}

#[async_trait]
impl StoreTx for PgStoreTx {
  async fn user_exists(&mut self, user_id: UserId) -> StoreResult<bool> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
      .bind(user_id)
      .fetch_one(&mut *self.tx)
      .await
      .map_err(classify)
  }

  async fn lock_products(&mut self, ids: &[ProductId]) -> StoreResult<Vec<Product>> {
    let rows: Vec<ProductRow> = sqlx::query_as(
      "SELECT id, name, description, price, stock, category FROM products \
       WHERE id = ANY($1) ORDER BY id FOR UPDATE",
    )
    .bind(ids)
    .fetch_all(&mut *self.tx)
    .await
    .map_err(classify)?;
    rows.into_iter().map(Product::try_from).collect()
  }

  async fn debit_stock(&mut self, product_id: ProductId, quantity: i32) -> StoreResult<Option<i32>> {
    sqlx::query_scalar("UPDATE products SET stock = stock - $1 WHERE id = $2 AND stock >= $1 RETURNING stock")
      .bind(quantity)
      .bind(product_id)
      .fetch_optional(&mut *self.tx)
      .await
      .map_err(classify)
  }

  async fn credit_stock(&mut self, product_id: ProductId, quantity: i32) -> StoreResult<()> {
    sqlx::query("UPDATE products SET stock = stock + $1 WHERE id = $2")
      .bind(quantity)
      .bind(product_id)
      .execute(&mut *self.tx)
      .await
      .map_err(classify)?;
    Ok(())
  }

  async fn insert_order(&mut self, user_id: UserId, placed_at: DateTime<Utc>) -> StoreResult<OrderId> {
    sqlx::query_scalar("INSERT INTO orders (user_id, placed_at) VALUES ($1, $2) RETURNING id")
      .bind(user_id)
      .bind(placed_at)
      .fetch_one(&mut *self.tx)
      .await
      .map_err(classify)
  }

  async fn insert_order_items(&mut self, order_id: OrderId, items: &[LineItem]) -> StoreResult<Vec<OrderItem>> {
    let sql = format!(
      "INSERT INTO order_items (order_id, product_id, quantity) VALUES ($1, $2, $3) RETURNING {}",
      ORDER_ITEM_COLUMNS
    );
    let mut written = Vec::with_capacity(items.len());
    for line in items {
      let row: OrderItemRow = sqlx::query_as(&sql)
        .bind(order_id)
        .bind(line.product_id)
        .bind(line.quantity)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(classify)?;
      written.push(row.into());
    }
    Ok(written)
  }

  async fn find_order(&mut self, order_id: OrderId) -> StoreResult<Option<Order>> {
    let header: Option<OrderRow> = sqlx::query_as("SELECT id, user_id, placed_at FROM orders WHERE id = $1")
      .bind(order_id)
      .fetch_optional(&mut *self.tx)
      .await
      .map_err(classify)?;
    match header {
      Some(header) => Ok(self.attach_items(vec![header]).await?.pop()),
      None => Ok(None),
    }
  }

  async fn orders_for_user(&mut self, user_id: UserId) -> StoreResult<Vec<Order>> {
    let headers: Vec<OrderRow> =
      sqlx::query_as("SELECT id, user_id, placed_at FROM orders WHERE user_id = $1 ORDER BY id")
        .bind(user_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(classify)?;
    self.attach_items(headers).await
  }

  async fn all_orders(&mut self) -> StoreResult<Vec<Order>> {
    let headers: Vec<OrderRow> = sqlx::query_as("SELECT id, user_id, placed_at FROM orders ORDER BY id")
      .fetch_all(&mut *self.tx)
      .await
      .map_err(classify)?;
    self.attach_items(headers).await
  }

  async fn update_order_owner(&mut self, order_id: OrderId, user_id: UserId) -> StoreResult<()> {
    sqlx::query("UPDATE orders SET user_id = $1 WHERE id = $2")
      .bind(user_id)
      .bind(order_id)
      .execute(&mut *self.tx)
      .await
      .map_err(classify)?;
    Ok(())
  }

  async fn delete_order_items(&mut self, order_id: OrderId) -> StoreResult<Vec<OrderItem>> {
    let mut rows: Vec<OrderItemRow> = sqlx::query_as(&format!(
      "DELETE FROM order_items WHERE order_id = $1 RETURNING {}",
      ORDER_ITEM_COLUMNS
    ))
    .bind(order_id)
    .fetch_all(&mut *self.tx)
    .await
    .map_err(classify)?;
    rows.sort_by_key(|r| r.id);
    Ok(rows.into_iter().map(OrderItem::from).collect())
  }

  async fn delete_order(&mut self, order_id: OrderId) -> StoreResult<bool> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1")
      .bind(order_id)
      .execute(&mut *self.tx)
      .await
      .map_err(classify)?;
    Ok(result.rows_affected() > 0)
  }

  async fn commit(self) -> StoreResult<()> {
    self.tx.commit().await.map_err(classify)
  }

  async fn rollback(self) -> StoreResult<()> {
    self.tx.rollback().await.map_err(classify)
  }
}

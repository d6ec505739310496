// core/src/queries.rs

//! Read-only order lookups. Every read goes to the store; nothing is cached.

use crate::book::{finish, OrderBook};
use crate::error::{Entity, OrderError, OrderResult};
use crate::model::{Order, OrderId, UserId};
use crate::store::{Store, StoreTx};
use tracing::instrument;

impl<S: Store> OrderBook<S> {
  #[instrument(name = "OrderBook::order", skip(self), err(Display))]
  pub async fn order(&self, order_id: OrderId) -> OrderResult<Order> {
    let mut tx = self.store.begin().await?;
    let outcome = match tx.find_order(order_id).await {
      Ok(Some(order)) => Ok(order),
      Ok(None) => Err(OrderError::NotFound {
        entity: Entity::Order,
        id: order_id,
      }),
      Err(e) => Err(e.into()),
    };
    finish(tx, outcome).await
  }

  #[instrument(name = "OrderBook::orders_for_user", skip(self), err(Display))]
  pub async fn orders_for_user(&self, user_id: UserId) -> OrderResult<Vec<Order>> {
    let mut tx = self.store.begin().await?;
    let outcome = tx.orders_for_user(user_id).await.map_err(OrderError::from);
    finish(tx, outcome).await
  }

  #[instrument(name = "OrderBook::all_orders", skip(self), err(Display))]
  pub async fn all_orders(&self) -> OrderResult<Vec<Order>> {
    let mut tx = self.store.begin().await?;
    let outcome = tx.all_orders().await.map_err(OrderError::from);
    finish(tx, outcome).await
  }
}

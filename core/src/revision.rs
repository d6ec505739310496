// core/src/revision.rs

//! Replacing the contents of an existing order, and deleting one.
//!
//! Under [`RestockPolicy::Retain`] neither operation touches stock, which keeps the
//! long-standing behaviour of the service: stock only moves when an order is first
//! assembled. [`RestockPolicy::Restore`] makes both operations stock-symmetric.

use crate::assembly::{debit_lines, validate_lines};
use crate::book::{finish, OrderBook, RestockPolicy};
use crate::error::{Entity, OrderError, OrderResult};
use crate::ledger::StockLedger;
use crate::model::{LineItem, Order, OrderId, OrderItem, OrderRevision, ProductId};
use crate::store::{Store, StoreTx};
use tracing::{event, instrument, Level};

/// Returns the quantities of `removed` to stock.
///
/// Every product the transaction is about to write (the removed lines plus any
/// `incoming` lines that will be debited afterwards) is locked up front in ascending
/// id order, and credits are applied in that same order.
async fn credit_items<T: StoreTx>(tx: &mut T, removed: &[OrderItem], incoming: &[LineItem]) -> OrderResult<()> {
  let mut lock_order: Vec<ProductId> = removed
    .iter()
    .map(|i| i.product_id)
    .chain(incoming.iter().map(|l| l.product_id))
    .collect();
  lock_order.sort_unstable();
  lock_order.dedup();
  if lock_order.is_empty() {
    return Ok(());
  }
  tx.lock_products(&lock_order).await?;

  let mut items: Vec<&OrderItem> = removed.iter().collect();
  items.sort_by_key(|i| i.product_id);
  for item in items {
    tx.credit_stock(item.product_id, item.quantity).await?;
    event!(
      Level::DEBUG,
      product_id = item.product_id,
      credited = item.quantity,
      "Stock credited."
    );
  }
  Ok(())
}

impl<S: Store> OrderBook<S> {
  /// Replaces the item set of order `order_id` wholesale and re-points its owner.
  ///
  /// Fails with [`OrderError::NotFound`] when the order does not exist.
  #[instrument(
    name = "OrderBook::update_order",
    skip(self, revision),
    fields(user_id = revision.user_id, lines = revision.items.len(), restock = %self.restock),
    err(Display)
  )]
  pub async fn update_order(&self, order_id: OrderId, revision: OrderRevision) -> OrderResult<Order> {
    if let Some(body_id) = revision.id {
      if body_id != order_id {
        return Err(OrderError::InvalidArgument(format!(
          "Order data is invalid: body id {} does not match order {}.",
          body_id, order_id
        )));
      }
    }
    validate_lines(&revision.items)?;

    let mut tx = self.store.begin().await?;
    let outcome = self.revise(&mut tx, order_id, &revision).await;
    let order = finish(tx, outcome).await?;
    event!(Level::INFO, order_id, lines = order.items.len(), "Order revised.");
    Ok(order)
  }

  async fn revise(&self, tx: &mut S::Tx, order_id: OrderId, revision: &OrderRevision) -> OrderResult<Order> {
    let existing = tx.find_order(order_id).await?.ok_or(OrderError::NotFound {
      entity: Entity::Order,
      id: order_id,
    })?;
    if !tx.user_exists(revision.user_id).await? {
      return Err(OrderError::missing(Entity::User, vec![revision.user_id]));
    }
    if existing.user_id != revision.user_id {
      tx.update_order_owner(order_id, revision.user_id).await?;
    }

    let removed = tx.delete_order_items(order_id).await?;
    if self.restock == RestockPolicy::Restore {
      credit_items(tx, &removed, &revision.items).await?;
      let products = StockLedger::check(tx, &revision.items).await?;
      debit_lines(tx, &revision.items, &products).await?;
    }
    let items = tx.insert_order_items(order_id, &revision.items).await?;

    Ok(Order {
      id: order_id,
      user_id: revision.user_id,
      placed_at: existing.placed_at,
      items,
    })
  }

  /// Deletes an order and its items. Returns the order as it was before deletion.
  #[instrument(name = "OrderBook::delete_order", skip(self), fields(restock = %self.restock), err(Display))]
  pub async fn delete_order(&self, order_id: OrderId) -> OrderResult<Order> {
    let mut tx = self.store.begin().await?;
    let outcome = self.remove(&mut tx, order_id).await;
    let order = finish(tx, outcome).await?;
    event!(Level::INFO, order_id, "Order deleted.");
    Ok(order)
  }

  async fn remove(&self, tx: &mut S::Tx, order_id: OrderId) -> OrderResult<Order> {
    let not_found = || OrderError::NotFound {
      entity: Entity::Order,
      id: order_id,
    };
    let existing = tx.find_order(order_id).await?.ok_or_else(not_found)?;
    let removed = tx.delete_order_items(order_id).await?;
    if self.restock == RestockPolicy::Restore {
      credit_items(tx, &removed, &[]).await?;
    }
    if !tx.delete_order(order_id).await? {
      return Err(not_found());
    }
    Ok(existing)
  }
}

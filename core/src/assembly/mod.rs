// core/src/assembly/mod.rs

//! Order assembly: validated, atomic creation of an order and its items, coupled
//! with the stock debit. This is the only code path that takes stock away.

pub mod stage;

pub use stage::AssemblyStage;

use crate::book::{finish, OrderBook};
use crate::error::{Entity, OrderError, OrderResult};
use crate::ledger::StockLedger;
use crate::model::{LineItem, Order, OrderDraft, Product, ProductId};
use crate::store::{Store, StoreTx};
use chrono::Utc;
use stage::StageTracker;
use std::collections::HashMap;
use tracing::{event, instrument, Level, Span};

/// Structural checks shared by creation and revision: at least one line, and a
/// positive quantity on every line.
pub(crate) fn validate_lines(items: &[LineItem]) -> OrderResult<()> {
  if items.is_empty() {
    return Err(OrderError::InvalidArgument(
      "Order must contain at least one item.".to_string(),
    ));
  }
  if let Some(bad) = items.iter().find(|i| i.quantity <= 0) {
    return Err(OrderError::InvalidArgument(format!(
      "Quantity for product {} must be a positive integer, got {}.",
      bad.product_id, bad.quantity
    )));
  }
  Ok(())
}

/// Debits every line from stock. The ledger check has already run under row locks,
/// so a guard miss here means the store disagrees with what was just read; it is
/// reported as insufficient stock with the stock the store now holds.
pub(crate) async fn debit_lines<T: StoreTx>(
  tx: &mut T,
  items: &[LineItem],
  products: &HashMap<ProductId, Product>,
) -> OrderResult<()> {
  for item in items {
    match tx.debit_stock(item.product_id, item.quantity).await? {
      Some(remaining) => {
        event!(
          Level::DEBUG,
          product_id = item.product_id,
          debited = item.quantity,
          remaining,
          "Stock debited."
        );
      }
      None => {
        let available = tx
          .lock_products(&[item.product_id])
          .await?
          .first()
          .map(|p| p.stock)
          .or_else(|| products.get(&item.product_id).map(|p| p.stock))
          .unwrap_or_default();
        event!(
          Level::WARN,
          product_id = item.product_id,
          available,
          requested = item.quantity,
          "Guarded stock debit refused."
        );
        return Err(OrderError::InsufficientStock {
          product_id: item.product_id,
          available,
          requested: item.quantity,
        });
      }
    }
  }
  Ok(())
}

impl<S: Store> OrderBook<S> {
  /// Creates an order from a client draft.
  ///
  /// A `None` draft or an empty/invalid item list fails with
  /// [`OrderError::InvalidArgument`]; an unknown user or product with
  /// [`OrderError::ReferentialIntegrity`]; a line the stock cannot cover with
  /// [`OrderError::InsufficientStock`]. Once the checks pass, stock debits, the
  /// order header and its items are written in one transaction. Any store failure
  /// rolls all of it back and is returned as [`OrderError::ConstraintViolation`] or
  /// [`OrderError::Persistence`].
  #[instrument(
    name = "OrderBook::create_order",
    skip_all,
    fields(user_id = tracing::field::Empty, lines = tracing::field::Empty, order_id = tracing::field::Empty),
    err(Display)
  )]
  pub async fn create_order(&self, draft: Option<OrderDraft>) -> OrderResult<Order> {
    let mut stage = StageTracker::new();

    let draft = match draft {
      Some(draft) => draft,
      None => {
        stage.abort();
        return Err(OrderError::InvalidArgument("Order cannot be null.".to_string()));
      }
    };
    let span = Span::current();
    span.record("user_id", draft.user_id);
    span.record("lines", draft.items.len());

    if let Err(err) = validate_lines(&draft.items) {
      stage.abort();
      return Err(err);
    }

    let mut tx = match self.store.begin().await {
      Ok(tx) => tx,
      Err(err) => {
        stage.abort();
        return Err(err.into());
      }
    };
    let outcome = self.assemble(&mut tx, &draft, &mut stage).await;
    match finish(tx, outcome).await {
      Ok(order) => {
        stage.advance(AssemblyStage::Committed)?;
        span.record("order_id", order.id);
        event!(
          Level::INFO,
          order_id = order.id,
          user_id = order.user_id,
          units = order.total_units(),
          "Order committed."
        );
        Ok(order)
      }
      Err(err) => {
        event!(Level::WARN, stage = ?stage.stage(), error = %err, "Order assembly aborted.");
        stage.abort();
        Err(err)
      }
    }
  }

  async fn assemble(&self, tx: &mut S::Tx, draft: &OrderDraft, stage: &mut StageTracker) -> OrderResult<Order> {
    if !tx.user_exists(draft.user_id).await? {
      event!(Level::WARN, user_id = draft.user_id, "Order references a user that does not exist.");
      return Err(OrderError::missing(Entity::User, vec![draft.user_id]));
    }
    stage.advance(AssemblyStage::Validated)?;

    let products = StockLedger::check(tx, &draft.items).await?;
    stage.advance(AssemblyStage::StockChecked)?;

    debit_lines(tx, &draft.items, &products).await?;
    // Items carry a foreign key to the header, so the header goes in first.
    let placed_at = Utc::now();
    let order_id = tx.insert_order(draft.user_id, placed_at).await?;
    let items = tx.insert_order_items(order_id, &draft.items).await?;

    Ok(Order {
      id: order_id,
      user_id: draft.user_id,
      placed_at,
      items,
    })
  }
}

// core/src/ledger.rs

//! The stock ledger check: a read-only precondition for committing order lines.

use crate::error::{Entity, OrderError, OrderResult};
use crate::model::{LineItem, Product, ProductId};
use crate::store::StoreTx;
use std::collections::{HashMap, HashSet};
use tracing::{event, instrument, Level};

pub struct StockLedger;

impl StockLedger {
  /// Confirms that every referenced product exists and can cover the requested
  /// quantities, and returns the matched products keyed by id.
  ///
  /// Products are fetched in one batch through [`StoreTx::lock_products`], so the
  /// rows stay locked until the surrounding transaction ends. Lines naming the same
  /// product draw on one running balance.
  #[instrument(name = "StockLedger::check", skip_all, fields(lines = items.len()), err(Display))]
  pub async fn check<T: StoreTx>(tx: &mut T, items: &[LineItem]) -> OrderResult<HashMap<ProductId, Product>> {
    let mut seen = HashSet::new();
    let requested: Vec<ProductId> = items
      .iter()
      .map(|i| i.product_id)
      .filter(|id| seen.insert(*id))
      .collect();

    // Ascending lock order keeps two overlapping orders from deadlocking each other.
    let mut lock_order = requested.clone();
    lock_order.sort_unstable();
    let found: HashMap<ProductId, Product> = tx
      .lock_products(&lock_order)
      .await?
      .into_iter()
      .map(|p| (p.id, p))
      .collect();

    let missing: Vec<ProductId> = requested.into_iter().filter(|id| !found.contains_key(id)).collect();
    if !missing.is_empty() {
      event!(Level::WARN, ?missing, "Order references products that do not exist.");
      return Err(OrderError::missing(Entity::Product, missing));
    }

    let mut balance: HashMap<ProductId, i32> = found.values().map(|p| (p.id, p.stock)).collect();
    for item in items {
      let available = balance.get(&item.product_id).copied().unwrap_or_default();
      if available < item.quantity {
        event!(
          Level::WARN,
          product_id = item.product_id,
          available,
          requested = item.quantity,
          "Insufficient stock."
        );
        return Err(OrderError::InsufficientStock {
          product_id: item.product_id,
          available,
          requested: item.quantity,
        });
      }
      balance.insert(item.product_id, available - item.quantity);
    }

    event!(Level::DEBUG, products = found.len(), "Stock ledger check passed.");
    Ok(found)
  }
}

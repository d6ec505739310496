// core/src/book.rs

//! Defines [`OrderBook`], the entry point for every order operation, and the
//! transaction bookkeeping its operations share.
//!
//! The operations themselves live next to the concern they implement:
//! creation in [`crate::assembly`], revision and removal in [`crate::revision`],
//! reads in [`crate::queries`].

use crate::error::{OrderError, OrderResult};
use crate::store::{Store, StoreTx};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{event, Level};

/// What happens to product stock when an existing order is revised or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestockPolicy {
  /// Stock is only ever debited by order creation. Revising an order does not
  /// re-check or re-debit stock and deleting one does not give it back.
  #[default]
  Retain,
  /// Deleting an order credits its quantities back; revising one credits the old
  /// lines, re-runs the stock ledger check on the new lines and debits them.
  Restore,
}

impl fmt::Display for RestockPolicy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      RestockPolicy::Retain => "retain",
      RestockPolicy::Restore => "restore",
    })
  }
}

impl FromStr for RestockPolicy {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "retain" => Ok(RestockPolicy::Retain),
      "restore" => Ok(RestockPolicy::Restore),
      other => Err(format!("unknown restock policy '{}' (expected 'retain' or 'restore')", other)),
    }
  }
}

/// Order operations over a persistence gateway `S`.
///
/// Each call runs in exactly one store transaction. On failure the transaction is
/// rolled back before the error is returned, so no partial state is ever visible.
pub struct OrderBook<S: Store> {
  pub(crate) store: Arc<S>,
  pub(crate) restock: RestockPolicy,
}

impl<S: Store> OrderBook<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      restock: RestockPolicy::default(),
    }
  }

  pub fn with_restock_policy(mut self, policy: RestockPolicy) -> Self {
    self.restock = policy;
    self
  }

  pub fn restock_policy(&self) -> RestockPolicy {
    self.restock
  }

  pub fn store(&self) -> &Arc<S> {
    &self.store
  }
}

impl<S: Store> Clone for OrderBook<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      restock: self.restock,
    }
  }
}

/// Commits `tx` if `outcome` succeeded, otherwise rolls it back and hands the
/// original error back. A failed rollback is logged and does not replace the cause.
pub(crate) async fn finish<T: StoreTx, V>(tx: T, outcome: OrderResult<V>) -> OrderResult<V> {
  match outcome {
    Ok(value) => {
      tx.commit().await.map_err(|e| {
        event!(Level::ERROR, error = %e, "Commit failed; transaction discarded.");
        OrderError::from(e)
      })?;
      Ok(value)
    }
    Err(cause) => {
      if let Err(rollback_err) = tx.rollback().await {
        event!(Level::ERROR, error = %rollback_err, cause = %cause, "Rollback failed.");
      } else {
        event!(Level::DEBUG, cause = %cause, "Transaction rolled back.");
      }
      Err(cause)
    }
  }
}

// api/src/state.rs
use commerce_core::{OrderBook, Store};

/// Shared per-worker state. Generic over the store so handlers run unchanged
/// against PostgreSQL in production and the in-memory store in tests.
pub struct AppState<S: Store> {
  pub order_book: OrderBook<S>,
}

impl<S: Store> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      order_book: self.order_book.clone(),
    }
  }
}

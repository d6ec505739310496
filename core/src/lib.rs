// src/lib.rs

//! commerce-core: the order workflow of a relational commerce backend.
//!
//! The crate owns the parts of the system with real invariants:
//!  - **Stock ledger check** ([`ledger::StockLedger`]): every referenced product exists
//!    and has enough stock for the requested quantities.
//!  - **Order assembly** ([`OrderBook::create_order`]): validate, debit stock, write the
//!    order and its items, all in one transaction or not at all.
//!  - **Revision and removal** ([`OrderBook::update_order`], [`OrderBook::delete_order`])
//!    with a configurable [`RestockPolicy`].
//!  - **Queries** ([`OrderBook::order`], [`OrderBook::orders_for_user`], [`OrderBook::all_orders`]).
//!
//! Persistence is reached only through the [`store::Store`] / [`store::StoreTx`]
//! contract. HTTP, SQL and authentication live in the API crate.

/*
    Creating an order:
    1. Wrap a gateway in an `Arc` and build an `OrderBook` over it.
    2. Call `order_book.create_order(Some(OrderDraft::new(user_id, lines))).await`.
    3. On `Ok(order)` the stock debits, the header and the items are durable.
       On `Err(e)` nothing was written; match on `OrderError` to decide how to report it.
*/

pub mod assembly;
pub mod book;
pub mod error;
pub mod ledger;
pub mod model;
pub mod queries;
pub mod revision;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::assembly::AssemblyStage;
pub use crate::book::{OrderBook, RestockPolicy};
pub use crate::error::{Entity, OrderError, OrderResult, StoreError, StoreResult};
pub use crate::ledger::StockLedger;
pub use crate::model::{
  Category, LineItem, NewProduct, NewUser, Order, OrderDraft, OrderId, OrderItem, OrderItemId, OrderRevision, Product,
  ProductId, Role, User, UserId,
};
pub use crate::store::memory::MemoryStore;
pub use crate::store::{Store, StoreTx};

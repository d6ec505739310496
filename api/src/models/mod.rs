// api/src/models/mod.rs

//! Row shapes read from PostgreSQL, converted into the core's domain records.

pub mod order;
pub mod order_item;
pub mod product;

pub use order::OrderRow;
pub use order_item::OrderItemRow;
pub use product::ProductRow;

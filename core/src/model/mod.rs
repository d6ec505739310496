// core/src/model/mod.rs

//! Domain records shared by the order workflow and every persistence gateway.

pub mod order;
pub mod product;
pub mod user;

pub use order::{LineItem, Order, OrderDraft, OrderItem, OrderRevision};
pub use product::{Category, NewProduct, Product};
pub use user::{NewUser, Role, User};

pub type UserId = i64;
pub type ProductId = i64;
pub type OrderId = i64;
pub type OrderItemId = i64;

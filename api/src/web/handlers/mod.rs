// api/src/web/handlers/mod.rs

pub mod order_handlers;

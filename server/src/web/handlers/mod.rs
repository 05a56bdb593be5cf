// atelier_server/src/web/handlers/mod.rs

pub mod order_handlers;
pub mod quote_handlers;

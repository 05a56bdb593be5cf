// atelier_server/src/db/mod.rs

//! PostgreSQL persistence for orders.

pub mod pg_order_store;

pub use pg_order_store::PgOrderStore;

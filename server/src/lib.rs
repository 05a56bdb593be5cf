// atelier_server/src/lib.rs

//! HTTP front end for the atelier configurator: order submission, quotes and
//! exchange rates over actix-web, with PostgreSQL or in-memory order storage.

pub mod config;
pub mod db;
pub mod errors;
pub mod services;
pub mod startup;
pub mod state;
pub mod web;

pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use state::AppState;

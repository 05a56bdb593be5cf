// atelier_server/src/services/mod.rs

pub mod exchange_rates;

pub use exchange_rates::ExchangeRatesApiSource;

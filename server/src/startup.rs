// atelier_server/src/startup.rs

//! Wires configuration into stores, the rate cache and the submission service.

use crate::config::AppConfig;
use crate::db::PgOrderStore;
use crate::errors::{AppError, Result};
use crate::services::ExchangeRatesApiSource;
use crate::state::AppState;
use atelier::{
  CachedRates, InMemoryOrderStore, LocalImageStore, OrderStoreRef, OrderSubmissionService, RateSource, StaticRateSource,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Public path prefix the upload directory is served under.
pub const UPLOADS_PATH: &str = "/uploads";

pub async fn build_order_store(config: &AppConfig) -> Result<OrderStoreRef> {
  match &config.database_url {
    Some(url) => {
      let store = PgOrderStore::connect(url).await?;
      store.ensure_schema().await?;
      Ok(Arc::new(store))
    }
    None => {
      warn!("DATABASE_URL is not set; orders are kept in memory and lost on restart.");
      Ok(Arc::new(InMemoryOrderStore::default()))
    }
  }
}

pub fn build_rate_source(config: &AppConfig) -> Result<Arc<dyn RateSource>> {
  match &config.rates_api_key {
    Some(key) => {
      let source = ExchangeRatesApiSource::new(&config.rates_api_url, key, config.rates_timeout)?;
      info!(url = %config.rates_api_url, "Using live exchange rates.");
      Ok(Arc::new(source))
    }
    None => {
      info!("RATES_API_KEY is not set; using built-in exchange rates.");
      Ok(Arc::new(StaticRateSource::default()))
    }
  }
}

pub async fn build_state(config: &AppConfig) -> Result<AppState> {
  let orders = build_order_store(config).await?;
  let images = LocalImageStore::open(&config.upload_dir, UPLOADS_PATH).await?;
  let rates = CachedRates::new(build_rate_source(config)?, config.rates_ttl).with_retry_after(config.rates_retry_after);

  let submission_service = OrderSubmissionService::new(orders, Arc::new(images), config.price_policy)
    .map_err(|e| AppError::Internal(format!("Failed to build submission pipeline: {}", e)))?;

  Ok(AppState {
    submission_service: Arc::new(submission_service),
    rates: Arc::new(rates),
  })
}

// atelier_server/src/config.rs

use crate::errors::{AppError, Result};
use atelier::{PricePolicy, DEFAULT_RETRY_AFTER};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_RATES_API_URL: &str = "https://api.exchangeratesapi.io/v1/latest";

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// Without a database URL orders are kept in memory and lost on restart.
  pub database_url: Option<String>,
  pub upload_dir: PathBuf,

  pub rates_api_url: String,
  pub rates_api_key: Option<String>,
  pub rates_ttl: Duration,
  pub rates_timeout: Duration,
  /// How long to serve cached or built-in rates after a failed refresh.
  pub rates_retry_after: Duration,

  pub price_policy: PricePolicy,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      database_url: None,
      upload_dir: PathBuf::from("./uploads"),
      rates_api_url: DEFAULT_RATES_API_URL.to_string(),
      rates_api_key: None,
      rates_ttl: Duration::from_secs(3600),
      rates_timeout: Duration::from_secs(5),
      rates_retry_after: DEFAULT_RETRY_AFTER,
      price_policy: PricePolicy::default(),
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the configuration from an arbitrary variable lookup. Empty values count as unset.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_env = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let defaults = Self::default();

    let server_host = get_env("SERVER_HOST").unwrap_or(defaults.server_host);
    let server_port = match get_env("SERVER_PORT") {
      Some(raw) => raw
        .parse::<u16>()
        .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?,
      None => defaults.server_port,
    };
    let upload_dir = get_env("UPLOAD_DIR").map(PathBuf::from).unwrap_or(defaults.upload_dir);

    let rates_api_url = get_env("RATES_API_URL").unwrap_or(defaults.rates_api_url);
    let rates_ttl = seconds(get_env("RATES_TTL_SECS"), "RATES_TTL_SECS")?.unwrap_or(defaults.rates_ttl);
    let rates_timeout = seconds(get_env("RATES_TIMEOUT_SECS"), "RATES_TIMEOUT_SECS")?.unwrap_or(defaults.rates_timeout);
    let rates_retry_after =
      seconds(get_env("RATES_RETRY_SECS"), "RATES_RETRY_SECS")?.unwrap_or(defaults.rates_retry_after);

    let price_policy = match get_env("PRICE_POLICY") {
      Some(raw) => raw
        .parse::<PricePolicy>()
        .map_err(|e| AppError::Config(format!("Invalid PRICE_POLICY: {}", e)))?,
      None => defaults.price_policy,
    };

    let config = Self {
      server_host,
      server_port,
      database_url: get_env("DATABASE_URL"),
      upload_dir,
      rates_api_url,
      rates_api_key: get_env("RATES_API_KEY"),
      rates_ttl,
      rates_timeout,
      rates_retry_after,
      price_policy,
    };

    tracing::info!(
      persistent_store = config.database_url.is_some(),
      live_rates = config.rates_api_key.is_some(),
      price_policy = %config.price_policy,
      "Application configuration loaded successfully."
    );
    Ok(config)
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn seconds(raw: Option<String>, name: &str) -> Result<Option<Duration>> {
  raw
    .map(|value| {
      value
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e)))
    })
    .transpose()
}

// tests/config_tests.rs

use atelier::PricePolicy;
use atelier_server::{AppConfig, AppError};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, AppError> {
  let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
  AppConfig::from_lookup(|name| vars.get(name).cloned())
}

#[test]
fn test_defaults_apply_when_nothing_is_set() {
  let config = config_from(&[]).unwrap();
  assert_eq!(config.bind_address(), "127.0.0.1:8080");
  assert_eq!(config.database_url, None);
  assert_eq!(config.upload_dir, PathBuf::from("./uploads"));
  assert_eq!(config.rates_api_key, None);
  assert_eq!(config.rates_ttl, Duration::from_secs(3600));
  assert_eq!(config.rates_timeout, Duration::from_secs(5));
  assert_eq!(config.rates_retry_after, Duration::from_secs(30));
  assert_eq!(config.price_policy, PricePolicy::Recompute);
}

#[test]
fn test_values_are_read_from_environment() {
  let config = config_from(&[
    ("SERVER_HOST", "0.0.0.0"),
    ("SERVER_PORT", "9000"),
    ("DATABASE_URL", "postgres://localhost/atelier"),
    ("UPLOAD_DIR", "/var/lib/atelier/uploads"),
    ("RATES_API_KEY", "secret"),
    ("RATES_TTL_SECS", "60"),
    ("RATES_TIMEOUT_SECS", "2"),
    ("RATES_RETRY_SECS", "120"),
    ("PRICE_POLICY", "reject_mismatch"),
  ])
  .unwrap();

  assert_eq!(config.bind_address(), "0.0.0.0:9000");
  assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/atelier"));
  assert_eq!(config.upload_dir, PathBuf::from("/var/lib/atelier/uploads"));
  assert_eq!(config.rates_api_key.as_deref(), Some("secret"));
  assert_eq!(config.rates_ttl, Duration::from_secs(60));
  assert_eq!(config.rates_timeout, Duration::from_secs(2));
  assert_eq!(config.rates_retry_after, Duration::from_secs(120));
  assert_eq!(config.price_policy, PricePolicy::RejectMismatch);
}

#[test]
fn test_blank_values_count_as_unset() {
  let config = config_from(&[("DATABASE_URL", "  "), ("RATES_API_KEY", "")]).unwrap();
  assert_eq!(config.database_url, None);
  assert_eq!(config.rates_api_key, None);
}

#[test]
fn test_invalid_values_are_config_errors() {
  for (name, value) in [
    ("SERVER_PORT", "eighty"),
    ("RATES_TTL_SECS", "-1"),
    ("RATES_RETRY_SECS", "soon"),
    ("PRICE_POLICY", "haggle"),
  ] {
    let err = config_from(&[(name, value)]).unwrap_err();
    assert!(matches!(err, AppError::Config(ref m) if m.contains(name)), "{}: {}", name, err);
  }
}

// atelier_server/src/services/exchange_rates.rs

use async_trait::async_trait;
use atelier::{Currency, RateError, RateSource, RateTable};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Body of the `latest` endpoint. Errors come back with `success: false` and HTTP 200.
#[derive(Debug, Deserialize)]
struct LatestResponse {
  #[serde(default = "default_success")]
  success: bool,
  base: Option<String>,
  #[serde(default)]
  rates: HashMap<String, f64>,
  error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
  #[serde(default)]
  code: Option<i64>,
  #[serde(rename = "type", default)]
  kind: Option<String>,
  #[serde(default)]
  info: Option<String>,
}

fn default_success() -> bool {
  true
}

/// Live rates from an exchangeratesapi.io compatible `latest` endpoint.
#[derive(Debug, Clone)]
pub struct ExchangeRatesApiSource {
  client: reqwest::Client,
  url: String,
  access_key: String,
}

impl ExchangeRatesApiSource {
  pub fn new(url: impl Into<String>, access_key: impl Into<String>, timeout: Duration) -> Result<Self, RateError> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| RateError::Request(format!("failed to build HTTP client: {}", e)))?;
    Ok(Self {
      client,
      url: url.into(),
      access_key: access_key.into(),
    })
  }
}

fn symbols() -> String {
  Currency::ALL.iter().map(|c| c.code()).collect::<Vec<_>>().join(",")
}

fn into_table(body: LatestResponse) -> Result<RateTable, RateError> {
  if !body.success {
    let detail = body
      .error
      .map(|e| {
        format!(
          "{} ({})",
          e.info.or(e.kind).unwrap_or_else(|| "unknown error".to_string()),
          e.code.map(|c| c.to_string()).unwrap_or_default()
        )
      })
      .unwrap_or_else(|| "unknown error".to_string());
    return Err(RateError::Rejected(detail));
  }

  let base: Currency = body
    .base
    .as_deref()
    .unwrap_or("EUR")
    .parse()
    .map_err(|e| RateError::Rejected(format!("unsupported base currency: {}", e)))?;

  let mut rates = Vec::with_capacity(Currency::ALL.len());
  for currency in Currency::ALL {
    if let Some(value) = body.rates.get(currency.code()) {
      let rate = Decimal::from_f64(*value).ok_or_else(|| RateError::InvalidRate {
        currency: currency.code(),
        rate: value.to_string(),
      })?;
      rates.push((currency, rate));
    } else if currency == base {
      rates.push((currency, Decimal::ONE));
    }
  }
  RateTable::new(base, rates)
}

#[async_trait]
impl RateSource for ExchangeRatesApiSource {
  #[instrument(name = "exchange_rates::fetch_latest", skip(self), fields(url = %self.url))]
  async fn fetch_latest(&self) -> Result<RateTable, RateError> {
    let response = self
      .client
      .get(&self.url)
      .query(&[("access_key", self.access_key.as_str()), ("symbols", symbols().as_str())])
      .send()
      .await
      .map_err(|e| RateError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
      warn!(%status, "Exchange rate API answered with an error status.");
      return Err(RateError::Request(format!("HTTP {}", status)));
    }

    let body: LatestResponse = response
      .json()
      .await
      .map_err(|e| RateError::Request(format!("invalid response body: {}", e)))?;
    let table = into_table(body)?;
    debug!(base = %table.base(), "Parsed exchange rate table.");
    Ok(table)
  }

  fn name(&self) -> &'static str {
    "exchangeratesapi"
  }
}

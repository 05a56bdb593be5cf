// atelier/src/rates.rs

//! Exchange rates for display conversion.
//!
//! Rates are best-effort: [`CachedRates::current`] never fails, it falls back
//! to the last table it saw and then to a built-in default table. After a
//! failed refresh the source is left alone for a retry interval.

use crate::catalog::Currency;
use crate::error::RateError;
use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Exchange rates for every supported currency relative to `base`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTable {
  base: Currency,
  rates: BTreeMap<Currency, Decimal>,
}

impl RateTable {
  /// Builds a table, requiring a positive rate for every supported currency.
  pub fn new(base: Currency, rates: impl IntoIterator<Item = (Currency, Decimal)>) -> Result<Self, RateError> {
    let rates: BTreeMap<Currency, Decimal> = rates.into_iter().collect();
    for currency in Currency::ALL {
      match rates.get(&currency) {
        None => return Err(RateError::MissingCurrency(currency.code())),
        Some(rate) if *rate <= Decimal::ZERO => {
          return Err(RateError::InvalidRate {
            currency: currency.code(),
            rate: rate.to_string(),
          })
        }
        Some(_) => {}
      }
    }
    Ok(Self { base, rates })
  }

  /// Fixed EUR-based rates used whenever no live table is available.
  pub fn default_table() -> Self {
    let rates = BTreeMap::from([
      (Currency::Eur, dec!(1.0)),
      (Currency::Usd, dec!(1.087)),
      (Currency::Cad, dec!(1.47)),
    ]);
    Self {
      base: Currency::Eur,
      rates,
    }
  }

  pub fn base(&self) -> Currency {
    self.base
  }

  pub fn rate(&self, currency: Currency) -> Decimal {
    // Construction guarantees every currency is present.
    self.rates.get(&currency).copied().unwrap_or(Decimal::ONE)
  }

  pub fn iter(&self) -> impl Iterator<Item = (Currency, Decimal)> + '_ {
    self.rates.iter().map(|(c, r)| (*c, *r))
  }

  /// Converts a USD reference price into `target`, rounded to cents.
  pub fn convert(&self, reference_usd: Decimal, target: Currency) -> Decimal {
    let converted = if target == Currency::REFERENCE {
      reference_usd
    } else {
      reference_usd * self.rate(target) / self.rate(Currency::REFERENCE)
    };
    converted.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
  }
}

impl Default for RateTable {
  fn default() -> Self {
    Self::default_table()
  }
}

/// An external lookup of current exchange rates.
#[async_trait]
pub trait RateSource: Send + Sync {
  async fn fetch_latest(&self) -> Result<RateTable, RateError>;

  /// Short name used in logs.
  fn name(&self) -> &'static str;
}

/// A source that always answers with the same table.
#[derive(Debug, Clone, Default)]
pub struct StaticRateSource {
  table: RateTable,
}

impl StaticRateSource {
  pub fn new(table: RateTable) -> Self {
    Self { table }
  }
}

#[async_trait]
impl RateSource for StaticRateSource {
  async fn fetch_latest(&self) -> Result<RateTable, RateError> {
    Ok(self.table.clone())
  }

  fn name(&self) -> &'static str {
    "static"
  }
}

/// Where the table returned by [`CachedRates::current`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateOrigin {
  /// Fetched from the source during this call.
  Fresh,
  /// Served from the cache within its time-to-live.
  Cached,
  /// The source failed; this is the last table it returned.
  LastKnown,
  /// The source failed and never succeeded; this is the fallback table.
  Fallback,
}

#[derive(Debug, Clone)]
pub struct RateSnapshot {
  pub table: RateTable,
  pub origin: RateOrigin,
}

struct CachedTable {
  table: RateTable,
  fetched_at: Instant,
}

/// How long a failed refresh keeps the source from being asked again, unless overridden.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Caches a [`RateSource`] for `ttl` and degrades gracefully when it fails.
pub struct CachedRates {
  source: Arc<dyn RateSource>,
  ttl: Duration,
  retry_after: Duration,
  fallback: RateTable,
  cached: RwLock<Option<CachedTable>>,
  failed_at: RwLock<Option<Instant>>,
}

impl CachedRates {
  pub fn new(source: Arc<dyn RateSource>, ttl: Duration) -> Self {
    Self {
      source,
      ttl,
      retry_after: DEFAULT_RETRY_AFTER,
      fallback: RateTable::default_table(),
      cached: RwLock::new(None),
      failed_at: RwLock::new(None),
    }
  }

  /// Sets how long degraded rates are served after a failed refresh before the source is tried again.
  pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
    self.retry_after = retry_after;
    self
  }

  /// Replaces the table used when the source has never answered.
  pub fn with_fallback(mut self, fallback: RateTable) -> Self {
    self.fallback = fallback;
    self
  }

  #[instrument(name = "rates::current", skip(self), fields(source = self.source.name()))]
  pub async fn current(&self) -> RateSnapshot {
    let cached = {
      let guard = self.cached.read();
      guard
        .as_ref()
        .filter(|c| c.fetched_at.elapsed() < self.ttl)
        .map(|c| c.table.clone())
    };
    if let Some(table) = cached {
      return RateSnapshot {
        table,
        origin: RateOrigin::Cached,
      };
    }

    let backing_off = self
      .failed_at
      .read()
      .map_or(false, |failed_at| failed_at.elapsed() < self.retry_after);
    if backing_off {
      debug!("Exchange rate source failed recently; not retrying yet.");
      return self.degraded();
    }

    match self.source.fetch_latest().await {
      Ok(table) => {
        debug!(base = %table.base(), "Fetched fresh exchange rates.");
        *self.failed_at.write() = None;
        *self.cached.write() = Some(CachedTable {
          table: table.clone(),
          fetched_at: Instant::now(),
        });
        RateSnapshot {
          table,
          origin: RateOrigin::Fresh,
        }
      }
      Err(e) => {
        warn!(error = %e, retry_after = ?self.retry_after, "Exchange rate refresh failed; using fallback rates.");
        *self.failed_at.write() = Some(Instant::now());
        self.degraded()
      }
    }
  }

  fn degraded(&self) -> RateSnapshot {
    match self.cached.read().as_ref() {
      Some(last) => RateSnapshot {
        table: last.table.clone(),
        origin: RateOrigin::LastKnown,
      },
      None => RateSnapshot {
        table: self.fallback.clone(),
        origin: RateOrigin::Fallback,
      },
    }
  }

  pub async fn current_table(&self) -> RateTable {
    self.current().await.table
  }
}

//! Rate acquisition with a time-bounded cache and a three-tier fallback
//! (live value, cached value, hardcoded default).

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use super::source::{RateObservation, RateSource, SeriesId};
use super::{is_valid_rate, monthly_from_annual, round_dp};
use crate::catalog::{InvestmentCatalog, RatesView};
use crate::error::RateError;

pub const DEFAULT_TTL_SECS: i64 = 3600;

/// Fallback monthly rates, used when a series cannot be fetched or validated
pub const FALLBACK_SELIC: f64 = 1.17;
pub const FALLBACK_CDI: f64 = 1.16;
pub const FALLBACK_IPCA: f64 = 0.52;

/// Shares of the interbank rate paid by each derived product
pub const CDB_SHARE: f64 = 1.0;
pub const LCI_LCA_SHARE: f64 = 0.87;
pub const MONEY_FUND_SHARE: f64 = 0.75;

/// Source of "now" for TTL decisions
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A resolved series value and whether it came from the fallback table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesValue {
    pub value: f64,
    pub from_fallback: bool,
}

impl SeriesValue {
    pub fn live(value: f64) -> Self {
        Self {
            value,
            from_fallback: false,
        }
    }

    pub fn fallback(value: f64) -> Self {
        Self {
            value,
            from_fallback: true,
        }
    }
}

/// Monthly rates of the products priced off the interbank rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProductRates {
    pub cdb: f64,
    pub lci_lca: f64,
    pub money_fund: f64,
}

impl ProductRates {
    /// Derive product rates from a resolved interbank rate.
    ///
    /// Each value is validated on its own; an invalid one falls back to the
    /// same share of the fallback interbank rate.
    pub fn derive(interbank: f64) -> Self {
        let derive_one = |name: &str, share: f64| {
            let value = round_dp(interbank * share, 4);
            if is_valid_rate(value) {
                value
            } else {
                warn!("Derived {} rate {} is invalid, using fallback", name, value);
                round_dp(FALLBACK_CDI * share, 4)
            }
        };

        Self {
            cdb: derive_one("CDB", CDB_SHARE),
            lci_lca: derive_one("LCI/LCA", LCI_LCA_SHARE),
            money_fund: derive_one("money fund", MONEY_FUND_SHARE),
        }
    }
}

/// Validated set of monthly rates (percent per month)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSet {
    pub policy_rate: f64,
    pub interbank_rate: f64,
    pub inflation_rate: f64,
    pub products: ProductRates,
    pub fetched_at: DateTime<Utc>,
    #[serde(skip)]
    fallbacks: Vec<SeriesId>,
}

impl RateSet {
    /// Assemble a rate set from resolved base series, deriving product rates
    pub fn from_series(
        policy: SeriesValue,
        interbank: SeriesValue,
        inflation: SeriesValue,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let fallbacks = [
            (SeriesId::Selic, policy),
            (SeriesId::Cdi, interbank),
            (SeriesId::Ipca, inflation),
        ]
        .into_iter()
        .filter(|(_, v)| v.from_fallback)
        .map(|(id, _)| id)
        .collect();

        Self {
            policy_rate: policy.value,
            interbank_rate: interbank.value,
            inflation_rate: inflation.value,
            products: ProductRates::derive(interbank.value),
            fetched_at,
            fallbacks,
        }
    }

    /// Rate set built entirely from the fallback table
    pub fn fallback(fetched_at: DateTime<Utc>) -> Self {
        Self::from_series(
            SeriesValue::fallback(FALLBACK_SELIC),
            SeriesValue::fallback(FALLBACK_CDI),
            SeriesValue::fallback(FALLBACK_IPCA),
            fetched_at,
        )
    }

    /// Whether `series` was substituted by its fallback value
    pub fn used_fallback(&self, series: SeriesId) -> bool {
        self.fallbacks.contains(&series)
    }

    /// True when every base series came from the source
    pub fn is_live(&self) -> bool {
        self.fallbacks.is_empty()
    }
}

/// Last successful refresh, owned by `RateProvider`
#[derive(Debug, Clone)]
pub struct RateCache {
    pub data: Option<RateSet>,
    pub captured_at: Option<DateTime<Utc>>,
    pub ttl: Duration,
}

impl RateCache {
    fn new(ttl: Duration) -> Self {
        Self {
            data: None,
            captured_at: None,
            ttl,
        }
    }

    fn fresh(&self, now: DateTime<Utc>) -> Option<&RateSet> {
        match (&self.data, self.captured_at) {
            (Some(data), Some(captured_at)) if now.signed_duration_since(captured_at) < self.ttl => {
                Some(data)
            }
            _ => None,
        }
    }
}

/// Supplies validated rate sets while minimizing calls to the source.
///
/// Construct once at the composition root and share it behind an `Arc`.
pub struct RateProvider {
    source: Arc<dyn RateSource>,
    clock: Arc<dyn Clock>,
    cache: Mutex<RateCache>,
    fetches: AtomicUsize,
}

impl RateProvider {
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self {
            source,
            clock: Arc::new(SystemClock),
            cache: Mutex::new(RateCache::new(Duration::seconds(DEFAULT_TTL_SECS))),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_ttl(self, ttl: Duration) -> Self {
        self.lock_cache().ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.lock_cache().ttl
    }

    /// Number of refreshes that reached the source
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Return the cached rate set while fresh, otherwise refresh from the source.
    ///
    /// Never fails: unavailable or invalid series are replaced by their
    /// fallback values.
    pub async fn get_rates(&self) -> RateSet {
        let now = self.clock.now();
        let cached = self.lock_cache().fresh(now).cloned();
        if let Some(cached) = cached {
            debug!("Using cached rates fetched at {}", cached.fetched_at);
            return cached;
        }

        info!("Refreshing rates from source");
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let (selic, cdi, ipca) = tokio::join!(
            self.source.latest(SeriesId::Selic),
            self.source.latest(SeriesId::Cdi),
            self.source.latest(SeriesId::Ipca),
        );

        let now = self.clock.now();
        let rates = RateSet::from_series(
            resolve(SeriesId::Selic, selic),
            resolve(SeriesId::Cdi, cdi),
            resolve(SeriesId::Ipca, ipca),
            now,
        );

        let mut cache = self.lock_cache();
        cache.data = Some(rates.clone());
        cache.captured_at = Some(now);
        rates
    }

    /// Drop the cached rate set so the next `get_rates` refetches
    pub fn invalidate(&self) {
        let mut cache = self.lock_cache();
        cache.data = None;
        cache.captured_at = None;
        debug!("Rate cache invalidated");
    }

    /// Current rates rendered as the per-product view used by front ends
    pub async fn view(&self) -> RatesView {
        let rates = self.get_rates().await;
        InvestmentCatalog::from_rates(&rates).view(rates.fetched_at)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, RateCache> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Fallback value for a base series
pub fn fallback_for(series: SeriesId) -> f64 {
    match series {
        SeriesId::Selic => FALLBACK_SELIC,
        SeriesId::Cdi => FALLBACK_CDI,
        SeriesId::Ipca => FALLBACK_IPCA,
        SeriesId::UsdBrl => super::fx::FALLBACK_USD_BRL,
    }
}

/// Convert an observation to a monthly rate, substituting the fallback on
/// any failure.
fn resolve(series: SeriesId, fetched: Result<RateObservation, RateError>) -> SeriesValue {
    let monthly = fetched.and_then(|obs| {
        let value = if series.is_annualized() {
            monthly_from_annual(obs.value)
        } else {
            round_dp(obs.value, 4)
        };
        if is_valid_rate(value) {
            Ok(value)
        } else {
            Err(RateError::InvalidRate { series, value })
        }
    });

    match monthly {
        Ok(value) => SeriesValue::live(value),
        Err(e) => {
            warn!("{}; using fallback {}", e, fallback_for(series));
            SeriesValue::fallback(fallback_for(series))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::OfflineSource;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 20, 9, 0, 0).unwrap()
    }

    fn observation(series: SeriesId, value: f64) -> Result<RateObservation, RateError> {
        Ok(RateObservation {
            series,
            value,
            observed_at: start(),
        })
    }

    #[test]
    fn test_resolve_converts_annual_series() {
        let v = resolve(SeriesId::Selic, observation(SeriesId::Selic, 15.0));
        assert!(!v.from_fallback);
        assert!((v.value - 1.1715).abs() < 1e-4);
    }

    #[test]
    fn test_resolve_keeps_monthly_inflation() {
        let v = resolve(SeriesId::Ipca, observation(SeriesId::Ipca, 0.56));
        assert_eq!(v, SeriesValue::live(0.56));
    }

    #[test]
    fn test_resolve_rejects_non_positive_and_nan() {
        for bad in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let v = resolve(SeriesId::Ipca, observation(SeriesId::Ipca, bad));
            assert_eq!(v, SeriesValue::fallback(FALLBACK_IPCA), "value {}", bad);
        }
    }

    #[test]
    fn test_resolve_source_failure_uses_fallback() {
        let v = resolve(
            SeriesId::Cdi,
            Err(RateError::unavailable(SeriesId::Cdi, "timeout")),
        );
        assert_eq!(v, SeriesValue::fallback(FALLBACK_CDI));
    }

    #[test]
    fn test_fallback_rate_set_values() {
        let rates = RateSet::fallback(start());
        assert_eq!(rates.policy_rate, 1.17);
        assert_eq!(rates.interbank_rate, 1.16);
        assert_eq!(rates.inflation_rate, 0.52);
        assert_eq!(rates.products.cdb, 1.16);
        assert_eq!(rates.products.lci_lca, 1.0092);
        assert_eq!(rates.products.money_fund, 0.87);
        assert!(!rates.is_live());
        assert!(rates.used_fallback(SeriesId::Cdi));
    }

    #[test]
    fn test_derived_products_fall_back_independently() {
        let products = ProductRates::derive(f64::NAN);
        assert_eq!(products.cdb, 1.16);
        assert_eq!(products.lci_lca, 1.0092);
        assert_eq!(products.money_fund, 0.87);
    }

    #[test]
    fn test_cache_freshness_boundary() {
        let mut cache = RateCache::new(Duration::seconds(60));
        cache.data = Some(RateSet::fallback(start()));
        cache.captured_at = Some(start());

        assert!(cache.fresh(start() + Duration::seconds(59)).is_some());
        assert!(cache.fresh(start() + Duration::seconds(60)).is_none());
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let clock = Arc::new(ManualClock::new(start()));
        let provider = RateProvider::new(Arc::new(OfflineSource)).with_clock(clock);

        provider.get_rates().await;
        provider.get_rates().await;
        assert_eq!(provider.fetch_count(), 1);

        provider.invalidate();
        provider.get_rates().await;
        assert_eq!(provider.fetch_count(), 2);
    }

    #[test]
    fn test_default_ttl_is_one_hour() {
        let provider = RateProvider::new(Arc::new(OfflineSource));
        assert_eq!(provider.ttl(), Duration::hours(1));
    }
}

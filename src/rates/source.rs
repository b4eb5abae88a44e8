use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::error::RateError;

/// Time series published by the Banco Central SGS service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SeriesId {
    /// Copom SELIC target, annualized percent
    Selic,
    /// DI over rate, annualized percent (base 252)
    Cdi,
    /// IPCA, percent for the month
    Ipca,
    /// USD/BRL commercial buy quote
    UsdBrl,
}

impl SeriesId {
    /// SGS series code
    pub fn code(&self) -> u32 {
        match self {
            SeriesId::Selic => 432,
            SeriesId::Cdi => 4389,
            SeriesId::Ipca => 433,
            SeriesId::UsdBrl => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesId::Selic => "SELIC",
            SeriesId::Cdi => "CDI",
            SeriesId::Ipca => "IPCA",
            SeriesId::UsdBrl => "USD/BRL",
        }
    }

    /// Whether the published value is an annual rate that needs converting
    /// to a monthly-equivalent one.
    pub fn is_annualized(&self) -> bool {
        matches!(self, SeriesId::Selic | SeriesId::Cdi)
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (SGS {})", self.as_str(), self.code())
    }
}

/// Most recent observation of a series, as published.
///
/// `value` carries the source's own unit: annual percent for SELIC and CDI,
/// monthly percent for IPCA, BRL per USD for the FX quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateObservation {
    pub series: SeriesId,
    pub value: f64,
    pub observed_at: DateTime<Utc>,
}

/// Capability that fetches the latest observation of one series.
///
/// Each call may fail independently; callers decide how to recover.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn latest(&self, series: SeriesId) -> Result<RateObservation, RateError>;
}

/// Source used when network access is disabled. Every request fails, so
/// consumers always end up on their fallback values.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineSource;

#[async_trait]
impl RateSource for OfflineSource {
    async fn latest(&self, series: SeriesId) -> Result<RateObservation, RateError> {
        Err(RateError::unavailable(series, "offline mode"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_codes() {
        assert_eq!(SeriesId::Selic.code(), 432);
        assert_eq!(SeriesId::Cdi.code(), 4389);
        assert_eq!(SeriesId::Ipca.code(), 433);
        assert_eq!(SeriesId::UsdBrl.code(), 1);
    }

    #[test]
    fn test_only_policy_and_interbank_are_annualized() {
        assert!(SeriesId::Selic.is_annualized());
        assert!(SeriesId::Cdi.is_annualized());
        assert!(!SeriesId::Ipca.is_annualized());
        assert!(!SeriesId::UsdBrl.is_annualized());
    }

    #[tokio::test]
    async fn test_offline_source_always_fails() {
        let err = OfflineSource.latest(SeriesId::Cdi).await.unwrap_err();
        assert!(matches!(
            err,
            RateError::SourceUnavailable {
                series: SeriesId::Cdi,
                ..
            }
        ));
    }
}

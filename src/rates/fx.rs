//! USD/BRL conversion for displaying a simulated amount in dollars.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use super::is_valid_rate;
use super::provider::fallback_for;
use super::source::{RateSource, SeriesId};

/// BRL per USD when the quote cannot be fetched, and for unsupported pairs
pub const FALLBACK_USD_BRL: f64 = 5.0;
/// USD per BRL when the quote cannot be fetched
pub const FALLBACK_BRL_USD: f64 = 0.20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Brl,
    Usd,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Brl => "BRL",
            Currency::Usd => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BRL" => Ok(Currency::Brl),
            "USD" => Ok(Currency::Usd),
            other => Err(format!("Unsupported currency '{}'. Use BRL or USD", other)),
        }
    }
}

/// Conversion factor from `from` to `to`.
///
/// Uses the latest USD/BRL quote; never fails.
pub async fn conversion_rate(source: &dyn RateSource, from: Currency, to: Currency) -> f64 {
    if from == to {
        return 1.0;
    }

    let quote = match source.latest(SeriesId::UsdBrl).await {
        Ok(obs) if is_valid_rate(obs.value) => Some(obs.value),
        Ok(obs) => {
            warn!("Ignoring invalid USD/BRL quote {}", obs.value);
            None
        }
        Err(e) => {
            warn!("{}; using fallback exchange rate", e);
            None
        }
    };

    match (from, to, quote) {
        (Currency::Usd, Currency::Brl, Some(q)) => q,
        (Currency::Brl, Currency::Usd, Some(q)) => 1.0 / q,
        (Currency::Brl, Currency::Usd, None) => FALLBACK_BRL_USD,
        _ => fallback_for(SeriesId::UsdBrl),
    }
}

/// An amount converted at a given factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Conversion {
    pub amount: f64,
    pub from: Currency,
    pub to: Currency,
    pub rate: f64,
    pub converted: f64,
}

/// Convert `amount` between currencies using [`conversion_rate`]
pub async fn convert(
    source: &dyn RateSource,
    amount: f64,
    from: Currency,
    to: Currency,
) -> Conversion {
    let rate = conversion_rate(source, from, to).await;
    Conversion {
        amount,
        from,
        to,
        rate,
        converted: amount * rate,
    }
}

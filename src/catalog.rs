//! Investment catalog
//!
//! The fixed set of products a user can simulate, each bound to a monthly
//! rate taken from the latest `RateSet`. Rebuilt whenever rates refresh.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use tracing::warn;

use crate::rates::provider::{
    FALLBACK_CDI, FALLBACK_SELIC, LCI_LCA_SHARE, MONEY_FUND_SHARE,
};
use crate::rates::{is_valid_rate, round_dp, RateSet};

/// Product identifier, in catalog order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum InvestmentKey {
    #[serde(rename = "SELIC")]
    Selic,
    #[serde(rename = "CDB")]
    Cdb,
    #[serde(rename = "LCI_LCA")]
    LciLca,
    #[serde(rename = "FUNDO")]
    Fundo,
}

impl InvestmentKey {
    pub const ALL: [InvestmentKey; 4] = [
        InvestmentKey::Selic,
        InvestmentKey::Cdb,
        InvestmentKey::LciLca,
        InvestmentKey::Fundo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvestmentKey::Selic => "SELIC",
            InvestmentKey::Cdb => "CDB",
            InvestmentKey::LciLca => "LCI_LCA",
            InvestmentKey::Fundo => "FUNDO",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            InvestmentKey::Selic => "Tesouro Selic",
            InvestmentKey::Cdb => "CDB",
            InvestmentKey::LciLca => "LCI/LCA",
            InvestmentKey::Fundo => "Fundo Multimercado",
        }
    }

    /// Rate shown before any refresh has completed
    pub fn default_rate(&self) -> f64 {
        match self {
            InvestmentKey::Selic => 1.17,
            InvestmentKey::Cdb => 1.16,
            InvestmentKey::LciLca => 1.01,
            InvestmentKey::Fundo => 0.87,
        }
    }
}

impl fmt::Display for InvestmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvestmentKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '/'], "_").as_str() {
            "selic" | "tesouro_selic" => Ok(InvestmentKey::Selic),
            "cdb" => Ok(InvestmentKey::Cdb),
            "lci_lca" | "lci" | "lca" => Ok(InvestmentKey::LciLca),
            "fundo" | "fund" => Ok(InvestmentKey::Fundo),
            _ => Err(format!(
                "Unknown investment '{}'. Use one of: SELIC, CDB, LCI_LCA, FUNDO",
                s
            )),
        }
    }
}

/// A named product and its monthly rate (percent per month)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentType {
    pub key: InvestmentKey,
    pub display_name: String,
    pub monthly_rate_percent: f64,
}

impl InvestmentType {
    pub fn new(key: InvestmentKey, monthly_rate_percent: f64) -> Self {
        Self {
            key,
            display_name: key.display_name().to_string(),
            monthly_rate_percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentCatalog {
    items: Vec<InvestmentType>,
}

impl Default for InvestmentCatalog {
    fn default() -> Self {
        Self {
            items: InvestmentKey::ALL
                .iter()
                .map(|k| InvestmentType::new(*k, k.default_rate()))
                .collect(),
        }
    }
}

impl InvestmentCatalog {
    /// Build from a rate set, re-validating each product rate with its own
    /// fallback.
    pub fn from_rates(rates: &RateSet) -> Self {
        let selic = validated("SELIC", rates.policy_rate, FALLBACK_SELIC);
        let cdi = validated("CDI", rates.interbank_rate, FALLBACK_CDI);
        let cdb = validated("CDB", rates.products.cdb, cdi);
        let lci_lca = validated("LCI/LCA", rates.products.lci_lca, cdi * LCI_LCA_SHARE);
        let fundo = validated("Fundo", rates.products.money_fund, cdi * MONEY_FUND_SHARE);

        Self {
            items: vec![
                InvestmentType::new(InvestmentKey::Selic, round_dp(selic, 4)),
                InvestmentType::new(InvestmentKey::Cdb, round_dp(cdb, 4)),
                InvestmentType::new(InvestmentKey::LciLca, round_dp(lci_lca, 4)),
                InvestmentType::new(InvestmentKey::Fundo, round_dp(fundo, 4)),
            ],
        }
    }

    /// Build from explicit entries, keeping their order
    pub fn from_items(items: Vec<InvestmentType>) -> Self {
        Self { items }
    }

    pub fn iter(&self) -> impl Iterator<Item = &InvestmentType> {
        self.items.iter()
    }

    pub fn get(&self, key: InvestmentKey) -> Option<&InvestmentType> {
        self.items.iter().find(|i| i.key == key)
    }

    pub fn rate(&self, key: InvestmentKey) -> Option<f64> {
        self.get(key).map(|i| i.monthly_rate_percent)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn view(&self, last_updated: DateTime<Utc>) -> RatesView {
        RatesView {
            products: self
                .items
                .iter()
                .map(|i| {
                    (
                        i.key.as_str().to_string(),
                        ProductView {
                            name: i.display_name.clone(),
                            taxa: i.monthly_rate_percent,
                        },
                    )
                })
                .collect(),
            last_updated: last_updated.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

fn validated(name: &str, value: f64, fallback: f64) -> f64 {
    if is_valid_rate(value) {
        value
    } else {
        warn!("Invalid {} rate {}, using {}", name, value, fallback);
        fallback
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductView {
    pub name: String,
    pub taxa: f64,
}

/// Per-product rates plus the refresh timestamp, keyed by product key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatesView {
    #[serde(flatten)]
    pub products: BTreeMap<String, ProductView>,
    #[serde(rename = "ultimaAtualizacao")]
    pub last_updated: String,
}

/// Catalog shared between the refresh task and its readers
#[derive(Debug, Clone, Default)]
pub struct SharedCatalog {
    inner: Arc<RwLock<InvestmentCatalog>>,
}

impl SharedCatalog {
    pub fn new(catalog: InvestmentCatalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(catalog)),
        }
    }

    pub fn replace(&self, rates: &RateSet) {
        let mut catalog = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *catalog = InvestmentCatalog::from_rates(rates);
    }

    pub fn snapshot(&self) -> InvestmentCatalog {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

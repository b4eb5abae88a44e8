use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::source::{RateObservation, RateSource, SeriesId};
use crate::error::RateError;

pub const DEFAULT_BASE_URL: &str = "https://api.bcb.gov.br/dados/serie";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; RendimentosBot/1.0)";

/// One row of the SGS `dados/ultimos/N` payload
#[derive(Debug, Deserialize)]
struct SgsEntry {
    data: Option<String>,
    valor: SgsValue,
}

/// SGS publishes values as strings, but some mirrors emit plain numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SgsValue {
    Text(String),
    Number(f64),
}

/// Banco Central SGS client
pub struct BcbClient {
    client: Client,
    base_url: String,
}

impl BcbClient {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to build Banco Central HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of the most recent observation for a series
    pub fn latest_url(&self, series: SeriesId) -> String {
        format!(
            "{}/bcdata.sgs.{}/dados/ultimos/1?formato=json",
            self.base_url,
            series.code()
        )
    }
}

#[async_trait]
impl RateSource for BcbClient {
    async fn latest(&self, series: SeriesId) -> Result<RateObservation, RateError> {
        let url = self.latest_url(series);
        info!("Fetching {} from Banco Central", series);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RateError::unavailable(series, format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(RateError::unavailable(
                series,
                format!("Banco Central returned error status: {}", response.status()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| RateError::unavailable(series, format!("failed to read body: {}", e)))?;

        debug!("SGS {} payload: {}", series.code(), body);
        parse_latest(series, &body, Utc::now())
    }
}

/// Parse an SGS JSON payload and keep its most recent entry.
///
/// `fetched_at` stands in for the observation date when the row has none.
pub fn parse_latest(
    series: SeriesId,
    body: &str,
    fetched_at: DateTime<Utc>,
) -> Result<RateObservation, RateError> {
    let entries: Vec<SgsEntry> = serde_json::from_str(body)
        .map_err(|e| RateError::unavailable(series, format!("malformed payload: {}", e)))?;

    let entry = entries
        .into_iter()
        .last()
        .ok_or_else(|| RateError::unavailable(series, "empty payload"))?;

    let value = match entry.valor {
        SgsValue::Number(n) => n,
        SgsValue::Text(s) => parse_sgs_number(&s)
            .ok_or_else(|| RateError::unavailable(series, format!("unparseable valor '{}'", s)))?,
    };

    let observed_at = entry
        .data
        .as_deref()
        .and_then(parse_sgs_date)
        .unwrap_or(fetched_at);

    Ok(RateObservation {
        series,
        value,
        observed_at,
    })
}

fn parse_sgs_number(raw: &str) -> Option<f64> {
    raw.trim().replace(',', ".").parse::<f64>().ok()
}

fn parse_sgs_date(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(raw.trim(), "%d/%m/%Y")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    fn should_skip_online_tests() -> bool {
        std::env::var("RENDIMENTOS_SKIP_ONLINE_TESTS")
            .map(|v| v != "0")
            .unwrap_or(false)
    }

    fn fetched_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_latest_string_valor() {
        let body = r#"[{"data":"19/11/2025","valor":"15.00"}]"#;
        let obs = parse_latest(SeriesId::Selic, body, fetched_at()).unwrap();
        assert_eq!(obs.series, SeriesId::Selic);
        assert_eq!(obs.value, 15.0);
        assert_eq!(obs.observed_at.day(), 19);
        assert_eq!(obs.observed_at.month(), 11);
    }

    #[test]
    fn test_parse_latest_numeric_and_comma_valor() {
        let body = r#"[{"data":"01/10/2025","valor":0.09}]"#;
        let obs = parse_latest(SeriesId::Ipca, body, fetched_at()).unwrap();
        assert_eq!(obs.value, 0.09);

        let body = r#"[{"data":"01/10/2025","valor":"14,90"}]"#;
        let obs = parse_latest(SeriesId::Cdi, body, fetched_at()).unwrap();
        assert_eq!(obs.value, 14.9);
    }

    #[test]
    fn test_parse_latest_missing_date_uses_fetch_time() {
        let body = r#"[{"valor":"5.33"}]"#;
        let obs = parse_latest(SeriesId::UsdBrl, body, fetched_at()).unwrap();
        assert_eq!(obs.observed_at, fetched_at());
    }

    #[test]
    fn test_parse_latest_rejects_bad_payloads() {
        for body in ["[]", "{\"erro\": true}", "not json", r#"[{"valor":"abc"}]"#] {
            let err = parse_latest(SeriesId::Cdi, body, fetched_at()).unwrap_err();
            assert!(
                matches!(err, RateError::SourceUnavailable { .. }),
                "payload {:?} should be rejected",
                body
            );
        }
    }

    #[test]
    fn test_latest_url() {
        let client = BcbClient::new("https://example.test/serie/", DEFAULT_USER_AGENT).unwrap();
        assert_eq!(
            client.latest_url(SeriesId::Cdi),
            "https://example.test/serie/bcdata.sgs.4389/dados/ultimos/1?formato=json"
        );
    }

    #[tokio::test]
    async fn test_fetch_selic_online() {
        if should_skip_online_tests() {
            return;
        }

        let client = BcbClient::new(DEFAULT_BASE_URL, DEFAULT_USER_AGENT).unwrap();
        match client.latest(SeriesId::Selic).await {
            Ok(obs) => {
                assert!(obs.value > 0.0);
                println!("SELIC from Banco Central: {}% a.a.", obs.value);
            }
            Err(e) => eprintln!("Skipping Banco Central SELIC test: {}", e),
        }
    }
}

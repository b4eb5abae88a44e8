//! Error handling for Rendimentos
//!
//! Defines the typed errors raised along the rate acquisition path and by
//! scenario validation, and establishes a unified Result type using anyhow
//! for context chaining at I/O boundaries.

use thiserror::Error;

use crate::rates::SeriesId;

/// Failures while acquiring a single rate series.
///
/// These never escape `RateProvider`; they are logged and replaced by the
/// series fallback.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RateError {
    #[error("source unavailable for {series}: {reason}")]
    SourceUnavailable { series: SeriesId, reason: String },

    #[error("invalid rate for {series}: {value}")]
    InvalidRate { series: SeriesId, value: f64 },
}

impl RateError {
    pub fn unavailable(series: SeriesId, reason: impl Into<String>) -> Self {
        RateError::SourceUnavailable {
            series,
            reason: reason.into(),
        }
    }
}

/// Caller-supplied scenario values that violate a solver precondition
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScenarioError {
    #[error("initial amount must be positive (got {0})")]
    NonPositiveInitial(f64),

    #[error("initial amount cannot be negative (got {0})")]
    NegativeInitial(f64),

    #[error("goal must be positive (got {0})")]
    NonPositiveGoal(f64),

    #[error("goal already met: initial {initial} >= goal {goal}")]
    GoalAlreadyMet { initial: f64, goal: f64 },

    #[error("monthly contribution must be positive (got {0})")]
    NonPositiveContribution(f64),

    #[error("horizon must be at least one month")]
    EmptyHorizon,

    #[error("horizon of {months} months exceeds the limit of {max_months}")]
    HorizonTooLong { months: u32, max_months: u32 },
}

/// Result type alias for fallible operations
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = RateError::unavailable(SeriesId::Cdi, "connection refused");
        assert_eq!(
            err.to_string(),
            "source unavailable for CDI (SGS 4389): connection refused"
        );
    }

    #[test]
    fn test_anyhow_context_chains_errors() {
        use anyhow::Context;
        let result: Result<()> =
            Err(anyhow::anyhow!("config.toml not readable")).context("failed to load settings");
        match result {
            Err(e) => {
                assert!(e.to_string().contains("failed to load settings"));
                let debug_msg = format!("{:?}", e);
                assert!(debug_msg.contains("config.toml not readable"));
            }
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn test_scenario_error_variants() {
        let err = ScenarioError::GoalAlreadyMet {
            initial: 5000.0,
            goal: 1000.0,
        };
        assert!(err.to_string().starts_with("goal already met"));

        let err = ScenarioError::NonPositiveGoal(0.0);
        assert!(err.to_string().starts_with("goal must be positive"));

        let err = RateError::InvalidRate {
            series: SeriesId::Selic,
            value: f64::NAN,
        };
        assert!(err.to_string().starts_with("invalid rate for SELIC"));
    }
}

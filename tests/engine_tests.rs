//! Integration tests for the projection and comparison engines
//!
//! These tests exercise the public API the way the CLI does:
//! - Annual to monthly conversion
//! - Growth series invariants
//! - Lump-sum and recurring-contribution goal solvers
//! - Product rankings over a catalog built from a rate set

use approx::assert_relative_eq;
use chrono::Utc;
use rendimentos::catalog::{InvestmentCatalog, InvestmentKey};
use rendimentos::comparison::{best_for_goal, rank_by_future_value, rank_goal_with_contributions};
use rendimentos::projection::{
    future_value, growth_series, minimum_initial_investment, months_to_reach_goal,
    months_to_reach_goal_with_contributions, solve_goal, DEFAULT_HORIZON_MONTHS,
    DEFAULT_MAX_MONTHS,
};
use rendimentos::rates::{monthly_from_annual, RateSet, SeriesValue};

#[test]
fn test_monthly_conversion_of_annual_rates() {
    assert_relative_eq!(monthly_from_annual(15.0), 1.1715, epsilon = 1e-4);
    assert_relative_eq!(monthly_from_annual(14.9), 1.1642, epsilon = 1e-4);
    assert_eq!(monthly_from_annual(0.0), 0.0);
}

#[test]
fn test_growth_series_is_non_decreasing() {
    for rate in [0.0, 0.52, 1.17, 3.0] {
        let series = growth_series(2500.0, rate, DEFAULT_HORIZON_MONTHS);
        assert_eq!(series.len(), DEFAULT_HORIZON_MONTHS as usize + 1);
        assert_eq!(series[0].value, 2500.0);
        assert_eq!(series[0].gain, 0.0);
        assert!(series.windows(2).all(|w| w[1].value >= w[0].value));
        assert!(series
            .iter()
            .all(|p| (p.value - 2500.0 - p.gain).abs() < 1e-9));
    }
}

#[test]
fn test_growth_series_is_restartable() {
    assert_eq!(growth_series(1000.0, 1.16, 36), growth_series(1000.0, 1.16, 36));
}

#[test]
fn test_end_to_end_example() {
    assert_eq!(future_value(1000.0, 1.17, 12), 1149.8);
    assert_eq!(months_to_reach_goal(1000.0, 1.17, 1149.7), 12);

    let solution = solve_goal(1000.0, 1.17, 1149.7);
    assert_eq!(solution.months_required, 12);
    assert!(solution.total_contributed.is_none());
}

#[test]
fn test_goal_round_trip() {
    for (goal, rate, months) in [
        (10_000.0, 1.17, 12),
        (50_000.0, 0.87, 60),
        (1_234.56, 1.0092, 7),
        (250_000.0, 1.16, 120),
    ] {
        let minimum = minimum_initial_investment(goal, rate, months);
        assert!(minimum < goal);
        assert_relative_eq!(future_value(minimum, rate, months), goal, epsilon = 0.05);
    }
}

#[test]
fn test_already_met_goal_takes_zero_months() {
    assert_eq!(months_to_reach_goal(5000.0, 1.17, 5000.0), 0);
    assert_eq!(months_to_reach_goal(5000.0, 1.17, 1000.0), 0);
}

#[test]
fn test_contribution_solver_terminates_before_ceiling() {
    let goal = 12_000.0;
    let monthly = goal / DEFAULT_MAX_MONTHS as f64 + 1.0;
    let solution =
        months_to_reach_goal_with_contributions(0.0, monthly, 0.0, goal, DEFAULT_MAX_MONTHS);

    assert!(solution.months_required < DEFAULT_MAX_MONTHS);
    assert_eq!(solution.months_required, 1091);
    assert!(solution.reached(goal));
}

#[test]
fn test_contribution_solver_stops_at_ceiling() {
    let solution =
        months_to_reach_goal_with_contributions(100.0, 0.0, 0.0, 1000.0, DEFAULT_MAX_MONTHS);

    assert_eq!(solution.months_required, DEFAULT_MAX_MONTHS);
    assert_eq!(solution.final_value, 100.0);
    assert_eq!(solution.total_contributed, Some(100.0));
    assert!(!solution.reached(1000.0));
}

#[test]
fn test_contribution_solver_accounting() {
    let solution =
        months_to_reach_goal_with_contributions(1000.0, 500.0, 1.17, 10_000.0, DEFAULT_MAX_MONTHS);
    let contributed = solution.total_contributed.unwrap();

    assert_eq!(contributed, 1000.0 + 500.0 * solution.months_required as f64);
    assert_relative_eq!(
        solution.total_gain,
        solution.final_value - contributed,
        epsilon = 1e-9
    );
    assert!(solution.reached(10_000.0));
}

fn fallback_catalog() -> InvestmentCatalog {
    InvestmentCatalog::from_rates(&RateSet::fallback(Utc::now()))
}

#[test]
fn test_ranking_is_deterministic() {
    let catalog = fallback_catalog();
    let first = rank_by_future_value(1000.0, 24, &catalog);
    for _ in 0..5 {
        assert_eq!(rank_by_future_value(1000.0, 24, &catalog), first);
    }
    assert_eq!(first.len(), 4);
    assert_eq!(first[0].investment_key, InvestmentKey::Selic);
}

#[test]
fn test_catalog_follows_live_interbank_rate() {
    let rates = RateSet::from_series(
        SeriesValue::live(monthly_from_annual(15.0)),
        SeriesValue::live(monthly_from_annual(14.9)),
        SeriesValue::live(0.44),
        Utc::now(),
    );
    let catalog = InvestmentCatalog::from_rates(&rates);

    assert_eq!(catalog.rate(InvestmentKey::Selic), Some(1.1715));
    assert_eq!(catalog.rate(InvestmentKey::Cdb), Some(1.1642));
    assert_eq!(catalog.rate(InvestmentKey::LciLca), Some(1.0129));
    assert_eq!(catalog.rate(InvestmentKey::Fundo), Some(0.8731));
}

#[test]
fn test_best_for_goal_and_contribution_ranking_agree_on_leader() {
    let catalog = fallback_catalog();

    let best = best_for_goal(20_000.0, 5_000.0, &catalog).unwrap();
    assert_eq!(best.investment_key, InvestmentKey::Selic);

    let ranked =
        rank_goal_with_contributions(20_000.0, 5_000.0, 300.0, &catalog, DEFAULT_MAX_MONTHS);
    assert_eq!(ranked[0].investment.key, InvestmentKey::Selic);
    assert!(ranked
        .windows(2)
        .all(|w| w[0].solution.months_required <= w[1].solution.months_required));
}

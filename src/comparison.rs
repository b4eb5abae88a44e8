//! Ranking of catalog products for a scenario
//!
//! Every ranking is a stable sort over catalog order, so ties keep the
//! order products appear in the catalog.

use itertools::Itertools;
use serde::Serialize;

use crate::catalog::{InvestmentCatalog, InvestmentKey, InvestmentType};
use crate::projection::{
    future_value, months_to_reach_goal_with_contributions, solve_goal, GoalSolution,
};
use crate::rates::round_dp;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub investment_key: InvestmentKey,
    pub display_name: String,
    pub monthly_rate_percent: f64,
    pub final_value: f64,
    pub gain: f64,
    /// Only set for goal comparisons
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months_required: Option<u32>,
}

impl ComparisonRow {
    fn new(investment: &InvestmentType, final_value: f64, gain: f64) -> Self {
        Self {
            investment_key: investment.key,
            display_name: investment.display_name.clone(),
            monthly_rate_percent: investment.monthly_rate_percent,
            final_value,
            gain,
            months_required: None,
        }
    }
}

/// A product and its recurring-contribution goal solution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedGoal {
    pub investment: InvestmentType,
    pub solution: GoalSolution,
}

/// Future value of `initial` after `months` for every product, highest first
pub fn rank_by_future_value(
    initial: f64,
    months: u32,
    catalog: &InvestmentCatalog,
) -> Vec<ComparisonRow> {
    catalog
        .iter()
        .map(|investment| {
            let final_value = future_value(initial, investment.monthly_rate_percent, months);
            ComparisonRow::new(investment, final_value, round_dp(final_value - initial, 2))
        })
        .sorted_by(|a, b| b.final_value.total_cmp(&a.final_value))
        .collect()
}

/// Product that turns `initial` into `goal` in the fewest months.
///
/// Uses the closed-form lump-sum solver; `None` only for an empty catalog.
pub fn best_for_goal(
    goal: f64,
    initial: f64,
    catalog: &InvestmentCatalog,
) -> Option<ComparisonRow> {
    catalog
        .iter()
        .map(|investment| {
            let solution = solve_goal(initial, investment.monthly_rate_percent, goal);
            ComparisonRow {
                months_required: Some(solution.months_required),
                ..ComparisonRow::new(investment, solution.final_value, solution.total_gain)
            }
        })
        .min_by_key(|row| row.months_required)
}

/// Recurring-contribution solution for every product, fastest first
pub fn rank_goal_with_contributions(
    goal: f64,
    initial: f64,
    monthly_contribution: f64,
    catalog: &InvestmentCatalog,
    max_months: u32,
) -> Vec<RankedGoal> {
    catalog
        .iter()
        .map(|investment| RankedGoal {
            investment: investment.clone(),
            solution: months_to_reach_goal_with_contributions(
                initial,
                monthly_contribution,
                investment.monthly_rate_percent,
                goal,
                max_months,
            ),
        })
        .sorted_by_key(|ranked| ranked.solution.months_required)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::DEFAULT_MAX_MONTHS;

    fn catalog() -> InvestmentCatalog {
        InvestmentCatalog::default()
    }

    #[test]
    fn test_rank_by_future_value_orders_descending() {
        let rows = rank_by_future_value(1000.0, 12, &catalog());
        let keys: Vec<_> = rows.iter().map(|r| r.investment_key).collect();
        assert_eq!(
            keys,
            vec![
                InvestmentKey::Selic,
                InvestmentKey::Cdb,
                InvestmentKey::LciLca,
                InvestmentKey::Fundo
            ]
        );
        assert!(rows.windows(2).all(|w| w[0].final_value >= w[1].final_value));
        assert!(rows.iter().all(|r| r.months_required.is_none()));
    }

    #[test]
    fn test_rank_ties_keep_catalog_order() {
        let catalog = InvestmentCatalog::from_items(vec![
            InvestmentType::new(InvestmentKey::Fundo, 1.0),
            InvestmentType::new(InvestmentKey::Selic, 1.0),
            InvestmentType::new(InvestmentKey::Cdb, 1.2),
        ]);
        let rows = rank_by_future_value(1000.0, 6, &catalog);
        let keys: Vec<_> = rows.iter().map(|r| r.investment_key).collect();
        assert_eq!(
            keys,
            vec![InvestmentKey::Cdb, InvestmentKey::Fundo, InvestmentKey::Selic]
        );
    }

    #[test]
    fn test_rank_gain_matches_final_value() {
        for row in rank_by_future_value(2500.0, 24, &catalog()) {
            assert!((row.final_value - 2500.0 - row.gain).abs() < 0.006);
        }
    }

    #[test]
    fn test_best_for_goal_picks_fastest() {
        let best = best_for_goal(2000.0, 1000.0, &catalog()).unwrap();
        assert_eq!(best.investment_key, InvestmentKey::Selic);
        assert_eq!(best.final_value, 2000.0);
        assert_eq!(best.gain, 1000.0);
        assert!(best.months_required.unwrap() > 0);
    }

    #[test]
    fn test_best_for_goal_tie_takes_first() {
        let catalog = InvestmentCatalog::from_items(vec![
            InvestmentType::new(InvestmentKey::Cdb, 1.16),
            InvestmentType::new(InvestmentKey::Selic, 1.16),
        ]);
        let best = best_for_goal(3000.0, 1000.0, &catalog).unwrap();
        assert_eq!(best.investment_key, InvestmentKey::Cdb);
    }

    #[test]
    fn test_best_for_goal_empty_catalog() {
        assert!(best_for_goal(3000.0, 1000.0, &InvestmentCatalog::from_items(vec![])).is_none());
    }

    #[test]
    fn test_rank_goal_with_contributions_orders_ascending() {
        let ranked =
            rank_goal_with_contributions(50_000.0, 1000.0, 800.0, &catalog(), DEFAULT_MAX_MONTHS);
        assert_eq!(ranked.len(), 4);
        assert_eq!(ranked[0].investment.key, InvestmentKey::Selic);
        assert_eq!(ranked[3].investment.key, InvestmentKey::Fundo);
        assert!(ranked
            .windows(2)
            .all(|w| w[0].solution.months_required <= w[1].solution.months_required));
        assert!(ranked.iter().all(|r| r.solution.reached(50_000.0)));
    }
}

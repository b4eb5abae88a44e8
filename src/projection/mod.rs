//! Compound-interest projections
//!
//! Pure functions over plain numbers: growth series, the closed-form
//! lump-sum goal solver, the iterative solver for recurring contributions,
//! minimum initial investment and future value. Rates are percent per month.
//!
//! The goal solvers do not validate their inputs; callers check scenarios
//! with the helpers in [`validation`] first.

pub mod validation;

use serde::Serialize;

use crate::rates::round_dp;

pub const DEFAULT_HORIZON_MONTHS: u32 = 24;
/// Ceiling for the contribution solver: 100 years
pub const DEFAULT_MAX_MONTHS: u32 = 1200;

/// Balance of a lump-sum investment at a given month
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectionPoint {
    pub month_index: u32,
    pub value: f64,
    pub gain: f64,
}

/// Outcome of a goal solver.
///
/// `total_contributed` is only present for recurring-contribution scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalSolution {
    pub months_required: u32,
    pub final_value: f64,
    pub total_gain: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_contributed: Option<f64>,
}

impl GoalSolution {
    /// The contribution solver stops at its month ceiling even when the goal
    /// is out of reach; this tells the two apart.
    pub fn reached(&self, goal: f64) -> bool {
        self.final_value >= goal
    }
}

fn growth_factor(monthly_rate_percent: f64, months: u32) -> f64 {
    (1.0 + monthly_rate_percent / 100.0).powf(f64::from(months))
}

/// Month-by-month balances for months `0..=horizon_months`
pub fn growth_series(
    initial: f64,
    monthly_rate_percent: f64,
    horizon_months: u32,
) -> Vec<ProjectionPoint> {
    (0..=horizon_months)
        .map(|month_index| {
            let value = initial * growth_factor(monthly_rate_percent, month_index);
            ProjectionPoint {
                month_index,
                value,
                gain: value - initial,
            }
        })
        .collect()
}

/// Months needed for `initial` to grow to `goal` with no further deposits.
///
/// Expects `initial > 0`, `rate > 0` and `goal > initial`. A goal at or
/// below `initial` yields 0. Other precondition violations give an
/// unspecified value.
pub fn months_to_reach_goal(initial: f64, monthly_rate_percent: f64, goal: f64) -> u32 {
    let months = (goal / initial).ln() / (1.0 + monthly_rate_percent / 100.0).ln();
    // `as` saturates: negative results become 0, NaN becomes 0
    months.ceil() as u32
}

/// Lump-sum goal solution with the goal amount as the final value
pub fn solve_goal(initial: f64, monthly_rate_percent: f64, goal: f64) -> GoalSolution {
    GoalSolution {
        months_required: months_to_reach_goal(initial, monthly_rate_percent, goal),
        final_value: round_dp(goal, 2),
        total_gain: round_dp(goal - initial, 2),
        total_contributed: None,
    }
}

/// Present value needed today to reach `goal` after `months`, rounded to cents
pub fn minimum_initial_investment(goal: f64, monthly_rate_percent: f64, months: u32) -> f64 {
    round_dp(goal / growth_factor(monthly_rate_percent, months), 2)
}

/// Compound `initial` for `months`, rounded to cents
///
/// ```
/// use rendimentos::projection::future_value;
///
/// assert_eq!(future_value(1000.0, 1.0, 1), 1010.0);
/// ```
pub fn future_value(initial: f64, monthly_rate_percent: f64, months: u32) -> f64 {
    round_dp(initial * growth_factor(monthly_rate_percent, months), 2)
}

/// Simulate monthly compounding plus a fixed deposit until the balance
/// reaches `goal` or `max_months` elapse.
///
/// Hitting `max_months` is a normal outcome; check [`GoalSolution::reached`].
pub fn months_to_reach_goal_with_contributions(
    initial: f64,
    monthly_contribution: f64,
    monthly_rate_percent: f64,
    goal: f64,
    max_months: u32,
) -> GoalSolution {
    let factor = 1.0 + monthly_rate_percent / 100.0;
    let mut balance = initial;
    let mut months = 0u32;

    while balance < goal && months < max_months {
        months += 1;
        balance = balance * factor + monthly_contribution;
    }

    let total_contributed = initial + monthly_contribution * months as f64;
    GoalSolution {
        months_required: months,
        final_value: balance,
        total_gain: balance - total_contributed,
        total_contributed: Some(total_contributed),
    }
}

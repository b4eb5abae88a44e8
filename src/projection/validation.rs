//! Scenario validation
//!
//! The solvers assume well-formed inputs. These checks run at the edge,
//! before a scenario reaches them, and report the first violated rule.

use crate::error::ScenarioError;

/// Amount to project must be positive
pub fn validate_initial(initial: f64) -> Result<(), ScenarioError> {
    if !(initial > 0.0 && initial.is_finite()) {
        return Err(ScenarioError::NonPositiveInitial(initial));
    }
    Ok(())
}

/// Horizon must cover at least one month and at most `max_months`
pub fn validate_horizon(months: u32, max_months: u32) -> Result<(), ScenarioError> {
    if months == 0 {
        return Err(ScenarioError::EmptyHorizon);
    }
    if months > max_months {
        return Err(ScenarioError::HorizonTooLong { months, max_months });
    }
    Ok(())
}

/// Goal amount must be positive
pub fn validate_goal(goal: f64) -> Result<(), ScenarioError> {
    if !(goal > 0.0 && goal.is_finite()) {
        return Err(ScenarioError::NonPositiveGoal(goal));
    }
    Ok(())
}

/// Lump-sum goal: positive goal, positive initial amount below the goal
pub fn validate_lump_sum_goal(initial: f64, goal: f64) -> Result<(), ScenarioError> {
    validate_goal(goal)?;
    validate_initial(initial)?;
    if initial >= goal {
        return Err(ScenarioError::GoalAlreadyMet { initial, goal });
    }
    Ok(())
}

/// Recurring-contribution goal: the initial amount may be zero, but the
/// monthly deposit must be positive.
pub fn validate_contribution_goal(
    initial: f64,
    monthly_contribution: f64,
    goal: f64,
) -> Result<(), ScenarioError> {
    validate_goal(goal)?;
    if !(initial >= 0.0 && initial.is_finite()) {
        return Err(ScenarioError::NegativeInitial(initial));
    }
    if !(monthly_contribution > 0.0 && monthly_contribution.is_finite()) {
        return Err(ScenarioError::NonPositiveContribution(monthly_contribution));
    }
    if initial >= goal {
        return Err(ScenarioError::GoalAlreadyMet { initial, goal });
    }
    Ok(())
}

//! In-memory planner for an interactive session
//!
//! Keeps the simulations and savings goals a user creates while the process
//! runs. Nothing is persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::{InvestmentCatalog, InvestmentKey, InvestmentType};
use crate::comparison::{best_for_goal, ComparisonRow};
use crate::projection::{growth_series, ProjectionPoint};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Simulation {
    pub id: u64,
    pub initial: f64,
    pub investment: InvestmentKey,
    pub monthly_rate_percent: f64,
    pub created_at: DateTime<Utc>,
    pub series: Vec<ProjectionPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Goal {
    pub id: u64,
    pub description: String,
    pub target: f64,
    pub available: f64,
    pub created_at: DateTime<Utc>,
    pub best: Option<ComparisonRow>,
}

#[derive(Debug, Default)]
pub struct Planner {
    next_id: u64,
    simulations: Vec<Simulation>,
    goals: Vec<Goal>,
}

impl Planner {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Record a growth projection of `initial` in `investment`
    pub fn simulate(
        &mut self,
        initial: f64,
        investment: &InvestmentType,
        horizon_months: u32,
    ) -> &Simulation {
        let simulation = Simulation {
            id: self.allocate_id(),
            initial,
            investment: investment.key,
            monthly_rate_percent: investment.monthly_rate_percent,
            created_at: Utc::now(),
            series: growth_series(initial, investment.monthly_rate_percent, horizon_months),
        };
        self.simulations.push(simulation);
        &self.simulations[self.simulations.len() - 1]
    }

    /// Record a savings goal together with the fastest product for it
    pub fn add_goal(
        &mut self,
        description: &str,
        target: f64,
        available: f64,
        catalog: &InvestmentCatalog,
    ) -> &Goal {
        let goal = Goal {
            id: self.allocate_id(),
            description: description.to_string(),
            target,
            available,
            created_at: Utc::now(),
            best: best_for_goal(target, available, catalog),
        };
        self.goals.push(goal);
        &self.goals[self.goals.len() - 1]
    }

    pub fn remove_simulation(&mut self, id: u64) -> bool {
        let before = self.simulations.len();
        self.simulations.retain(|s| s.id != id);
        self.simulations.len() != before
    }

    pub fn remove_goal(&mut self, id: u64) -> bool {
        let before = self.goals.len();
        self.goals.retain(|g| g.id != id);
        self.goals.len() != before
    }

    pub fn simulations(&self) -> &[Simulation] {
        &self.simulations
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }
}

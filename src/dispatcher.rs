//! Command dispatcher that routes both clap Commands and interactive input
//! to the appropriate handlers.
//!
//! `AppContext` owns the long-lived pieces (rate provider, shared catalog,
//! session planner) so one-shot CLI runs and the REPL share the same wiring.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use colored::Colorize;
use serde::Serialize;
use tracing::info;

use crate::catalog::{InvestmentCatalog, InvestmentKey, InvestmentType, SharedCatalog};
use crate::cli::formatters;
use crate::commands::{Command, GoalsAction, HistoryAction};
use crate::comparison::{best_for_goal, rank_by_future_value, rank_goal_with_contributions};
use crate::config::Settings;
use crate::projection::validation::{
    validate_contribution_goal, validate_goal, validate_horizon, validate_initial,
    validate_lump_sum_goal,
};
use crate::projection::{minimum_initial_investment, ProjectionPoint};
use crate::rates::bcb::BcbClient;
use crate::rates::fx::{self, Currency};
use crate::rates::{OfflineSource, RateProvider, RateSet, RateSource};
use crate::session::Planner;

/// Default horizon for `compare` when none is given
pub const DEFAULT_COMPARE_MONTHS: u32 = 12;

/// Composition root shared by every command
pub struct AppContext {
    pub settings: Settings,
    pub source: Arc<dyn RateSource>,
    pub provider: Arc<RateProvider>,
    pub catalog: SharedCatalog,
    planner: Mutex<Planner>,
}

impl AppContext {
    /// Wire the Banco Central client, or the offline source when configured
    pub fn new(settings: Settings) -> Result<Self> {
        let source: Arc<dyn RateSource> = if settings.offline {
            info!("Offline mode: using fallback rates");
            Arc::new(OfflineSource)
        } else {
            Arc::new(BcbClient::new(&settings.bcb_base_url, &settings.user_agent)?)
        };
        Ok(Self::with_source(settings, source))
    }

    pub fn with_source(settings: Settings, source: Arc<dyn RateSource>) -> Self {
        let provider =
            Arc::new(RateProvider::new(Arc::clone(&source)).with_ttl(settings.cache_ttl()));
        Self {
            settings,
            source,
            provider,
            catalog: SharedCatalog::default(),
            planner: Mutex::new(Planner::new()),
        }
    }

    /// Current rates, pushed into the shared catalog before returning it
    pub async fn current(&self) -> (RateSet, InvestmentCatalog) {
        let rates = self.provider.get_rates().await;
        self.catalog.replace(&rates);
        (rates, self.catalog.snapshot())
    }

    pub fn planner(&self) -> MutexGuard<'_, Planner> {
        self.planner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn select(catalog: &InvestmentCatalog, key: Option<InvestmentKey>) -> Result<Vec<InvestmentType>> {
    match key {
        Some(key) => catalog
            .get(key)
            .cloned()
            .map(|i| vec![i])
            .ok_or_else(|| anyhow!("{} is not in the catalog", key)),
        None => Ok(catalog.iter().cloned().collect()),
    }
}

fn print_output(json_output: bool, json: impl FnOnce() -> String, text: impl FnOnce() -> String) {
    if json_output {
        println!("{}", json());
    } else {
        print!("{}", text());
    }
}

/// Route a parsed command to its handler
pub async fn dispatch_command(ctx: &AppContext, command: Command, json_output: bool) -> Result<()> {
    match command {
        Command::Rates => dispatch_rates(ctx, json_output).await,
        Command::Refresh => {
            ctx.provider.invalidate();
            dispatch_rates(ctx, json_output).await
        }
        Command::Simulate {
            initial,
            investment,
            months,
        } => dispatch_simulate(ctx, initial, investment, months, json_output).await,
        Command::Compare { initial, months } => {
            dispatch_compare(ctx, initial, months, json_output).await
        }
        Command::Goal { target, available } => {
            dispatch_goal(ctx, target, available, json_output).await
        }
        Command::Minimum {
            target,
            months,
            investment,
        } => dispatch_minimum(ctx, target, months, investment, json_output).await,
        Command::Plan {
            target,
            monthly,
            initial,
        } => dispatch_plan(ctx, target, monthly, initial, json_output).await,
        Command::Convert { amount, from, to } => {
            dispatch_convert(ctx, amount, from, to, json_output).await
        }
        Command::Goals { action } => dispatch_goals(ctx, action, json_output).await,
        Command::History { action } => dispatch_history(ctx, action, json_output),
        Command::Help => {
            println!("Help: rendimentos <command> [options]");
            println!("\nAvailable commands:");
            println!("  rates                              - Show current monthly rates");
            println!("  refresh                            - Fetch rates again from Banco Central");
            println!("  simulate <initial> [-i KEY] [-m N] - Project growth month by month");
            println!("  compare <initial> [-m N]           - Rank products by future value");
            println!("  goal <target> <available>          - Fastest product for a lump-sum goal");
            println!("  minimum <target> <months> [-i KEY] - Initial amount needed for a target");
            println!("  plan <target> <monthly> [--initial I] - Months to a goal with deposits");
            println!("  convert <amount> [--from C] [--to C] - Convert between BRL and USD");
            println!("  goals [list|add|remove]            - Manage savings goals");
            println!("  history [list|remove <id>]         - Simulations of this session");
            println!("  help                               - Show this help");
            println!("  exit                               - Exit application");
            println!("\nProducts: SELIC, CDB, LCI_LCA, FUNDO");
            Ok(())
        }
        // Handled by the interactive loop
        Command::Exit => Ok(()),
    }
}

async fn dispatch_rates(ctx: &AppContext, json_output: bool) -> Result<()> {
    let (rates, catalog) = ctx.current().await;
    print_output(
        json_output,
        || formatters::format_json(&catalog.view(rates.fetched_at)),
        || formatters::format_rates_table(&rates, &catalog),
    );
    Ok(())
}

async fn dispatch_simulate(
    ctx: &AppContext,
    initial: f64,
    investment: Option<InvestmentKey>,
    months: Option<u32>,
    json_output: bool,
) -> Result<()> {
    let months = months.unwrap_or(ctx.settings.horizon_months);
    validate_initial(initial)?;
    validate_horizon(months, ctx.settings.max_months)?;

    let (_, catalog) = ctx.current().await;
    let selected = select(&catalog, investment)?;
    info!(
        "Simulating {} over {} months for {} products",
        initial,
        months,
        selected.len()
    );

    let projections: Vec<(InvestmentType, Vec<ProjectionPoint>)> = {
        let mut planner = ctx.planner();
        selected
            .into_iter()
            .map(|i| {
                let series = planner.simulate(initial, &i, months).series.clone();
                (i, series)
            })
            .collect()
    };

    #[derive(Serialize)]
    struct GrowthJson<'a> {
        investment: &'a InvestmentType,
        series: &'a [ProjectionPoint],
    }

    print_output(
        json_output,
        || {
            let out: Vec<GrowthJson> = projections
                .iter()
                .map(|(investment, series)| GrowthJson { investment, series })
                .collect();
            formatters::format_json(&out)
        },
        || formatters::format_growth_table(initial, &projections),
    );
    Ok(())
}

async fn dispatch_compare(
    ctx: &AppContext,
    initial: f64,
    months: Option<u32>,
    json_output: bool,
) -> Result<()> {
    let months = months.unwrap_or(DEFAULT_COMPARE_MONTHS);
    validate_initial(initial)?;
    validate_horizon(months, ctx.settings.max_months)?;

    let (_, catalog) = ctx.current().await;
    let rows = rank_by_future_value(initial, months, &catalog);
    print_output(
        json_output,
        || formatters::format_json(&rows),
        || formatters::format_comparison_table(&rows, initial, months),
    );
    Ok(())
}

async fn dispatch_goal(
    ctx: &AppContext,
    target: f64,
    available: f64,
    json_output: bool,
) -> Result<()> {
    validate_lump_sum_goal(available, target)?;

    let (_, catalog) = ctx.current().await;
    let best = best_for_goal(target, available, &catalog)
        .ok_or_else(|| anyhow!("No investment products available"))?;
    print_output(
        json_output,
        || formatters::format_json(&best),
        || formatters::format_goal_result(&best, target, available),
    );
    Ok(())
}

async fn dispatch_minimum(
    ctx: &AppContext,
    target: f64,
    months: u32,
    investment: Option<InvestmentKey>,
    json_output: bool,
) -> Result<()> {
    validate_goal(target)?;
    validate_horizon(months, ctx.settings.max_months)?;

    let (_, catalog) = ctx.current().await;
    let rows: Vec<(InvestmentType, f64)> = select(&catalog, investment)?
        .into_iter()
        .map(|i| {
            let minimum = minimum_initial_investment(target, i.monthly_rate_percent, months);
            (i, minimum)
        })
        .collect();

    #[derive(Serialize)]
    struct MinimumJson<'a> {
        investment: &'a InvestmentType,
        minimum_initial: f64,
    }

    print_output(
        json_output,
        || {
            let out: Vec<MinimumJson> = rows
                .iter()
                .map(|(investment, minimum_initial)| MinimumJson {
                    investment,
                    minimum_initial: *minimum_initial,
                })
                .collect();
            formatters::format_json(&out)
        },
        || formatters::format_minimum_table(&rows, target, months),
    );
    Ok(())
}

async fn dispatch_plan(
    ctx: &AppContext,
    target: f64,
    monthly: f64,
    initial: f64,
    json_output: bool,
) -> Result<()> {
    validate_contribution_goal(initial, monthly, target)?;

    let (_, catalog) = ctx.current().await;
    let ranked =
        rank_goal_with_contributions(target, initial, monthly, &catalog, ctx.settings.max_months);
    print_output(
        json_output,
        || formatters::format_json(&ranked),
        || formatters::format_plan_table(&ranked, target, monthly, initial),
    );
    Ok(())
}

async fn dispatch_convert(
    ctx: &AppContext,
    amount: f64,
    from: Currency,
    to: Currency,
    json_output: bool,
) -> Result<()> {
    let conversion = fx::convert(ctx.source.as_ref(), amount, from, to).await;
    print_output(
        json_output,
        || formatters::format_json(&conversion),
        || formatters::format_conversion(&conversion),
    );
    Ok(())
}

async fn dispatch_goals(ctx: &AppContext, action: GoalsAction, json_output: bool) -> Result<()> {
    match action {
        GoalsAction::List => {
            let planner = ctx.planner();
            print_output(
                json_output,
                || formatters::format_json(&planner.goals()),
                || formatters::format_goals_list(planner.goals()),
            );
        }
        GoalsAction::Add {
            target,
            available,
            description,
        } => {
            validate_lump_sum_goal(available, target)?;
            let (_, catalog) = ctx.current().await;
            let mut planner = ctx.planner();
            let goal = planner.add_goal(&description, target, available, &catalog);
            print_output(
                json_output,
                || formatters::format_json(goal),
                || {
                    format!(
                        "{} Goal #{} added: {}\n",
                        "✓".green().bold(),
                        goal.id,
                        goal.description
                    )
                },
            );
        }
        GoalsAction::Remove { id } => {
            if !ctx.planner().remove_goal(id) {
                return Err(anyhow!("No goal with id {}", id));
            }
            if !json_output {
                println!("{} Goal #{} removed", "✓".green().bold(), id);
            }
        }
    }
    Ok(())
}

fn dispatch_history(ctx: &AppContext, action: HistoryAction, json_output: bool) -> Result<()> {
    match action {
        HistoryAction::List => {
            let planner = ctx.planner();
            print_output(
                json_output,
                || formatters::format_json(&planner.simulations()),
                || formatters::format_history(planner.simulations()),
            );
        }
        HistoryAction::Remove { id } => {
            if !ctx.planner().remove_simulation(id) {
                return Err(anyhow!("No simulation with id {}", id));
            }
            if !json_output {
                println!("{} Simulation #{} removed", "✓".green().bold(), id);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScenarioError;

    fn offline_context() -> AppContext {
        AppContext::with_source(Settings::default(), Arc::new(OfflineSource))
    }

    #[tokio::test]
    async fn test_current_uses_fallback_offline() {
        let ctx = offline_context();
        let (rates, catalog) = ctx.current().await;
        assert!(!rates.is_live());
        assert_eq!(catalog.rate(InvestmentKey::Selic), Some(1.17));
        assert_eq!(ctx.catalog.snapshot(), catalog);
    }

    #[tokio::test]
    async fn test_simulate_records_history() {
        let ctx = offline_context();
        let cmd = Command::Simulate {
            initial: 1000.0,
            investment: None,
            months: Some(6),
        };
        dispatch_command(&ctx, cmd, true).await.unwrap();
        assert_eq!(ctx.planner().simulations().len(), 4);
    }

    #[tokio::test]
    async fn test_invalid_scenarios_are_rejected() {
        let ctx = offline_context();

        let err = dispatch_command(
            &ctx,
            Command::Goal {
                target: 1000.0,
                available: 5000.0,
            },
            true,
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ScenarioError>(),
            Some(&ScenarioError::GoalAlreadyMet {
                initial: 5000.0,
                goal: 1000.0
            })
        );

        let err = dispatch_command(
            &ctx,
            Command::Plan {
                target: 1000.0,
                monthly: 0.0,
                initial: 0.0,
            },
            true,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("monthly contribution"));

        assert!(dispatch_command(
            &ctx,
            Command::Compare {
                initial: 1000.0,
                months: Some(0)
            },
            true
        )
        .await
        .is_err());
    }

    #[tokio::test]
    async fn test_horizon_beyond_month_limit_is_rejected() {
        let ctx = offline_context();

        let err = dispatch_command(
            &ctx,
            Command::Compare {
                initial: 1000.0,
                months: Some(3_000_000_000),
            },
            true,
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ScenarioError>(),
            Some(&ScenarioError::HorizonTooLong {
                months: 3_000_000_000,
                max_months: 1200
            })
        );
        assert!(ctx.planner().simulations().is_empty());
    }

    #[tokio::test]
    async fn test_goals_add_and_remove() {
        let ctx = offline_context();
        let add = Command::Goals {
            action: GoalsAction::Add {
                target: 5000.0,
                available: 1000.0,
                description: "Reserva".to_string(),
            },
        };
        dispatch_command(&ctx, add, true).await.unwrap();
        let id = ctx.planner().goals()[0].id;

        let remove = Command::Goals {
            action: GoalsAction::Remove { id },
        };
        dispatch_command(&ctx, remove.clone(), true).await.unwrap();
        assert!(dispatch_command(&ctx, remove, true).await.is_err());
    }

    #[tokio::test]
    async fn test_refresh_refetches() {
        let ctx = offline_context();
        dispatch_command(&ctx, Command::Rates, true).await.unwrap();
        dispatch_command(&ctx, Command::Rates, true).await.unwrap();
        assert_eq!(ctx.provider.fetch_count(), 1);
        dispatch_command(&ctx, Command::Refresh, true).await.unwrap();
        assert_eq!(ctx.provider.fetch_count(), 2);
    }
}

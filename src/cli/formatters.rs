//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data calculation from presentation.

use colored::Colorize;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::catalog::{InvestmentCatalog, InvestmentType};
use crate::comparison::{ComparisonRow, RankedGoal};
use crate::projection::ProjectionPoint;
use crate::rates::fx::{Conversion, Currency};
use crate::rates::{RateSet, SeriesId};
use crate::session::{Goal, Simulation};
use crate::utils::{
    format_currency, format_currency_with_width, format_duration_months, format_percent,
    format_rate, format_usd, CurrencySymbol,
};

/// Pretty JSON for any serializable result
pub fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

fn money(value: f64) -> String {
    format_currency_with_width(value, 0, CurrencySymbol::None)
}

fn header(icon: &str, title: &str) -> String {
    format!("\n{} {}\n\n", icon.cyan().bold(), title.bold())
}

/// Product rates plus the base series they were derived from
pub fn format_rates_table(rates: &RateSet, catalog: &InvestmentCatalog) -> String {
    let mut output = header("📈", "Current monthly rates");

    #[derive(Tabled)]
    struct RateRow {
        #[tabled(rename = "Key")]
        key: String,
        #[tabled(rename = "Product")]
        name: String,
        #[tabled(rename = "Rate")]
        rate: String,
    }

    let rows: Vec<RateRow> = catalog
        .iter()
        .map(|i| RateRow {
            key: i.key.as_str().to_string(),
            name: i.display_name.clone(),
            rate: format_rate(i.monthly_rate_percent),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(2..), Alignment::right());
    output.push_str(&table.to_string());

    output.push_str(&format!("\n\n{} Base series", "━".repeat(60).bright_black()));
    for (series, value) in [
        (SeriesId::Selic, rates.policy_rate),
        (SeriesId::Cdi, rates.interbank_rate),
        (SeriesId::Ipca, rates.inflation_rate),
    ] {
        let source = if rates.used_fallback(series) {
            "fallback".yellow()
        } else {
            "live".green()
        };
        output.push_str(&format!(
            "\n{:<20} {:>14}  {}",
            format!("{}:", series.as_str()).bold(),
            format_rate(value),
            source
        ));
    }
    output.push_str(&format!(
        "\n{:<20} {}\n",
        "Updated:".bold(),
        rates
            .fetched_at
            .with_timezone(&chrono::Local)
            .format("%d/%m/%Y %H:%M")
    ));

    if !rates.is_live() {
        output.push_str(&format!(
            "\n{} Banco Central unavailable for some series; fallback rates in use\n",
            "⚠".yellow().bold()
        ));
    }

    output
}

/// Month-by-month balances, one value column per product
pub fn format_growth_table(
    initial: f64,
    projections: &[(InvestmentType, Vec<ProjectionPoint>)],
) -> String {
    let mut output = header(
        "📊",
        &format!("Growth of {} per month", format_currency(initial)),
    );

    let mut builder = Builder::default();
    let mut head = vec!["Month".to_string()];
    head.extend(projections.iter().map(|(investment, _)| {
        format!(
            "{} ({})",
            investment.display_name,
            format_rate(investment.monthly_rate_percent)
        )
    }));
    builder.push_record(head);

    let months = projections.first().map(|(_, s)| s.len()).unwrap_or(0);
    for month in 0..months {
        let mut record = vec![month.to_string()];
        record.extend(
            projections
                .iter()
                .map(|(_, series)| series.get(month).map(|p| money(p.value)).unwrap_or_default()),
        );
        builder.push_record(record);
    }

    let mut table = builder.build();
    table.with(Style::modern());
    table.modify(Columns::new(..), Alignment::right());
    output.push_str(&table.to_string());

    for (investment, series) in projections {
        if let Some(last) = series.last() {
            output.push_str(&format!(
                "\n{:<22} {} ({} gain)",
                format!("{}:", investment.display_name).bold(),
                format_currency(last.value),
                format_currency(last.gain).green()
            ));
        }
    }
    output.push('\n');
    output
}

/// Products ranked by future value, best first
pub fn format_comparison_table(rows: &[ComparisonRow], initial: f64, months: u32) -> String {
    let mut output = header(
        "🏁",
        &format!(
            "{} invested for {}",
            format_currency(initial),
            format_duration_months(months)
        ),
    );

    #[derive(Tabled)]
    struct CompareRow {
        #[tabled(rename = "#")]
        rank: usize,
        #[tabled(rename = "Product")]
        name: String,
        #[tabled(rename = "Rate")]
        rate: String,
        #[tabled(rename = "Final Value")]
        final_value: String,
        #[tabled(rename = "Gain")]
        gain: String,
        #[tabled(rename = "Return")]
        total_return: String,
    }

    let table_rows: Vec<CompareRow> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| CompareRow {
            rank: i + 1,
            name: r.display_name.clone(),
            rate: format_rate(r.monthly_rate_percent),
            final_value: money(r.final_value),
            gain: money(r.gain).green().to_string(),
            total_return: format_percent(r.gain / initial * 100.0),
        })
        .collect();

    let mut table = Table::new(&table_rows);
    table.with(Style::modern());
    table.modify(Columns::new(2..), Alignment::right());
    output.push_str(&table.to_string());

    if let Some(best) = rows.first() {
        output.push_str(&format!(
            "\n\n{} Best option: {}\n",
            "✓".green().bold(),
            best.display_name.bold()
        ));
    }
    output
}

/// Fastest product for a lump-sum goal
pub fn format_goal_result(best: &ComparisonRow, target: f64, available: f64) -> String {
    let mut output = header(
        "🎯",
        &format!(
            "Goal {} starting from {}",
            format_currency(target),
            format_currency(available)
        ),
    );
    let months = best.months_required.unwrap_or(0);

    output.push_str(&format!(
        "{:<20} {} ({})\n",
        "Best product:".bold(),
        best.display_name,
        format_rate(best.monthly_rate_percent)
    ));
    output.push_str(&format!(
        "{:<20} {} months ({})\n",
        "Time needed:".bold(),
        months,
        format_duration_months(months)
    ));
    output.push_str(&format!(
        "{:<20} {}\n",
        "Final value:".bold(),
        format_currency(best.final_value)
    ));
    output.push_str(&format!(
        "{:<20} {}\n",
        "Interest earned:".bold(),
        format_currency(best.gain).green()
    ));
    output
}

/// Initial amount required per product
pub fn format_minimum_table(rows: &[(InvestmentType, f64)], target: f64, months: u32) -> String {
    let mut output = header(
        "💰",
        &format!(
            "Initial amount to reach {} in {}",
            format_currency(target),
            format_duration_months(months)
        ),
    );

    #[derive(Tabled)]
    struct MinimumRow {
        #[tabled(rename = "Product")]
        name: String,
        #[tabled(rename = "Rate")]
        rate: String,
        #[tabled(rename = "Invest Today")]
        minimum: String,
        #[tabled(rename = "Interest")]
        interest: String,
    }

    let table_rows: Vec<MinimumRow> = rows
        .iter()
        .map(|(investment, minimum)| MinimumRow {
            name: investment.display_name.clone(),
            rate: format_rate(investment.monthly_rate_percent),
            minimum: money(*minimum),
            interest: money(target - minimum).green().to_string(),
        })
        .collect();

    let mut table = Table::new(&table_rows);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());
    output.push_str(&table.to_string());
    output.push('\n');
    output
}

/// Recurring-contribution solutions, fastest first
pub fn format_plan_table(ranked: &[RankedGoal], target: f64, monthly: f64, initial: f64) -> String {
    let mut output = header(
        "🗓",
        &format!(
            "Goal {} with {} per month (initial {})",
            format_currency(target),
            format_currency(monthly),
            format_currency(initial)
        ),
    );

    #[derive(Tabled)]
    struct PlanRow {
        #[tabled(rename = "Product")]
        name: String,
        #[tabled(rename = "Months")]
        months: String,
        #[tabled(rename = "Deposited")]
        contributed: String,
        #[tabled(rename = "Interest")]
        gain: String,
        #[tabled(rename = "Final Value")]
        final_value: String,
    }

    let table_rows: Vec<PlanRow> = ranked
        .iter()
        .map(|r| {
            let months = if r.solution.reached(target) {
                r.solution.months_required.to_string()
            } else {
                format!("> {}", r.solution.months_required).red().to_string()
            };
            PlanRow {
                name: r.investment.display_name.clone(),
                months,
                contributed: r.solution.total_contributed.map(money).unwrap_or_default(),
                gain: money(r.solution.total_gain).green().to_string(),
                final_value: money(r.solution.final_value),
            }
        })
        .collect();

    let mut table = Table::new(&table_rows);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());
    output.push_str(&table.to_string());

    match ranked.first() {
        Some(best) if best.solution.reached(target) => output.push_str(&format!(
            "\n\n{} Fastest: {} in {}\n",
            "✓".green().bold(),
            best.investment.display_name.bold(),
            format_duration_months(best.solution.months_required)
        )),
        Some(best) => output.push_str(&format!(
            "\n\n{} Goal not reached within {}\n",
            "⚠".yellow().bold(),
            format_duration_months(best.solution.months_required)
        )),
        None => output.push('\n'),
    }
    output
}

pub fn format_conversion(conversion: &Conversion) -> String {
    let render = |value: f64, currency: Currency| match currency {
        Currency::Brl => format_currency(value),
        Currency::Usd => format_usd(value),
    };
    format!(
        "{} = {}\n",
        render(conversion.amount, conversion.from),
        render(conversion.converted, conversion.to).bold()
    )
}

pub fn format_goals_list(goals: &[Goal]) -> String {
    if goals.is_empty() {
        return format!(
            "{} No goals yet. Add one with: {}\n",
            "ℹ".blue().bold(),
            "goals add <target> <available> <description>".bold()
        );
    }

    #[derive(Tabled)]
    struct GoalRow {
        #[tabled(rename = "ID")]
        id: u64,
        #[tabled(rename = "Description")]
        description: String,
        #[tabled(rename = "Target")]
        target: String,
        #[tabled(rename = "Available")]
        available: String,
        #[tabled(rename = "Best Product")]
        best: String,
        #[tabled(rename = "Months")]
        months: String,
    }

    let rows: Vec<GoalRow> = goals
        .iter()
        .map(|g| GoalRow {
            id: g.id,
            description: g.description.clone(),
            target: money(g.target),
            available: money(g.available),
            best: g
                .best
                .as_ref()
                .map(|b| b.display_name.clone())
                .unwrap_or_else(|| "-".to_string()),
            months: g
                .best
                .as_ref()
                .and_then(|b| b.months_required)
                .map(|m| m.to_string())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    format!("{}\n", table)
}

pub fn format_history(simulations: &[Simulation]) -> String {
    if simulations.is_empty() {
        return format!("{} No simulations yet\n", "ℹ".blue().bold());
    }

    #[derive(Tabled)]
    struct SimulationRow {
        #[tabled(rename = "ID")]
        id: u64,
        #[tabled(rename = "Product")]
        investment: String,
        #[tabled(rename = "Initial")]
        initial: String,
        #[tabled(rename = "Rate")]
        rate: String,
        #[tabled(rename = "Months")]
        months: usize,
        #[tabled(rename = "Final Value")]
        final_value: String,
    }

    let rows: Vec<SimulationRow> = simulations
        .iter()
        .map(|s| SimulationRow {
            id: s.id,
            investment: s.investment.display_name().to_string(),
            initial: money(s.initial),
            rate: format_rate(s.monthly_rate_percent),
            months: s.series.len().saturating_sub(1),
            final_value: s.series.last().map(|p| money(p.value)).unwrap_or_default(),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    format!("{}\n", table)
}

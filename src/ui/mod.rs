//! Interactive mode
//!
//! A readline REPL over the same command grammar as the CLI. While it runs, a
//! background task refreshes the rate cache and the shared catalog.

pub mod readline;

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::commands::{parse_command, Command};
use crate::dispatcher::{dispatch_command, AppContext};
use crate::rates::RefreshTask;
use crate::utils::format_rate;

const COMMAND_PATTERNS: &[&[&str]] = &[
    &["rates"],
    &["refresh"],
    &["simulate"],
    &["compare"],
    &["goal"],
    &["minimum"],
    &["plan"],
    &["convert"],
    &["goals", "list"],
    &["goals", "add"],
    &["goals", "remove"],
    &["history", "list"],
    &["history", "remove"],
    &["help"],
    &["exit"],
    &["quit"],
];

/// Launch the interactive REPL.
pub async fn launch_interactive(ctx: &AppContext) -> Result<()> {
    println!("{}", "Rendimentos - Interactive Mode".bold());
    println!(
        "Type {} for help, {} to exit\n",
        "/help".cyan(),
        "/exit".cyan()
    );

    let (rates, catalog) = ctx.current().await;
    for investment in catalog.iter() {
        println!(
            "  {:<20} {}",
            investment.display_name,
            format_rate(investment.monthly_rate_percent)
        );
    }
    if !rates.is_live() {
        println!("  {}", "(fallback rates)".yellow());
    }
    println!();

    let shared = ctx.catalog.clone();
    let refresh = RefreshTask::spawn(
        ctx.provider.clone(),
        ctx.settings.refresh_interval(),
        move |rates| {
            shared.replace(rates);
            debug!("Catalog updated from refresh at {}", rates.fetched_at);
        },
    );

    let mut rl = readline::Readline::new(COMMAND_PATTERNS, None)?;

    loop {
        match rl.readline("rendimentos> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match parse_command(trimmed) {
                    Ok(Command::Exit) => {
                        println!("Goodbye!");
                        break;
                    }
                    Ok(cmd) => {
                        if let Err(e) = dispatch_command(ctx, cmd, false).await {
                            eprintln!("{} {}", "Error:".red().bold(), e);
                        }
                    }
                    Err(e) => {
                        eprintln!("{} {}", "Parse error:".yellow().bold(), e.message);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("{} {}", "Error:".red().bold(), err);
                break;
            }
        }
    }

    refresh.cancel();
    Ok(())
}

use std::io::IsTerminal;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use rendimentos::cli::{runner, Cli, Commands};
use rendimentos::config::Settings;
use rendimentos::dispatcher::{dispatch_command, AppContext};
use rendimentos::ui;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let settings = Settings::load()?;
    let ctx = AppContext::new(settings)?;

    match cli.command.as_ref() {
        None => {
            if std::io::stdin().is_terminal() {
                ui::launch_interactive(&ctx).await
            } else {
                Cli::command().print_help()?;
                Ok(())
            }
        }
        Some(Commands::Interactive) => ui::launch_interactive(&ctx).await,
        Some(command) => match runner::to_internal_command(command) {
            Some(cmd) => dispatch_command(&ctx, cmd, cli.json).await,
            None => Ok(()),
        },
    }
}

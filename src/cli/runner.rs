use crate::cli::Commands;
use crate::commands::Command;

/// Convert clap `Commands` into the internal `commands::Command`.
/// Returns None for commands that need special handling (`interactive`).
pub fn to_internal_command(c: &Commands) -> Option<Command> {
    match c {
        Commands::Rates => Some(Command::Rates),
        Commands::Simulate {
            initial,
            investment,
            months,
        } => Some(Command::Simulate {
            initial: *initial,
            investment: *investment,
            months: *months,
        }),
        Commands::Compare { initial, months } => Some(Command::Compare {
            initial: *initial,
            months: *months,
        }),
        Commands::Goal { target, available } => Some(Command::Goal {
            target: *target,
            available: *available,
        }),
        Commands::Minimum {
            target,
            months,
            investment,
        } => Some(Command::Minimum {
            target: *target,
            months: *months,
            investment: *investment,
        }),
        Commands::Plan {
            target,
            monthly,
            initial,
        } => Some(Command::Plan {
            target: *target,
            monthly: *monthly,
            initial: *initial,
        }),
        Commands::Convert { amount, from, to } => Some(Command::Convert {
            amount: *amount,
            from: *from,
            to: *to,
        }),
        Commands::Interactive => None,
    }
}

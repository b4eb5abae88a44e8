//! Command parsing and routing layer
//!
//! Provides a simple, custom command parser used by the interactive mode.
//! The clap CLI converts into the same `Command` enum, so both surfaces share
//! one dispatcher.

use crate::catalog::InvestmentKey;
use crate::rates::fx::Currency;

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Show current rates: `rates`
    Rates,
    /// Drop the cache and fetch again: `refresh`
    Refresh,
    /// Project growth: `simulate <initial> [-i <investment>] [-m <months>]`
    Simulate {
        initial: f64,
        investment: Option<InvestmentKey>,
        months: Option<u32>,
    },
    /// Rank products by future value: `compare <initial> [-m <months>]`
    Compare { initial: f64, months: Option<u32> },
    /// Fastest product for a lump-sum goal: `goal <target> <available>`
    Goal { target: f64, available: f64 },
    /// Initial amount needed: `minimum <target> <months> [-i <investment>]`
    Minimum {
        target: f64,
        months: u32,
        investment: Option<InvestmentKey>,
    },
    /// Goal with monthly deposits: `plan <target> [--monthly] <monthly> [--initial <amount>]`
    Plan {
        target: f64,
        monthly: f64,
        initial: f64,
    },
    /// Currency conversion: `convert <amount> [--from BRL] [--to USD]`
    Convert {
        amount: f64,
        from: Currency,
        to: Currency,
    },
    /// Saved goals of this session
    Goals { action: GoalsAction },
    /// Simulations of this session
    History { action: HistoryAction },
    /// Show help
    Help,
    /// Exit/quit
    Exit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GoalsAction {
    List,
    Add {
        target: f64,
        available: f64,
        description: String,
    },
    Remove { id: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryAction {
    List,
    Remove { id: u64 },
}

/// Error type for command parsing
#[derive(Debug, Clone)]
pub struct CommandParseError {
    pub message: String,
}

impl CommandParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CommandParseError {}

/// Parse a money amount: `1500`, `1500.50`, `1500,50`, `R$ 1.500,50`
pub fn parse_amount(s: &str) -> Result<f64, CommandParseError> {
    let cleaned = s.trim().trim_start_matches("R$").trim();
    let normalized = if cleaned.contains(',') || has_thousands_dots(cleaned) {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned.to_string()
    };

    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CommandParseError::new(format!("Invalid amount '{}'", s)))
}

/// `1.500` or `12.345.678`: dots only ever followed by three digits
fn has_thousands_dots(s: &str) -> bool {
    let mut groups = s.trim_start_matches('-').split('.');
    let lead = groups.next().unwrap_or_default();
    let lead_ok = (1..=3).contains(&lead.len())
        && lead != "0"
        && lead.bytes().all(|b| b.is_ascii_digit());
    let mut rest = groups.peekable();
    lead_ok
        && rest.peek().is_some()
        && rest.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()))
}

fn parse_months(s: &str) -> Result<u32, CommandParseError> {
    s.parse::<u32>().map_err(|_| {
        CommandParseError::new(format!("Months must be a whole number (got '{}')", s))
    })
}

fn parse_investment(s: &str) -> Result<InvestmentKey, CommandParseError> {
    s.parse::<InvestmentKey>().map_err(CommandParseError::new)
}

fn parse_currency(s: &str) -> Result<Currency, CommandParseError> {
    s.parse::<Currency>().map_err(CommandParseError::new)
}

fn parse_id(s: Option<&str>, usage: &str) -> Result<u64, CommandParseError> {
    s.ok_or_else(|| CommandParseError::new(usage))?
        .parse::<u64>()
        .map_err(|_| CommandParseError::new("Id must be a positive number"))
}

/// Split arguments into positionals and `--flag value` pairs
fn split_flags<'a>(
    args: &[&'a str],
) -> Result<(Vec<&'a str>, Vec<(&'a str, &'a str)>), CommandParseError> {
    let mut positionals = Vec::new();
    let mut flags = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let arg = args[i];
        if arg.starts_with('-') && arg.len() > 1 && arg.parse::<f64>().is_err() {
            let value = args
                .get(i + 1)
                .ok_or_else(|| CommandParseError::new(format!("{} requires a value", arg)))?;
            flags.push((arg, *value));
            i += 2;
        } else {
            positionals.push(arg);
            i += 1;
        }
    }
    Ok((positionals, flags))
}

fn flag<'a>(flags: &[(&'a str, &'a str)], names: &[&str]) -> Option<&'a str> {
    flags
        .iter()
        .rev()
        .find(|(name, _)| names.contains(name))
        .map(|(_, value)| *value)
}

fn required<'a>(
    positionals: &[&'a str],
    index: usize,
    usage: &str,
) -> Result<&'a str, CommandParseError> {
    positionals
        .get(index)
        .copied()
        .ok_or_else(|| CommandParseError::new(usage))
}

/// Parse a command string into a Command enum
///
/// A leading slash is accepted, so `/compare 1000` and `compare 1000` are
/// equivalent.
pub fn parse_command(input: &str) -> Result<Command, CommandParseError> {
    let input = input.trim();

    if input.is_empty() {
        return Err(CommandParseError::new(
            "Empty command. Type `/help` for commands.",
        ));
    }

    let input = input.strip_prefix('/').unwrap_or(input);
    let tokens: Vec<&str> = input.split_whitespace().collect();
    let (cmd, args) = tokens
        .split_first()
        .ok_or_else(|| CommandParseError::new("No command provided"))?;
    let (positionals, flags) = split_flags(args)?;

    match cmd.to_lowercase().as_str() {
        "rates" => Ok(Command::Rates),
        "refresh" => Ok(Command::Refresh),
        "simulate" => {
            let usage = "Usage: simulate <initial> [-i <investment>] [-m <months>]";
            let initial = parse_amount(required(&positionals, 0, usage)?)?;
            let investment = flag(&flags, &["-i", "--investment"])
                .or_else(|| positionals.get(1).copied())
                .map(parse_investment)
                .transpose()?;
            let months = flag(&flags, &["-m", "--months"])
                .map(parse_months)
                .transpose()?;
            Ok(Command::Simulate {
                initial,
                investment,
                months,
            })
        }
        "compare" => {
            let usage = "Usage: compare <initial> [-m <months>]";
            let initial = parse_amount(required(&positionals, 0, usage)?)?;
            let months = flag(&flags, &["-m", "--months"])
                .or_else(|| positionals.get(1).copied())
                .map(parse_months)
                .transpose()?;
            Ok(Command::Compare { initial, months })
        }
        "goal" => {
            let usage = "Usage: goal <target> <available>";
            let target = parse_amount(required(&positionals, 0, usage)?)?;
            let available = parse_amount(required(&positionals, 1, usage)?)?;
            Ok(Command::Goal { target, available })
        }
        "minimum" => {
            let usage = "Usage: minimum <target> <months> [-i <investment>]";
            let target = parse_amount(required(&positionals, 0, usage)?)?;
            let months = parse_months(required(&positionals, 1, usage)?)?;
            let investment = flag(&flags, &["-i", "--investment"])
                .map(parse_investment)
                .transpose()?;
            Ok(Command::Minimum {
                target,
                months,
                investment,
            })
        }
        "plan" => {
            let usage = "Usage: plan <target> <monthly> [--initial <amount>]";
            let target = parse_amount(required(&positionals, 0, usage)?)?;
            let monthly = match flag(&flags, &["--monthly"]) {
                Some(m) => parse_amount(m)?,
                None => parse_amount(required(&positionals, 1, usage)?)?,
            };
            let initial = flag(&flags, &["--initial"])
                .map(parse_amount)
                .transpose()?
                .unwrap_or(0.0);
            Ok(Command::Plan {
                target,
                monthly,
                initial,
            })
        }
        "convert" => {
            let usage = "Usage: convert <amount> [--from BRL] [--to USD]";
            let amount = parse_amount(required(&positionals, 0, usage)?)?;
            let from = flag(&flags, &["--from"])
                .map(parse_currency)
                .transpose()?
                .unwrap_or(Currency::Brl);
            let to = flag(&flags, &["--to"])
                .map(parse_currency)
                .transpose()?
                .unwrap_or(Currency::Usd);
            Ok(Command::Convert { amount, from, to })
        }
        "goals" => {
            let action = positionals
                .first()
                .map(|a| a.to_lowercase())
                .unwrap_or_else(|| "list".to_string());
            match action.as_str() {
                "list" => Ok(Command::Goals {
                    action: GoalsAction::List,
                }),
                "add" => {
                    let usage = "Usage: goals add <target> <available> <description>";
                    let target = parse_amount(required(&positionals, 1, usage)?)?;
                    let available = parse_amount(required(&positionals, 2, usage)?)?;
                    let description = positionals.get(3..).unwrap_or_default().join(" ");
                    if description.is_empty() {
                        return Err(CommandParseError::new(usage));
                    }
                    Ok(Command::Goals {
                        action: GoalsAction::Add {
                            target,
                            available,
                            description,
                        },
                    })
                }
                "remove" => Ok(Command::Goals {
                    action: GoalsAction::Remove {
                        id: parse_id(positionals.get(1).copied(), "Usage: goals remove <id>")?,
                    },
                }),
                _ => Err(CommandParseError::new(format!(
                    "Unknown goals action: {}. Use: goals list|add|remove",
                    action
                ))),
            }
        }
        "history" => match positionals.first().map(|a| a.to_lowercase()).as_deref() {
            None | Some("list") => Ok(Command::History {
                action: HistoryAction::List,
            }),
            Some("remove") => Ok(Command::History {
                action: HistoryAction::Remove {
                    id: parse_id(positionals.get(1).copied(), "Usage: history remove <id>")?,
                },
            }),
            Some(other) => Err(CommandParseError::new(format!(
                "Unknown history action: {}. Use: history [list|remove <id>]",
                other
            ))),
        },
        "help" | "h" | "?" => Ok(Command::Help),
        "exit" | "quit" | "q" => Ok(Command::Exit),
        other => Err(CommandParseError::new(format!(
            "Unknown command: {}. Type `/help` for commands.",
            other
        ))),
    }
}

use clap::{Parser, Subcommand};

use crate::catalog::InvestmentKey;
use crate::rates::fx::Currency;

pub mod formatters;
pub mod runner;

#[derive(Parser)]
#[command(name = "rendimentos")]
#[command(
    version,
    about = "Brazilian fixed-income rates and investment projections"
)]
#[command(
    long_about = "Fetch SELIC, CDI and IPCA from the Banco Central SGS API, derive monthly rates for Tesouro Selic, CDB, LCI/LCA and multimarket funds, and project growth, savings goals and product comparisons."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show current monthly rates for every product
    Rates,

    /// Project month-by-month growth of an initial amount
    Simulate {
        /// Initial amount in BRL
        #[arg(allow_negative_numbers = true)]
        initial: f64,

        /// Product key (SELIC, CDB, LCI_LCA, FUNDO); all products when omitted
        #[arg(short, long)]
        investment: Option<InvestmentKey>,

        /// Horizon in months (default 24)
        #[arg(short, long)]
        months: Option<u32>,
    },

    /// Rank products by future value of an initial amount
    Compare {
        /// Initial amount in BRL
        #[arg(allow_negative_numbers = true)]
        initial: f64,

        /// Horizon in months (default 12)
        #[arg(short, long)]
        months: Option<u32>,
    },

    /// Find the product that reaches a lump-sum goal fastest
    Goal {
        /// Target amount in BRL
        #[arg(allow_negative_numbers = true)]
        target: f64,

        /// Amount available to invest today
        #[arg(allow_negative_numbers = true)]
        available: f64,
    },

    /// Initial amount needed to reach a target in a number of months
    Minimum {
        /// Target amount in BRL
        #[arg(allow_negative_numbers = true)]
        target: f64,

        /// Months until the target date
        months: u32,

        /// Product key; every product when omitted
        #[arg(short, long)]
        investment: Option<InvestmentKey>,
    },

    /// Months to reach a target with a fixed monthly deposit
    Plan {
        /// Target amount in BRL
        #[arg(allow_negative_numbers = true)]
        target: f64,

        /// Monthly deposit in BRL
        #[arg(long, allow_negative_numbers = true)]
        monthly: f64,

        /// Amount invested today
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        initial: f64,
    },

    /// Convert between BRL and USD at the latest quote
    Convert {
        /// Amount to convert
        #[arg(allow_negative_numbers = true)]
        amount: f64,

        #[arg(long, default_value = "BRL")]
        from: Currency,

        #[arg(long, default_value = "USD")]
        to: Currency,
    },

    /// Launch interactive mode
    Interactive,
}

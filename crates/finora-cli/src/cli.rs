//! Command-line definition.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use finora_core::models::{AccountType, HouseholdType, TransactionCategory, TransactionType};

#[derive(Parser, Debug)]
#[command(name = "finora", version, about = "Command-line client for finora household finances")]
pub struct Cli {
    /// Keep expected figures in memory only, leaving the budget file untouched
    #[arg(long, global = true)]
    pub no_persist: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Period selection; a missing part means the current year or month.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct PeriodArgs {
    #[arg(long)]
    pub year: Option<i32>,

    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and remember the session
    Login {
        /// Defaults to the last email used
        email: Option<String>,
    },

    /// Forget the session and stored token
    Logout,

    /// Show who is logged in and for how long
    Status,

    /// Show the dashboard for a period
    Dashboard {
        #[command(flatten)]
        period: PeriodArgs,

        /// Months of trend to request
        #[arg(long)]
        trend: Option<u32>,

        /// Skip the cache
        #[arg(long)]
        force: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show real vs expected figures for a month
    Monthly {
        #[command(flatten)]
        period: PeriodArgs,

        /// Set the expected income first
        #[arg(long)]
        income: Option<f64>,

        /// Set the expected expenses first
        #[arg(long)]
        expenses: Option<f64>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Dashboard and monthly report together
    Overview {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Record a transaction and show how this month's totals moved
    AddTransaction {
        account_id: String,

        /// income or expense
        kind: TransactionType,

        /// Category label or code (food, 10, salary, ...)
        category: TransactionCategory,

        amount: f64,

        /// YYYY-MM-DD
        date: NaiveDate,

        description: Option<String>,
    },

    /// List transactions
    Transactions {
        #[arg(long)]
        account: Option<String>,

        /// First day, YYYY-MM-DD
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day, YYYY-MM-DD
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// List accounts, or show or add one
    Accounts {
        #[command(subcommand)]
        action: Option<AccountsCommand>,
    },

    /// Show the household and its members, or update it
    Household {
        #[command(subcommand)]
        action: Option<HouseholdCommand>,
    },
}

#[derive(Subcommand, Debug)]
pub enum AccountsCommand {
    /// Show one account
    Show { id: String },

    /// Create an account
    Add {
        name: String,

        /// bank, cash, credit-card, savings, investment or other
        #[arg(value_name = "TYPE")]
        kind: AccountType,

        /// Opening balance
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        balance: f64,

        #[arg(long, default_value = "EUR")]
        currency: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum HouseholdCommand {
    /// Rename the household or change its plan
    Update {
        #[arg(long)]
        name: Option<String>,

        /// individual or couple
        #[arg(long = "type")]
        kind: Option<HouseholdType>,
    },
}

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Gatepass checkpoint and attendance tool
#[derive(Parser, Debug)]
#[command(name = "gatepass")]
#[command(about = "QR access control checkpoint and attendance reports")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (defaults to ./gatepass.toml when present)
    #[arg(short, long, global = true, env = "GATEPASS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub authority: AuthorityArgs,
}

/// Overrides for the `[authority]` config section.
#[derive(Args, Debug, Default)]
pub struct AuthorityArgs {
    /// Authority base URL
    #[arg(long, global = true, env = "GATEPASS_AUTHORITY_URL")]
    pub authority_url: Option<String>,

    /// Bearer token for the authority
    #[arg(long, global = true, env = "GATEPASS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask the authority whether a credential is valid
    Verify {
        /// Scanned credential text
        credential: String,
    },

    /// Check a visitor in
    CheckIn { credential: String },

    /// Check a visitor out
    CheckOut { credential: String },

    /// Record an employee sign-in or sign-out
    Attendance { credential: String },

    /// Daily breakdown and salary for one employee
    Salary {
        /// Employee id
        #[arg(short, long)]
        employee: u64,

        /// Hourly rate
        #[arg(short, long)]
        rate: f64,

        /// First date (YYYY-MM-DD); defaults to the configured window
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Sum every sign-in/sign-out pair of a day
        #[arg(long)]
        multi_shift: bool,
    },

    /// Employees currently signed in
    Roster {
        /// Keep refreshing until interrupted
        #[arg(short, long)]
        watch: bool,
    },
}

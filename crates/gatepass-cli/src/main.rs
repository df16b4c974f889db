//! Gatepass command-line client.
//!
//! Talks to the authority over HTTP for checkpoint operations, salary
//! reports and the signed-in roster.

mod cli;
mod config;
mod output;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use cli::{AuthorityArgs, Cli, Command};
use config::FileConfig;
use gatepass_attendance::{DateRange, SalaryCalculator};
use gatepass_checkpoint::{
    AuthorityClient, CheckpointAction, CheckpointController, RosterMonitor, SignedInRoster,
};
use gatepass_core::RawScanPayload;
use gatepass_network::{AuthorityConfig, HttpAuthority};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatepass=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let file = FileConfig::load(cli.config.as_deref())?;
    let authority_config = apply_overrides(file.authority.clone(), &cli.authority);
    debug!(base_url = %authority_config.base_url, "Using authority");

    let authority =
        HttpAuthority::new(authority_config).context("Failed to create authority client")?;

    match cli.command {
        Command::Verify { credential } => {
            submit(authority, &credential, CheckpointAction::Verify).await
        }
        Command::CheckIn { credential } => {
            submit(authority, &credential, CheckpointAction::CheckIn).await
        }
        Command::CheckOut { credential } => {
            submit(authority, &credential, CheckpointAction::CheckOut).await
        }
        Command::Attendance { credential } => {
            submit(authority, &credential, CheckpointAction::Attendance).await
        }
        Command::Salary {
            employee,
            rate,
            from,
            to,
            multi_shift,
        } => {
            let today = Local::now().date_naive();
            let end = to.unwrap_or(today);
            let range = match from {
                Some(start) => DateRange::new(start, end)?,
                None => DateRange::last_days(file.attendance.report_days, end)?,
            };

            let calculator = SalaryCalculator::new(authority)
                .with_policy(file.attendance.pairing_policy(multi_shift));
            let report = calculator
                .calculate(employee, rate, range)
                .await
                .with_context(|| format!("Failed to compute salary for employee {employee}"))?;
            let late = gatepass_attendance::late_arrivals(
                &report.breakdown,
                file.attendance.late_threshold,
            );

            print!("{}", output::salary(&report, &late));
            Ok(())
        }
        Command::Roster { watch: false } => {
            let employees = authority
                .signed_in_roster()
                .await
                .map_err(gatepass_core::Error::from)
                .context("Failed to fetch signed-in roster")?;
            let roster = SignedInRoster {
                employees,
                fetched_at: Local::now().naive_local(),
            };
            print!("{}", output::roster(&roster));
            Ok(())
        }
        Command::Roster { watch: true } => watch_roster(authority, file.roster).await,
    }
}

fn apply_overrides(mut config: AuthorityConfig, args: &AuthorityArgs) -> AuthorityConfig {
    if let Some(url) = &args.authority_url {
        config.base_url = url.clone();
    }
    if let Some(token) = &args.token {
        config.token = Some(token.clone());
    }
    if let Some(ms) = args.timeout_ms {
        config.timeout = Duration::from_millis(ms);
    }
    config
}

async fn submit(authority: HttpAuthority, text: &str, action: CheckpointAction) -> Result<()> {
    let controller = CheckpointController::new(authority);
    let outcome = controller
        .submit(&RawScanPayload::from(text), action)
        .await
        .with_context(|| format!("{action} failed"))?;

    println!("{}", output::outcome(&outcome));
    Ok(())
}

async fn watch_roster(
    authority: HttpAuthority,
    config: gatepass_checkpoint::RosterConfig,
) -> Result<()> {
    let monitor = RosterMonitor::spawn(Arc::new(authority), config);
    let mut updates = monitor.subscribe();
    info!("Watching roster, press Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(roster) = updates.borrow_and_update().as_ref() {
                    print!("{}", output::roster(roster));
                }
            }
        }
    }

    monitor.shutdown().await;
    Ok(())
}

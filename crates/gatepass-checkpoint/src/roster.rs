//! Signed-in roster monitor.
//!
//! Polls the authority for employees currently on site and publishes the
//! latest roster through a `watch` channel. A failed refresh is logged and
//! the last good roster stays published.

use crate::authority::{AuthorityClient, RosterEntry};
use chrono::{Local, NaiveDateTime};
use gatepass_core::constants::DEFAULT_ROSTER_REFRESH_MS;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Roster monitor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Time between refreshes.
    #[serde(with = "gatepass_core::serde_millis")]
    pub refresh_interval: Duration,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_millis(DEFAULT_ROSTER_REFRESH_MS),
        }
    }
}

impl RosterConfig {
    /// Set the refresh interval.
    pub fn with_refresh_interval(mut self, refresh_interval: Duration) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }
}


/// Employees on site at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignedInRoster {
    pub employees: Vec<RosterEntry>,
    pub fetched_at: NaiveDateTime,
}

impl SignedInRoster {
    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    /// Returns `true` if the employee is on the roster.
    pub fn contains(&self, employee_id: u64) -> bool {
        self.employees.iter().any(|e| e.employee_id == employee_id)
    }
}

/// Background task that keeps the signed-in roster fresh.
///
/// # Examples
///
/// ```no_run
/// use gatepass_checkpoint::mock::ScriptedAuthority;
/// use gatepass_checkpoint::roster::{RosterConfig, RosterMonitor};
/// use std::sync::Arc;
///
/// # async fn example() {
/// let authority = Arc::new(ScriptedAuthority::new());
/// let monitor = RosterMonitor::spawn(authority, RosterConfig::default());
///
/// let mut updates = monitor.subscribe();
/// if updates.changed().await.is_ok() {
///     println!("{:?}", *updates.borrow());
/// }
/// monitor.shutdown().await;
/// # }
/// ```
#[derive(Debug)]
pub struct RosterMonitor {
    roster_rx: watch::Receiver<Option<SignedInRoster>>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl RosterMonitor {
    /// Start refreshing immediately, then every `config.refresh_interval`.
    pub fn spawn<A>(authority: Arc<A>, config: RosterConfig) -> Self
    where
        A: AuthorityClient + 'static,
    {
        let (roster_tx, roster_rx) = watch::channel(None);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        info!(
            interval_ms = config.refresh_interval.as_millis() as u64,
            "Starting roster monitor"
        );
        let task = tokio::spawn(refresh_task(authority, config, roster_tx, shutdown_rx));

        Self {
            roster_rx,
            shutdown: Some(shutdown_tx),
            task,
        }
    }

    /// Receiver for roster updates. `None` until the first successful fetch.
    pub fn subscribe(&self) -> watch::Receiver<Option<SignedInRoster>> {
        self.roster_rx.clone()
    }

    /// Most recent good roster.
    pub fn latest(&self) -> Option<SignedInRoster> {
        self.roster_rx.borrow().clone()
    }

    /// Stop the refresh task and wait for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        match (&mut self.task).await {
            Ok(()) => debug!("Roster monitor stopped"),
            Err(e) if e.is_cancelled() => {}
            Err(e) => warn!(error = %e, "Roster monitor task panicked"),
        }
    }
}

impl Drop for RosterMonitor {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

async fn refresh_task<A: AuthorityClient>(
    authority: Arc<A>,
    config: RosterConfig,
    roster_tx: watch::Sender<Option<SignedInRoster>>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(config.refresh_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        match authority.signed_in_roster().await {
            Ok(employees) => {
                debug!(count = employees.len(), "Roster refreshed");
                roster_tx.send_replace(Some(SignedInRoster {
                    employees,
                    fetched_at: Local::now().naive_local(),
                }));
            }
            Err(e) => {
                warn!(error = %e, "Roster refresh failed, keeping last roster");
            }
        }
    }
}

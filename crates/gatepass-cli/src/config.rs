//! File configuration for the gatepass CLI.
//!
//! Every section and field is optional; missing values fall back to the
//! library defaults.
//!
//! ```toml
//! [authority]
//! base_url = "https://gate.example.org/api"
//! timeout_ms = 10000
//!
//! [roster]
//! refresh_interval = 10000
//!
//! [attendance]
//! report_days = 30
//! late_threshold = "09:10:00"
//! multi_shift = false
//! ```

use anyhow::{Context, Result};
use chrono::NaiveTime;
use gatepass_attendance::{PairingPolicy, default_late_threshold};
use gatepass_checkpoint::RosterConfig;
use gatepass_core::constants::DEFAULT_REPORT_DAYS;
use gatepass_network::AuthorityConfig;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "gatepass.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub authority: AuthorityConfig,
    pub roster: RosterConfig,
    pub attendance: AttendanceSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AttendanceSettings {
    /// Window used by `salary` when no dates are given.
    pub report_days: i64,
    pub late_threshold: NaiveTime,
    pub multi_shift: bool,
}

impl Default for AttendanceSettings {
    fn default() -> Self {
        Self {
            report_days: DEFAULT_REPORT_DAYS,
            late_threshold: default_late_threshold(),
            multi_shift: false,
        }
    }
}

impl AttendanceSettings {
    pub fn pairing_policy(&self, multi_shift_flag: bool) -> PairingPolicy {
        if multi_shift_flag || self.multi_shift {
            PairingPolicy::StackedShifts
        } else {
            PairingPolicy::FirstPairPerDay
        }
    }
}

impl FileConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
    /// read if present and defaults are used otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    debug!("No config file, using defaults");
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

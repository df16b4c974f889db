//! Core constants for the gatepass checkpoint workflow.
//!
//! This module centralizes the values shared by the scanner, checkpoint and
//! attendance crates: credential prefixes, scanner sampling defaults, alert
//! wording and attendance policy thresholds.
//!
//! # Usage
//!
//! ```
//! use gatepass_core::constants::*;
//!
//! assert_eq!(EMPLOYEE_PREFIX, "EMP_");
//! assert!(DEFAULT_SCAN_FPS >= MIN_SCAN_FPS && DEFAULT_SCAN_FPS <= MAX_SCAN_FPS);
//! ```

// ============================================================================
// Credential Prefixes
// ============================================================================

/// Prefix carried by employee credentials (e.g. `EMP_3_2d0b007bad15`).
///
/// Advisory only: the authority decides the subject type.
pub const EMPLOYEE_PREFIX: &str = "EMP_";

/// Prefix carried by visitor credentials (e.g. `VIS_17_a9c4`).
pub const VISITOR_PREFIX: &str = "VIS_";

// ============================================================================
// Scanner Sampling
// ============================================================================

/// Default target decode rate in frames per second.
pub const DEFAULT_SCAN_FPS: u32 = 10;

/// Lowest accepted target frame rate.
pub const MIN_SCAN_FPS: u32 = 1;

/// Highest accepted target frame rate.
pub const MAX_SCAN_FPS: u32 = 60;

/// Default side length of the square detection region, in pixels.
pub const DEFAULT_SCAN_REGION_PX: u32 = 250;

/// Smallest detection region side length, in pixels.
pub const MIN_SCAN_REGION_PX: u32 = 50;

/// Default time to wait for a code in a single-shot scan, in milliseconds.
pub const DEFAULT_SCAN_TIMEOUT_MS: u64 = 30_000;

// ============================================================================
// Security Alerts
// ============================================================================

/// Keyword whose presence in a rejection detail marks a security flag.
///
/// Matched case-insensitively.
pub const FLAG_KEYWORD: &str = "flag";

/// Alert text used when a flagged check-in carries no message of its own.
pub const DEFAULT_CHECKIN_ALERT: &str = "SECURITY ALERT: This visitor has been flagged!";

/// Advisory text used when a check-out reply carries an alert without a message.
pub const DEFAULT_CHECKOUT_ALERT: &str = "Note: Visitor has active security flags";

// ============================================================================
// Attendance
// ============================================================================

/// Sign-ins strictly after this local time count as late arrivals (09:10).
pub const LATE_THRESHOLD_HOUR: u32 = 9;

/// Minute component of the late-arrival threshold.
pub const LATE_THRESHOLD_MINUTE: u32 = 10;

/// Default reporting window, in days, when no range is given.
pub const DEFAULT_REPORT_DAYS: i64 = 30;

/// Default interval between signed-in roster refreshes, in milliseconds.
pub const DEFAULT_ROSTER_REFRESH_MS: u64 = 10_000;

/// Default timeout for a single remote authority call, in milliseconds.
pub const DEFAULT_AUTHORITY_TIMEOUT_MS: u64 = 10_000;

//! Credential verification and check-in/out workflow for the gatepass checkpoint.
//!
//! This crate sits between the camera ([`gatepass_scanner`]) and the remote
//! authority that owns all subject records. It normalizes scanned payloads,
//! asks the authority to verify or record them, surfaces security alerts and
//! mirrors the reported subject states.
//!
//! # Modules
//!
//! - [`authority`]: the [`AuthorityClient`] seam and its wire replies
//! - [`alert`]: flag detection and rejection classification
//! - [`controller`]: the [`CheckpointController`] operations
//! - [`observed`]: per-subject state mirror with bounded history
//! - [`roster`]: background signed-in roster refresh
//! - [`station`]: scanner plus controller for one checkpoint
//! - [`mock`]: a scripted authority for tests and development

pub mod alert;
pub mod authority;
pub mod controller;
pub mod mock;
pub mod observed;
pub mod roster;
pub mod station;

pub use authority::{AuthorityClient, AuthorityError, AuthorityResult};
pub use controller::{
    AttendanceScan, CheckEvent, CheckpointAction, CheckpointController, CheckpointOutcome,
    VerificationResult,
};
pub use roster::{RosterConfig, RosterMonitor, SignedInRoster};
pub use station::CheckpointStation;

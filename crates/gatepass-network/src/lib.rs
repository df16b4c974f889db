//! HTTP transport for the gatepass authority.
//!
//! [`HttpAuthority`] implements both
//! [`AuthorityClient`](gatepass_checkpoint::AuthorityClient) for the checkpoint
//! and [`AttendanceSource`](gatepass_attendance::AttendanceSource) for salary
//! reports, over the authority's JSON API.
//!
//! # Example
//!
//! ```no_run
//! use gatepass_checkpoint::CheckpointController;
//! use gatepass_network::{AuthorityConfig, HttpAuthority};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AuthorityConfig::new("http://127.0.0.1:8000")
//!     .with_timeout(Duration::from_secs(5));
//!
//! let controller = CheckpointController::new(HttpAuthority::new(config)?);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;

pub use client::HttpAuthority;
pub use config::{AuthorityConfig, DEFAULT_AUTHORITY_URL};

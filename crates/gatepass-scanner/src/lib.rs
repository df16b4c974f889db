//! Camera scan sessions for the gatepass checkpoint.
//!
//! This crate owns the camera side of a checkpoint: it acquires a capture
//! device, samples frames at a bounded rate, suppresses frames without a
//! readable code and hands decoded payloads to the caller. It guarantees a
//! single live camera handle per surface and always releases the camera when
//! a session ends.
//!
//! # Modules
//!
//! - [`traits`]: the [`CaptureDevice`] abstraction
//! - [`devices`]: enum dispatch over capture backends
//! - [`mock`]: a scriptable camera for tests and development
//! - [`session`]: the [`ScanSurface`] session manager
//!
//! # Quick Start
//!
//! ```no_run
//! use gatepass_scanner::mock::MockCamera;
//! use gatepass_scanner::{SamplingPolicy, ScanSurface};
//! use std::time::Duration;
//!
//! # async fn example() -> gatepass_scanner::Result<()> {
//! let (camera, _handle) = MockCamera::new();
//! let mut surface = ScanSurface::new(camera, SamplingPolicy::default())?;
//!
//! let payload = surface.scan_once(Duration::from_secs(30)).await?;
//! println!("scanned {payload:?}");
//! # Ok(())
//! # }
//! ```

#![allow(async_fn_in_trait)]

pub mod devices;
pub mod error;
pub mod mock;
pub mod session;
pub mod traits;
pub mod types;

pub use devices::AnyCaptureDevice;
pub use error::{Result, ScannerError};
pub use session::{
    DetectFlow, DetectHandler, ScanSurface, SessionInfo, SessionReport, SessionState, StopReason,
    channel_handler,
};
pub use traits::{CaptureDevice, FrameOutcome};
pub use types::{DeviceInfo, FacingMode, SamplingPolicy, StopPolicy};

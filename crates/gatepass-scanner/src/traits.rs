//! Capture device abstraction.
//!
//! A capture device produces frames and attempts to decode a QR code from
//! each one. Frames without a readable code are expected and reported as
//! [`FrameOutcome::NoCode`], never as errors.

use crate::{
    Result,
    types::{DeviceInfo, SamplingPolicy},
};
use gatepass_core::RawScanPayload;

/// Result of one decode attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// A code was decoded from the frame.
    Decoded(RawScanPayload),

    /// No readable code in this frame. Carries the decoder's reason.
    NoCode(String),
}

/// Camera-backed QR decoder.
///
/// # Object Safety and Dynamic Dispatch
///
/// This trait uses native `async fn` and is not object-safe. Use generic
/// parameters, or [`AnyCaptureDevice`](crate::devices::AnyCaptureDevice)
/// where a concrete type is needed (for example inside a spawned task).
///
/// # Examples
///
/// ```no_run
/// use gatepass_scanner::traits::{CaptureDevice, FrameOutcome};
/// use gatepass_scanner::{Result, SamplingPolicy};
/// use gatepass_core::RawScanPayload;
///
/// async fn first_code<C: CaptureDevice>(camera: &mut C) -> Result<RawScanPayload> {
///     camera.open(&SamplingPolicy::default()).await?;
///     loop {
///         if let FrameOutcome::Decoded(payload) = camera.next_frame().await? {
///             camera.close().await?;
///             return Ok(payload);
///         }
///     }
/// }
/// ```
pub trait CaptureDevice: Send + Sync {
    /// Acquire the camera and start streaming with the given policy.
    ///
    /// # Errors
    ///
    /// Returns `ScannerError::CameraUnavailable` if permission is denied or
    /// no suitable camera exists.
    async fn open(&mut self, policy: &SamplingPolicy) -> Result<()>;

    /// Wait for the next frame and try to decode it.
    ///
    /// # Errors
    ///
    /// Returns an error only for device faults (disconnection, stream loss).
    async fn next_frame(&mut self) -> Result<FrameOutcome>;

    /// Release the camera. Closing a closed device is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the device fails to release cleanly.
    async fn close(&mut self) -> Result<()>;

    /// Get device information.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be queried.
    async fn get_info(&self) -> Result<DeviceInfo>;
}

//! Scanner and controller glue for one physical checkpoint.

use crate::authority::AuthorityClient;
use crate::controller::{CheckpointAction, CheckpointController, CheckpointOutcome};
use gatepass_core::Result;
use gatepass_scanner::ScanSurface;
use std::time::Duration;
use tracing::info;

/// A scan surface paired with a controller.
///
/// # Examples
///
/// ```
/// use gatepass_checkpoint::authority::VerifyReply;
/// use gatepass_checkpoint::mock::ScriptedAuthority;
/// use gatepass_checkpoint::{CheckpointAction, CheckpointController, CheckpointOutcome, CheckpointStation};
/// use gatepass_core::VerificationStatus;
/// use gatepass_scanner::mock::MockCamera;
/// use gatepass_scanner::{SamplingPolicy, ScanSurface};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> gatepass_core::Result<()> {
///     let (camera, handle) = MockCamera::new();
///     let surface = ScanSurface::new(camera, SamplingPolicy::default())?;
///
///     let authority = ScriptedAuthority::new();
///     authority.push_verify(Ok(VerifyReply {
///         status: Some(VerificationStatus::Valid),
///         ..Default::default()
///     }));
///
///     let mut station = CheckpointStation::new(surface, CheckpointController::new(authority));
///     handle.present("EMP_3_abc").await?;
///
///     let outcome = station
///         .scan_and_submit(CheckpointAction::Verify, Duration::from_secs(1))
///         .await?;
///     assert!(matches!(outcome, CheckpointOutcome::Verified(_)));
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct CheckpointStation<A> {
    surface: ScanSurface,
    controller: CheckpointController<A>,
}

impl<A: AuthorityClient> CheckpointStation<A> {
    pub fn new(surface: ScanSurface, controller: CheckpointController<A>) -> Self {
        Self {
            surface,
            controller,
        }
    }

    pub fn surface(&self) -> &ScanSurface {
        &self.surface
    }

    pub fn controller(&self) -> &CheckpointController<A> {
        &self.controller
    }

    /// Scan one code and submit it for `action`.
    ///
    /// The camera is released before the authority is contacted, whatever
    /// the scan outcome.
    ///
    /// # Errors
    ///
    /// - `Error::CameraUnavailable` if the camera cannot be acquired
    /// - `Error::ScanTimeout` if no code is detected within `timeout`
    /// - any error of the submitted operation
    pub async fn scan_and_submit(
        &mut self,
        action: CheckpointAction,
        timeout: Duration,
    ) -> Result<CheckpointOutcome> {
        info!(action = %action, timeout_ms = timeout.as_millis() as u64, "Waiting for scan");
        let payload = self.surface.scan_once(timeout).await?;
        self.controller.submit(&payload, action).await
    }

    /// Stop any running session and release the camera.
    ///
    /// # Errors
    ///
    /// `Error::CameraUnavailable` if the capture task crashed.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.surface.stop().await?;
        Ok(())
    }
}

//! Scan session management.
//!
//! A [`ScanSurface`] owns one capture device and runs at most one scan
//! session on it at a time. Each session runs in its own task that reads
//! frames at the policy's rate, suppresses frames without a code, and hands
//! every decoded payload to a [`DetectHandler`].
//!
//! # Lifecycle
//!
//! ```text
//! Idle -> Starting -> Active -> Stopping -> Idle
//!            |
//!            +-> Idle   (camera acquisition failed)
//! ```
//!
//! Starting while a session is active stops the old session first, so the
//! camera is never held twice. Stopping is idempotent, and the capture task
//! always releases the device on every exit path, including handler panics
//! and a dropped surface. A `stop` or `wait` future dropped before it
//! completes leaves the surface `Stopping`; the next `stop`, `wait` or
//! `start` finishes the release.
//!
//! # Examples
//!
//! ```
//! use gatepass_scanner::mock::MockCamera;
//! use gatepass_scanner::{DetectFlow, SamplingPolicy, ScanSurface, StopReason};
//! use gatepass_core::RawScanPayload;
//!
//! #[tokio::main]
//! async fn main() -> gatepass_scanner::Result<()> {
//!     let (camera, handle) = MockCamera::new();
//!     let mut surface = ScanSurface::new(camera, SamplingPolicy::default())?;
//!
//!     surface
//!         .start(|payload: RawScanPayload| {
//!             println!("detected {payload:?}");
//!             DetectFlow::Continue
//!         })
//!         .await?;
//!
//!     handle.present("EMP_3_abc").await?;
//!     let report = surface.wait().await?.expect("session report");
//!     assert_eq!(report.reason, StopReason::Detection);
//!     Ok(())
//! }
//! ```

use crate::{
    Result, ScannerError,
    devices::AnyCaptureDevice,
    traits::{CaptureDevice, FrameOutcome},
    types::{SamplingPolicy, StopPolicy},
};
use chrono::{DateTime, Utc};
use gatepass_core::RawScanPayload;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

/// What the capture task does after a detection has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectFlow {
    /// Keep scanning (subject to the session's stop policy).
    Continue,
    /// End the session now.
    Stop,
}

/// Receives decoded payloads from a running session.
///
/// Implemented for any `FnMut(RawScanPayload) -> DetectFlow` closure. The
/// handler runs on the capture task; a panic inside it ends the session
/// without leaking the camera.
pub trait DetectHandler: Send + 'static {
    /// Handle one decoded payload.
    fn on_detect(&mut self, payload: RawScanPayload) -> DetectFlow;
}

impl<F> DetectHandler for F
where
    F: FnMut(RawScanPayload) -> DetectFlow + Send + 'static,
{
    fn on_detect(&mut self, payload: RawScanPayload) -> DetectFlow {
        self(payload)
    }
}

/// Build a handler that forwards every detection into a channel.
///
/// Detections are dropped (with a warning) while the channel is full. The
/// session stops once the receiver is gone.
pub fn channel_handler(tx: mpsc::Sender<RawScanPayload>) -> impl DetectHandler {
    move |payload: RawScanPayload| match tx.try_send(payload) {
        Ok(()) => DetectFlow::Continue,
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!("Detection channel full, dropping payload");
            DetectFlow::Continue
        }
        Err(mpsc::error::TrySendError::Closed(_)) => DetectFlow::Stop,
    }
}

/// Scan session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No session; camera released.
    Idle,
    /// Acquiring the camera.
    Starting,
    /// Capture task running.
    Active,
    /// Waiting for the capture task to release the camera.
    Stopping,
}

impl SessionState {
    /// Check if transition to target state is valid.
    pub fn can_transition_to(&self, target: &SessionState) -> bool {
        matches!(
            (self, target),
            (SessionState::Idle, SessionState::Starting)
                | (SessionState::Starting, SessionState::Active | SessionState::Idle)
                | (SessionState::Active, SessionState::Stopping)
                | (SessionState::Stopping, SessionState::Idle)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Starting => write!(f, "Starting"),
            SessionState::Active => write!(f, "Active"),
            SessionState::Stopping => write!(f, "Stopping"),
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// `stop()` was called, or the surface was dropped.
    Requested,
    /// Auto-stop after a detection, or the handler returned [`DetectFlow::Stop`].
    Detection,
    /// The device failed mid-session.
    DeviceFailure(String),
    /// The detect handler panicked.
    HandlerPanicked,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Requested => write!(f, "stop requested"),
            StopReason::Detection => write!(f, "code detected"),
            StopReason::DeviceFailure(message) => write!(f, "device failure: {message}"),
            StopReason::HandlerPanicked => write!(f, "detect handler panicked"),
        }
    }
}

/// Identity of a running session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInfo {
    /// Unique session id.
    pub id: Uuid,
    /// When the camera was acquired.
    pub started_at: DateTime<Utc>,
    /// Policy the session runs with.
    pub policy: SamplingPolicy,
}

/// Summary produced when a session ends.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    /// Session id, matching [`SessionInfo::id`].
    pub session_id: Uuid,
    /// Frames read from the device.
    pub frames: u64,
    /// Frames that yielded a code.
    pub detections: u64,
    /// Frames without a readable code. Never surfaced as errors.
    pub suppressed_errors: u64,
    /// Why the session ended.
    pub reason: StopReason,
    /// Wall time from acquisition to release.
    pub duration: Duration,
}

struct ActiveSession {
    info: SessionInfo,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<CaptureOutcome>,
}

struct CaptureOutcome {
    device: AnyCaptureDevice,
    report: SessionReport,
}

/// Owner of a capture device and its single active scan session.
pub struct ScanSurface {
    name: String,
    device: Option<AnyCaptureDevice>,
    policy: SamplingPolicy,
    state: SessionState,
    active: Option<ActiveSession>,
}

impl ScanSurface {
    /// Create a surface around a capture device.
    ///
    /// # Errors
    ///
    /// Returns `ScannerError::ConfigurationError` if the policy is invalid.
    pub fn new(device: impl Into<AnyCaptureDevice>, policy: SamplingPolicy) -> Result<Self> {
        policy.validate()?;
        let device = device.into();
        Ok(Self {
            name: device.name().to_string(),
            device: Some(device),
            policy,
            state: SessionState::Idle,
            active: None,
        })
    }

    /// Current lifecycle state.
    ///
    /// A session that ended on its own (auto-stop, device failure) reports
    /// `Idle` even before its report has been collected.
    pub fn state(&self) -> SessionState {
        match (&self.state, &self.active) {
            (SessionState::Active, Some(active)) if active.task.is_finished() => {
                SessionState::Idle
            }
            (state, _) => *state,
        }
    }

    /// Returns `true` while a capture task is running.
    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    /// Info for the current (or last uncollected) session.
    pub fn current_session(&self) -> Option<&SessionInfo> {
        self.active.as_ref().map(|active| &active.info)
    }

    /// Sampling policy used for new sessions.
    pub fn policy(&self) -> &SamplingPolicy {
        &self.policy
    }

    /// Replace the sampling policy. Takes effect on the next `start`.
    ///
    /// # Errors
    ///
    /// Returns `ScannerError::ConfigurationError` if the policy is invalid.
    pub fn set_policy(&mut self, policy: SamplingPolicy) -> Result<()> {
        policy.validate()?;
        self.policy = policy;
        Ok(())
    }

    /// Acquire the camera and begin delivering detections to `handler`.
    ///
    /// Any session already running is stopped (and its camera released)
    /// before the new one acquires the device.
    ///
    /// # Errors
    ///
    /// Returns `ScannerError::CameraUnavailable` if the camera cannot be
    /// acquired; the surface is left idle and no session exists.
    pub async fn start<H: DetectHandler>(&mut self, handler: H) -> Result<SessionInfo> {
        if self.active.is_some() {
            debug!(surface = %self.name, "Stopping previous session before restart");
            self.stop().await?;
        }

        self.transition(SessionState::Starting)?;

        let Some(mut device) = self.device.take() else {
            self.transition(SessionState::Idle)?;
            return Err(ScannerError::disconnected(self.name.clone()));
        };

        if let Err(e) = device.open(&self.policy).await {
            self.device = Some(device);
            self.transition(SessionState::Idle)?;
            warn!(surface = %self.name, error = %e, "Camera acquisition failed");
            return Err(e.into_acquisition_error());
        }

        let info = SessionInfo {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            policy: self.policy.clone(),
        };

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(capture_task(
            device,
            self.policy.clone(),
            Box::new(handler),
            shutdown_rx,
            info.id,
        ));

        self.active = Some(ActiveSession {
            info: info.clone(),
            shutdown: Some(shutdown_tx),
            task,
        });
        self.transition(SessionState::Active)?;

        info!(
            surface = %self.name,
            session_id = %info.id,
            fps = info.policy.fps,
            facing = %info.policy.facing,
            "Scan session started"
        );

        Ok(info)
    }

    /// Stop the current session and release the camera.
    ///
    /// Returns the session report, or `None` if no session existed. Calling
    /// it again (or on an idle surface) is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ScannerError::Disconnected` if the capture task crashed and
    /// the device could not be recovered.
    pub async fn stop(&mut self) -> Result<Option<SessionReport>> {
        self.finish(true).await
    }

    /// Wait for the current session to end on its own.
    ///
    /// Returns `None` immediately if no session exists.
    ///
    /// # Errors
    ///
    /// Same as [`ScanSurface::stop`].
    pub async fn wait(&mut self) -> Result<Option<SessionReport>> {
        self.finish(false).await
    }

    /// Run a single-shot scan: start, wait for one code, stop.
    ///
    /// The session always ends after the first detection, whatever the
    /// surface's stop policy.
    ///
    /// # Errors
    ///
    /// - `ScannerError::CameraUnavailable` if the camera cannot be acquired
    /// - `ScannerError::Timeout` if no code arrives in time
    /// - `ScannerError::CommunicationError` if the session ended without a code
    pub async fn scan_once(&mut self, timeout: Duration) -> Result<RawScanPayload> {
        let (tx, mut rx) = mpsc::channel(1);
        self.start(move |payload: RawScanPayload| {
            let _ = tx.try_send(payload);
            DetectFlow::Stop
        })
        .await?;

        let received = tokio::time::timeout(timeout, rx.recv()).await;
        let report = self.stop().await?;

        match received {
            Ok(Some(payload)) => Ok(payload),
            Ok(None) => {
                let reason = report.map_or_else(
                    || "session ended".to_string(),
                    |report| report.reason.to_string(),
                );
                Err(ScannerError::communication(format!(
                    "Session ended without a detection: {reason}"
                )))
            }
            Err(_) => Err(ScannerError::timeout(timeout.as_millis() as u64)),
        }
    }

    async fn finish(&mut self, signal: bool) -> Result<Option<SessionReport>> {
        if self.active.is_none() {
            return Ok(None);
        }

        // A dropped earlier stop/wait leaves us in Stopping; resume it.
        if self.state != SessionState::Stopping {
            self.transition(SessionState::Stopping)?;
        }
        let Some(active) = self.active.as_mut() else {
            return Ok(None);
        };
        if signal && let Some(shutdown) = active.shutdown.take() {
            let _ = shutdown.send(());
        }

        // The session stays in `self.active` until joined.
        let joined = (&mut active.task).await;
        self.active = None;
        self.transition(SessionState::Idle)?;

        match joined {
            Ok(CaptureOutcome { device, report }) => {
                self.device = Some(device);
                info!(
                    surface = %self.name,
                    session_id = %report.session_id,
                    frames = report.frames,
                    detections = report.detections,
                    suppressed = report.suppressed_errors,
                    reason = %report.reason,
                    "Scan session ended"
                );
                Ok(Some(report))
            }
            Err(e) => {
                error!(surface = %self.name, error = %e, "Capture task crashed, device lost");
                Err(ScannerError::disconnected(self.name.clone()))
            }
        }
    }

    fn transition(&mut self, target: SessionState) -> Result<()> {
        if !self.state.can_transition_to(&target) {
            return Err(ScannerError::InvalidTransition {
                from: self.state.to_string(),
                to: target.to_string(),
            });
        }
        trace!(surface = %self.name, from = %self.state, to = %target, "Session state change");
        self.state = target;
        Ok(())
    }
}

impl fmt::Debug for ScanSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanSurface")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("policy", &self.policy)
            .field("session", &self.current_session().map(|info| info.id))
            .finish()
    }
}

impl Drop for ScanSurface {
    fn drop(&mut self) {
        if let Some(mut active) = self.active.take() {
            if let Some(shutdown) = active.shutdown.take() {
                let _ = shutdown.send(());
            }
            debug!(session_id = %active.info.id, "Surface dropped, capture task will release camera");
        }
    }
}

async fn capture_task(
    mut device: AnyCaptureDevice,
    policy: SamplingPolicy,
    mut handler: Box<dyn DetectHandler>,
    mut shutdown: oneshot::Receiver<()>,
    session_id: Uuid,
) -> CaptureOutcome {
    let frame_interval = policy.frame_interval();
    let started = Instant::now();
    let mut frames = 0u64;
    let mut detections = 0u64;
    let mut suppressed_errors = 0u64;

    let reason = loop {
        let frame_start = Instant::now();

        let frame = tokio::select! {
            biased;
            _ = &mut shutdown => break StopReason::Requested,
            frame = device.next_frame() => frame,
        };
        frames += 1;

        match frame {
            Ok(FrameOutcome::Decoded(payload)) => {
                detections += 1;
                debug!(session_id = %session_id, "Code detected");
                match catch_unwind(AssertUnwindSafe(|| handler.on_detect(payload))) {
                    Ok(DetectFlow::Stop) => break StopReason::Detection,
                    Ok(DetectFlow::Continue) => {
                        if policy.stop_policy == StopPolicy::AfterFirstDetection {
                            break StopReason::Detection;
                        }
                    }
                    Err(_) => {
                        error!(session_id = %session_id, "Detect handler panicked");
                        break StopReason::HandlerPanicked;
                    }
                }
            }
            Ok(FrameOutcome::NoCode(cause)) => {
                suppressed_errors += 1;
                trace!(session_id = %session_id, cause = %cause, "No code in frame");
            }
            Err(e) => {
                error!(session_id = %session_id, error = %e, "Capture device failed");
                break StopReason::DeviceFailure(e.to_string());
            }
        }

        // Rate limit to the policy's frame rate
        let elapsed = frame_start.elapsed();
        if elapsed < frame_interval {
            tokio::select! {
                biased;
                _ = &mut shutdown => break StopReason::Requested,
                _ = tokio::time::sleep(frame_interval - elapsed) => {}
            }
        }
    };

    if let Err(e) = device.close().await {
        warn!(session_id = %session_id, error = %e, "Failed to release camera");
    }

    CaptureOutcome {
        device,
        report: SessionReport {
            session_id,
            frames,
            detections,
            suppressed_errors,
            reason,
            duration: started.elapsed(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SessionState::Idle, SessionState::Starting, true)]
    #[case(SessionState::Starting, SessionState::Active, true)]
    #[case(SessionState::Starting, SessionState::Idle, true)]
    #[case(SessionState::Active, SessionState::Stopping, true)]
    #[case(SessionState::Stopping, SessionState::Idle, true)]
    #[case(SessionState::Idle, SessionState::Active, false)]
    #[case(SessionState::Active, SessionState::Starting, false)]
    #[case(SessionState::Active, SessionState::Idle, false)]
    #[case(SessionState::Stopping, SessionState::Active, false)]
    fn test_session_transitions(
        #[case] from: SessionState,
        #[case] to: SessionState,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(&to), allowed);
    }

    #[test]
    fn test_stop_reason_display() {
        assert_eq!(StopReason::Detection.to_string(), "code detected");
        assert_eq!(
            StopReason::DeviceFailure("stream lost".into()).to_string(),
            "device failure: stream lost"
        );
    }

    #[tokio::test]
    async fn test_channel_handler_stops_when_receiver_gone() {
        let (tx, rx) = mpsc::channel(1);
        let mut handler = channel_handler(tx);

        assert_eq!(handler.on_detect("a".into()), DetectFlow::Continue);
        // Full: dropped, keep going
        assert_eq!(handler.on_detect("b".into()), DetectFlow::Continue);

        drop(rx);
        assert_eq!(handler.on_detect("c".into()), DetectFlow::Stop);
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let (camera, _handle) = crate::mock::MockCamera::new();
        let result = ScanSurface::new(camera, SamplingPolicy::default().with_fps(0));
        assert!(matches!(
            result,
            Err(ScannerError::ConfigurationError { .. })
        ));
    }
}

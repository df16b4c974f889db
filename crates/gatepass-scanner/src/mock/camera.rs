//! Mock camera for testing and development.
//!
//! Frames are injected through a [`MockCameraHandle`]; the handle also exposes
//! acquisition counters so tests can check that the camera is never held by
//! two sessions at once and is always released.

use crate::{
    Result, ScannerError,
    traits::{CaptureDevice, FrameOutcome},
    types::{DeviceInfo, FacingMode, SamplingPolicy},
};
use gatepass_core::RawScanPayload;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// Mock camera for testing and development.
///
/// # Examples
///
/// ```
/// use gatepass_scanner::mock::MockCamera;
/// use gatepass_scanner::traits::{CaptureDevice, FrameOutcome};
/// use gatepass_scanner::SamplingPolicy;
///
/// #[tokio::main]
/// async fn main() -> gatepass_scanner::Result<()> {
///     let (mut camera, handle) = MockCamera::new();
///     camera.open(&SamplingPolicy::default()).await?;
///
///     handle.present("VIS_7_a1b2").await?;
///     assert_eq!(camera.next_frame().await?, FrameOutcome::Decoded("VIS_7_a1b2".into()));
///
///     camera.close().await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockCamera {
    /// Channel receiver for frame events
    frame_rx: mpsc::Receiver<FrameEvent>,

    /// Device name
    name: String,

    /// Counters shared with the handle
    shared: Arc<CameraCounters>,

    /// Whether this device currently holds the camera
    open: bool,

    /// Facing requested by the last `open`
    facing: Option<FacingMode>,
}

#[derive(Debug, Default)]
struct CameraCounters {
    live: AtomicUsize,
    max_live: AtomicUsize,
    opens: AtomicUsize,
    closes: AtomicUsize,
    deny_access: AtomicBool,
}

impl MockCamera {
    /// Create a new mock camera with the default name.
    ///
    /// Returns the camera and a handle used to inject frames.
    pub fn new() -> (Self, MockCameraHandle) {
        Self::with_name("Mock Camera".to_string())
    }

    /// Create a new mock camera with a custom name.
    pub fn with_name(name: String) -> (Self, MockCameraHandle) {
        let (frame_tx, frame_rx) = mpsc::channel(32);
        let shared = Arc::new(CameraCounters::default());

        let camera = Self {
            frame_rx,
            name,
            shared: Arc::clone(&shared),
            open: false,
            facing: None,
        };

        let handle = MockCameraHandle { frame_tx, shared };

        (camera, handle)
    }

    /// Device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` while the camera is acquired.
    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::new().0
    }
}

impl CaptureDevice for MockCamera {
    async fn open(&mut self, policy: &SamplingPolicy) -> Result<()> {
        if self.shared.deny_access.load(Ordering::SeqCst) {
            return Err(ScannerError::camera_unavailable("Permission denied"));
        }
        if self.open {
            return Ok(());
        }

        self.open = true;
        self.facing = Some(policy.facing);
        let live = self.shared.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.max_live.fetch_max(live, Ordering::SeqCst);
        self.shared.opens.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<FrameOutcome> {
        if !self.open {
            return Err(ScannerError::disconnected(format!(
                "{}: capture not started",
                self.name
            )));
        }

        let event = self
            .frame_rx
            .recv()
            .await
            .ok_or_else(|| ScannerError::disconnected("Camera frame channel closed"))?;

        match event {
            FrameEvent::Code(payload) => Ok(FrameOutcome::Decoded(payload)),
            FrameEvent::Noise(reason) => Ok(FrameOutcome::NoCode(reason)),
            FrameEvent::Fault(message) => Err(ScannerError::communication(message)),
        }
    }

    async fn close(&mut self) -> Result<()> {
        if self.open {
            self.open = false;
            self.shared.live.fetch_sub(1, Ordering::SeqCst);
            self.shared.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        let info = DeviceInfo::new(self.name.clone(), "MOCK-CAM-01");
        Ok(match self.facing {
            Some(facing) => info.with_facing(facing),
            None => info,
        })
    }
}

/// Handle for driving a mock camera.
#[derive(Debug, Clone)]
pub struct MockCameraHandle {
    frame_tx: mpsc::Sender<FrameEvent>,
    shared: Arc<CameraCounters>,
}

impl MockCameraHandle {
    /// Put a decodable code in front of the camera.
    ///
    /// # Errors
    ///
    /// Returns an error if the camera has been dropped.
    pub async fn present(&self, payload: impl Into<RawScanPayload>) -> Result<()> {
        self.send(FrameEvent::Code(payload.into())).await
    }

    /// Emit a frame with no readable code.
    ///
    /// # Errors
    ///
    /// Returns an error if the camera has been dropped.
    pub async fn present_noise(&self, reason: impl Into<String>) -> Result<()> {
        self.send(FrameEvent::Noise(reason.into())).await
    }

    /// Make the next frame read fail with a device fault.
    ///
    /// # Errors
    ///
    /// Returns an error if the camera has been dropped.
    pub async fn inject_fault(&self, message: impl Into<String>) -> Result<()> {
        self.send(FrameEvent::Fault(message.into())).await
    }

    /// Simulate the user denying (or later granting) camera permission.
    pub fn deny_access(&self, deny: bool) {
        self.shared.deny_access.store(deny, Ordering::SeqCst);
    }

    /// Number of sessions currently holding the camera.
    pub fn live_handles(&self) -> usize {
        self.shared.live.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous holders ever observed.
    pub fn max_live_handles(&self) -> usize {
        self.shared.max_live.load(Ordering::SeqCst)
    }

    /// Number of successful acquisitions.
    pub fn open_count(&self) -> usize {
        self.shared.opens.load(Ordering::SeqCst)
    }

    /// Number of releases.
    pub fn close_count(&self) -> usize {
        self.shared.closes.load(Ordering::SeqCst)
    }

    async fn send(&self, event: FrameEvent) -> Result<()> {
        self.frame_tx
            .send(event)
            .await
            .map_err(|_| ScannerError::other("Failed to send frame event"))
    }
}

/// Internal frame events.
#[derive(Debug)]
enum FrameEvent {
    Code(RawScanPayload),
    Noise(String),
    Fault(String),
}

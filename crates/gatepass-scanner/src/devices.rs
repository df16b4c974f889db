//! Enum wrappers for capture device dispatch.
//!
//! Native `async fn` in traits is not object-safe, so the scan session holds
//! an [`AnyCaptureDevice`] and dispatches through a `match`. New backends are
//! added as variants behind their feature flags.

use crate::mock::MockCamera;
use crate::traits::{CaptureDevice, FrameOutcome};
use crate::{DeviceInfo, Result, SamplingPolicy};

/// Enum wrapper for capture device dispatch.
///
/// # Examples
///
/// ```
/// use gatepass_scanner::devices::AnyCaptureDevice;
/// use gatepass_scanner::mock::MockCamera;
///
/// let (camera, _handle) = MockCamera::new();
/// let device = AnyCaptureDevice::Mock(camera);
/// assert_eq!(device.name(), "Mock Camera");
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyCaptureDevice {
    /// Mock camera for development and testing.
    Mock(MockCamera),
}

impl AnyCaptureDevice {
    /// Device name, for logging.
    pub fn name(&self) -> &str {
        match self {
            Self::Mock(device) => device.name(),
        }
    }
}

impl CaptureDevice for AnyCaptureDevice {
    async fn open(&mut self, policy: &SamplingPolicy) -> Result<()> {
        match self {
            Self::Mock(device) => device.open(policy).await,
        }
    }

    async fn next_frame(&mut self) -> Result<FrameOutcome> {
        match self {
            Self::Mock(device) => device.next_frame().await,
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.close().await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
        }
    }
}

impl From<MockCamera> for AnyCaptureDevice {
    fn from(device: MockCamera) -> Self {
        Self::Mock(device)
    }
}

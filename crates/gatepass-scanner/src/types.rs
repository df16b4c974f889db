//! Sampling policy and device metadata shared by capture backends.

use crate::{Result, ScannerError};
use gatepass_core::constants::{
    DEFAULT_SCAN_FPS, DEFAULT_SCAN_REGION_PX, MAX_SCAN_FPS, MIN_SCAN_FPS, MIN_SCAN_REGION_PX,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Generic capture device information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "Integrated Webcam", "Mock Camera").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Which way the camera points, when known.
    pub facing: Option<FacingMode>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            facing: None,
        }
    }

    /// Set the facing direction.
    pub fn with_facing(mut self, facing: FacingMode) -> Self {
        self.facing = Some(facing);
        self
    }
}

/// Camera facing preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear ("environment") camera, pointed at the credential holder.
    #[default]
    Environment,
    /// Front ("user") camera.
    User,
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacingMode::Environment => write!(f, "environment"),
            FacingMode::User => write!(f, "user"),
        }
    }
}

/// What a session does after handing a detection to its handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopPolicy {
    /// Stop the session after the first decoded code.
    #[default]
    AfterFirstDetection,
    /// Keep scanning until stopped or the handler asks to stop.
    Continuous,
}

/// Capture parameters for a scan session.
///
/// # Examples
///
/// ```
/// use gatepass_scanner::SamplingPolicy;
///
/// let policy = SamplingPolicy::default();
/// assert_eq!(policy.fps, 10);
/// assert_eq!(policy.region_px, 250);
/// assert!(policy.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingPolicy {
    /// Target decode attempts per second.
    pub fps: u32,

    /// Side length of the square detection region, in pixels.
    pub region_px: u32,

    /// Preferred camera.
    pub facing: FacingMode,

    /// Auto-stop behaviour after a detection.
    pub stop_policy: StopPolicy,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            fps: DEFAULT_SCAN_FPS,
            region_px: DEFAULT_SCAN_REGION_PX,
            facing: FacingMode::default(),
            stop_policy: StopPolicy::default(),
        }
    }
}

impl SamplingPolicy {
    /// Set the target frame rate.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Set the stop policy.
    pub fn with_stop_policy(mut self, stop_policy: StopPolicy) -> Self {
        self.stop_policy = stop_policy;
        self
    }

    /// Minimum time between two decode attempts.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.fps.max(1)))
    }

    /// Check the policy against the supported capture ranges.
    ///
    /// # Errors
    /// Returns `ScannerError::ConfigurationError` if the frame rate or
    /// detection region is out of range.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_SCAN_FPS..=MAX_SCAN_FPS).contains(&self.fps) {
            return Err(ScannerError::configuration(format!(
                "fps must be between {MIN_SCAN_FPS} and {MAX_SCAN_FPS}, got {}",
                self.fps
            )));
        }
        if self.region_px < MIN_SCAN_REGION_PX {
            return Err(ScannerError::configuration(format!(
                "scan region must be at least {MIN_SCAN_REGION_PX}px, got {}",
                self.region_px
            )));
        }
        Ok(())
    }
}

//! Error types for camera capture and scan sessions.
//!
//! Covers camera acquisition failures, device faults during a session,
//! invalid sampling configuration and illegal session state changes.

/// Result type alias for scanner operations.
pub type Result<T> = std::result::Result<T, ScannerError>;

/// Errors that can occur while acquiring a camera or running a scan session.
#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    /// Camera could not be acquired (permission denied, missing device, busy).
    #[error("Camera unavailable: {message}")]
    CameraUnavailable { message: String },

    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// No code was detected before the deadline.
    #[error("Scan timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Device communication error during capture.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Sampling policy or surface configuration error.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Session state change that the lifecycle does not allow.
    #[error("Invalid session transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl ScannerError {
    /// Create a new camera unavailable error.
    pub fn camera_unavailable(message: impl Into<String>) -> Self {
        Self::CameraUnavailable {
            message: message.into(),
        }
    }

    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Recast any acquisition failure as [`ScannerError::CameraUnavailable`].
    pub(crate) fn into_acquisition_error(self) -> Self {
        match self {
            err @ Self::CameraUnavailable { .. } => err,
            other => Self::camera_unavailable(other.to_string()),
        }
    }
}

impl From<ScannerError> for gatepass_core::Error {
    fn from(err: ScannerError) -> Self {
        match err {
            ScannerError::CameraUnavailable { message } => {
                gatepass_core::Error::CameraUnavailable(message)
            }
            ScannerError::Timeout { duration_ms } => gatepass_core::Error::ScanTimeout {
                waited_ms: duration_ms,
            },
            ScannerError::ConfigurationError { message } => gatepass_core::Error::Config(message),
            ScannerError::InvalidTransition { from, to } => {
                gatepass_core::Error::InvalidStateTransition { from, to }
            }
            other => gatepass_core::Error::CameraUnavailable(other.to_string()),
        }
    }
}

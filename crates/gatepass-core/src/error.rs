use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Input errors
    #[error("Credential is empty")]
    EmptyCredential,

    // Authority outcomes
    #[error("Subject not found: {0}")]
    SubjectNotFound(String),

    #[error("Already checked in: {0}")]
    AlreadyCheckedIn(String),

    #[error("Already checked out: {0}")]
    AlreadyCheckedOut(String),

    #[error("Security flag: {0}")]
    SecurityFlag(String),

    #[error("Rejected by authority{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    RemoteRejection {
        status: Option<u16>,
        message: String,
    },

    #[error("Authority unreachable: {0}")]
    RemoteUnavailable(String),

    #[error("Invalid authority response: {0}")]
    InvalidResponse(String),

    // Scanner errors
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("No code detected within {waited_ms}ms")]
    ScanTimeout { waited_ms: u64 },

    // Attendance errors
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("Invalid hourly rate: {0}")]
    InvalidRate(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns `true` if re-submitting a credential (or retrying the call) may succeed.
    ///
    /// Only configuration problems need operator action first.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Error::Config(_))
    }

    /// Returns `true` for the security-flag alert path.
    #[must_use]
    pub fn is_security_flag(&self) -> bool {
        matches!(self, Error::SecurityFlag(_))
    }

    /// Returns `true` if the error was raised before any remote call was made.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::EmptyCredential)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

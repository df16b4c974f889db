//! Remote authority abstraction and wire replies.
//!
//! The authority owns every credential decision and every subject state
//! change. This module only describes what the checkpoint asks of it and the
//! shape of its answers; transports live elsewhere (`gatepass-network`) and
//! tests use [`ScriptedAuthority`](crate::mock::ScriptedAuthority).

use chrono::NaiveDateTime;
use gatepass_core::{Credential, Direction, SubjectType, VerificationStatus};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

/// Result type alias for authority calls.
pub type AuthorityResult<T> = std::result::Result<T, AuthorityError>;

/// Transport-level outcome of an authority call that did not succeed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthorityError {
    /// The authority answered and refused the request.
    #[error("Rejected{}: {detail}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Rejected { status: Option<u16>, detail: String },

    /// The authority could not be reached or failed internally.
    #[error("Authority unavailable: {message}")]
    Unavailable { message: String },

    /// The authority answered with something that could not be decoded.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },
}

impl AuthorityError {
    /// Create a new rejection.
    pub fn rejected(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            detail: detail.into(),
        }
    }

    /// Create a new unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a new invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}

impl From<AuthorityError> for gatepass_core::Error {
    fn from(err: AuthorityError) -> Self {
        match err {
            AuthorityError::Rejected { status, detail } => {
                crate::alert::classify_rejection(status, &detail)
            }
            AuthorityError::Unavailable { message } => {
                gatepass_core::Error::RemoteUnavailable(message)
            }
            AuthorityError::InvalidResponse { message } => {
                gatepass_core::Error::InvalidResponse(message)
            }
        }
    }
}

/// Reply to a verification request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifyReply {
    #[serde(rename = "type", default)]
    pub subject_type: Option<SubjectType>,
    #[serde(default)]
    pub status: Option<VerificationStatus>,
    #[serde(default)]
    pub employee_id: Option<u64>,
    #[serde(default)]
    pub employee_name: Option<String>,
    #[serde(default)]
    pub visitor_id: Option<u64>,
    #[serde(default)]
    pub visitor_name: Option<String>,
    #[serde(default)]
    pub visit_id: Option<u64>,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Reply to a visitor check-in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckInReply {
    /// Absent means success.
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default, alias = "type")]
    pub subject_type: Option<SubjectType>,
    #[serde(default)]
    pub visitor_id: Option<u64>,
    #[serde(default)]
    pub visitor_name: Option<String>,
    #[serde(default)]
    pub visit_id: Option<u64>,
    #[serde(default)]
    pub alert: Option<bool>,
    /// Active security flags; each entry is opaque to the checkpoint.
    #[serde(default)]
    pub flags: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub message: Option<String>,
    /// Refusal reason when `success` is false.
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub checkin_time: Option<NaiveDateTime>,
}

impl CheckInReply {
    /// Returns `true` if the reply carries at least one flag.
    pub fn has_flags(&self) -> bool {
        self.flags.as_ref().is_some_and(|flags| !flags.is_empty())
    }
}

/// Reply to a visitor check-out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckOutReply {
    #[serde(default)]
    pub visitor_id: Option<u64>,
    #[serde(default)]
    pub visitor_name: Option<String>,
    #[serde(default)]
    pub visit_id: Option<u64>,
    #[serde(default)]
    pub alert: Option<bool>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub checkout_time: Option<NaiveDateTime>,
}

/// Employee reference embedded in attendance replies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRef {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
}

/// Reply to an employee attendance scan. The authority picks the direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceScanReply {
    pub employee: EmployeeRef,
    pub status: Direction,
    #[serde(default)]
    pub time: Option<NaiveDateTime>,
}

/// One employee currently signed in on site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub employee_id: u64,
    pub name: String,
    #[serde(default, alias = "department_name")]
    pub department: Option<String>,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    #[serde(default, alias = "last_scan_time")]
    pub last_scan: Option<NaiveDateTime>,
}

/// Operations the checkpoint needs from the remote authority.
///
/// Futures are `Send` so that callers can drive them from spawned tasks
/// (the roster monitor does).
pub trait AuthorityClient: Send + Sync {
    /// Ask whether a credential is valid and who it belongs to.
    fn verify(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = AuthorityResult<VerifyReply>> + Send;

    /// Register a visitor arrival.
    fn check_in(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = AuthorityResult<CheckInReply>> + Send;

    /// Register a visitor departure.
    fn check_out(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = AuthorityResult<CheckOutReply>> + Send;

    /// Record an employee sign-in or sign-out.
    fn scan_attendance(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = AuthorityResult<AttendanceScanReply>> + Send;

    /// Employees currently signed in.
    fn signed_in_roster(&self) -> impl Future<Output = AuthorityResult<Vec<RosterEntry>>> + Send;
}

impl<A: AuthorityClient> AuthorityClient for Arc<A> {
    fn verify(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = AuthorityResult<VerifyReply>> + Send {
        (**self).verify(credential)
    }

    fn check_in(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = AuthorityResult<CheckInReply>> + Send {
        (**self).check_in(credential)
    }

    fn check_out(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = AuthorityResult<CheckOutReply>> + Send {
        (**self).check_out(credential)
    }

    fn scan_attendance(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = AuthorityResult<AttendanceScanReply>> + Send {
        (**self).scan_attendance(credential)
    }

    fn signed_in_roster(&self) -> impl Future<Output = AuthorityResult<Vec<RosterEntry>>> + Send {
        (**self).signed_in_roster()
    }
}

use crate::{
    Result,
    constants::{EMPLOYEE_PREFIX, VISITOR_PREFIX},
    error::Error,
    normalize::{RawScanPayload, normalize},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Canonical credential token decoded from a QR code.
///
/// Always non-empty and whitespace-trimmed. The content is opaque to this
/// layer; format and validity are decided by the remote authority.
///
/// # Security
/// Comparison runs in constant time so that credential lookups do not leak
/// how much of a token matched.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Credential(String);

impl Credential {
    /// Create a credential from already-decoded text.
    ///
    /// The value is trimmed before validation, so constructing from an
    /// existing credential's text is a no-op.
    ///
    /// # Errors
    /// Returns `Error::EmptyCredential` if nothing remains after trimming.
    pub fn new(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::EmptyCredential);
        }
        Ok(Credential(value.to_string()))
    }

    /// Normalize a raw decoder payload into a credential.
    ///
    /// # Errors
    /// Returns `Error::EmptyCredential` if the payload normalizes to `""`.
    pub fn from_payload(payload: &RawScanPayload) -> Result<Self> {
        Credential::new(&normalize(payload))
    }

    /// Get the credential as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Subject type suggested by the credential prefix, if any.
    ///
    /// Advisory only. Used to label events when the authority omits the type.
    #[must_use]
    pub fn kind_hint(&self) -> Option<SubjectType> {
        if self.0.starts_with(EMPLOYEE_PREFIX) {
            Some(SubjectType::Employee)
        } else if self.0.starts_with(VISITOR_PREFIX) {
            Some(SubjectType::Visitor)
        } else {
            None
        }
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Credential {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Credential::new(s)
    }
}

impl TryFrom<String> for Credential {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Credential::new(&value)
    }
}

impl From<Credential> for String {
    fn from(credential: Credential) -> Self {
        credential.0
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl std::hash::Hash for Credential {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// Kind of subject a credential refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectType {
    Visitor,
    Employee,
    /// The authority did not recognize the credential format.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SubjectType::Visitor => write!(f, "visitor"),
            SubjectType::Employee => write!(f, "employee"),
            SubjectType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Validity status reported by the authority for a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Valid,
    Expired,
    Revoked,
    #[serde(other)]
    Invalid,
}

impl VerificationStatus {
    /// Returns `true` only for `Valid`.
    #[inline]
    #[must_use]
    pub fn is_valid(self) -> bool {
        matches!(self, VerificationStatus::Valid)
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VerificationStatus::Valid => write!(f, "valid"),
            VerificationStatus::Expired => write!(f, "expired"),
            VerificationStatus::Revoked => write!(f, "revoked"),
            VerificationStatus::Invalid => write!(f, "invalid"),
        }
    }
}

/// Direction of a check or attendance event.
///
/// Accepts the authority's wire spellings (`signin`/`signout`,
/// `checked_in`/`checked_out`) when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "signin", alias = "checked_in", alias = "check_in")]
    In,
    #[serde(alias = "signout", alias = "checked_out", alias = "check_out")]
    Out,
}

impl Direction {
    /// Returns `true` if direction is In.
    #[inline]
    #[must_use]
    pub fn is_in(self) -> bool {
        matches!(self, Direction::In)
    }

    /// Returns `true` if direction is Out.
    #[inline]
    #[must_use]
    pub fn is_out(self) -> bool {
        matches!(self, Direction::Out)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
        }
    }
}

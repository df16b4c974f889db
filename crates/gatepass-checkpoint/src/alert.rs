//! Security alert detection and rejection classification.
//!
//! The authority signals a flagged visitor two ways: structurally (an
//! `alert` field or a non-empty `flags` list on a reply) or only through the
//! wording of a rejection detail. The wording check is a heuristic and lives
//! in [`mentions_flag`] alone.

use gatepass_core::{Error, constants::FLAG_KEYWORD};

/// Returns `true` if an authority message mentions a security flag.
///
/// Case-insensitive substring match on the flag keyword.
///
/// # Examples
///
/// ```
/// use gatepass_checkpoint::alert::mentions_flag;
///
/// assert!(mentions_flag("Visitor has active security flags"));
/// assert!(mentions_flag("FLAGGED visitor"));
/// assert!(!mentions_flag("QR code is expired"));
/// ```
#[must_use]
pub fn mentions_flag(message: &str) -> bool {
    message.to_lowercase().contains(FLAG_KEYWORD)
}

/// Map an authority rejection onto the checkpoint error taxonomy.
///
/// Order matters: a flag mention wins over every other classification.
#[must_use]
pub fn classify_rejection(status: Option<u16>, detail: &str) -> Error {
    let lowered = detail.to_lowercase();

    if mentions_flag(detail) {
        Error::SecurityFlag(detail.to_string())
    } else if status == Some(404) || lowered.contains("not found") {
        Error::SubjectNotFound(detail.to_string())
    } else if lowered.contains("already checked in") {
        Error::AlreadyCheckedIn(detail.to_string())
    } else if lowered.contains("already checked out") {
        Error::AlreadyCheckedOut(detail.to_string())
    } else if status.is_some_and(|code| code >= 500) {
        Error::RemoteUnavailable(detail.to_string())
    } else {
        Error::RemoteRejection {
            status,
            message: detail.to_string(),
        }
    }
}

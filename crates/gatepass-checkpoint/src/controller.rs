//! Verification and check-in/out controller.
//!
//! Turns credentials into authority requests and authority answers into
//! checkpoint outcomes. The controller holds no subject state of its own
//! beyond the [`ObservedStateLedger`] mirror; the authority decides everything.
//!
//! # Alert Paths
//!
//! A flagged visitor can surface two ways and both produce an alert:
//!
//! 1. A successful reply carrying `alert = true` or a non-empty `flags` list.
//! 2. A rejection whose detail mentions a flag ([`mentions_flag`]).
//!
//! For check-in the second path still yields `Ok(CheckEvent)` with
//! `admitted = false`, so the operator sees the alert rather than an error.
//! For check-out and attendance it yields [`Error::SecurityFlag`].

use crate::{
    alert::{classify_rejection, mentions_flag},
    authority::{AuthorityClient, AuthorityError, CheckInReply, CheckOutReply, VerifyReply},
    observed::{ObservedState, ObservedStateLedger, SubjectKey},
};
use chrono::{Local, NaiveDateTime};
use gatepass_core::{
    Credential, Direction, Error, RawScanPayload, Result, SubjectType, VerificationStatus,
    constants::{DEFAULT_CHECKIN_ALERT, DEFAULT_CHECKOUT_ALERT},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// What to do with a scanned credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckpointAction {
    Verify,
    CheckIn,
    CheckOut,
    Attendance,
}

impl fmt::Display for CheckpointAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointAction::Verify => write!(f, "verify"),
            CheckpointAction::CheckIn => write!(f, "check-in"),
            CheckpointAction::CheckOut => write!(f, "check-out"),
            CheckpointAction::Attendance => write!(f, "attendance"),
        }
    }
}

impl FromStr for CheckpointAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verify" => Ok(CheckpointAction::Verify),
            "check-in" | "checkin" => Ok(CheckpointAction::CheckIn),
            "check-out" | "checkout" => Ok(CheckpointAction::CheckOut),
            "attendance" => Ok(CheckpointAction::Attendance),
            other => Err(Error::Config(format!("unknown checkpoint action: {other}"))),
        }
    }
}

/// Authority answer to a verification request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    pub subject_type: SubjectType,
    pub status: VerificationStatus,
    pub subject_id: Option<u64>,
    pub name: Option<String>,
    pub visit_id: Option<u64>,
    pub expiry_date: Option<String>,
    pub message: Option<String>,
}

impl VerificationResult {
    fn from_reply(reply: VerifyReply, credential: &Credential) -> Self {
        let subject_type = reply
            .subject_type
            .or_else(|| credential.kind_hint())
            .unwrap_or(SubjectType::Unknown);

        let (subject_id, name) = match subject_type {
            SubjectType::Employee => (reply.employee_id, reply.employee_name),
            SubjectType::Visitor => (reply.visitor_id, reply.visitor_name),
            SubjectType::Unknown => (
                reply.employee_id.or(reply.visitor_id),
                reply.employee_name.or(reply.visitor_name),
            ),
        };

        Self {
            subject_type,
            status: reply.status.unwrap_or(VerificationStatus::Invalid),
            subject_id,
            name,
            visit_id: reply.visit_id,
            expiry_date: reply.expiry_date,
            message: reply.message,
        }
    }

    /// Returns `true` if the authority reported the credential as valid.
    pub fn is_valid(&self) -> bool {
        self.status.is_valid()
    }
}

/// Outcome of a check-in or check-out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckEvent {
    pub subject_type: SubjectType,
    pub subject_id: Option<u64>,
    pub name: Option<String>,
    pub visit_id: Option<u64>,
    pub direction: Direction,
    pub timestamp: NaiveDateTime,
    pub alert: bool,
    pub alert_message: Option<String>,
    /// False only for a check-in refused because of a security flag.
    pub admitted: bool,
}

/// Outcome of an employee attendance scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceScan {
    pub employee_id: u64,
    pub name: Option<String>,
    pub direction: Direction,
    pub time: NaiveDateTime,
}

/// Result of [`CheckpointController::submit`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckpointOutcome {
    Verified(VerificationResult),
    Checked(CheckEvent),
    Attendance(AttendanceScan),
}

/// Credential workflow against a remote authority.
///
/// # Examples
///
/// ```
/// use gatepass_checkpoint::mock::ScriptedAuthority;
/// use gatepass_checkpoint::authority::CheckInReply;
/// use gatepass_checkpoint::CheckpointController;
/// use gatepass_core::Credential;
///
/// #[tokio::main]
/// async fn main() -> gatepass_core::Result<()> {
///     let authority = ScriptedAuthority::new();
///     authority.push_check_in(Ok(CheckInReply {
///         visitor_id: Some(17),
///         visitor_name: Some("Dana".into()),
///         ..Default::default()
///     }));
///
///     let controller = CheckpointController::new(authority);
///     let event = controller.check_in(&Credential::new("VIS_17_a9c4")?).await?;
///     assert!(event.admitted && !event.alert);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct CheckpointController<A> {
    authority: A,
    ledger: ObservedStateLedger,
}

impl<A: AuthorityClient> CheckpointController<A> {
    pub fn new(authority: A) -> Self {
        Self {
            authority,
            ledger: ObservedStateLedger::new(),
        }
    }

    /// The underlying authority client.
    pub fn authority(&self) -> &A {
        &self.authority
    }

    /// Mirror of authority-reported subject states.
    pub fn ledger(&self) -> &ObservedStateLedger {
        &self.ledger
    }

    /// Ask the authority about a credential. Changes no state.
    ///
    /// # Errors
    ///
    /// Authority rejections and transport failures, classified.
    pub async fn verify(&self, credential: &Credential) -> Result<VerificationResult> {
        debug!(credential = %credential, "Verifying credential");
        let reply = self.authority.verify(credential).await?;
        let result = VerificationResult::from_reply(reply, credential);

        info!(
            subject_type = %result.subject_type,
            status = %result.status,
            subject_id = ?result.subject_id,
            "Credential verified"
        );
        Ok(result)
    }

    /// Check a visitor in.
    ///
    /// A rejection that mentions a security flag is returned as an
    /// alert-bearing event with `admitted = false`.
    ///
    /// # Errors
    ///
    /// Any other rejection or transport failure, classified.
    pub async fn check_in(&self, credential: &Credential) -> Result<CheckEvent> {
        debug!(credential = %credential, "Submitting check-in");
        match self.authority.check_in(credential).await {
            Ok(reply) => self.accept_check_in(reply, credential),
            Err(AuthorityError::Rejected { status, detail }) if mentions_flag(&detail) => {
                warn!(status = ?status, detail = %detail, "Check-in refused: security flag");
                Ok(CheckEvent {
                    subject_type: credential.kind_hint().unwrap_or(SubjectType::Visitor),
                    subject_id: None,
                    name: None,
                    visit_id: None,
                    direction: Direction::In,
                    timestamp: now(),
                    alert: true,
                    alert_message: Some(detail),
                    admitted: false,
                })
            }
            Err(e) => Err(self.rejected("check-in", e)),
        }
    }

    /// Check a visitor out. Flags on a successful check-out are advisory.
    ///
    /// # Errors
    ///
    /// `Error::SecurityFlag` if the authority refused because of a flag;
    /// any other rejection or transport failure, classified.
    pub async fn check_out(&self, credential: &Credential) -> Result<CheckEvent> {
        debug!(credential = %credential, "Submitting check-out");
        let reply = self
            .authority
            .check_out(credential)
            .await
            .map_err(|e| self.rejected("check-out", e))?;
        self.accept_check_out(reply, credential)
    }

    /// Record an employee attendance scan. The authority picks the direction.
    ///
    /// # Errors
    ///
    /// `Error::SecurityFlag` if the authority refused because of a flag;
    /// any other rejection or transport failure, classified.
    pub async fn scan_attendance(&self, credential: &Credential) -> Result<AttendanceScan> {
        debug!(credential = %credential, "Submitting attendance scan");
        let reply = self
            .authority
            .scan_attendance(credential)
            .await
            .map_err(|e| self.rejected("attendance", e))?;

        let scan = AttendanceScan {
            employee_id: reply.employee.id,
            name: reply.employee.name,
            direction: reply.status,
            time: reply.time.unwrap_or_else(now),
        };

        self.ledger.observe(
            SubjectKey::new(SubjectType::Employee, scan.employee_id),
            scan.direction.into(),
        );
        info!(
            employee_id = scan.employee_id,
            direction = %scan.direction,
            time = %scan.time,
            "Attendance recorded"
        );
        Ok(scan)
    }

    /// Normalize a raw decoder payload and run `action` on it.
    ///
    /// # Errors
    ///
    /// `Error::EmptyCredential` if the payload carries no usable text (no
    /// remote call is made); otherwise the errors of the chosen operation.
    pub async fn submit(
        &self,
        payload: &RawScanPayload,
        action: CheckpointAction,
    ) -> Result<CheckpointOutcome> {
        let credential = Credential::from_payload(payload).inspect_err(|_| {
            warn!(action = %action, "Scanned payload carried no credential");
        })?;

        match action {
            CheckpointAction::Verify => self.verify(&credential).await.map(CheckpointOutcome::Verified),
            CheckpointAction::CheckIn => self.check_in(&credential).await.map(CheckpointOutcome::Checked),
            CheckpointAction::CheckOut => {
                self.check_out(&credential).await.map(CheckpointOutcome::Checked)
            }
            CheckpointAction::Attendance => self
                .scan_attendance(&credential)
                .await
                .map(CheckpointOutcome::Attendance),
        }
    }

    fn accept_check_in(&self, reply: CheckInReply, credential: &Credential) -> Result<CheckEvent> {
        let admitted = reply.success.unwrap_or(true);
        // A refusal worded around a flag is the same alert as a flagged 4xx.
        let flag_text = reply
            .error
            .as_deref()
            .filter(|e| mentions_flag(e))
            .or_else(|| {
                reply
                    .message
                    .as_deref()
                    .filter(|m| !admitted && mentions_flag(m))
            })
            .map(str::to_owned);
        let alert = reply.alert.unwrap_or(false) || reply.has_flags() || flag_text.is_some();

        if !admitted && !alert {
            let detail = refusal_detail(reply.error, reply.message, "Check-in refused");
            return Err(self.rejected("check-in", AuthorityError::rejected(None, detail)));
        }

        let event = CheckEvent {
            subject_type: reply.subject_type.unwrap_or(SubjectType::Visitor),
            subject_id: reply.visitor_id,
            name: reply.visitor_name,
            visit_id: reply.visit_id,
            direction: Direction::In,
            timestamp: reply.checkin_time.unwrap_or_else(now),
            alert,
            alert_message: alert.then(|| {
                flag_text.unwrap_or_else(|| non_empty(reply.message, DEFAULT_CHECKIN_ALERT))
            }),
            admitted,
        };

        if event.admitted
            && let Some(id) = event.subject_id
        {
            self.ledger
                .observe(SubjectKey::new(event.subject_type, id), ObservedState::CheckedIn);
        }

        if event.alert {
            warn!(
                credential = %credential,
                admitted = event.admitted,
                message = ?event.alert_message,
                "Security alert on check-in"
            );
        } else {
            info!(visitor = ?event.name, visit_id = ?event.visit_id, "Visitor checked in");
        }
        Ok(event)
    }

    fn accept_check_out(&self, reply: CheckOutReply, credential: &Credential) -> Result<CheckEvent> {
        if reply.success == Some(false) {
            let detail = refusal_detail(reply.error, reply.message, "Check-out refused");
            return Err(self.rejected("check-out", AuthorityError::rejected(None, detail)));
        }

        let alert = reply.alert.unwrap_or(false);
        let event = CheckEvent {
            subject_type: credential.kind_hint().unwrap_or(SubjectType::Visitor),
            subject_id: reply.visitor_id,
            name: reply.visitor_name,
            visit_id: reply.visit_id,
            direction: Direction::Out,
            timestamp: reply.checkout_time.unwrap_or_else(now),
            alert,
            alert_message: alert.then(|| non_empty(reply.message, DEFAULT_CHECKOUT_ALERT)),
            admitted: true,
        };

        if let Some(id) = event.subject_id {
            self.ledger
                .observe(SubjectKey::new(event.subject_type, id), ObservedState::CheckedOut);
        }

        info!(
            visitor = ?event.name,
            visit_id = ?event.visit_id,
            alert = event.alert,
            "Visitor checked out"
        );
        Ok(event)
    }

    fn rejected(&self, operation: &str, err: AuthorityError) -> Error {
        let error = match err {
            AuthorityError::Rejected { status, detail } => classify_rejection(status, &detail),
            other => other.into(),
        };
        warn!(operation, error = %error, "Authority did not accept request");
        error
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn non_empty(message: Option<String>, fallback: &str) -> String {
    message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn refusal_detail(error: Option<String>, message: Option<String>, fallback: &str) -> String {
    error
        .filter(|e| !e.trim().is_empty())
        .or(message)
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("verify", CheckpointAction::Verify)]
    #[case("check-in", CheckpointAction::CheckIn)]
    #[case("checkin", CheckpointAction::CheckIn)]
    #[case("Check-Out", CheckpointAction::CheckOut)]
    #[case(" attendance ", CheckpointAction::Attendance)]
    fn test_action_from_str(#[case] input: &str, #[case] expected: CheckpointAction) {
        assert_eq!(input.parse::<CheckpointAction>().unwrap(), expected);
    }

    #[test]
    fn test_action_round_trips_display() {
        for action in [
            CheckpointAction::Verify,
            CheckpointAction::CheckIn,
            CheckpointAction::CheckOut,
            CheckpointAction::Attendance,
        ] {
            assert_eq!(action.to_string().parse::<CheckpointAction>().unwrap(), action);
        }
        assert!("enter".parse::<CheckpointAction>().is_err());
    }

    #[test]
    fn test_verification_uses_prefix_hint_when_type_missing() {
        let credential = Credential::new("EMP_3_abc").unwrap();
        let reply = VerifyReply {
            status: Some(VerificationStatus::Valid),
            employee_id: Some(3),
            employee_name: Some("Ana".into()),
            ..Default::default()
        };

        let result = VerificationResult::from_reply(reply, &credential);
        assert_eq!(result.subject_type, SubjectType::Employee);
        assert_eq!(result.subject_id, Some(3));
        assert!(result.is_valid());
    }

    #[test]
    fn test_verification_missing_status_is_invalid() {
        let credential = Credential::new("opaque").unwrap();
        let result = VerificationResult::from_reply(VerifyReply::default(), &credential);
        assert_eq!(result.subject_type, SubjectType::Unknown);
        assert_eq!(result.status, VerificationStatus::Invalid);
    }

    #[rstest]
    #[case(None, DEFAULT_CHECKIN_ALERT)]
    #[case(Some("  "), DEFAULT_CHECKIN_ALERT)]
    #[case(Some("Contact security"), "Contact security")]
    fn test_non_empty_message(#[case] message: Option<&str>, #[case] expected: &str) {
        assert_eq!(
            non_empty(message.map(str::to_string), DEFAULT_CHECKIN_ALERT),
            expected
        );
    }
}

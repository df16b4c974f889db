//! Controller behaviour against a scripted authority.

use chrono::NaiveDate;
use gatepass_checkpoint::authority::{
    AttendanceScanReply, AuthorityError, CheckInReply, CheckOutReply, EmployeeRef, VerifyReply,
};
use gatepass_checkpoint::mock::{Operation, ScriptedAuthority};
use gatepass_checkpoint::observed::{ObservedState, SubjectKey};
use gatepass_checkpoint::{CheckpointAction, CheckpointController, CheckpointOutcome};
use gatepass_core::constants::{DEFAULT_CHECKIN_ALERT, DEFAULT_CHECKOUT_ALERT};
use gatepass_core::{
    Credential, Direction, Error, RawScanPayload, SubjectType, VerificationStatus,
};
use rstest::rstest;
use serde_json::json;

fn credential(text: &str) -> Credential {
    Credential::new(text).unwrap()
}

fn controller() -> CheckpointController<ScriptedAuthority> {
    CheckpointController::new(ScriptedAuthority::new())
}

fn visitor_checked_in(id: u64) -> CheckInReply {
    CheckInReply {
        success: Some(true),
        visitor_id: Some(id),
        visitor_name: Some("Dana Reyes".into()),
        visit_id: Some(40 + id),
        ..Default::default()
    }
}

// ============================================================================
// Verify
// ============================================================================

#[tokio::test]
async fn test_verify_passes_authority_answer_through() {
    let controller = controller();
    controller.authority().push_verify(Ok(VerifyReply {
        subject_type: Some(SubjectType::Visitor),
        status: Some(VerificationStatus::Expired),
        visitor_id: Some(17),
        visitor_name: Some("Dana Reyes".into()),
        visit_id: Some(57),
        expiry_date: Some("2025-03-01".into()),
        message: Some("QR code has expired".into()),
        ..Default::default()
    }));

    let result = controller.verify(&credential("VIS_17_a9c4")).await.unwrap();

    assert_eq!(result.subject_type, SubjectType::Visitor);
    assert_eq!(result.status, VerificationStatus::Expired);
    assert_eq!(result.subject_id, Some(17));
    assert_eq!(result.name.as_deref(), Some("Dana Reyes"));
    assert_eq!(result.message.as_deref(), Some("QR code has expired"));
    assert!(!result.is_valid());
    assert!(controller.ledger().is_empty());
}

#[tokio::test]
async fn test_verify_unknown_credential() {
    let controller = controller();
    controller
        .authority()
        .push_verify(Err(AuthorityError::rejected(Some(404), "QR code not found")));

    let result = controller.verify(&credential("garbage")).await;
    assert!(matches!(result, Err(Error::SubjectNotFound(_))));
}

// ============================================================================
// Check-in alert paths
// ============================================================================

#[tokio::test]
async fn test_check_in_success_without_alert() {
    let controller = controller();
    controller.authority().push_check_in(Ok(visitor_checked_in(17)));

    let event = controller.check_in(&credential("VIS_17_a9c4")).await.unwrap();

    assert!(event.admitted);
    assert!(!event.alert);
    assert!(event.alert_message.is_none());
    assert_eq!(event.direction, Direction::In);
    assert_eq!(event.subject_id, Some(17));
    assert_eq!(
        controller
            .ledger()
            .state_of(&SubjectKey::new(SubjectType::Visitor, 17)),
        Some(ObservedState::CheckedIn)
    );
}

#[tokio::test]
async fn test_check_in_alert_field_uses_default_message() {
    let controller = controller();
    controller.authority().push_check_in(Ok(CheckInReply {
        alert: Some(true),
        ..visitor_checked_in(17)
    }));

    let event = controller.check_in(&credential("VIS_17_a9c4")).await.unwrap();

    assert!(event.alert);
    assert!(event.admitted);
    assert_eq!(event.alert_message.as_deref(), Some(DEFAULT_CHECKIN_ALERT));
}

#[tokio::test]
async fn test_check_in_flags_list_raises_alert() {
    let controller = controller();
    controller.authority().push_check_in(Ok(CheckInReply {
        success: Some(false),
        alert: None,
        flags: Some(vec![json!({ "alert_id": 4, "description": "Expired QR scanned" })]),
        message: Some("SECURITY ALERT: This visitor has been flagged. Please contact security.".into()),
        ..visitor_checked_in(17)
    }));

    let event = controller.check_in(&credential("VIS_17_a9c4")).await.unwrap();

    assert!(event.alert);
    assert!(!event.admitted);
    assert_eq!(
        event.alert_message.as_deref(),
        Some("SECURITY ALERT: This visitor has been flagged. Please contact security.")
    );
    // Refused check-ins are not mirrored as on site
    assert!(controller.ledger().is_empty());
}

#[rstest]
#[case("Visitor has active security flags")]
#[case("FLAGGED: contact security")]
#[case("Security Flag raised for this visitor")]
#[tokio::test]
async fn test_check_in_flag_rejection_yields_alert_event(#[case] detail: &str) {
    let controller = controller();
    controller
        .authority()
        .push_check_in(Err(AuthorityError::rejected(Some(400), detail)));

    let event = controller.check_in(&credential("VIS_17_a9c4")).await.unwrap();

    assert!(event.alert);
    assert!(!event.admitted);
    assert_eq!(event.alert_message.as_deref(), Some(detail));
    assert_eq!(event.subject_type, SubjectType::Visitor);
}

#[rstest]
#[case(Some("Visitor has active security flags"), None)]
#[case(None, Some("Visitor has active security flags"))]
#[case(Some("Check-in refused"), Some("FLAGGED: contact security"))]
#[tokio::test]
async fn test_check_in_flag_worded_refusal_matches_flag_rejection(
    #[case] error: Option<&str>,
    #[case] message: Option<&str>,
) {
    let refused = controller();
    refused.authority().push_check_in(Ok(CheckInReply {
        success: Some(false),
        error: error.map(Into::into),
        message: message.map(Into::into),
        ..Default::default()
    }));
    let flag_text = error
        .into_iter()
        .chain(message)
        .find(|text| text.to_lowercase().contains("flag"))
        .unwrap();

    let rejected = controller();
    rejected
        .authority()
        .push_check_in(Err(AuthorityError::rejected(Some(400), flag_text)));

    let from_reply = refused.check_in(&credential("VIS_17_a9c4")).await.unwrap();
    let from_rejection = rejected.check_in(&credential("VIS_17_a9c4")).await.unwrap();

    for event in [&from_reply, &from_rejection] {
        assert!(event.alert);
        assert!(!event.admitted);
        assert_eq!(event.alert_message.as_deref(), Some(flag_text));
        assert_eq!(event.subject_type, SubjectType::Visitor);
    }
    assert!(refused.ledger().is_empty());
}

#[rstest]
#[case(Some(400), "Visitor is already checked in", Error::AlreadyCheckedIn("Visitor is already checked in".into()))]
#[case(Some(404), "Visit not found", Error::SubjectNotFound("Visit not found".into()))]
#[case(Some(400), "QR code is expired", Error::RemoteRejection { status: Some(400), message: "QR code is expired".into() })]
#[tokio::test]
async fn test_check_in_rejections_map_to_taxonomy(
    #[case] status: Option<u16>,
    #[case] detail: &str,
    #[case] expected: Error,
) {
    let controller = controller();
    controller
        .authority()
        .push_check_in(Err(AuthorityError::rejected(status, detail)));

    let result = controller.check_in(&credential("VIS_17_a9c4")).await;
    assert_eq!(result, Err(expected));
}

#[tokio::test]
async fn test_check_in_unsuccessful_reply_without_flag_is_error() {
    let controller = controller();
    controller.authority().push_check_in(Ok(CheckInReply {
        success: Some(false),
        error: Some("Visitor is already checked in".into()),
        ..Default::default()
    }));

    let result = controller.check_in(&credential("VIS_17_a9c4")).await;
    assert_eq!(
        result,
        Err(Error::AlreadyCheckedIn("Visitor is already checked in".into()))
    );
}

#[tokio::test]
async fn test_check_in_transport_failure() {
    let controller = controller();
    controller
        .authority()
        .push_check_in(Err(AuthorityError::unavailable("connection refused")));

    let result = controller.check_in(&credential("VIS_17_a9c4")).await;
    assert_eq!(
        result,
        Err(Error::RemoteUnavailable("connection refused".into()))
    );
}

// ============================================================================
// Check-out
// ============================================================================

#[tokio::test]
async fn test_check_out_advisory_alert() {
    let controller = controller();
    controller.authority().push_check_in(Ok(visitor_checked_in(17)));
    controller.authority().push_check_out(Ok(CheckOutReply {
        visitor_id: Some(17),
        visitor_name: Some("Dana Reyes".into()),
        alert: Some(true),
        ..Default::default()
    }));

    let cred = credential("VIS_17_a9c4");
    controller.check_in(&cred).await.unwrap();
    let event = controller.check_out(&cred).await.unwrap();

    assert!(event.admitted);
    assert!(event.alert);
    assert_eq!(event.direction, Direction::Out);
    assert_eq!(event.alert_message.as_deref(), Some(DEFAULT_CHECKOUT_ALERT));

    let key = SubjectKey::new(SubjectType::Visitor, 17);
    let history = controller.ledger().history(&key);
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|t| t.expected));
}

#[tokio::test]
async fn test_check_out_flag_rejection_is_security_error() {
    let controller = controller();
    controller.authority().push_check_out(Err(AuthorityError::rejected(
        Some(400),
        "Visitor has active security flags",
    )));

    let result = controller.check_out(&credential("VIS_17_a9c4")).await;
    assert!(matches!(result, Err(Error::SecurityFlag(_))));
}

#[tokio::test]
async fn test_check_out_without_check_in_is_recorded_as_unexpected() {
    let controller = controller();
    controller.authority().push_check_out(Ok(CheckOutReply {
        visitor_id: Some(5),
        ..Default::default()
    }));

    controller.check_out(&credential("VIS_5_x")).await.unwrap();

    let history = controller
        .ledger()
        .history(&SubjectKey::new(SubjectType::Visitor, 5));
    assert_eq!(history.len(), 1);
    assert!(!history[0].expected);
}

// ============================================================================
// Attendance
// ============================================================================

#[tokio::test]
async fn test_attendance_direction_comes_from_authority() {
    let controller = controller();
    let time = NaiveDate::from_ymd_opt(2025, 3, 4)
        .unwrap()
        .and_hms_opt(8, 2, 0)
        .unwrap();
    controller.authority().push_attendance(Ok(AttendanceScanReply {
        employee: EmployeeRef {
            id: 3,
            name: Some("Ana Lima".into()),
        },
        status: Direction::In,
        time: Some(time),
    }));

    let scan = controller
        .scan_attendance(&credential("EMP_3_2d0b007bad15"))
        .await
        .unwrap();

    assert_eq!(scan.employee_id, 3);
    assert_eq!(scan.direction, Direction::In);
    assert_eq!(scan.time, time);
    assert_eq!(
        controller
            .ledger()
            .state_of(&SubjectKey::new(SubjectType::Employee, 3)),
        Some(ObservedState::CheckedIn)
    );
}

#[tokio::test]
async fn test_attendance_rejection() {
    let controller = controller();
    controller.authority().push_attendance(Err(AuthorityError::rejected(
        Some(400),
        "Invalid QR code or not an employee QR code",
    )));

    let result = controller.scan_attendance(&credential("VIS_1_a")).await;
    assert!(matches!(
        result,
        Err(Error::RemoteRejection { status: Some(400), .. })
    ));
}

// ============================================================================
// Submit
// ============================================================================

#[rstest]
#[case(RawScanPayload::from("   "))]
#[case(RawScanPayload::Empty)]
#[case(RawScanPayload::from(json!({ "decodedText": "\n" })))]
#[tokio::test]
async fn test_submit_rejects_empty_before_remote_call(#[case] payload: RawScanPayload) {
    let controller = controller();

    for action in [
        CheckpointAction::Verify,
        CheckpointAction::CheckIn,
        CheckpointAction::CheckOut,
        CheckpointAction::Attendance,
    ] {
        let result = controller.submit(&payload, action).await;
        assert_eq!(result, Err(Error::EmptyCredential));
    }
    assert_eq!(controller.authority().call_count(), 0);
}

#[tokio::test]
async fn test_submit_normalizes_structured_payload() {
    let controller = controller();
    controller.authority().push_verify(Ok(VerifyReply {
        subject_type: Some(SubjectType::Employee),
        status: Some(VerificationStatus::Valid),
        employee_id: Some(3),
        ..Default::default()
    }));

    let payload = RawScanPayload::from(json!({ "decodedText": "EMP_3_2d0b007bad15 " }));
    let outcome = controller
        .submit(&payload, CheckpointAction::Verify)
        .await
        .unwrap();

    assert!(matches!(outcome, CheckpointOutcome::Verified(ref r) if r.is_valid()));
    assert_eq!(
        controller.authority().credentials(),
        vec!["EMP_3_2d0b007bad15".to_string()]
    );
    assert_eq!(controller.authority().calls_for(Operation::Verify), 1);
}

//! End-to-end scan and submit through a checkpoint station.

use gatepass_checkpoint::authority::{AuthorityError, CheckInReply};
use gatepass_checkpoint::mock::ScriptedAuthority;
use gatepass_checkpoint::{CheckpointAction, CheckpointController, CheckpointOutcome, CheckpointStation};
use gatepass_core::Error;
use gatepass_scanner::mock::{MockCamera, MockCameraHandle};
use gatepass_scanner::{SamplingPolicy, ScanSurface};
use serde_json::json;
use std::time::Duration;

fn station() -> (CheckpointStation<ScriptedAuthority>, MockCameraHandle) {
    let (camera, handle) = MockCamera::new();
    let surface = ScanSurface::new(camera, SamplingPolicy::default().with_fps(60)).unwrap();
    let controller = CheckpointController::new(ScriptedAuthority::new());
    (CheckpointStation::new(surface, controller), handle)
}

#[tokio::test]
async fn test_scan_and_check_in() {
    let (mut station, handle) = station();
    station.controller().authority().push_check_in(Ok(CheckInReply {
        visitor_id: Some(17),
        visitor_name: Some("Dana Reyes".into()),
        ..Default::default()
    }));

    handle.present_noise("No QR code found").await.unwrap();
    handle
        .present(json!({ "decodedText": " VIS_17_a9c4 ", "result": {} }))
        .await
        .unwrap();

    let outcome = station
        .scan_and_submit(CheckpointAction::CheckIn, Duration::from_secs(1))
        .await
        .unwrap();

    match outcome {
        CheckpointOutcome::Checked(event) => {
            assert!(event.admitted);
            assert_eq!(event.name.as_deref(), Some("Dana Reyes"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(
        station.controller().authority().credentials(),
        vec!["VIS_17_a9c4".to_string()]
    );
    assert_eq!(handle.live_handles(), 0);
}

#[tokio::test]
async fn test_scan_timeout() {
    let (mut station, handle) = station();

    let result = station
        .scan_and_submit(CheckpointAction::Verify, Duration::from_millis(50))
        .await;

    assert_eq!(result, Err(Error::ScanTimeout { waited_ms: 50 }));
    assert_eq!(station.controller().authority().call_count(), 0);
    assert_eq!(handle.live_handles(), 0);
}

#[tokio::test]
async fn test_camera_denied() {
    let (mut station, handle) = station();
    handle.deny_access(true);

    let result = station
        .scan_and_submit(CheckpointAction::Verify, Duration::from_millis(50))
        .await;

    assert!(matches!(result, Err(Error::CameraUnavailable(_))));
    assert!(!station.surface().is_active());
}

#[tokio::test]
async fn test_flagged_visitor_alert_after_scan() {
    let (mut station, handle) = station();
    station
        .controller()
        .authority()
        .push_check_in(Err(AuthorityError::rejected(
            Some(400),
            "Visitor has active security flags",
        )));

    handle.present("VIS_17_a9c4").await.unwrap();
    let outcome = station
        .scan_and_submit(CheckpointAction::CheckIn, Duration::from_secs(1))
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        CheckpointOutcome::Checked(ref event) if event.alert && !event.admitted
    ));
    station.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_empty_scan_is_rejected_without_remote_call() {
    let (mut station, handle) = station();
    handle.present("   ").await.unwrap();

    let result = station
        .scan_and_submit(CheckpointAction::CheckOut, Duration::from_secs(1))
        .await;

    assert_eq!(result, Err(Error::EmptyCredential));
    assert_eq!(station.controller().authority().call_count(), 0);
}

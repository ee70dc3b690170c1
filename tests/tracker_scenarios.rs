//! End-to-end tracker behaviour against an in-memory server

mod fixtures;

use std::sync::Arc;
use std::time::Duration;

use attendance_client::api::{ActionReply, ApiError};
use attendance_client::{
    ActionOutcome, AttendanceAction, AttendanceError, AttendanceStatus, AttendanceTracker,
    StaticLocationProvider, WorkplaceId,
};
use fixtures::{milan, user, FakeAttendanceServer};

fn tracker(server: &Arc<FakeAttendanceServer>) -> AttendanceTracker {
    AttendanceTracker::new(server.clone(), milan(), user())
}

#[tokio::test]
async fn test_full_day() {
    let server = FakeAttendanceServer::new(AttendanceStatus::CheckedOut)
        .with_workplaces(&[("4", "Milano Centrale"), ("9", "Torino")]);
    let tracker = tracker(&server);
    tracker.mount().await.unwrap();

    for (action, expected) in [
        (AttendanceAction::Checkin, AttendanceStatus::CheckedIn),
        (AttendanceAction::StartBreak, AttendanceStatus::OnBreak),
        (AttendanceAction::EndBreak, AttendanceStatus::CheckedIn),
        (AttendanceAction::Checkout, AttendanceStatus::CheckedOut),
    ] {
        let outcome = tracker.perform_selected(action).await.unwrap();
        assert!(matches!(outcome, ActionOutcome::Confirmed { status, .. } if status == expected));
        assert!(tracker.state().pending.is_none());
    }

    let submitted = server.submitted();
    assert_eq!(submitted.len(), 4);
    assert!(submitted.iter().all(|r| r.workplace_id == WorkplaceId::new("4")));
    assert!(submitted.iter().all(|r| r.position.latitude == 45.4642));
    // mount only; confirmed actions are not re-queried
    assert_eq!(server.status_calls(), 1);
}

#[tokio::test]
async fn test_double_tap_submits_once() {
    let server = FakeAttendanceServer::new(AttendanceStatus::CheckedIn)
        .with_workplaces(&[("4", "Milano Centrale")]);
    let tracker = tracker(&server);
    tracker.mount().await.unwrap();
    let gate = server.gate_actions();

    let first = tracker.perform_selected(AttendanceAction::StartBreak);
    let second = async {
        gate.entered.notified().await;
        let outcome = tracker.perform_selected(AttendanceAction::StartBreak).await;
        assert_eq!(tracker.state().pending, Some(AttendanceAction::StartBreak));
        assert_eq!(tracker.state().status, Some(AttendanceStatus::OnBreak));
        gate.release.notify_one();
        outcome
    };
    let (first, second) = tokio::join!(first, second);

    assert!(matches!(
        first.unwrap(),
        ActionOutcome::Confirmed { status: AttendanceStatus::OnBreak, .. }
    ));
    assert_eq!(
        second.unwrap(),
        ActionOutcome::Ignored { pending: AttendanceAction::StartBreak }
    );
    assert_eq!(server.submitted().len(), 1);
    assert_eq!(tracker.state().pending, None);
    assert_eq!(tracker.state().status, Some(AttendanceStatus::OnBreak));
}

#[tokio::test]
async fn test_rejection_resyncs_to_server_truth() {
    let server = FakeAttendanceServer::new(AttendanceStatus::CheckedIn)
        .with_workplaces(&[("4", "Milano Centrale")]);
    let tracker = tracker(&server);
    tracker.mount().await.unwrap();

    // Someone checked out from another device meanwhile
    server.set_status(AttendanceStatus::CheckedOut);
    server.reply_next(Ok(ActionReply {
        success: false,
        message: Some("Non sei in servizio".into()),
    }));

    let err = tracker
        .perform_selected(AttendanceAction::StartBreak)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Non sei in servizio");
    assert_eq!(tracker.state().status, Some(AttendanceStatus::CheckedOut));
    assert_eq!(tracker.state().pending, None);
}

#[tokio::test]
async fn test_failed_resync_keeps_optimistic_state() {
    let server = FakeAttendanceServer::new(AttendanceStatus::CheckedOut)
        .with_workplaces(&[("4", "Milano Centrale")]);
    let tracker = tracker(&server);
    tracker.mount().await.unwrap();

    server.go_offline();
    server.reply_next(Err(ApiError::Status {
        endpoint: "userAttendanceApi.php".into(),
        status: 500,
        body: "<html>".into(),
    }));

    let err = tracker
        .perform_selected(AttendanceAction::Checkin)
        .await
        .unwrap_err();
    assert!(matches!(err, AttendanceError::Transport(_)));
    // Resync failed too, so the optimistic value is all we have
    assert_eq!(tracker.state().status, Some(AttendanceStatus::CheckedIn));
    assert_eq!(tracker.state().pending, None);
}

#[tokio::test]
async fn test_denied_location_never_submits() {
    let server = FakeAttendanceServer::new(AttendanceStatus::CheckedOut)
        .with_workplaces(&[("4", "Milano Centrale")]);
    let geo = Arc::new(StaticLocationProvider::new(false, None));
    let tracker = AttendanceTracker::new(server.clone(), geo, user());
    tracker.mount().await.unwrap();

    let err = tracker
        .perform_selected(AttendanceAction::Checkin)
        .await
        .unwrap_err();
    assert!(matches!(err, AttendanceError::PermissionDenied));
    assert!(server.submitted().is_empty());
    assert_eq!(tracker.state().status, Some(AttendanceStatus::CheckedOut));
    assert_eq!(server.status_calls(), 2);
}

#[tokio::test]
async fn test_teardown_discards_late_status() {
    let server = FakeAttendanceServer::new(AttendanceStatus::OnBreak);
    let tracker = tracker(&server);
    let gate = server.gate_status();

    let refresh = tracker.refresh_status();
    let close = async {
        gate.entered.notified().await;
        tracker.teardown();
        gate.release.notify_one();
    };
    let (status, ()) = tokio::join!(refresh, close);

    assert_eq!(status.unwrap(), AttendanceStatus::OnBreak);
    assert_eq!(tracker.state().status, None);
    assert!(tracker.is_closed());
}

#[tokio::test]
async fn test_teardown_mid_action_discards_resync() {
    let server = FakeAttendanceServer::new(AttendanceStatus::CheckedIn)
        .with_workplaces(&[("4", "Milano Centrale")]);
    let tracker = tracker(&server);
    tracker.mount().await.unwrap();
    let gate = server.gate_actions();

    let action = tracker.perform_selected(AttendanceAction::StartBreak);
    let close = async {
        gate.entered.notified().await;
        tracker.teardown();
        server.set_status(AttendanceStatus::CheckedOut);
        server.reply_next(Ok(ActionReply {
            success: false,
            message: Some("Turno chiuso".into()),
        }));
        gate.release.notify_one();
    };
    let (outcome, ()) = tokio::join!(action, close);

    let err = outcome.unwrap_err();
    assert!(matches!(&err, AttendanceError::Business { message } if message == "Turno chiuso"));
    // The resync ran but its answer was not applied
    assert_eq!(server.status_calls(), 2);
    assert_eq!(tracker.state().status, Some(AttendanceStatus::OnBreak));
    assert_eq!(tracker.state().pending, None);
}

#[tokio::test]
async fn test_dropped_action_releases_pending() {
    let server = FakeAttendanceServer::new(AttendanceStatus::CheckedOut)
        .with_workplaces(&[("4", "Milano Centrale")]);
    let tracker = tracker(&server);
    tracker.mount().await.unwrap();
    let gate = server.gate_actions();

    {
        let action = tracker.perform_selected(AttendanceAction::Checkin);
        tokio::pin!(action);
        tokio::select! {
            _ = &mut action => panic!("action should be parked at the gate"),
            _ = gate.entered.notified() => {}
        }
        assert_eq!(tracker.state().pending, Some(AttendanceAction::Checkin));
    }

    assert_eq!(tracker.state().pending, None);
    // A new action is accepted again
    gate.release.notify_one();
    let outcome = tracker.perform_selected(AttendanceAction::Checkout).await.unwrap();
    assert!(matches!(outcome, ActionOutcome::Confirmed { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_watch_picks_up_remote_changes() {
    let server = FakeAttendanceServer::new(AttendanceStatus::CheckedOut);
    let tracker = tracker(&server);

    let mut seen = Vec::new();
    let remote = server.clone();
    tracker
        .watch(
            Duration::from_secs(30),
            tokio::time::sleep(Duration::from_secs(95)),
            |state| {
                seen.push(state.status);
                remote.set_status(AttendanceStatus::CheckedIn);
            },
        )
        .await;

    assert!(server.status_calls() >= 3);
    assert_eq!(seen.first(), Some(&Some(AttendanceStatus::CheckedOut)));
    assert_eq!(seen.last(), Some(&Some(AttendanceStatus::CheckedIn)));
    assert_eq!(tracker.state().status, Some(AttendanceStatus::CheckedIn));
}

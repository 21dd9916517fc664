//! Tests of the provider in online mode.
//! Note that this uses a second local store to "mock" a server, with a
//! [`MockBehaviour`](pocket_planner::mock_behaviour::MockBehaviour) to inject faults.
#![cfg(feature = "integration_tests")]


use chrono::{NaiveDate, NaiveTime};

use pocket_planner::cache::Cache;
use pocket_planner::event::EventInput;
use pocket_planner::mock_behaviour::MockBehaviour;
use pocket_planner::task::TaskInput;
use pocket_planner::traits::AuthSource;
use pocket_planner::{ConnectionMode, Error, EventQuery, Provider};

#[tokio::test]
async fn the_probe_pins_the_mode_once() {
    use std::sync::{Arc, Mutex};

    let dir = tempfile::tempdir().unwrap();

    let reachable = Cache::new(&dir.path().join("server-up"));
    let provider = Provider::detect(reachable, Cache::new(&dir.path().join("local-1"))).await;
    assert_eq!(provider.mode(), ConnectionMode::Online);

    let behaviour = Arc::new(Mutex::new(MockBehaviour {
        is_reachable: false,
        ..MockBehaviour::default()
    }));
    let mut unreachable = Cache::new(&dir.path().join("server-down"));
    unreachable.set_mock_behaviour(Some(behaviour.clone()));
    let mut provider = Provider::detect(unreachable, Cache::new(&dir.path().join("local-2"))).await;
    assert_eq!(provider.mode(), ConnectionMode::Offline);

    // connectivity coming back does not move the pinned mode by itself
    behaviour.lock().unwrap().is_reachable = true;
    assert_eq!(provider.mode(), ConnectionMode::Offline);

    // only an explicit re-probe does
    assert_eq!(provider.re_probe().await, ConnectionMode::Online);
}

#[tokio::test]
async fn a_remote_session_is_snapshotted_locally() {
    let (_dir, _behaviour, provider) = scenarii::mocked_online_provider_with_session().await;

    // the session side effects: snapshot + token, so reads need no round trip
    let snapshot = provider.local().load_user().unwrap().unwrap();
    assert_eq!(snapshot.email(), "alice@example.com");
    assert!(provider.local().token().is_some());
    assert!(provider.is_authenticated());
    assert_eq!(provider.remote().token(), provider.local().token());
}

#[tokio::test]
async fn online_tasks_live_on_the_remote_source() {
    let (_dir, _behaviour, mut provider) = scenarii::mocked_online_provider_with_session().await;

    let task = provider.create_task(TaskInput::titled("remote work")).await.unwrap();

    // stored by the server, not by the local store
    assert!(provider.local().load_tasks().unwrap().is_empty());
    let tasks = provider.tasks().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id(), task.id());

    provider.delete_task(task.id()).await.unwrap();
    assert!(provider.tasks().await.unwrap().is_empty());
}

#[tokio::test]
async fn remote_faults_surface_as_transport_errors() {
    let (_dir, behaviour, mut provider) = scenarii::mocked_online_provider_with_session().await;

    behaviour.lock().unwrap().create_task_behaviour = (0, 1);

    let err = provider.create_task(TaskInput::titled("flaky")).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));

    // the injected failure is spent, the next call goes through
    provider.create_task(TaskInput::titled("flaky")).await.unwrap();
    assert_eq!(provider.tasks().await.unwrap().len(), 1);
}

#[tokio::test]
async fn statistics_degrade_to_zero_filled_on_failure() {
    let (_dir, behaviour, mut provider) = scenarii::mocked_online_provider_with_session().await;

    provider.create_task(TaskInput::titled("counted")).await.unwrap();
    assert_eq!(provider.task_statistics().await.total, 1);

    behaviour.lock().unwrap().list_tasks_behaviour = (0, 1);
    let stats = provider.task_statistics().await;
    assert_eq!(stats.total, 0);
    assert_eq!(stats.pending, 0);

    behaviour.lock().unwrap().event_statistics_behaviour = (0, 1);
    let stats = provider.event_statistics().await;
    assert_eq!(stats.total, 0);
    assert!(stats.by_type.is_empty());
}

#[tokio::test]
async fn online_event_deletion_is_soft_on_the_server() {
    let (_dir, _behaviour, mut provider) = scenarii::mocked_online_provider_with_session().await;

    let event = provider
        .create_event(EventInput::new(
            "kickoff",
            NaiveDate::from_ymd(2025, 6, 1),
            NaiveTime::from_hms(9, 30, 0),
        ))
        .await
        .unwrap();

    provider.delete_event(event.id()).await.unwrap();
    assert!(provider.events(&EventQuery::All).await.unwrap().is_empty());

    let server_rows = provider.remote().events_including_inactive().unwrap();
    assert_eq!(server_rows.len(), 1);
    assert!(server_rows[0].is_active() == false);
}

#[tokio::test]
async fn login_failures_stay_generic() {
    let (_dir, _behaviour, mut provider) = scenarii::mocked_online_provider_with_session().await;
    provider.logout();

    let err = provider
        .login(pocket_planner::user::Credentials {
            email: "mallory@example.com".to_string(),
            password: "guess".to_string(),
        })
        .await
        .unwrap_err();
    match err {
        Error::Auth(message) => assert_eq!(message, "invalid credentials"),
        other => panic!("expected an auth error, got {:?}", other),
    }
}

//! End-to-end tests of the provider in offline mode: everything is served by the
//! local store, and the remote client is never touched


use chrono::{Duration, NaiveDate, NaiveTime, Utc};

use pocket_planner::event::{EventInput, EventPatch};
use pocket_planner::task::TaskInput;
use pocket_planner::user::Credentials;
use pocket_planner::{ConnectionMode, Error, EventQuery, ItemId};

#[tokio::test]
async fn an_overdue_task_shows_up_in_the_statistics() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (_dir, mut provider) = scenarii::offline_provider_with_session().await;

    let yesterday = Utc::now().date_naive() - Duration::days(1);
    let task = provider
        .create_task(TaskInput {
            title: Some("Write report".to_string()),
            priority: Some("high".to_string()),
            status: Some("pending".to_string()),
            due_date: Some(yesterday),
            ..TaskInput::default()
        })
        .await
        .unwrap();

    let stats = provider.task_statistics().await;
    assert_eq!(stats.total, 1);
    assert_eq!(stats.overdue, 1);
    assert_eq!(stats.priorities.high, 1);

    // finishing the task clears the overdue count and flips the legacy mirror
    provider
        .update_task(task.id(), TaskInput { status: Some("done".to_string()), ..TaskInput::default() })
        .await
        .unwrap();

    let tasks = provider.tasks().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].completed());

    let stats = provider.task_statistics().await;
    assert_eq!(stats.overdue, 0);
    assert_eq!(stats.done, 1);
}

#[tokio::test]
async fn task_creation_is_validated_before_it_reaches_the_store() {
    let (_dir, mut provider) = scenarii::offline_provider_with_session().await;

    let err = provider
        .create_task(TaskInput {
            title: Some("   ".to_string()),
            priority: Some("maximum".to_string()),
            ..TaskInput::default()
        })
        .await
        .unwrap_err();

    match err {
        Error::Validation(errors) => assert_eq!(errors.len(), 2),
        other => panic!("expected a validation error, got {:?}", other),
    }
    assert!(provider.tasks().await.unwrap().is_empty());
}

#[tokio::test]
async fn tasks_read_back_newest_first_and_scoped_to_their_owner() {
    let (_dir, mut provider) = scenarii::offline_provider_with_session().await;

    provider.create_task(TaskInput::titled("first")).await.unwrap();
    provider.create_task(TaskInput::titled("second")).await.unwrap();

    let tasks = provider.tasks().await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title(), "second");
    assert_eq!(tasks[1].title(), "first");

    let owner = provider.current_user().unwrap().id().clone();
    assert!(tasks.iter().all(|task| task.user_id() == Some(&owner)));
}

#[tokio::test]
async fn updating_an_unknown_task_is_a_not_found_error() {
    let (_dir, mut provider) = scenarii::offline_provider_with_session().await;

    let err = provider
        .update_task(&ItemId::from("no-such-task"), TaskInput::titled("whatever"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let err = provider.delete_task(&ItemId::from("no-such-task")).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn date_queries_return_events_in_chronological_order() {
    let (_dir, mut provider) = scenarii::offline_provider_with_session().await;

    let june_first = NaiveDate::from_ymd(2025, 6, 1);
    provider
        .create_event(EventInput::new("late riser", june_first, NaiveTime::from_hms(9, 0, 0)))
        .await
        .unwrap();
    provider
        .create_event(EventInput::new("early bird", june_first, NaiveTime::from_hms(8, 0, 0)))
        .await
        .unwrap();

    let events = provider.events(&EventQuery::On(june_first)).await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].title(), "early bird");
    assert_eq!(events[1].title(), "late riser");
}

#[tokio::test]
async fn a_deleted_event_lingers_inactive_while_a_deleted_task_is_gone() {
    let (_dir, mut provider) = scenarii::offline_provider_with_session().await;

    let task = provider.create_task(TaskInput::titled("doomed")).await.unwrap();
    let event = provider
        .create_event(EventInput::new(
            "doomed too",
            NaiveDate::from_ymd(2025, 6, 1),
            NaiveTime::from_hms(10, 0, 0),
        ))
        .await
        .unwrap();

    provider.delete_task(task.id()).await.unwrap();
    provider.delete_event(event.id()).await.unwrap();

    // neither shows up in default reads
    assert!(provider.tasks().await.unwrap().is_empty());
    assert!(provider.events(&EventQuery::All).await.unwrap().is_empty());

    // but the event row is still there, flagged inactive; the task row is not
    assert!(provider.local().load_tasks().unwrap().is_empty());
    let lingering = provider.local().events_including_inactive().unwrap();
    assert_eq!(lingering.len(), 1);
    assert!(lingering[0].is_active() == false);
}

#[tokio::test]
async fn completing_an_event_stamps_and_clears_completed_at() {
    let (_dir, mut provider) = scenarii::offline_provider_with_session().await;

    let event = provider
        .create_event(EventInput::new(
            "standup",
            NaiveDate::from_ymd(2025, 6, 1),
            NaiveTime::from_hms(9, 0, 0),
        ))
        .await
        .unwrap();

    let done = provider
        .update_event(event.id(), EventPatch { is_completed: Some(true), ..EventPatch::default() })
        .await
        .unwrap();
    assert!(done.is_completed());
    assert!(done.completed_at().is_some());

    let undone = provider
        .update_event(event.id(), EventPatch { is_completed: Some(false), ..EventPatch::default() })
        .await
        .unwrap();
    assert!(undone.is_completed() == false);
    assert!(undone.completed_at().is_none());
}

#[tokio::test]
async fn imported_events_are_appended() {
    let (_dir, mut provider) = scenarii::offline_provider_with_session().await;

    provider
        .create_event(EventInput::new(
            "already there",
            NaiveDate::from_ymd(2025, 6, 1),
            NaiveTime::from_hms(8, 0, 0),
        ))
        .await
        .unwrap();

    let imported = provider
        .import_events(vec![
            EventInput::new("brought in", NaiveDate::from_ymd(2025, 6, 2), NaiveTime::from_hms(9, 0, 0)),
            EventInput::new("brought in too", NaiveDate::from_ymd(2025, 6, 3), NaiveTime::from_hms(9, 0, 0)),
        ])
        .await
        .unwrap();
    assert_eq!(imported.len(), 2);

    let events = provider.events(&EventQuery::All).await.unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].title(), "already there");
}

#[tokio::test]
async fn event_statistics_partition_by_date() {
    let (_dir, mut provider) = scenarii::offline_provider_with_session().await;

    let today = Utc::now().date_naive();
    provider
        .create_event(EventInput::new("now", today, NaiveTime::from_hms(12, 0, 0)))
        .await
        .unwrap();
    provider
        .create_event(EventInput::new("soon", today + Duration::days(3), NaiveTime::from_hms(12, 0, 0)))
        .await
        .unwrap();
    provider
        .create_event(EventInput::new("ago", today - Duration::days(3), NaiveTime::from_hms(12, 0, 0)))
        .await
        .unwrap();

    let stats = provider.event_statistics().await;
    assert_eq!(stats.total, 3);
    assert_eq!(stats.today, 1);
    assert_eq!(stats.upcoming, 1);
    assert_eq!(stats.past, 1);
    assert_eq!(stats.by_type.get("event"), Some(&3));
}

#[tokio::test]
async fn a_session_survives_a_provider_restart() {
    let dir = tempfile::tempdir().unwrap();
    let local_dir = dir.path().join("local");

    {
        let client = pocket_planner::client::Client::new("http://localhost:59999/api").unwrap();
        let cache = pocket_planner::cache::Cache::new(&local_dir);
        let mut provider = pocket_planner::Provider::new(client, cache, ConnectionMode::Offline);
        provider.register(scenarii::alice()).await.unwrap();
        assert!(provider.is_authenticated());
    }

    // a fresh provider over the same store picks the session back up
    let client = pocket_planner::client::Client::new("http://localhost:59999/api").unwrap();
    let cache = pocket_planner::cache::Cache::new(&local_dir);
    let mut provider = pocket_planner::Provider::new(client, cache, ConnectionMode::Offline);
    assert!(provider.is_authenticated());
    assert_eq!(provider.current_user().unwrap().name(), "Alice");

    provider.logout();
    assert!(provider.is_authenticated() == false);

    // the user data is kept for the next login
    let session = provider
        .login(Credentials { email: "alice@example.com".to_string(), password: "whatever".to_string() })
        .await
        .unwrap();
    assert_eq!(session.user.email(), "alice@example.com");
}

#[tokio::test]
async fn account_lifecycle_register_conflict_and_deletion() {
    let (_dir, mut provider) = scenarii::offline_provider_with_session().await;

    let err = provider.register(scenarii::alice()).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    let err = provider.change_password("old", "short").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    provider.change_password("old", "long enough").await.unwrap();

    let err = provider.delete_account("please").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    provider.delete_account("DELETE").await.unwrap();
    assert!(provider.current_user().is_none());
    assert!(provider.is_authenticated() == false);

    // the slot is free again
    provider.register(scenarii::bob()).await.unwrap();
    assert_eq!(provider.current_user().unwrap().name(), "Bob");
}

#[tokio::test]
async fn profile_updates_only_touch_supplied_fields() {
    let (_dir, mut provider) = scenarii::offline_provider_with_session().await;

    let before = provider.profile().await.unwrap();
    assert_eq!(before.timezone(), "Europe/Lisbon");

    let updated = provider
        .update_profile(pocket_planner::user::ProfileUpdate {
            dark_mode: Some(true),
            timezone: Some("Europe/Berlin".to_string()),
            ..pocket_planner::user::ProfileUpdate::default()
        })
        .await
        .unwrap();

    assert!(updated.dark_mode());
    assert_eq!(updated.timezone(), "Europe/Berlin");
    assert_eq!(updated.name(), "Alice");
    assert_eq!(updated.language(), before.language());
}

//! This module provides a local store for planner data
//!
//! Collections are persisted as named JSON buffers under one directory, plus a separate
//! plain-text buffer for the bearer token. Every mutation re-reads the buffer, applies
//! the change, and rewrites the whole buffer. That is only safe because a single logical
//! session drives this store serially; concurrent writers would race.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config;
use crate::error::Error;
use crate::event::{Event, EventInput, EventPatch, EventQuery};
use crate::item::ItemId;
use crate::stats::{self, EventStatistics};
use crate::task::{Task, TaskInput};
use crate::traits::{AuthSource, EventSource, Source, TaskSource};
use crate::user::{Credentials, NewUser, Preferences, ProfileUpdate, Session, User};

#[cfg(feature = "local_store_mocks_remote_server")]
use std::sync::{Arc, Mutex};
#[cfg(feature = "local_store_mocks_remote_server")]
use crate::mock_behaviour::MockBehaviour;

const TASKS_BUFFER: &str = "tasks.json";
const EVENTS_BUFFER: &str = "events.json";
const USER_BUFFER: &str = "user.json";
const PREFERENCES_BUFFER: &str = "preferences.json";
const TOKEN_BUFFER: &str = "token";

/// A data source that stores its records in local files
#[derive(Debug)]
pub struct Cache {
    data_dir: PathBuf,

    #[cfg(feature = "local_store_mocks_remote_server")]
    mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>,
}

impl Cache {
    /// Initialize a store over the given directory.
    /// The directory (and its buffers) are created lazily, on the first write.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: PathBuf::from(data_dir),
            #[cfg(feature = "local_store_mocks_remote_server")]
            mock_behaviour: None,
        }
    }

    #[cfg(feature = "local_store_mocks_remote_server")]
    pub fn set_mock_behaviour(&mut self, mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>) {
        self.mock_behaviour = mock_behaviour;
    }
    #[cfg(feature = "local_store_mocks_remote_server")]
    fn mock_check(&self, check: impl FnOnce(&mut MockBehaviour) -> Result<(), Error>) -> Result<(), Error> {
        match &self.mock_behaviour {
            Some(behaviour) => check(&mut behaviour.lock().unwrap()),
            None => Ok(()),
        }
    }

    fn buffer_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    fn read_buffer<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T, Error> {
        let path = self.buffer_path(name);
        if path.exists() == false {
            return Ok(T::default());
        }
        let file = fs::File::open(&path)
            .map_err(|err| Error::Storage(format!("unable to open {:?}: {}", path, err)))?;
        Ok(serde_json::from_reader(file)?)
    }

    fn write_buffer<T: Serialize>(&self, name: &str, data: &T) -> Result<(), Error> {
        fs::create_dir_all(&self.data_dir)?;
        let path = self.buffer_path(name);
        let file = fs::File::create(&path)
            .map_err(|err| Error::Storage(format!("unable to save {:?}: {}", path, err)))?;
        serde_json::to_writer(file, data)?;
        Ok(())
    }

    fn remove_buffer(&self, name: &str) {
        let path = self.buffer_path(name);
        if path.exists() {
            if let Err(err) = fs::remove_file(&path) {
                log::warn!("Unable to remove buffer {:?}: {}", path, err);
            }
        }
    }

    /// The whole task buffer, unscoped (newest first)
    pub fn load_tasks(&self) -> Result<Vec<Task>, Error> {
        self.read_buffer(TASKS_BUFFER)
    }

    /// The whole event buffer, soft-deleted records included.
    /// Regular reads go through [`EventSource::list_events`]; this is the admin view.
    pub fn events_including_inactive(&self) -> Result<Vec<Event>, Error> {
        self.read_buffer(EVENTS_BUFFER)
    }

    pub fn load_user(&self) -> Result<Option<User>, Error> {
        self.read_buffer(USER_BUFFER)
    }

    pub fn load_preferences(&self) -> Result<Preferences, Error> {
        let preferences: Option<Preferences> = self.read_buffer(PREFERENCES_BUFFER)?;
        Ok(preferences.unwrap_or_default())
    }

    /// Persist the current user snapshot, so that later profile reads need no round trip
    pub fn store_user(&self, user: &User) -> Result<(), Error> {
        self.write_buffer(USER_BUFFER, user)
    }

    pub fn store_preferences(&self, preferences: &Preferences) -> Result<(), Error> {
        self.write_buffer(PREFERENCES_BUFFER, preferences)
    }

    fn store_token(&self, token: Option<&str>) {
        match token {
            None => self.remove_buffer(TOKEN_BUFFER),
            Some(token) => {
                if let Err(err) = fs::create_dir_all(&self.data_dir)
                    .and_then(|_| fs::write(self.buffer_path(TOKEN_BUFFER), token))
                {
                    log::warn!("Unable to save the token buffer: {}", err);
                }
            }
        }
    }

    fn mint_token() -> String {
        uuid::Uuid::new_v4().to_hyphenated().to_string()
    }

    fn active_events(&self, owner: Option<&ItemId>) -> Result<Vec<Event>, Error> {
        let events = self.events_including_inactive()?;
        Ok(events
            .into_iter()
            .filter(|event| event.is_active() && event.user_id() == owner)
            .collect())
    }
}

#[async_trait]
impl TaskSource for Cache {
    async fn list_tasks(&self, owner: Option<&ItemId>) -> Result<Vec<Task>, Error> {
        #[cfg(feature = "local_store_mocks_remote_server")]
        self.mock_check(|mb| mb.can_list_tasks())?;

        let tasks = self.load_tasks()?;
        Ok(tasks.into_iter().filter(|task| task.user_id() == owner).collect())
    }

    async fn create_task(&mut self, input: TaskInput, owner: Option<&ItemId>) -> Result<Task, Error> {
        #[cfg(feature = "local_store_mocks_remote_server")]
        self.mock_check(|mb| mb.can_create_task())?;

        let task = Task::from_input(input, owner.cloned());
        let mut tasks = self.load_tasks()?;
        // prepend, so that the read order is newest-first
        tasks.insert(0, task.clone());
        self.write_buffer(TASKS_BUFFER, &tasks)?;
        Ok(task)
    }

    async fn update_task(&mut self, id: &ItemId, patch: TaskInput, owner: Option<&ItemId>) -> Result<Task, Error> {
        #[cfg(feature = "local_store_mocks_remote_server")]
        self.mock_check(|mb| mb.can_update_task())?;

        let mut tasks = self.load_tasks()?;
        let task = tasks
            .iter_mut()
            .find(|task| task.id() == id && task.user_id() == owner)
            .ok_or_else(|| Error::NotFound("task not found".to_string()))?;
        task.apply(patch);
        let updated = task.clone();
        self.write_buffer(TASKS_BUFFER, &tasks)?;
        Ok(updated)
    }

    async fn delete_task(&mut self, id: &ItemId, owner: Option<&ItemId>) -> Result<(), Error> {
        #[cfg(feature = "local_store_mocks_remote_server")]
        self.mock_check(|mb| mb.can_delete_task())?;

        let mut tasks = self.load_tasks()?;
        let initial_len = tasks.len();
        tasks.retain(|task| (task.id() == id && task.user_id() == owner) == false);
        if tasks.len() == initial_len {
            return Err(Error::NotFound("task not found".to_string()));
        }
        self.write_buffer(TASKS_BUFFER, &tasks)?;
        Ok(())
    }
}

#[async_trait]
impl EventSource for Cache {
    async fn list_events(&self, query: &EventQuery, owner: Option<&ItemId>) -> Result<Vec<Event>, Error> {
        #[cfg(feature = "local_store_mocks_remote_server")]
        self.mock_check(|mb| mb.can_list_events())?;

        let mut events = self.active_events(owner)?;
        match query {
            EventQuery::All => (),
            EventQuery::On(date) => events.retain(|event| event.date() == *date),
            EventQuery::Between(start, end) => {
                events.retain(|event| event.date() >= *start && event.date() <= *end)
            }
        }
        events.sort_by_key(|event| (event.date(), event.time()));
        Ok(events)
    }

    async fn create_event(&mut self, input: EventInput, owner: Option<&ItemId>) -> Result<Event, Error> {
        #[cfg(feature = "local_store_mocks_remote_server")]
        self.mock_check(|mb| mb.can_create_event())?;

        let event = Event::from_input(input, owner.cloned());
        let mut events = self.events_including_inactive()?;
        events.push(event.clone());
        self.write_buffer(EVENTS_BUFFER, &events)?;
        Ok(event)
    }

    async fn update_event(&mut self, id: &ItemId, patch: EventPatch, owner: Option<&ItemId>) -> Result<Event, Error> {
        #[cfg(feature = "local_store_mocks_remote_server")]
        self.mock_check(|mb| mb.can_update_event())?;

        let mut events = self.events_including_inactive()?;
        let event = events
            .iter_mut()
            .find(|event| event.id() == id && event.is_active() && event.user_id() == owner)
            .ok_or_else(|| Error::NotFound("event not found".to_string()))?;
        event.apply(patch);
        let updated = event.clone();
        self.write_buffer(EVENTS_BUFFER, &events)?;
        Ok(updated)
    }

    async fn delete_event(&mut self, id: &ItemId, owner: Option<&ItemId>) -> Result<(), Error> {
        #[cfg(feature = "local_store_mocks_remote_server")]
        self.mock_check(|mb| mb.can_delete_event())?;

        let mut events = self.events_including_inactive()?;
        let event = events
            .iter_mut()
            .find(|event| event.id() == id && event.is_active() && event.user_id() == owner)
            .ok_or_else(|| Error::NotFound("event not found".to_string()))?;
        event.deactivate();
        self.write_buffer(EVENTS_BUFFER, &events)?;
        Ok(())
    }

    async fn import_events(&mut self, inputs: Vec<EventInput>, owner: Option<&ItemId>) -> Result<Vec<Event>, Error> {
        #[cfg(feature = "local_store_mocks_remote_server")]
        self.mock_check(|mb| mb.can_create_event())?;

        let mut events = self.events_including_inactive()?;
        let mut created = Vec::new();
        for input in inputs {
            let event = Event::from_input(input, owner.cloned());
            events.push(event.clone());
            created.push(event);
        }
        self.write_buffer(EVENTS_BUFFER, &events)?;
        Ok(created)
    }

    async fn event_statistics(&self, owner: Option<&ItemId>) -> Result<EventStatistics, Error> {
        #[cfg(feature = "local_store_mocks_remote_server")]
        self.mock_check(|mb| mb.can_event_statistics())?;

        let events = self.active_events(owner)?;
        Ok(stats::event_statistics(&events))
    }
}

#[async_trait]
impl AuthSource for Cache {
    async fn register(&mut self, new_user: &NewUser) -> Result<Session, Error> {
        #[cfg(feature = "local_store_mocks_remote_server")]
        self.mock_check(|mb| mb.can_register())?;

        if let Some(existing) = self.load_user()? {
            if existing.email() == new_user.email.to_lowercase() || existing.name() == new_user.name {
                return Err(Error::Conflict("name or email already exists".to_string()));
            }
        }

        let user = User::from_new(new_user);
        let preferences = Preferences::seeded(
            new_user.country.as_deref().unwrap_or(""),
            new_user.news_country_code.as_deref().unwrap_or(""),
        );
        let token = Self::mint_token();

        self.store_user(&user)?;
        self.store_preferences(&preferences)?;
        self.store_token(Some(&token));

        Ok(Session { token, user })
    }

    async fn login(&mut self, credentials: &Credentials) -> Result<Session, Error> {
        #[cfg(feature = "local_store_mocks_remote_server")]
        self.mock_check(|mb| mb.can_login())?;

        let user = match self.load_user()? {
            None => return Err(Error::Auth("no account registered on this device yet".to_string())),
            Some(user) => user,
        };
        // The local store keeps no password hash, so the email is all it can check
        if user.email() != credentials.email.to_lowercase() {
            return Err(Error::Auth("invalid credentials".to_string()));
        }

        let token = Self::mint_token();
        self.store_token(Some(&token));
        Ok(Session { token, user })
    }

    async fn profile(&self) -> Result<User, Error> {
        let user = self
            .load_user()?
            .ok_or_else(|| Error::NotFound("user not found".to_string()))?;
        let preferences = self.load_preferences()?;
        Ok(user.with_preferences(&preferences))
    }

    async fn update_profile(&mut self, update: ProfileUpdate) -> Result<User, Error> {
        let mut errors = Vec::new();
        if let Some(name) = &update.name {
            if name.trim().chars().count() < 3 {
                errors.push("name must be at least 3 characters".to_string());
            }
        }
        if let Some(email) = &update.email {
            if is_valid_email(email) == false {
                errors.push("invalid email".to_string());
            }
        }
        if errors.is_empty() == false {
            return Err(Error::Validation(errors));
        }

        let mut user = self
            .load_user()?
            .ok_or_else(|| Error::NotFound("user not found".to_string()))?;

        let mut preferences = self.load_preferences()?;
        preferences.apply(&update);

        user.apply(update);
        self.store_user(&user)?;
        self.store_preferences(&preferences)?;
        Ok(user.with_preferences(&preferences))
    }

    async fn change_password(&mut self, current_password: &str, new_password: &str) -> Result<(), Error> {
        if current_password.is_empty() || new_password.is_empty() {
            return Err(Error::Validation(vec![
                "current password and new password are required".to_string(),
            ]));
        }
        if new_password.chars().count() < 6 {
            return Err(Error::Validation(vec![
                "the new password must be at least 6 characters".to_string(),
            ]));
        }
        // There is no local hash to verify the current password against; the check
        // happens on the backend whenever one is reachable
        Ok(())
    }

    async fn delete_account(&mut self, confirmation: &str) -> Result<(), Error> {
        if confirmation != config::DELETE_ACCOUNT_CONFIRMATION {
            return Err(Error::Validation(vec![format!(
                "invalid confirmation. Type \"{}\" to confirm",
                config::DELETE_ACCOUNT_CONFIRMATION
            )]));
        }
        if self.load_user()?.is_none() {
            return Err(Error::NotFound("user not found".to_string()));
        }

        self.remove_buffer(TASKS_BUFFER);
        self.remove_buffer(EVENTS_BUFFER);
        self.remove_buffer(USER_BUFFER);
        self.remove_buffer(PREFERENCES_BUFFER);
        self.remove_buffer(TOKEN_BUFFER);
        Ok(())
    }

    fn set_token(&mut self, token: Option<String>) {
        self.store_token(token.as_deref());
    }

    fn token(&self) -> Option<String> {
        fs::read_to_string(self.buffer_path(TOKEN_BUFFER))
            .ok()
            .filter(|token| token.is_empty() == false)
    }
}

#[async_trait]
impl Source for Cache {
    async fn probe(&self) -> bool {
        #[cfg(feature = "local_store_mocks_remote_server")]
        if let Some(behaviour) = &self.mock_behaviour {
            return behaviour.lock().unwrap().is_reachable;
        }

        true
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(|c| c.is_whitespace()) {
        return false;
    }
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    domain.contains('.') && domain.starts_with('.') == false && domain.ends_with('.') == false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TagsInput;

    fn temp_cache() -> (tempfile::TempDir, Cache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path());
        (dir, cache)
    }

    #[tokio::test]
    async fn created_tasks_read_back_newest_first() {
        let (_dir, mut cache) = temp_cache();

        cache.create_task(TaskInput::titled("first"), None).await.unwrap();
        cache.create_task(TaskInput::titled("second"), None).await.unwrap();

        let tasks = cache.list_tasks(None).await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title(), "second");
        assert_eq!(tasks[1].title(), "first");
    }

    #[tokio::test]
    async fn tasks_survive_a_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut cache = Cache::new(dir.path());
            cache.create_task(TaskInput::titled("durable"), None).await.unwrap();
        }
        let reopened = Cache::new(dir.path());
        let tasks = reopened.list_tasks(None).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title(), "durable");
    }

    #[tokio::test]
    async fn deleting_removes_and_unknown_ids_are_not_found() {
        let (_dir, mut cache) = temp_cache();
        let task = cache.create_task(TaskInput::titled("doomed"), None).await.unwrap();

        cache.delete_task(task.id(), None).await.unwrap();
        assert!(cache.list_tasks(None).await.unwrap().is_empty());

        let err = cache.delete_task(task.id(), None).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let err = cache
            .update_task(&ItemId::from("nope"), TaskInput::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn updates_merge_and_coerce_string_tags() {
        let (_dir, mut cache) = temp_cache();
        let task = cache.create_task(TaskInput::titled("tagged"), None).await.unwrap();

        let patch = TaskInput {
            tags: Some(TagsInput::Text("a, b , a".to_string())),
            ..TaskInput::default()
        };
        let updated = cache.update_task(task.id(), patch, None).await.unwrap();
        assert_eq!(updated.tags(), ["a", "b"]);
        assert_eq!(updated.title(), "tagged");
        assert!(updated.updated_at() >= task.updated_at());
    }

    #[tokio::test]
    async fn reads_are_scoped_to_the_owner() {
        let (_dir, mut cache) = temp_cache();
        let alice = ItemId::from("alice");
        let bob = ItemId::from("bob");
        cache.create_task(TaskInput::titled("hers"), Some(&alice)).await.unwrap();
        cache.create_task(TaskInput::titled("his"), Some(&bob)).await.unwrap();

        let tasks = cache.list_tasks(Some(&alice)).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title(), "hers");

        // neither can an owner touch somebody else's record
        let theirs = cache.list_tasks(Some(&bob)).await.unwrap();
        let err = cache.delete_task(theirs[0].id(), Some(&alice)).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn event_delete_is_soft() {
        use chrono::{NaiveDate, NaiveTime};

        let (_dir, mut cache) = temp_cache();
        let input = EventInput::new(
            "party",
            NaiveDate::from_ymd(2025, 6, 1),
            NaiveTime::from_hms(20, 0, 0),
        );
        let event = cache.create_event(input, None).await.unwrap();

        cache.delete_event(event.id(), None).await.unwrap();

        let visible = cache.list_events(&EventQuery::All, None).await.unwrap();
        assert!(visible.is_empty());

        let all = cache.events_including_inactive().unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].is_active() == false);

        // a second delete cannot find it anymore
        let err = cache.delete_event(event.id(), None).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn event_queries_sort_chronologically() {
        use chrono::{NaiveDate, NaiveTime};

        let (_dir, mut cache) = temp_cache();
        let june_first = NaiveDate::from_ymd(2025, 6, 1);
        cache
            .create_event(EventInput::new("later", june_first, NaiveTime::from_hms(9, 0, 0)), None)
            .await
            .unwrap();
        cache
            .create_event(EventInput::new("sooner", june_first, NaiveTime::from_hms(8, 0, 0)), None)
            .await
            .unwrap();
        cache
            .create_event(
                EventInput::new("elsewhere", NaiveDate::from_ymd(2025, 6, 2), NaiveTime::from_hms(7, 0, 0)),
                None,
            )
            .await
            .unwrap();

        let events = cache.list_events(&EventQuery::On(june_first), None).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title(), "sooner");
        assert_eq!(events[1].title(), "later");

        let ranged = cache
            .list_events(
                &EventQuery::Between(june_first, NaiveDate::from_ymd(2025, 6, 2)),
                None,
            )
            .await
            .unwrap();
        assert_eq!(ranged.len(), 3);
        assert_eq!(ranged[2].title(), "elsewhere");
    }

    #[tokio::test]
    async fn register_login_and_account_deletion() {
        let (_dir, mut cache) = temp_cache();
        let new_user = NewUser {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "correct horse".to_string(),
            country: Some("pt".to_string()),
            country_name: None,
            news_country_code: None,
        };

        let session = cache.register(&new_user).await.unwrap();
        assert_eq!(session.user.email(), "alice@example.com");
        assert_eq!(cache.token(), Some(session.token.clone()));

        // same name or email cannot register again
        let err = cache.register(&new_user).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        let err = cache
            .login(&Credentials { email: "bob@example.com".to_string(), password: "x".to_string() })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(_)));

        let session = cache
            .login(&Credentials { email: "ALICE@example.com".to_string(), password: "anything".to_string() })
            .await
            .unwrap();
        assert_eq!(session.user.name(), "Alice");

        let err = cache.delete_account("delete").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        cache.delete_account(config::DELETE_ACCOUNT_CONFIRMATION).await.unwrap();
        assert!(cache.load_user().unwrap().is_none());
        assert!(cache.token().is_none());
        assert!(cache.load_tasks().unwrap().is_empty());
    }

    #[tokio::test]
    async fn profile_reads_merge_preferences() {
        let (_dir, mut cache) = temp_cache();
        let new_user = NewUser {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "correct horse".to_string(),
            country: Some("br".to_string()),
            country_name: None,
            news_country_code: Some("br".to_string()),
        };
        cache.register(&new_user).await.unwrap();

        let profile = cache.profile().await.unwrap();
        assert_eq!(profile.timezone(), "America/Sao_Paulo");
        assert_eq!(profile.language(), "pt");

        let updated = cache
            .update_profile(ProfileUpdate { dark_mode: Some(true), ..ProfileUpdate::default() })
            .await
            .unwrap();
        assert!(updated.dark_mode());
        assert!(cache.load_preferences().unwrap().dark_mode);

        let err = cache
            .update_profile(ProfileUpdate { name: Some("ab".to_string()), ..ProfileUpdate::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}

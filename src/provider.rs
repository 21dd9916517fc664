//! This module abstracts the two data sources and presents them as a single one
//!
//! A [`Provider`] owns a remote source (usually a [`Client`](crate::client::Client)) and
//! the local [`Cache`](crate::cache::Cache). The backend is probed once, at construction:
//! the resulting [`ConnectionMode`] stays pinned for the session and every operation is
//! routed accordingly. There is no automatic mid-session failover; a caller that wants to
//! re-evaluate connectivity does so explicitly with [`Provider::re_probe`].

use crate::cache::Cache;
use crate::error::Error;
use crate::event::{Event, EventInput, EventPatch, EventQuery};
use crate::item::ItemId;
use crate::stats::{self, EventStatistics, TaskStatistics};
use crate::task::{Task, TaskInput};
use crate::traits::{AuthSource, EventSource, Source, TaskSource};
use crate::user::{Credentials, NewUser, ProfileUpdate, Session, User};
use crate::validation;

/// Which backend a session talks to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionMode {
    /// The REST backend is reachable and handles every operation
    Online,
    /// The backend could not be reached; everything is served by the local store
    Offline,
}

/// A data source that fronts a remote source and the local store, one of which is
/// active for the whole session
pub struct Provider<R: Source> {
    /// The remote source (usually a server)
    remote: R,
    /// The local store
    local: Cache,
    mode: ConnectionMode,
    /// The cached snapshot of whoever is logged in
    current_user: Option<User>,
}

impl<R: Source> Provider<R> {
    /// Create a provider with an explicitly pinned mode.
    ///
    /// A user snapshot and bearer token left over from a previous session are picked up
    /// from the local store, so an authenticated session survives a restart.
    pub fn new(mut remote: R, local: Cache, mode: ConnectionMode) -> Self {
        let current_user = match local.load_user() {
            Ok(user) => user,
            Err(err) => {
                log::warn!("Unable to read the stored user snapshot: {}", err);
                None
            }
        };
        if let Some(token) = local.token() {
            remote.set_token(Some(token));
        }
        Self { remote, local, mode, current_user }
    }

    /// Create a provider, probing the backend once to decide the mode for this session
    pub async fn detect(remote: R, local: Cache) -> Self {
        let mode = if remote.probe().await {
            ConnectionMode::Online
        } else {
            ConnectionMode::Offline
        };
        log::info!("Backend probe done, {:?} mode activated", mode);
        Self::new(remote, local, mode)
    }

    /// Explicitly probe the backend again and re-pin the mode.
    /// This is the only way the mode ever changes within a session
    pub async fn re_probe(&mut self) -> ConnectionMode {
        self.mode = if self.remote.probe().await {
            ConnectionMode::Online
        } else {
            ConnectionMode::Offline
        };
        log::info!("Backend re-probe done, {:?} mode activated", self.mode);
        self.mode
    }

    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }
    /// Returns the data source described as the `remote`
    pub fn remote(&self) -> &R {
        &self.remote
    }
    /// Returns the local store
    pub fn local(&self) -> &Cache {
        &self.local
    }
    /// The snapshot of whoever is logged in
    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }
    pub fn is_authenticated(&self) -> bool {
        self.local.token().is_some()
    }

    fn owner_id(&self) -> Option<ItemId> {
        self.current_user.as_ref().map(|user| user.id().clone())
    }

    //
    // Tasks
    //

    /// All tasks of the current user, newest-created-first
    pub async fn tasks(&self) -> Result<Vec<Task>, Error> {
        let owner = self.owner_id();
        let mut tasks = match self.mode {
            ConnectionMode::Online => self.remote.list_tasks(owner.as_ref()).await?,
            ConnectionMode::Offline => self.local.list_tasks(owner.as_ref()).await?,
        };
        tasks.sort_by(|a, b| b.created_at().cmp(a.created_at()));
        Ok(tasks)
    }

    /// Sanitize and validate the input, then store the task with the active backend.
    /// Validation reports every violated rule at once
    pub async fn create_task(&mut self, input: TaskInput) -> Result<Task, Error> {
        let input = validation::sanitize(input);
        let report = validation::validate(&input);
        if report.valid == false {
            return Err(Error::Validation(report.errors));
        }

        let owner = self.owner_id();
        match self.mode {
            ConnectionMode::Online => self.remote.create_task(input, owner.as_ref()).await,
            ConnectionMode::Offline => self.local.create_task(input, owner.as_ref()).await,
        }
    }

    /// Merge the supplied fields over an existing task.
    /// The patch is only validated when it rewrites the title, since absent fields
    /// keep their stored (already validated) values
    pub async fn update_task(&mut self, id: &ItemId, patch: TaskInput) -> Result<Task, Error> {
        let patch = validation::sanitize_partial(patch);
        if patch.title.is_some() {
            let report = validation::validate(&patch);
            if report.valid == false {
                return Err(Error::Validation(report.errors));
            }
        }

        let owner = self.owner_id();
        match self.mode {
            ConnectionMode::Online => self.remote.update_task(id, patch, owner.as_ref()).await,
            ConnectionMode::Offline => self.local.update_task(id, patch, owner.as_ref()).await,
        }
    }

    /// Remove a task for good (tasks are hard-deleted, unlike events)
    pub async fn delete_task(&mut self, id: &ItemId) -> Result<(), Error> {
        let owner = self.owner_id();
        match self.mode {
            ConnectionMode::Online => self.remote.delete_task(id, owner.as_ref()).await,
            ConnectionMode::Offline => self.local.delete_task(id, owner.as_ref()).await,
        }
    }

    /// Statistics over the current task snapshot.
    /// A failing read degrades to zero-filled statistics instead of propagating
    pub async fn task_statistics(&self) -> TaskStatistics {
        match self.tasks().await {
            Ok(tasks) => stats::task_statistics(&tasks),
            Err(err) => {
                log::warn!("Unable to compute task statistics: {}", err);
                TaskStatistics::default()
            }
        }
    }

    //
    // Events
    //

    /// The current user's active events matching the query, sorted by date then time
    pub async fn events(&self, query: &EventQuery) -> Result<Vec<Event>, Error> {
        let owner = self.owner_id();
        let mut events = match self.mode {
            ConnectionMode::Online => self.remote.list_events(query, owner.as_ref()).await?,
            ConnectionMode::Offline => self.local.list_events(query, owner.as_ref()).await?,
        };
        events.sort_by_key(|event| (event.date(), event.time()));
        Ok(events)
    }

    /// Store a new event. Events are validated by whichever backend stores them
    pub async fn create_event(&mut self, input: EventInput) -> Result<Event, Error> {
        let owner = self.owner_id();
        match self.mode {
            ConnectionMode::Online => self.remote.create_event(input, owner.as_ref()).await,
            ConnectionMode::Offline => self.local.create_event(input, owner.as_ref()).await,
        }
    }

    pub async fn update_event(&mut self, id: &ItemId, patch: EventPatch) -> Result<Event, Error> {
        let owner = self.owner_id();
        match self.mode {
            ConnectionMode::Online => self.remote.update_event(id, patch, owner.as_ref()).await,
            ConnectionMode::Offline => self.local.update_event(id, patch, owner.as_ref()).await,
        }
    }

    /// Delete an event. This reports success to the caller, but the record is merely
    /// flagged inactive by whichever backend holds it
    pub async fn delete_event(&mut self, id: &ItemId) -> Result<(), Error> {
        let owner = self.owner_id();
        match self.mode {
            ConnectionMode::Online => self.remote.delete_event(id, owner.as_ref()).await,
            ConnectionMode::Offline => self.local.delete_event(id, owner.as_ref()).await,
        }
    }

    /// Store a batch of events, e.g. a calendar import
    pub async fn import_events(&mut self, inputs: Vec<EventInput>) -> Result<Vec<Event>, Error> {
        let owner = self.owner_id();
        match self.mode {
            ConnectionMode::Online => self.remote.import_events(inputs, owner.as_ref()).await,
            ConnectionMode::Offline => self.local.import_events(inputs, owner.as_ref()).await,
        }
    }

    /// Statistics over the current event snapshot (computed by the backend in online
    /// mode). A failure degrades to zero-filled statistics instead of propagating
    pub async fn event_statistics(&self) -> EventStatistics {
        let owner = self.owner_id();
        let result = match self.mode {
            ConnectionMode::Online => self.remote.event_statistics(owner.as_ref()).await,
            ConnectionMode::Offline => self.local.event_statistics(owner.as_ref()).await,
        };
        match result {
            Ok(statistics) => statistics,
            Err(err) => {
                log::warn!("Unable to compute event statistics: {}", err);
                EventStatistics::default()
            }
        }
    }

    //
    // Auth
    //

    /// Create an account with the active backend, then persist the session locally
    pub async fn register(&mut self, new_user: NewUser) -> Result<Session, Error> {
        let session = match self.mode {
            ConnectionMode::Online => self.remote.register(&new_user).await?,
            ConnectionMode::Offline => self.local.register(&new_user).await?,
        };
        self.adopt_session(&session);
        Ok(session)
    }

    /// Authenticate with the active backend, then persist the session locally
    pub async fn login(&mut self, credentials: Credentials) -> Result<Session, Error> {
        let session = match self.mode {
            ConnectionMode::Online => self.remote.login(&credentials).await?,
            ConnectionMode::Offline => self.local.login(&credentials).await?,
        };
        self.adopt_session(&session);
        Ok(session)
    }

    /// Drop the session token. The user snapshot is kept around for the next login
    pub fn logout(&mut self) {
        self.local.set_token(None);
        self.remote.set_token(None);
    }

    /// Terminate every session of this user.
    /// Token invalidation beyond this device is the backend's business; locally this is
    /// the same token disposal as [`logout`](Self::logout)
    pub fn logout_all_sessions(&mut self) {
        self.logout();
    }

    /// The profile of the logged-in user
    pub async fn profile(&mut self) -> Result<User, Error> {
        let user = match self.mode {
            ConnectionMode::Online => self.remote.profile().await?,
            ConnectionMode::Offline => self.local.profile().await?,
        };
        self.current_user = Some(user.clone());
        Ok(user)
    }

    /// Merge the supplied fields over the profile, with the active backend.
    /// The local snapshot and preference buffer follow suit so later reads are
    /// consistent without a round trip
    pub async fn update_profile(&mut self, update: ProfileUpdate) -> Result<User, Error> {
        let user = match self.mode {
            ConnectionMode::Online => {
                let user = self.remote.update_profile(update.clone()).await?;
                if let Err(err) = self.local.store_user(&user) {
                    log::warn!("Unable to persist the user snapshot: {}", err);
                }
                match self.local.load_preferences() {
                    Ok(mut preferences) => {
                        preferences.apply(&update);
                        if let Err(err) = self.local.store_preferences(&preferences) {
                            log::warn!("Unable to persist the preferences: {}", err);
                        }
                    }
                    Err(err) => log::warn!("Unable to read the preferences: {}", err),
                }
                user
            }
            ConnectionMode::Offline => self.local.update_profile(update).await?,
        };
        self.current_user = Some(user.clone());
        Ok(user)
    }

    /// Rotate the password. The backend verifies the current password first;
    /// basic input checks happen here so both modes reject garbage alike
    pub async fn change_password(&mut self, current_password: &str, new_password: &str) -> Result<(), Error> {
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

        match self.mode {
            ConnectionMode::Online => self.remote.change_password(current_password, new_password).await,
            ConnectionMode::Offline => self.local.change_password(current_password, new_password).await,
        }
    }

    /// Delete the account. `confirmation` must be the exact expected phrase.
    /// The backend anonymizes the account rather than purging it; the local session
    /// data is cleared either way
    pub async fn delete_account(&mut self, confirmation: &str) -> Result<(), Error> {
        match self.mode {
            ConnectionMode::Online => {
                self.remote.delete_account(confirmation).await?;
                if let Err(err) = self.local.delete_account(confirmation).await {
                    log::debug!("No local session data to clear: {}", err);
                }
            }
            ConnectionMode::Offline => self.local.delete_account(confirmation).await?,
        }
        self.remote.set_token(None);
        self.current_user = None;
        Ok(())
    }

    /// Keep the local snapshot, both tokens, and the in-memory user in step with a
    /// freshly opened session
    fn adopt_session(&mut self, session: &Session) {
        if let Err(err) = self.local.store_user(&session.user) {
            log::warn!("Unable to persist the user snapshot: {}", err);
        }
        self.local.set_token(Some(session.token.clone()));
        self.remote.set_token(Some(session.token.clone()));
        self.current_user = Some(session.user.clone());
    }
}

use async_trait::async_trait;

use crate::error::Error;
use crate::event::{Event, EventInput, EventPatch, EventQuery};
use crate::item::ItemId;
use crate::stats::EventStatistics;
use crate::task::{Task, TaskInput};
use crate::user::{Credentials, NewUser, ProfileUpdate, Session, User};

/// CRUD over the task collection of a data source.
///
/// `owner` scopes every call to the records of one user. The remote backend derives the
/// owner from the bearer token and ignores the parameter; the local store enforces it.
#[async_trait]
pub trait TaskSource {
    /// Returns the owner's tasks, newest-created-first
    async fn list_tasks(&self, owner: Option<&ItemId>) -> Result<Vec<Task>, Error>;
    /// Stores a new task and returns it as this source represents it
    async fn create_task(&mut self, input: TaskInput, owner: Option<&ItemId>) -> Result<Task, Error>;
    /// Merges the supplied fields over an existing task. Fails with NotFound for an
    /// unknown identifier (or one owned by somebody else)
    async fn update_task(&mut self, id: &ItemId, patch: TaskInput, owner: Option<&ItemId>) -> Result<Task, Error>;
    /// Removes a task for good (tasks are hard-deleted)
    async fn delete_task(&mut self, id: &ItemId, owner: Option<&ItemId>) -> Result<(), Error>;
}

/// CRUD over the event collection of a data source
#[async_trait]
pub trait EventSource {
    /// Returns the owner's active events matching the query, sorted by date then time
    async fn list_events(&self, query: &EventQuery, owner: Option<&ItemId>) -> Result<Vec<Event>, Error>;
    async fn create_event(&mut self, input: EventInput, owner: Option<&ItemId>) -> Result<Event, Error>;
    async fn update_event(&mut self, id: &ItemId, patch: EventPatch, owner: Option<&ItemId>) -> Result<Event, Error>;
    /// Soft-deletes an event: the record stays around, flagged inactive
    async fn delete_event(&mut self, id: &ItemId, owner: Option<&ItemId>) -> Result<(), Error>;
    /// Stores a batch of events (a calendar import). Entries that fail are skipped,
    /// the successfully stored ones are returned
    async fn import_events(&mut self, inputs: Vec<EventInput>, owner: Option<&ItemId>) -> Result<Vec<Event>, Error>;
    /// Returns the derived event statistics of this source
    async fn event_statistics(&self, owner: Option<&ItemId>) -> Result<EventStatistics, Error>;
}

/// Account management on a data source
#[async_trait]
pub trait AuthSource {
    /// Creates an account. Fails with Conflict when the name or email is already taken
    async fn register(&mut self, new_user: &NewUser) -> Result<Session, Error>;
    /// Authenticates. Unknown email and wrong password yield the same generic Auth error
    async fn login(&mut self, credentials: &Credentials) -> Result<Session, Error>;
    /// Returns the profile of the authenticated user
    async fn profile(&self) -> Result<User, Error>;
    /// Merges the supplied fields over the authenticated user's profile
    async fn update_profile(&mut self, update: ProfileUpdate) -> Result<User, Error>;
    /// Rotates the password after verifying the current one
    async fn change_password(&mut self, current_password: &str, new_password: &str) -> Result<(), Error>;
    /// Deletes the account. `confirmation` must match the exact expected phrase
    async fn delete_account(&mut self, confirmation: &str) -> Result<(), Error>;
    /// Arms (or clears) the bearer token this source authenticates with
    fn set_token(&mut self, token: Option<String>);
    /// The token currently armed, if any
    fn token(&self) -> Option<String>;
}

/// The full contract a data source fulfills, plus the reachability probe the provider
/// runs once at startup to pick its mode
#[async_trait]
pub trait Source: TaskSource + EventSource + AuthSource + Send {
    /// Report whether this source can currently be reached.
    /// The local store always can; the remote client answers by probing the server
    async fn probe(&self) -> bool;
}

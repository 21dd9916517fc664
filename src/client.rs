//! This module provides a client to connect to the planner's REST backend

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::config;
use crate::error::Error;
use crate::event::{Event, EventInput, EventPatch, EventQuery};
use crate::item::ItemId;
use crate::resource::Resource;
use crate::stats::EventStatistics;
use crate::task::{Task, TaskInput};
use crate::traits::{AuthSource, EventSource, Source, TaskSource};
use crate::user::{Credentials, NewUser, ProfileUpdate, Session, User};

/// A data source that talks to the REST backend.
///
/// Success replies are unwrapped from their envelopes; error replies are turned into the
/// matching [`Error`] kind from their status and `{message, error?}` envelope.
pub struct Client {
    resource: Resource,
    http: reqwest::Client,
}

/// The `{message, error?}` envelope every backend error reply carries
#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct EventsEnvelope {
    events: Vec<Event>,
}
#[derive(Deserialize)]
struct EventEnvelope {
    event: Event,
}
#[derive(Deserialize)]
struct UserEnvelope {
    user: User,
}
#[derive(Deserialize)]
struct StatsEnvelope {
    stats: EventStatistics,
}
#[derive(Deserialize)]
struct MessageEnvelope {
    #[serde(default)]
    #[allow(dead_code)]
    message: String,
}

impl Client {
    /// Create a client against the given base API URL. This does not start a connection
    pub fn new<S: AsRef<str>>(base_url: S) -> Result<Self, Error> {
        let url = Url::parse(base_url.as_ref())
            .map_err(|err| Error::Transport(format!("invalid backend URL: {}", err)))?;
        Ok(Self {
            resource: Resource::new(url),
            http: reqwest::Client::new(),
        })
    }

    /// Create a client against the configured [`API_BASE_URL`](crate::config::API_BASE_URL)
    pub fn from_config() -> Result<Self, Error> {
        let base_url = config::API_BASE_URL.lock().unwrap().clone();
        Self::new(base_url)
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<T, Error> {
        let mut builder = self.http.request(method, self.resource.route(path));
        if query.is_empty() == false {
            builder = builder.query(query);
        }
        if let Some(token) = self.resource.token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() == false {
            let envelope: ErrorEnvelope = response.json().await.unwrap_or_default();
            if let Some(detail) = &envelope.error {
                log::debug!("Backend error detail: {}", detail);
            }
            let message = if envelope.message.is_empty() {
                format!("the server answered with status {}", status)
            } else {
                envelope.message
            };
            return Err(Error::from_status(status, message));
        }

        Ok(response.json().await?)
    }

    fn to_body<B: serde::Serialize>(body: &B) -> Result<serde_json::Value, Error> {
        serde_json::to_value(body).map_err(Error::from)
    }
}

#[async_trait]
impl TaskSource for Client {
    async fn list_tasks(&self, _owner: Option<&ItemId>) -> Result<Vec<Task>, Error> {
        // the backend scopes by the bearer token, and answers a bare array, newest first
        self.request(Method::GET, "/tasks", &[], None).await
    }

    async fn create_task(&mut self, input: TaskInput, _owner: Option<&ItemId>) -> Result<Task, Error> {
        self.request(Method::POST, "/tasks", &[], Some(Self::to_body(&input)?)).await
    }

    async fn update_task(&mut self, id: &ItemId, patch: TaskInput, _owner: Option<&ItemId>) -> Result<Task, Error> {
        self.request(Method::PUT, &format!("/tasks/{}", id), &[], Some(Self::to_body(&patch)?)).await
    }

    async fn delete_task(&mut self, id: &ItemId, _owner: Option<&ItemId>) -> Result<(), Error> {
        let _: MessageEnvelope = self.request(Method::DELETE, &format!("/tasks/{}", id), &[], None).await?;
        Ok(())
    }
}

#[async_trait]
impl EventSource for Client {
    async fn list_events(&self, query: &EventQuery, _owner: Option<&ItemId>) -> Result<Vec<Event>, Error> {
        let params: Vec<(&str, String)> = match query {
            EventQuery::All => Vec::new(),
            EventQuery::On(date) => vec![("date", date.to_string())],
            EventQuery::Between(start, end) => vec![
                ("startDate", start.to_string()),
                ("endDate", end.to_string()),
            ],
        };
        let envelope: EventsEnvelope = self.request(Method::GET, "/events", &params, None).await?;
        Ok(envelope.events)
    }

    async fn create_event(&mut self, input: EventInput, _owner: Option<&ItemId>) -> Result<Event, Error> {
        let envelope: EventEnvelope = self
            .request(Method::POST, "/events", &[], Some(Self::to_body(&input)?))
            .await?;
        Ok(envelope.event)
    }

    async fn update_event(&mut self, id: &ItemId, patch: EventPatch, _owner: Option<&ItemId>) -> Result<Event, Error> {
        let envelope: EventEnvelope = self
            .request(Method::PUT, &format!("/events/{}", id), &[], Some(Self::to_body(&patch)?))
            .await?;
        Ok(envelope.event)
    }

    async fn delete_event(&mut self, id: &ItemId, _owner: Option<&ItemId>) -> Result<(), Error> {
        let _: MessageEnvelope = self.request(Method::DELETE, &format!("/events/{}", id), &[], None).await?;
        Ok(())
    }

    async fn import_events(&mut self, inputs: Vec<EventInput>, _owner: Option<&ItemId>) -> Result<Vec<Event>, Error> {
        let body = json!({ "events": inputs });
        let envelope: EventsEnvelope = self.request(Method::POST, "/events/bulk", &[], Some(body)).await?;
        Ok(envelope.events)
    }

    async fn event_statistics(&self, _owner: Option<&ItemId>) -> Result<EventStatistics, Error> {
        let envelope: StatsEnvelope = self.request(Method::GET, "/events/stats", &[], None).await?;
        Ok(envelope.stats)
    }
}

#[async_trait]
impl AuthSource for Client {
    async fn register(&mut self, new_user: &NewUser) -> Result<Session, Error> {
        let result: Result<Session, Error> = self
            .request(Method::POST, "/auth/register", &[], Some(Self::to_body(new_user)?))
            .await;
        match result {
            // this route answers 400 exactly when the name or email is taken
            Err(Error::Validation(errors)) => Err(Error::Conflict(errors.join(", "))),
            other => other,
        }
    }

    async fn login(&mut self, credentials: &Credentials) -> Result<Session, Error> {
        self.request(Method::POST, "/auth/login", &[], Some(Self::to_body(credentials)?)).await
    }

    async fn profile(&self) -> Result<User, Error> {
        let envelope: UserEnvelope = self.request(Method::GET, "/auth/profile", &[], None).await?;
        Ok(envelope.user)
    }

    async fn update_profile(&mut self, update: ProfileUpdate) -> Result<User, Error> {
        let envelope: UserEnvelope = self
            .request(Method::PUT, "/auth/profile", &[], Some(Self::to_body(&update)?))
            .await?;
        Ok(envelope.user)
    }

    async fn change_password(&mut self, current_password: &str, new_password: &str) -> Result<(), Error> {
        let body = json!({
            "currentPassword": current_password,
            "newPassword": new_password,
        });
        let _: MessageEnvelope = self.request(Method::PUT, "/auth/change-password", &[], Some(body)).await?;
        Ok(())
    }

    async fn delete_account(&mut self, confirmation: &str) -> Result<(), Error> {
        let body = json!({ "confirmation": confirmation });
        let _: MessageEnvelope = self.request(Method::DELETE, "/auth/profile", &[], Some(body)).await?;
        Ok(())
    }

    fn set_token(&mut self, token: Option<String>) {
        self.resource.set_token(token);
    }

    fn token(&self) -> Option<String> {
        self.resource.token().map(|token| token.to_string())
    }
}

#[async_trait]
impl Source for Client {
    /// Ping the server origin, with a short timeout, to decide whether online mode is viable
    async fn probe(&self) -> bool {
        let request = self.http.get(self.resource.origin()).timeout(config::PROBE_TIMEOUT);
        match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                log::debug!("Backend probe failed: {}", err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelopes_unwrap() {
        let envelope: EventsEnvelope = serde_json::from_str(
            r#"{"message": "ok", "events": [], "count": 0}"#,
        )
        .unwrap();
        assert!(envelope.events.is_empty());

        let envelope: ErrorEnvelope =
            serde_json::from_str(r#"{"message": "task not found"}"#).unwrap();
        assert_eq!(envelope.message, "task not found");
        assert!(envelope.error.is_none());

        let session: Session = serde_json::from_str(
            r#"{
                "message": "welcome",
                "token": "jwt-goes-here",
                "user": {
                    "_id": "u1",
                    "name": "Alice",
                    "email": "alice@example.com",
                    "createdAt": "2025-05-01T10:00:00Z",
                    "updatedAt": "2025-05-01T10:00:00Z"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(session.token, "jwt-goes-here");
        assert_eq!(session.user.name(), "Alice");
    }
}

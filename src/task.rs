//! To-do tasks

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::item::ItemId;

/// How important a task is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}
impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}
impl Priority {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "urgent" => Some(Priority::Urgent),
            _ => None,
        }
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

/// Where a task stands in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "done")]
    Done,
}
impl Default for Status {
    fn default() -> Self {
        Status::Pending
    }
}
impl Status {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "pending" => Some(Status::Pending),
            "in-progress" => Some(Status::InProgress),
            "done" => Some(Status::Done),
            _ => None,
        }
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }
}

/// The life domain a task belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Personal,
    Work,
    Study,
    Health,
    Finance,
}
impl Default for Category {
    fn default() -> Self {
        Category::Personal
    }
}
impl Category {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "personal" => Some(Category::Personal),
            "work" => Some(Category::Work),
            "study" => Some(Category::Study),
            "health" => Some(Category::Health),
            "finance" => Some(Category::Finance),
            _ => None,
        }
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Personal => "personal",
            Category::Work => "work",
            Category::Study => "study",
            Category::Health => "health",
            Category::Finance => "finance",
        }
    }
}

/// How often a recurrent task repeats.
/// This is descriptive metadata only: no future instances are ever generated from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurringKind {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}
impl RecurringKind {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "daily" => Some(RecurringKind::Daily),
            "weekly" => Some(RecurringKind::Weekly),
            "monthly" => Some(RecurringKind::Monthly),
            "yearly" => Some(RecurringKind::Yearly),
            _ => None,
        }
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurringKind::Daily => "daily",
            RecurringKind::Weekly => "weekly",
            RecurringKind::Monthly => "monthly",
            RecurringKind::Yearly => "yearly",
        }
    }
}

/// A rough estimate of how long a task will take
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstimatedDuration {
    #[serde(rename = "15min")]
    Min15,
    #[serde(rename = "30min")]
    Min30,
    #[serde(rename = "1h")]
    Hours1,
    #[serde(rename = "2h")]
    Hours2,
    #[serde(rename = "4h")]
    Hours4,
    #[serde(rename = "8h")]
    Hours8,
    #[serde(rename = "1d+")]
    DaysPlus,
}
impl EstimatedDuration {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "15min" => Some(EstimatedDuration::Min15),
            "30min" => Some(EstimatedDuration::Min30),
            "1h" => Some(EstimatedDuration::Hours1),
            "2h" => Some(EstimatedDuration::Hours2),
            "4h" => Some(EstimatedDuration::Hours4),
            "8h" => Some(EstimatedDuration::Hours8),
            "1d+" => Some(EstimatedDuration::DaysPlus),
            _ => None,
        }
    }

    /// The minute value this estimate counts for in averages.
    /// `1d+` counts as a working day (8h), like the service this crate talks to.
    pub fn minutes(&self) -> u32 {
        match self {
            EstimatedDuration::Min15 => 15,
            EstimatedDuration::Min30 => 30,
            EstimatedDuration::Hours1 => 60,
            EstimatedDuration::Hours2 => 120,
            EstimatedDuration::Hours4 => 240,
            EstimatedDuration::Hours8 => 480,
            EstimatedDuration::DaysPlus => 480,
        }
    }
}

/// A to-do task, as represented by either data source
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    id: ItemId,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    due_date: Option<NaiveDate>,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    status: Status,
    #[serde(default)]
    category: Category,
    #[serde(default)]
    is_recurrent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recurring_type: Option<RecurringKind>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    estimated_duration: Option<EstimatedDuration>,
    /// Legacy field older consumers still read. Invariant: `completed == (status == Done)`,
    /// re-derived after every create and every update.
    #[serde(default)]
    completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<ItemId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    /// Materialize a brand new task from caller input, filling every absent field with
    /// its default. The caller is expected to have sanitized and validated `input` already.
    pub fn from_input(input: TaskInput, user_id: Option<ItemId>) -> Self {
        let now = Utc::now();
        let status = input.status.as_deref().and_then(Status::parse).unwrap_or_default();
        Self {
            id: ItemId::generate(),
            title: input.title.unwrap_or_default(),
            description: input.description.unwrap_or_default(),
            start_date: input.start_date,
            due_date: input.due_date,
            priority: input.priority.as_deref().and_then(Priority::parse).unwrap_or_default(),
            status,
            category: input.category.as_deref().and_then(Category::parse).unwrap_or_default(),
            is_recurrent: input.is_recurrent.unwrap_or(false),
            recurring_type: input.recurring_type.as_deref().and_then(RecurringKind::parse),
            tags: input.tags.map(|t| t.into_list()).unwrap_or_default(),
            estimated_duration: input.estimated_duration.as_deref().and_then(EstimatedDuration::parse),
            completed: status == Status::Done,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge the supplied fields of a partial update over this task.
    /// Omitted fields keep their values; `updated_at` is re-stamped and the legacy
    /// `completed` mirror is re-derived no matter which side of it the caller set.
    pub fn apply(&mut self, patch: TaskInput) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = Some(start_date);
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(priority) = patch.priority.as_deref().and_then(Priority::parse) {
            self.priority = priority;
        }
        let patched_status = patch.status.as_deref().and_then(Status::parse);
        if let Some(status) = patched_status {
            self.status = status;
        }
        if let Some(category) = patch.category.as_deref().and_then(Category::parse) {
            self.category = category;
        }
        if let Some(is_recurrent) = patch.is_recurrent {
            self.is_recurrent = is_recurrent;
        }
        if let Some(kind) = patch.recurring_type.as_deref().and_then(RecurringKind::parse) {
            self.recurring_type = Some(kind);
        }
        if let Some(tags) = patch.tags {
            self.tags = tags.into_list();
        }
        if let Some(duration) = patch.estimated_duration.as_deref().and_then(EstimatedDuration::parse) {
            self.estimated_duration = Some(duration);
        }

        // The legacy boolean may drive the status, like the original schema middleware did:
        // marking completed means Done, unmarking falls back to Pending unless the same
        // call supplied an explicit non-Done status.
        if let Some(completed) = patch.completed {
            if completed {
                self.status = Status::Done;
            } else if patched_status.is_none() || patched_status == Some(Status::Done) {
                self.status = Status::Pending;
            }
        }

        self.completed = self.status == Status::Done;
        self.updated_at = Utc::now();
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }
    pub fn title(&self) -> &str {
        &self.title
    }
    pub fn description(&self) -> &str {
        &self.description
    }
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }
    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }
    pub fn priority(&self) -> Priority {
        self.priority
    }
    pub fn status(&self) -> Status {
        self.status
    }
    pub fn category(&self) -> Category {
        self.category
    }
    pub fn is_recurrent(&self) -> bool {
        self.is_recurrent
    }
    pub fn recurring_type(&self) -> Option<RecurringKind> {
        self.recurring_type
    }
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
    pub fn estimated_duration(&self) -> Option<EstimatedDuration> {
        self.estimated_duration
    }
    pub fn completed(&self) -> bool {
        self.completed
    }
    pub fn user_id(&self) -> Option<&ItemId> {
        self.user_id.as_ref()
    }
    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }
    pub fn updated_at(&self) -> &DateTime<Utc> {
        &self.updated_at
    }
}

/// The all-optional record shape accepted by task create and update calls.
///
/// This is the form boundary: enum-valued fields are raw strings here, checked by the
/// [`validation`](crate::validation) module and only parsed into typed values once a
/// [`Task`] is materialized. Fields left `None` are omitted from serialized requests,
/// which is what makes partial updates partial.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_recurrent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagsInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskInput {
    /// A minimal input with just a title, the common case in tests and quick captures
    pub fn titled<S: ToString>(title: S) -> Self {
        Self { title: Some(title.to_string()), ..Self::default() }
    }
}

/// Tags as submitted by a caller: either an actual list, or the raw comma-separated
/// text of a form input
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Text(String),
}

impl TagsInput {
    /// Coerce into a deduplicated, order-preserving list of trimmed, non-empty tags
    pub fn into_list(self) -> Vec<String> {
        let raw = match self {
            TagsInput::List(tags) => tags,
            TagsInput::Text(text) => text.split(',').map(|t| t.to_string()).collect(),
        };
        let mut tags = Vec::new();
        for tag in raw {
            let tag = tag.trim();
            if tag.is_empty() {
                continue;
            }
            if tags.iter().any(|existing| existing == tag) == false {
                tags.push(tag.to_string());
            }
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_mirrors_status_on_create() {
        let mut input = TaskInput::titled("write report");
        input.status = Some("done".to_string());
        // the legacy boolean is ignored on create, the status wins
        input.completed = Some(false);
        let task = Task::from_input(input, None);
        assert_eq!(task.status(), Status::Done);
        assert!(task.completed());

        let task = Task::from_input(TaskInput::titled("plain"), None);
        assert_eq!(task.status(), Status::Pending);
        assert!(task.completed() == false);
    }

    #[test]
    fn completed_patch_drives_status() {
        let mut task = Task::from_input(TaskInput::titled("write report"), None);

        task.apply(TaskInput { completed: Some(true), ..TaskInput::default() });
        assert_eq!(task.status(), Status::Done);
        assert!(task.completed());

        // unmarking without a status falls back to pending
        task.apply(TaskInput { completed: Some(false), ..TaskInput::default() });
        assert_eq!(task.status(), Status::Pending);
        assert!(task.completed() == false);

        // unmarking with an explicit non-done status keeps that status
        task.apply(TaskInput {
            completed: Some(false),
            status: Some("in-progress".to_string()),
            ..TaskInput::default()
        });
        assert_eq!(task.status(), Status::InProgress);
        assert!(task.completed() == false);
    }

    #[test]
    fn status_patch_refreshes_mirror() {
        let mut task = Task::from_input(TaskInput::titled("write report"), None);
        task.apply(TaskInput { status: Some("done".to_string()), ..TaskInput::default() });
        assert!(task.completed());
        task.apply(TaskInput { status: Some("pending".to_string()), ..TaskInput::default() });
        assert!(task.completed() == false);
    }

    #[test]
    fn omitted_fields_keep_their_values() {
        let mut input = TaskInput::titled("write report");
        input.priority = Some("urgent".to_string());
        input.category = Some("work".to_string());
        let mut task = Task::from_input(input, None);

        task.apply(TaskInput { status: Some("in-progress".to_string()), ..TaskInput::default() });
        assert_eq!(task.priority(), Priority::Urgent);
        assert_eq!(task.category(), Category::Work);
        assert_eq!(task.title(), "write report");
    }

    #[test]
    fn tags_coercion_dedups_and_trims() {
        let tags = TagsInput::Text("home, errands , home,, urgent".to_string());
        assert_eq!(tags.into_list(), vec!["home", "errands", "urgent"]);

        let tags = TagsInput::List(vec![" a ".to_string(), "a".to_string(), "".to_string(), "b".to_string()]);
        assert_eq!(tags.into_list(), vec!["a", "b"]);
    }

    #[test]
    fn wire_format_uses_backend_names() {
        let task = Task::from_input(TaskInput::titled("x"), Some(ItemId::from("u1")));
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("_id").is_some());
        assert_eq!(json["status"], "pending");
        assert_eq!(json["userId"], "u1");
        assert!(json.get("createdAt").is_some());
    }
}

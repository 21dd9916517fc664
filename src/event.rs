//! Calendar events

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use csscolorparser::Color;
use serde::{Deserialize, Serialize};

use crate::item::ItemId;
use crate::task::RecurringKind;

/// What kind of entry an event is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Event,
    Meeting,
    Task,
    Reminder,
    Presentation,
    Appointment,
    Birthday,
    Holiday,
}
impl Default for EventType {
    fn default() -> Self {
        EventType::Event
    }
}
impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Event => "event",
            EventType::Meeting => "meeting",
            EventType::Task => "task",
            EventType::Reminder => "reminder",
            EventType::Presentation => "presentation",
            EventType::Appointment => "appointment",
            EventType::Birthday => "birthday",
            EventType::Holiday => "holiday",
        }
    }
}

/// Event priorities are a narrower scale than task priorities
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventPriority {
    Low,
    Medium,
    High,
}
impl Default for EventPriority {
    fn default() -> Self {
        EventPriority::Medium
    }
}
impl EventPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventPriority::Low => "low",
            EventPriority::Medium => "medium",
            EventPriority::High => "high",
        }
    }
}

/// Somebody expected at an event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub name: String,
    pub email: String,
}

/// The color an event defaults to when the caller picks none
pub fn default_color() -> Color {
    csscolorparser::parse("#007bff").expect("cannot parse the default event color")
}

/// Which events a read should return
pub enum EventQuery {
    /// Every active event
    All,
    /// Events on this exact date
    On(NaiveDate),
    /// Events within this inclusive date range
    Between(NaiveDate, NaiveDate),
}

impl Default for EventQuery {
    fn default() -> Self {
        EventQuery::All
    }
}

/// A calendar event, as represented by either data source
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id")]
    id: ItemId,
    title: String,
    #[serde(default)]
    description: String,
    date: NaiveDate,
    #[serde(with = "hhmm")]
    time: NaiveTime,
    #[serde(rename = "type", default)]
    event_type: EventType,
    #[serde(default)]
    priority: EventPriority,
    #[serde(default)]
    is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recurring_type: Option<RecurringKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recurring_end_date: Option<NaiveDate>,
    #[serde(default)]
    location: String,
    #[serde(default)]
    attendees: Vec<Attendee>,
    /// `completed_at` is set exactly when this flips to true, and cleared when it flips back
    #[serde(default)]
    is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default = "default_color")]
    color: Color,
    #[serde(default)]
    is_all_day: bool,
    #[serde(default, with = "hhmm_opt", skip_serializing_if = "Option::is_none")]
    end_time: Option<NaiveTime>,
    #[serde(default = "default_notification_minutes")]
    notification_minutes: u32,
    /// Soft-delete flag: deleting an event clears this rather than removing the record
    #[serde(default = "default_true")]
    is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<ItemId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn default_notification_minutes() -> u32 {
    15
}
fn default_true() -> bool {
    true
}

impl Event {
    /// Materialize a brand new event from caller input, filling absent fields with defaults
    pub fn from_input(input: EventInput, user_id: Option<ItemId>) -> Self {
        let now = Utc::now();
        Self {
            id: ItemId::generate(),
            title: input.title,
            description: input.description.unwrap_or_default(),
            date: input.date,
            time: input.time,
            event_type: input.event_type.unwrap_or_default(),
            priority: input.priority.unwrap_or_default(),
            is_recurring: input.is_recurring.unwrap_or(false),
            recurring_type: input.recurring_type,
            recurring_end_date: input.recurring_end_date,
            location: input.location.unwrap_or_default(),
            attendees: input.attendees.unwrap_or_default(),
            is_completed: false,
            completed_at: None,
            tags: input.tags.unwrap_or_default(),
            color: input.color.unwrap_or_else(default_color),
            is_all_day: input.is_all_day.unwrap_or(false),
            end_time: input.end_time,
            notification_minutes: input.notification_minutes.unwrap_or(15),
            is_active: true,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge the supplied fields of a partial update over this event.
    /// Omitted fields keep their values; `updated_at` is re-stamped, and the
    /// `completed_at` timestamp follows the `is_completed` transitions.
    pub fn apply(&mut self, patch: EventPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(time) = patch.time {
            self.time = time;
        }
        if let Some(event_type) = patch.event_type {
            self.event_type = event_type;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(is_recurring) = patch.is_recurring {
            self.is_recurring = is_recurring;
        }
        if let Some(kind) = patch.recurring_type {
            self.recurring_type = Some(kind);
        }
        if let Some(end_date) = patch.recurring_end_date {
            self.recurring_end_date = Some(end_date);
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(attendees) = patch.attendees {
            self.attendees = attendees;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(is_all_day) = patch.is_all_day {
            self.is_all_day = is_all_day;
        }
        if let Some(end_time) = patch.end_time {
            self.end_time = Some(end_time);
        }
        if let Some(minutes) = patch.notification_minutes {
            self.notification_minutes = minutes;
        }
        if let Some(is_completed) = patch.is_completed {
            if is_completed && self.is_completed == false {
                self.completed_at = Some(Utc::now());
            }
            if is_completed == false {
                self.completed_at = None;
            }
            self.is_completed = is_completed;
        }
        self.updated_at = Utc::now();
    }

    /// Soft-delete this event
    pub fn deactivate(&mut self) {
        self.is_active = false;
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
    pub fn date(&self) -> NaiveDate {
        self.date
    }
    pub fn time(&self) -> NaiveTime {
        self.time
    }
    pub fn event_type(&self) -> EventType {
        self.event_type
    }
    pub fn priority(&self) -> EventPriority {
        self.priority
    }
    pub fn is_recurring(&self) -> bool {
        self.is_recurring
    }
    pub fn recurring_type(&self) -> Option<RecurringKind> {
        self.recurring_type
    }
    pub fn recurring_end_date(&self) -> Option<NaiveDate> {
        self.recurring_end_date
    }
    pub fn location(&self) -> &str {
        &self.location
    }
    pub fn attendees(&self) -> &[Attendee] {
        &self.attendees
    }
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }
    pub fn completed_at(&self) -> Option<&DateTime<Utc>> {
        self.completed_at.as_ref()
    }
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
    pub fn color(&self) -> &Color {
        &self.color
    }
    pub fn is_all_day(&self) -> bool {
        self.is_all_day
    }
    pub fn end_time(&self) -> Option<NaiveTime> {
        self.end_time
    }
    pub fn notification_minutes(&self) -> u32 {
        self.notification_minutes
    }
    pub fn is_active(&self) -> bool {
        self.is_active
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

/// What a caller must (and may) supply to create an event.
/// Unlike tasks, events are validated by whichever backend stores them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub title: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<EventPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_recurring: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_type: Option<RecurringKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<Attendee>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_all_day: Option<bool>,
    #[serde(default, with = "hhmm_opt", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_minutes: Option<u32>,
}

impl EventInput {
    /// An input with the three required fields and nothing else
    pub fn new<S: ToString>(title: S, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            title: title.to_string(),
            date,
            time,
            description: None,
            event_type: None,
            priority: None,
            is_recurring: None,
            recurring_type: None,
            recurring_end_date: None,
            location: None,
            attendees: None,
            tags: None,
            color: None,
            is_all_day: None,
            end_time: None,
            notification_minutes: None,
        }
    }
}

/// A partial update to an event: only supplied fields change
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(with = "hhmm_opt", skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<EventPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_recurring: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_type: Option<RecurringKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<Attendee>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_all_day: Option<bool>,
    #[serde(with = "hhmm_opt", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

/// Serde support for the backend's `HH:MM` time format
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&text, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Serde support for optional `HH:MM` times
mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(time) => serializer.serialize_str(&time.format(super::hhmm::FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text: Option<String> = Option::deserialize(deserializer)?;
        match text {
            None => Ok(None),
            Some(text) => NaiveTime::parse_from_str(&text, super::hhmm::FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

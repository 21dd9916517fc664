//! Derived statistics over task and event snapshots.
//!
//! Everything here is a pure function over an in-memory snapshot: no I/O, no clock
//! dependency beyond the `today` parameter of the `_at` variants (the plain variants
//! fill it in with the current date).

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::task::{Category, EstimatedDuration, Priority, Status, Task};

/// How many tags the top-tags ranking keeps by default
pub const TOP_TAGS_LIMIT: usize = 5;

/// Per-priority task counts, zero-filled
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriorityCounts {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
    pub urgent: u32,
}

/// Per-category task counts, zero-filled
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub personal: u32,
    pub work: u32,
    pub study: u32,
    pub health: u32,
    pub finance: u32,
}

/// One entry of the top-tags ranking
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u32,
}

/// Everything [`task_statistics`] derives from a task snapshot
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskStatistics {
    pub total: u32,
    pub pending: u32,
    pub in_progress: u32,
    pub done: u32,
    /// Tasks whose due date is past and that are not done yet
    pub overdue: u32,
    pub priorities: PriorityCounts,
    pub categories: CategoryCounts,
    pub recurrent: u32,
    pub top_tags: Vec<TagCount>,
    /// Human-readable mean of the recognized duration estimates, `None` when nothing qualifies
    pub average_estimated_duration: Option<String>,
}

/// Everything [`event_statistics`] derives from an event snapshot.
/// This is also the shape the remote `/events/stats` route answers with.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventStatistics {
    pub total: u32,
    pub today: u32,
    pub upcoming: u32,
    pub past: u32,
    pub by_type: BTreeMap<String, u32>,
    pub by_priority: BTreeMap<String, u32>,
}

/// Derive task statistics from a snapshot, relative to the current date
pub fn task_statistics(tasks: &[Task]) -> TaskStatistics {
    task_statistics_at(tasks, Utc::now().date_naive())
}

/// Derive task statistics from a snapshot, relative to the given date
pub fn task_statistics_at(tasks: &[Task], today: NaiveDate) -> TaskStatistics {
    let mut stats = TaskStatistics::default();
    stats.total = tasks.len() as u32;

    for task in tasks {
        match task.status() {
            Status::Pending => stats.pending += 1,
            Status::InProgress => stats.in_progress += 1,
            Status::Done => stats.done += 1,
        }

        if let Some(due) = task.due_date() {
            if due < today && task.status() != Status::Done {
                stats.overdue += 1;
            }
        }

        match task.priority() {
            Priority::Low => stats.priorities.low += 1,
            Priority::Medium => stats.priorities.medium += 1,
            Priority::High => stats.priorities.high += 1,
            Priority::Urgent => stats.priorities.urgent += 1,
        }

        match task.category() {
            Category::Personal => stats.categories.personal += 1,
            Category::Work => stats.categories.work += 1,
            Category::Study => stats.categories.study += 1,
            Category::Health => stats.categories.health += 1,
            Category::Finance => stats.categories.finance += 1,
        }

        if task.is_recurrent() {
            stats.recurrent += 1;
        }
    }

    stats.top_tags = top_tags(tasks, TOP_TAGS_LIMIT);
    stats.average_estimated_duration = average_estimated_duration(tasks);
    stats
}

/// The `limit` most frequent tags of a snapshot.
///
/// The sort is stable and keyed on the count only, so tags with equal counts keep
/// their first-encountered order.
pub fn top_tags(tasks: &[Task], limit: usize) -> Vec<TagCount> {
    let mut counts: Vec<TagCount> = Vec::new();
    for task in tasks {
        for tag in task.tags() {
            match counts.iter_mut().find(|entry| &entry.tag == tag) {
                Some(entry) => entry.count += 1,
                None => counts.push(TagCount { tag: tag.clone(), count: 1 }),
            }
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// The mean of the recognized duration estimates of a snapshot, rendered in the
/// coarsest unit that does not truncate to zero: minutes below an hour, hours below
/// a working day (8h), days beyond that.
pub fn average_estimated_duration(tasks: &[Task]) -> Option<String> {
    let minutes: Vec<u32> = tasks
        .iter()
        .filter_map(|task| task.estimated_duration())
        .map(|duration| duration.minutes())
        .collect();
    if minutes.is_empty() {
        return None;
    }

    let average = minutes.iter().sum::<u32>() as f64 / minutes.len() as f64;
    if average < 60.0 {
        Some(format!("{}min", average.round() as u32))
    } else if average < 480.0 {
        Some(format!("{}h", (average / 60.0).round() as u32))
    } else {
        Some(format!("{}d", (average / 480.0).round() as u32))
    }
}

/// Derive event statistics from a snapshot, relative to the current date
pub fn event_statistics(events: &[Event]) -> EventStatistics {
    event_statistics_at(events, Utc::now().date_naive())
}

/// Derive event statistics from a snapshot, relative to the given date
pub fn event_statistics_at(events: &[Event], today: NaiveDate) -> EventStatistics {
    let mut stats = EventStatistics::default();
    stats.total = events.len() as u32;

    for event in events {
        if event.date() == today {
            stats.today += 1;
        } else if event.date() > today {
            stats.upcoming += 1;
        } else {
            stats.past += 1;
        }

        *stats.by_type.entry(event.event_type().as_str().to_string()).or_insert(0) += 1;
        *stats.by_priority.entry(event.priority().as_str().to_string()).or_insert(0) += 1;
    }

    stats
}

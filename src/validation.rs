//! Client-side validation and sanitization of task input.
//!
//! The backend performs the authoritative checks; this module applies the same ruleset
//! before anything is sent (or stored locally), so a form can report every problem at
//! once without a round trip. Errors are therefore collected, never short-circuited.

use crate::task::{Category, EstimatedDuration, Priority, Status, TagsInput, TaskInput};

/// The outcome of a [`validate`] call: either `valid`, or every rule the record broke
#[derive(Clone, Debug, PartialEq)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Clean up task input before a create call.
///
/// Trims title and description, coerces tags into a deduplicated list, and fills
/// priority/category/status/recurrence with their defaults when absent.
/// Idempotent: sanitizing twice changes nothing.
pub fn sanitize(input: TaskInput) -> TaskInput {
    let mut input = sanitize_partial(input);
    if input.priority.is_none() {
        input.priority = Some("medium".to_string());
    }
    if input.category.is_none() {
        input.category = Some("personal".to_string());
    }
    if input.status.is_none() {
        input.status = Some("pending".to_string());
    }
    if input.is_recurrent.is_none() {
        input.is_recurrent = Some(false);
    }
    input
}

/// Clean up task input before an update call.
///
/// Same trimming and tag coercion as [`sanitize`], but absent fields stay absent so an
/// update only ever touches what the caller supplied.
pub fn sanitize_partial(mut input: TaskInput) -> TaskInput {
    if let Some(title) = input.title {
        input.title = Some(title.trim().to_string());
    }
    if let Some(description) = input.description {
        input.description = Some(description.trim().to_string());
    }
    if let Some(tags) = input.tags {
        input.tags = Some(TagsInput::List(tags.into_list()));
    }
    input
}

/// Check task input against the field rules, collecting every violation
pub fn validate(input: &TaskInput) -> Validation {
    let mut errors = Vec::new();

    match &input.title {
        None => errors.push("title is required".to_string()),
        Some(title) => {
            let trimmed = title.trim();
            if trimmed.is_empty() {
                errors.push("title is required".to_string());
            } else if trimmed.chars().count() > 200 {
                errors.push("title must be at most 200 characters".to_string());
            }
        }
    }

    if let Some(description) = &input.description {
        if description.chars().count() > 2000 {
            errors.push("description must be at most 2000 characters".to_string());
        }
    }

    if let Some(priority) = &input.priority {
        if Priority::parse(priority).is_none() {
            errors.push("invalid priority".to_string());
        }
    }

    if let Some(status) = &input.status {
        if Status::parse(status).is_none() {
            errors.push("invalid status".to_string());
        }
    }

    if let Some(category) = &input.category {
        if Category::parse(category).is_none() {
            errors.push("invalid category".to_string());
        }
    }

    if let Some(duration) = &input.estimated_duration {
        if EstimatedDuration::parse(duration).is_none() {
            errors.push("invalid estimated duration".to_string());
        }
    }

    if let (Some(start), Some(due)) = (input.start_date, input.due_date) {
        if start > due {
            errors.push("start date cannot be after the due date".to_string());
        }
    }

    match &input.tags {
        None => (),
        Some(TagsInput::Text(_)) => errors.push("tags must be a list".to_string()),
        Some(TagsInput::List(tags)) => {
            for (index, tag) in tags.iter().enumerate() {
                if tag.chars().count() > 50 {
                    errors.push(format!("tag {} is invalid (50 characters maximum)", index + 1));
                }
            }
        }
    }

    Validation { valid: errors.is_empty(), errors }
}

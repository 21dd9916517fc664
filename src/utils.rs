//! Some utility functions

use crate::Event;
use crate::Task;

/// A debug utility that pretty-prints a task list
pub fn print_task_list(tasks: &[Task]) {
    for task in tasks {
        print_task(task);
    }
}

pub fn print_task(task: &Task) {
    let completion = if task.completed() { "✓" } else { " " };
    let due = match task.due_date() {
        Some(due) => format!(" (due {})", due),
        None => String::new(),
    };
    println!("    {} [{}] {}{}\t{}", completion, task.priority().as_str(), task.title(), due, task.id());
}

/// A debug utility that pretty-prints an event list
pub fn print_event_list(events: &[Event]) {
    for event in events {
        print_event(event);
    }
}

pub fn print_event(event: &Event) {
    let completion = if event.is_completed() { "✓" } else { " " };
    println!(
        "    {} {} {}  {}\t{}",
        completion,
        event.date(),
        event.time().format("%H:%M"),
        event.title(),
        event.id()
    );
}

//! This crate provides a way to manage personal tasks and calendar events.
//!
//! It provides a REST client for the planner backend in the [`client`] module, that can be used as a stand-alone module.
//!
//! Because the backend may be unreachable (or the user may simply prefer to work offline), this crate also provides a local store for the same data in the [`cache`] module.
//!
//! These two "data sources" (actual client and local store) implement one common interface (the traits in [`traits`]). \
//! A [`Provider`](provider::Provider) fronts them both: it probes the backend once at startup, pins an online or offline mode for the session, and routes every operation to the matching source. \
//! It also owns the client-side validation of task input and the derived statistics.

pub mod traits;

pub mod config;
mod error;
pub use error::Error;
pub mod item;
pub use item::ItemId;
pub mod task;
pub use task::Task;
pub use task::TaskInput;
pub mod event;
pub use event::Event;
pub use event::EventQuery;
pub mod user;
pub use user::User;
pub mod validation;
pub mod stats;
pub mod provider;
pub use provider::ConnectionMode;
pub use provider::Provider;

pub mod client;
pub mod cache;
mod resource;
pub use resource::Resource;

pub mod mock_behaviour;
pub mod utils;

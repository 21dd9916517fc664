//! Support for library configuration options

use std::sync::{Arc, Mutex};
use std::time::Duration;
use once_cell::sync::Lazy;

/// Base URL of the REST backend (the `/api` prefix included).
/// Feel free to override it when initing this library.
pub static API_BASE_URL: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("http://localhost:5000/api".to_string())));

/// How long the startup connectivity probe waits before deciding the backend is unreachable
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// The exact phrase a caller must supply to confirm an account deletion
pub const DELETE_ACCOUNT_CONFIRMATION: &str = "DELETE";

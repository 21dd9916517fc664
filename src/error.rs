//! The errors this crate surfaces to callers

use reqwest::StatusCode;

/// An error from a data source or from the provider.
///
/// Every variant carries a message that is suitable for direct display to a user
/// (its `Display` implementation), so no raw backend error ever reaches the UI layer.
/// Callers branch on the variant, never on the message text.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The supplied record broke one or more validation rules.
    /// Every violated rule is reported at once.
    #[error("invalid data: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// No entity matches this identifier (or it is owned by somebody else)
    #[error("{0}")]
    NotFound(String),

    /// Bad credentials, or a missing/expired token.
    /// Unknown email and wrong password are deliberately not told apart.
    #[error("{0}")]
    Auth(String),

    /// The name or email is already taken
    #[error("{0}")]
    Conflict(String),

    /// The remote backend could not be reached, or answered something unexpected.
    /// Local-mode operations never produce this variant.
    #[error("{0}")]
    Transport(String),

    /// The local persistence area could not be read or written
    #[error("{0}")]
    Storage(String),
}

impl Error {
    /// Map an HTTP error status and the message from its `{message, error?}` envelope
    /// to the matching error kind
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Error::Validation(vec![message]),
            StatusCode::UNAUTHORIZED => Error::Auth(message),
            StatusCode::NOT_FOUND => Error::NotFound(message),
            StatusCode::CONFLICT => Error::Conflict(message),
            _ => Error::Transport(message),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

//! Identifiers for the records this crate manages (tasks, events, users)

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The identifier of a task, an event or a user.
///
/// Identifiers are opaque strings: records created by the remote backend carry its canonical
/// identifier format, records created by the local store carry a locally generated one.
/// Callers must not assume either format.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ItemId {
    content: String,
}

impl ItemId {
    /// Generate an identifier for a locally created record.
    ///
    /// The unix-milliseconds prefix keeps ids monotonically distinguishable, the uuid
    /// fragment keeps two creations within the same millisecond distinct.
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let random = uuid::Uuid::new_v4().to_hyphenated().to_string();
        Self { content: format!("{}-{}", millis, &random[..8]) }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }
}

impl From<String> for ItemId {
    fn from(content: String) -> Self {
        Self { content }
    }
}
impl From<&str> for ItemId {
    fn from(content: &str) -> Self {
        Self { content: content.to_string() }
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content)
    }
}

/// Used to support serde
impl Serialize for ItemId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.content)
    }
}
/// Used to support serde
impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<ItemId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let content = String::deserialize(deserializer)?;
        Ok(ItemId { content })
    }
}

//! User accounts, profiles, and the preference record kept alongside them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::item::ItemId;
use crate::task::Priority;

/// A user account, as returned by either data source.
///
/// There is deliberately no password field here: the backend stores only a salted hash
/// and strips it from every response, and the local store never records one at all.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    id: ItemId,
    name: String,
    email: String,
    #[serde(default)]
    profile_image: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    country_name: String,
    #[serde(default)]
    news_country_code: String,
    #[serde(default = "default_language")]
    language: String,
    #[serde(default = "default_timezone")]
    timezone: String,
    #[serde(default = "default_true")]
    notifications: bool,
    #[serde(default)]
    default_priority: Priority,
    #[serde(default)]
    dark_mode: bool,
    /// Soft-delete flag: "deleting" an account anonymizes it and clears this
    #[serde(default = "default_true")]
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn default_language() -> String {
    "pt".to_string()
}
fn default_timezone() -> String {
    "Europe/Lisbon".to_string()
}
fn default_true() -> bool {
    true
}

impl User {
    /// Build a local account from registration data.
    /// Language and timezone are seeded from the registration country, like the backend does.
    pub fn from_new(new: &NewUser) -> Self {
        let now = Utc::now();
        let country = new.country.clone().unwrap_or_default();
        Self {
            id: ItemId::generate(),
            name: new.name.clone(),
            email: new.email.to_lowercase(),
            profile_image: String::new(),
            language: language_for_country(&country).to_string(),
            timezone: timezone_for_country(&country).to_string(),
            country,
            country_name: new.country_name.clone().unwrap_or_default(),
            news_country_code: new.news_country_code.clone().unwrap_or_default(),
            notifications: true,
            default_priority: Priority::default(),
            dark_mode: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge the supplied fields of a partial profile update over this account
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email.to_lowercase();
        }
        if let Some(profile_image) = update.profile_image {
            self.profile_image = profile_image;
        }
        if let Some(country) = update.country {
            self.country = country;
        }
        if let Some(country_name) = update.country_name {
            self.country_name = country_name;
        }
        if let Some(news_country_code) = update.news_country_code {
            self.news_country_code = news_country_code;
        }
        if let Some(language) = update.language {
            self.language = language;
        }
        if let Some(timezone) = update.timezone {
            self.timezone = timezone;
        }
        if let Some(notifications) = update.notifications {
            self.notifications = notifications;
        }
        if let Some(default_priority) = update.default_priority {
            self.default_priority = default_priority;
        }
        if let Some(dark_mode) = update.dark_mode {
            self.dark_mode = dark_mode;
        }
        self.updated_at = Utc::now();
    }

    /// A copy of this account with the locally stored preferences merged over the
    /// preference-backed fields, the shape profile reads hand back in offline mode
    pub fn with_preferences(&self, preferences: &Preferences) -> User {
        let mut merged = self.clone();
        merged.news_country_code = preferences.news_country.clone();
        merged.language = preferences.language.clone();
        merged.timezone = preferences.timezone.clone();
        merged.notifications = preferences.notifications;
        merged.default_priority = preferences.default_priority;
        merged.dark_mode = preferences.dark_mode;
        merged
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn email(&self) -> &str {
        &self.email
    }
    pub fn profile_image(&self) -> &str {
        &self.profile_image
    }
    pub fn country(&self) -> &str {
        &self.country
    }
    pub fn country_name(&self) -> &str {
        &self.country_name
    }
    pub fn news_country_code(&self) -> &str {
        &self.news_country_code
    }
    pub fn language(&self) -> &str {
        &self.language
    }
    pub fn timezone(&self) -> &str {
        &self.timezone
    }
    pub fn notifications(&self) -> bool {
        self.notifications
    }
    pub fn default_priority(&self) -> Priority {
        self.default_priority
    }
    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }
    pub fn is_active(&self) -> bool {
        self.is_active
    }
    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }
    pub fn updated_at(&self) -> &DateTime<Utc> {
        &self.updated_at
    }
}

/// Registration data
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news_country_code: Option<String>,
}

/// Login data
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// A partial profile update: only supplied fields change
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news_country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
}

/// What a successful register or login hands back
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// The preference record the local store keeps next to the user
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub news_country: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_true")]
    pub notifications: bool,
    #[serde(default)]
    pub default_priority: Priority,
    #[serde(default)]
    pub dark_mode: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            news_country: String::new(),
            language: default_language(),
            timezone: default_timezone(),
            notifications: true,
            default_priority: Priority::default(),
            dark_mode: false,
        }
    }
}

impl Preferences {
    /// Merge the preference-backed fields of a profile update over this record
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(news_country_code) = &update.news_country_code {
            self.news_country = news_country_code.clone();
        }
        if let Some(language) = &update.language {
            self.language = language.clone();
        }
        if let Some(timezone) = &update.timezone {
            self.timezone = timezone.clone();
        }
        if let Some(notifications) = update.notifications {
            self.notifications = notifications;
        }
        if let Some(default_priority) = update.default_priority {
            self.default_priority = default_priority;
        }
        if let Some(dark_mode) = update.dark_mode {
            self.dark_mode = dark_mode;
        }
    }

    /// Country-derived defaults, seeded at registration time
    pub fn seeded(country: &str, news_country_code: &str) -> Self {
        Self {
            news_country: news_country_code.to_string(),
            language: language_for_country(country).to_string(),
            timezone: timezone_for_country(country).to_string(),
            ..Self::default()
        }
    }
}

/// The timezone an account defaults to, by registration country
pub fn timezone_for_country(country_code: &str) -> &'static str {
    match country_code {
        "pt" => "Europe/Lisbon",
        "br" => "America/Sao_Paulo",
        "us" => "America/New_York",
        "uk" => "Europe/London",
        "es" => "Europe/Madrid",
        "fr" => "Europe/Paris",
        "de" => "Europe/Berlin",
        "it" => "Europe/Rome",
        "ca" => "America/Toronto",
        "au" => "Australia/Sydney",
        _ => "UTC",
    }
}

/// The interface language an account defaults to, by registration country
pub fn language_for_country(country_code: &str) -> &'static str {
    match country_code {
        "pt" | "br" => "pt",
        _ => "en",
    }
}

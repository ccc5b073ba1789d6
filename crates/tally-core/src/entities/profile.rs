//! User profile and identity snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::UserId;

/// Country/gender pair denormalized onto votes and comments at write time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographics {
    pub country: String,
    pub gender: String,
}

impl Demographics {
    /// Key used when the identity provider has no value
    pub const UNKNOWN: &'static str = "unknown";

    /// Normalize optional values; blanks become [`Self::UNKNOWN`]
    pub fn new(country: Option<&str>, gender: Option<&str>) -> Self {
        Self {
            country: normalize(country),
            gender: normalize(gender),
        }
    }

    pub fn unknown() -> Self {
        Self::new(None, None)
    }
}

fn normalize(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => Demographics::UNKNOWN.to_string(),
    }
}

/// Caller identity as supplied by the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub country: Option<String>,
    pub gender: Option<String>,
    pub is_anonymous: bool,
}

impl Identity {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            country: None,
            gender: None,
            is_anonymous: false,
        }
    }

    pub fn anonymous(user_id: UserId) -> Self {
        Self {
            is_anonymous: true,
            ..Self::new(user_id)
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn demographics(&self) -> Demographics {
        Demographics::new(self.country.as_deref(), self.gender.as_deref())
    }
}

/// Stored user profile (`users/{userId}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default = "unknown_field")]
    pub country: String,
    #[serde(default = "unknown_field")]
    pub gender: String,
    #[serde(default)]
    pub anonymous: bool,
    pub created_at: DateTime<Utc>,
}

fn unknown_field() -> String {
    Demographics::UNKNOWN.to_string()
}

impl UserProfile {
    /// Implicit profile for a first-time voter
    pub fn from_identity(identity: &Identity, now: DateTime<Utc>) -> Self {
        let Demographics { country, gender } = identity.demographics();
        Self {
            country,
            gender,
            anonymous: identity.is_anonymous,
            created_at: now,
        }
    }

    pub fn demographics(&self) -> Demographics {
        Demographics::new(Some(&self.country), Some(&self.gender))
    }
}

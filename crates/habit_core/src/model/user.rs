//! User identity and per-user settings.
//!
//! Authentication is out of scope; a user is an email-keyed identity that
//! owns habits and completions.

use crate::calendar::{CalendarError, ReferenceZone};
use crate::model::validation::{ensure_valid_instant, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uuid: UserId,
    /// Unique sign-in key.
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl User {
    pub fn new(email: impl Into<String>, name: Option<String>, created_at: i64) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            email: email.into().trim().to_string(),
            name,
            avatar: None,
            created_at,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let email = self.email.trim();
        let well_formed = match email.split_once('@') {
            Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
            None => false,
        };
        if !well_formed {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }
        ensure_valid_instant("created_at", self.created_at)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Auto => "auto",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub reminders: bool,
    pub streak_alerts: bool,
    pub motivational_messages: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            reminders: true,
            streak_alerts: true,
            motivational_messages: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub user_id: UserId,
    pub notifications: NotificationPreferences,
    pub theme: Theme,
    /// `local`, `UTC` or an IANA zone name.
    pub timezone: String,
}

impl UserSettings {
    /// Default settings created alongside a new user.
    pub fn defaults_for(user_id: UserId, zone: ReferenceZone) -> Self {
        Self {
            user_id,
            notifications: NotificationPreferences::default(),
            theme: Theme::Auto,
            timezone: zone.to_string(),
        }
    }

    /// Zone in which this user's calendar days are evaluated.
    pub fn reference_zone(&self) -> Result<ReferenceZone, CalendarError> {
        self.timezone.parse()
    }
}

//! Habit domain model.
//!
//! # Responsibility
//! - Define the user-owned recurring activity that completions point at.
//! - Provide partial-update semantics for habit edits.
//!
//! # Invariants
//! - `uuid` is stable and never reassigned.
//! - `updated_at >= created_at`.
//! - `name`, `category` and `icon` are never blank.

use crate::model::user::UserId;
use crate::model::validation::{ensure_valid_instant, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type HabitId = Uuid;

pub const DEFAULT_CATEGORY: &str = "Health";
pub const DEFAULT_COLOR: &str = "#4CAF50";
pub const DEFAULT_ICON: &str = "fitness";

static REMINDER_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("valid reminder regex"));
static COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"));

/// How often a habit is meant to be performed.
///
/// Streaks are always evaluated per calendar day regardless of frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Custom,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Custom => "custom",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub uuid: HabitId,
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    /// Free-form label used for the category breakdown.
    pub category: String,
    pub frequency: Frequency,
    /// Wall-clock reminder times formatted as `HH:MM`.
    pub reminder_times: Vec<String>,
    /// `#RRGGBB` display color.
    pub color: String,
    pub icon: String,
    pub goal: Option<u32>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Never earlier than `created_at`.
    pub updated_at: i64,
}

impl Habit {
    /// Creates a daily habit with default category and presentation.
    pub fn new(user_id: UserId, name: impl Into<String>, created_at: i64) -> Self {
        Self::with_id(Uuid::new_v4(), user_id, name, created_at)
    }

    /// Creates a habit with a caller-provided stable ID.
    pub fn with_id(
        uuid: HabitId,
        user_id: UserId,
        name: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            uuid,
            user_id,
            name: name.into(),
            description: None,
            category: DEFAULT_CATEGORY.to_string(),
            frequency: Frequency::Daily,
            reminder_times: Vec::new(),
            color: DEFAULT_COLOR.to_string(),
            icon: DEFAULT_ICON.to_string(),
            goal: None,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyHabitName);
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        if self.icon.trim().is_empty() {
            return Err(ValidationError::EmptyIcon);
        }
        if !COLOR_RE.is_match(&self.color) {
            return Err(ValidationError::InvalidColor(self.color.clone()));
        }
        if let Some(bad) = self
            .reminder_times
            .iter()
            .find(|time| !REMINDER_TIME_RE.is_match(time))
        {
            return Err(ValidationError::InvalidReminderTime(bad.clone()));
        }
        if self.goal == Some(0) {
            return Err(ValidationError::ZeroGoal);
        }

        ensure_valid_instant("created_at", self.created_at)?;
        ensure_valid_instant("updated_at", self.updated_at)?;
        if self.updated_at < self.created_at {
            return Err(ValidationError::UpdatedBeforeCreated {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }

        Ok(())
    }

    /// Applies only the fields present in `patch` and bumps `updated_at`.
    ///
    /// `updated_at` is clamped to `created_at` so a skewed clock cannot
    /// produce an invalid record.
    pub fn apply_patch(&mut self, patch: &HabitPatch, now_ms: i64) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(frequency) = patch.frequency {
            self.frequency = frequency;
        }
        if let Some(reminder_times) = &patch.reminder_times {
            self.reminder_times = reminder_times.clone();
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        if let Some(icon) = &patch.icon {
            self.icon = icon.clone();
        }
        if let Some(goal) = patch.goal {
            self.goal = Some(goal);
        }
        self.updated_at = now_ms.max(self.created_at);
    }
}

/// Partial habit update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub frequency: Option<Frequency>,
    pub reminder_times: Option<Vec<String>>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub goal: Option<u32>,
}

impl HabitPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

//! Completion domain model.
//!
//! # Invariants
//! - `completed_at` is a non-negative epoch-ms instant.
//! - At most one completion per (habit, calendar day) is the *intended*
//!   state; storage does not enforce it and readers must tolerate duplicates.

use crate::model::habit::HabitId;
use crate::model::user::UserId;
use crate::model::validation::{ensure_valid_instant, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CompletionId = Uuid;

/// Record that a habit was performed at a given instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub uuid: CompletionId,
    pub habit_id: HabitId,
    pub user_id: UserId,
    /// Unix epoch milliseconds (UTC).
    pub completed_at: i64,
    pub notes: Option<String>,
}

impl Completion {
    pub fn new(habit_id: HabitId, user_id: UserId, completed_at: i64) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            habit_id,
            user_id,
            completed_at,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes.filter(|value| !value.trim().is_empty());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_valid_instant("completed_at", self.completed_at)
    }
}

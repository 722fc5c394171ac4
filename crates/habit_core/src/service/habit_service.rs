//! Habit use-case service.
//!
//! # Invariants
//! - Timestamps come from the caller's `now_ms`; `updated_at` never moves
//!   before `created_at`.
//! - Deleting a habit also deletes its completions.

use crate::model::habit::{Frequency, Habit, HabitId, HabitPatch};
use crate::model::user::UserId;
use crate::repo::habit_repo::HabitRepository;
use crate::repo::{RepoError, RepoResult};
use log::info;

/// Request model for creating a habit. Unset presentation fields use defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewHabit {
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub frequency: Frequency,
    pub reminder_times: Vec<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub goal: Option<u32>,
}

pub struct HabitService<R: HabitRepository> {
    repo: R,
}

impl<R: HabitRepository> HabitService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a habit and returns the stored record.
    pub fn create_habit(&self, request: NewHabit, now_ms: i64) -> RepoResult<Habit> {
        let mut habit = Habit::new(request.user_id, request.name, now_ms);
        habit.description = request.description;
        habit.frequency = request.frequency;
        habit.reminder_times = request.reminder_times;
        habit.goal = request.goal;
        if let Some(category) = request.category {
            habit.category = category;
        }
        if let Some(color) = request.color {
            habit.color = color;
        }
        if let Some(icon) = request.icon {
            habit.icon = icon;
        }

        self.repo.create_habit(&habit)?;
        info!(
            "event=habit_create module=service status=ok habit_id={} user_id={}",
            habit.uuid, habit.user_id
        );
        Ok(habit)
    }

    /// Applies a partial update. An empty patch is a no-op.
    pub fn update_habit(
        &self,
        habit_id: HabitId,
        patch: &HabitPatch,
        now_ms: i64,
    ) -> RepoResult<Habit> {
        let mut habit = self
            .repo
            .get_habit(habit_id)?
            .ok_or(RepoError::HabitNotFound(habit_id))?;
        if patch.is_empty() {
            return Ok(habit);
        }

        habit.apply_patch(patch, now_ms);
        self.repo.update_habit(&habit)?;
        Ok(habit)
    }

    pub fn get_habit(&self, habit_id: HabitId) -> RepoResult<Option<Habit>> {
        self.repo.get_habit(habit_id)
    }

    /// Lists a user's habits, newest first.
    pub fn list_habits(&self, user_id: UserId) -> RepoResult<Vec<Habit>> {
        self.repo.list_habits(user_id)
    }

    /// Deletes a habit on behalf of `user_id`, who must own it.
    pub fn delete_user_habit(&self, habit_id: HabitId, user_id: UserId) -> RepoResult<()> {
        let habit = self
            .repo
            .get_habit(habit_id)?
            .ok_or(RepoError::HabitNotFound(habit_id))?;
        if habit.user_id != user_id {
            return Err(RepoError::OwnershipMismatch { habit_id, user_id });
        }
        self.delete_habit(habit_id)
    }

    pub fn delete_habit(&self, habit_id: HabitId) -> RepoResult<()> {
        self.repo.delete_habit(habit_id)?;
        info!("event=habit_delete module=service status=ok habit_id={habit_id}");
        Ok(())
    }
}

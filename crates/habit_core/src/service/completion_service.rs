//! Completion use-case service.
//!
//! # Responsibility
//! - Own the toggle contract: one tap completes today, the next undoes it.
//! - Answer "is this habit done today" and per-habit streak queries.
//!
//! # Invariants
//! - "Today" is `[start_of_day(now), end_of_day(now)]` in the service zone.
//! - Any number of completions inside today's window counts as completed.
//! - Duplicate same-day rows are removed together, in one transaction, and
//!   never reported as errors.
//! - Every mutation requires `user_id` to own the habit.

use crate::calendar::ReferenceZone;
use crate::model::completion::{Completion, CompletionId};
use crate::model::habit::HabitId;
use crate::model::user::UserId;
use crate::repo::completion_repo::CompletionRepository;
use crate::repo::{RepoError, RepoResult};
use crate::streak::{compute_streak, StreakSummary};
use log::{info, warn};

/// Result of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// No completion existed today; one was created.
    Completed(CompletionId),
    /// Today's completions were removed.
    Uncompleted { removed: usize },
}

impl ToggleOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

pub struct CompletionService<R: CompletionRepository> {
    repo: R,
    zone: ReferenceZone,
}

impl<R: CompletionRepository> CompletionService<R> {
    pub fn new(repo: R, zone: ReferenceZone) -> Self {
        Self { repo, zone }
    }

    pub fn zone(&self) -> ReferenceZone {
        self.zone
    }

    /// Flips today's completion state for a habit.
    ///
    /// Check-then-act: two concurrent toggles may both create. The extra row
    /// is harmless to streaks and is cleaned by the next toggle.
    pub fn toggle_completion(
        &self,
        habit_id: HabitId,
        user_id: UserId,
        now_ms: i64,
    ) -> RepoResult<ToggleOutcome> {
        self.ensure_owner(habit_id, user_id)?;
        let existing = self.completions_today(habit_id, now_ms)?;
        if existing.is_empty() {
            let id = self
                .repo
                .create_completion(&Completion::new(habit_id, user_id, now_ms))?;
            info!(
                "event=completion_toggle module=service status=ok action=completed habit_id={habit_id}"
            );
            return Ok(ToggleOutcome::Completed(id));
        }

        let removed = self.remove_all(habit_id, &existing)?;
        info!(
            "event=completion_toggle module=service status=ok action=uncompleted habit_id={habit_id} removed={removed}"
        );
        Ok(ToggleOutcome::Uncompleted { removed })
    }

    /// Marks a habit done today, reusing an existing completion if present.
    pub fn complete_habit(
        &self,
        habit_id: HabitId,
        user_id: UserId,
        now_ms: i64,
        notes: Option<String>,
    ) -> RepoResult<CompletionId> {
        self.ensure_owner(habit_id, user_id)?;
        if let Some(existing) = self.completions_today(habit_id, now_ms)?.first() {
            return Ok(existing.uuid);
        }
        let completion = Completion::new(habit_id, user_id, now_ms).with_notes(notes);
        self.repo.create_completion(&completion)
    }

    /// Removes every completion of `habit_id` in today's window.
    pub fn uncomplete_habit(
        &self,
        habit_id: HabitId,
        user_id: UserId,
        now_ms: i64,
    ) -> RepoResult<usize> {
        self.ensure_owner(habit_id, user_id)?;
        let existing = self.completions_today(habit_id, now_ms)?;
        self.remove_all(habit_id, &existing)
    }

    pub fn is_completed_today(&self, habit_id: HabitId, now_ms: i64) -> RepoResult<bool> {
        Ok(!self.completions_today(habit_id, now_ms)?.is_empty())
    }

    /// All of a user's completions inside today's window.
    pub fn today_completions(&self, user_id: UserId, now_ms: i64) -> RepoResult<Vec<Completion>> {
        self.repo
            .list_user_completions(user_id, Some(self.zone.day_window(now_ms)))
    }

    pub fn habit_streak(&self, habit_id: HabitId, now_ms: i64) -> RepoResult<StreakSummary> {
        let completions = self.repo.list_habit_completions(habit_id, None)?;
        Ok(compute_streak(
            completions.iter().map(|completion| completion.completed_at),
            now_ms,
            &self.zone,
        ))
    }

    fn ensure_owner(&self, habit_id: HabitId, user_id: UserId) -> RepoResult<()> {
        match self.repo.habit_owner(habit_id)? {
            None => Err(RepoError::HabitNotFound(habit_id)),
            Some(owner) if owner != user_id => {
                Err(RepoError::OwnershipMismatch { habit_id, user_id })
            }
            Some(_) => Ok(()),
        }
    }

    fn completions_today(&self, habit_id: HabitId, now_ms: i64) -> RepoResult<Vec<Completion>> {
        self.repo
            .list_habit_completions(habit_id, Some(self.zone.day_window(now_ms)))
    }

    fn remove_all(&self, habit_id: HabitId, completions: &[Completion]) -> RepoResult<usize> {
        if completions.len() > 1 {
            warn!(
                "event=duplicate_completions module=service status=repaired habit_id={habit_id} count={}",
                completions.len()
            );
        }

        // Rows a concurrent toggle already deleted are skipped by the store.
        let ids: Vec<CompletionId> = completions
            .iter()
            .map(|completion| completion.uuid)
            .collect();
        self.repo.delete_completions(&ids)
    }
}

//! Statistics use-case service.
//!
//! Pulls a user's habits and completions from the stores and hands them to
//! the pure streak and statistics builders. Callers decide refresh cadence.

use crate::calendar::ReferenceZone;
use crate::model::user::UserId;
use crate::repo::completion_repo::CompletionRepository;
use crate::repo::habit_repo::HabitRepository;
use crate::repo::RepoResult;
use crate::stats::{compute_statistics, DailyStatistics, StatisticsInput};
use crate::streak::{compute_user_streaks, group_completion_instants, StreakRecord};

pub struct StatsService<H: HabitRepository, C: CompletionRepository> {
    habits: H,
    completions: C,
    zone: ReferenceZone,
}

impl<H: HabitRepository, C: CompletionRepository> StatsService<H, C> {
    pub fn new(habits: H, completions: C, zone: ReferenceZone) -> Self {
        Self {
            habits,
            completions,
            zone,
        }
    }

    /// One streak record per habit, newest habit first.
    pub fn user_streaks(&self, user_id: UserId, now_ms: i64) -> RepoResult<Vec<StreakRecord>> {
        let habits = self.habits.list_habits(user_id)?;
        let completions = self.completions.list_user_completions(user_id, None)?;
        Ok(compute_user_streaks(
            &habits,
            &group_completion_instants(&completions),
            now_ms,
            &self.zone,
        ))
    }

    pub fn statistics(&self, user_id: UserId, now_ms: i64) -> RepoResult<DailyStatistics> {
        let habits = self.habits.list_habits(user_id)?;
        let all_completions = self.completions.list_user_completions(user_id, None)?;
        let today_completions = self
            .completions
            .list_user_completions(user_id, Some(self.zone.day_window(now_ms)))?;
        let streaks = compute_user_streaks(
            &habits,
            &group_completion_instants(&all_completions),
            now_ms,
            &self.zone,
        );

        Ok(compute_statistics(
            &StatisticsInput {
                habits: &habits,
                all_completions: &all_completions,
                today_completions: &today_completions,
                streaks: &streaks,
            },
            now_ms,
            &self.zone,
        ))
    }
}

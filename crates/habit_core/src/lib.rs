//! Core domain logic for the habit tracker.
//! Streaks, day boundaries and statistics are computed here and nowhere else.

pub mod calendar;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod stats;
pub mod streak;

pub use calendar::{end_of_day, now_ms, start_of_day, CalendarError, InstantRange, ReferenceZone};
pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::completion::{Completion, CompletionId};
pub use model::habit::{Frequency, Habit, HabitId, HabitPatch};
pub use model::user::{NotificationPreferences, Theme, User, UserId, UserSettings};
pub use model::validation::ValidationError;
pub use repo::completion_repo::{CompletionRepository, SqliteCompletionRepository};
pub use repo::habit_repo::{HabitRepository, SqliteHabitRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::completion_service::{CompletionService, ToggleOutcome};
pub use service::habit_service::{HabitService, NewHabit};
pub use service::stats_service::StatsService;
pub use service::user_service::UserService;
pub use stats::{compute_statistics, DailyStatistics, StatisticsInput};
pub use streak::{compute_streak, compute_user_streaks, StreakRecord, StreakSummary};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

//! Streak derivation from completion instants.
//!
//! # Responsibility
//! - Turn an unordered set of completion instants into current/longest
//!   consecutive-day streaks.
//!
//! # Invariants
//! - Pure: output depends only on instants, `now` and the reference zone.
//! - Same-day duplicates never inflate a streak.
//! - `longest_streak >= current_streak`.

mod calculator;

pub use calculator::{
    compute_streak, compute_user_streaks, group_completion_instants, StreakRecord, StreakSummary,
};

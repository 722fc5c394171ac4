//! Aggregate statistics over a user's habits and completions.
//!
//! # Responsibility
//! - Build the summary shown on the statistics view from already-fetched data.
//!
//! # Invariants
//! - Pure and deterministic for a given input, `now` and reference zone.
//! - Ratios are finite: empty denominators yield `0.0`.

mod daily;

pub use daily::{
    compute_statistics, most_active_weekday, DailyStatistics, StatisticsInput,
    AVERAGE_WINDOW_DAYS,
};

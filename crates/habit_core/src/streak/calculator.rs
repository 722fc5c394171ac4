use crate::calendar::ReferenceZone;
use crate::model::completion::Completion;
use crate::model::habit::{Habit, HabitId};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Streak counts for one habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StreakSummary {
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Streak counts labelled with the habit they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreakRecord {
    pub habit_id: HabitId,
    pub habit_name: String,
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Maximal run of consecutive calendar days, newest day first.
#[derive(Debug, Clone, Copy)]
struct DayRun {
    newest: NaiveDate,
    length: u32,
}

/// Computes current and longest streak for one habit.
///
/// The current streak is the run ending today, or ending yesterday when
/// today has not been logged yet. Days after `now`'s calendar day are
/// ignored.
pub fn compute_streak<I>(
    completion_instants: I,
    now_ms: i64,
    zone: &ReferenceZone,
) -> StreakSummary
where
    I: IntoIterator<Item = i64>,
{
    let today = zone.calendar_day(now_ms);
    let days: BTreeSet<NaiveDate> = completion_instants
        .into_iter()
        .map(|instant| zone.calendar_day(instant))
        .filter(|day| *day <= today)
        .collect();

    let runs = consecutive_runs(days.iter().rev().copied());
    let Some(latest) = runs.first() else {
        return StreakSummary::default();
    };

    let alive = latest.newest == today || Some(latest.newest) == today.pred_opt();
    StreakSummary {
        current_streak: if alive { latest.length } else { 0 },
        longest_streak: runs.iter().map(|run| run.length).max().unwrap_or(0),
    }
}

/// Computes one streak record per habit, preserving habit order.
///
/// Habits missing from `completions_by_habit` get `0/0`.
pub fn compute_user_streaks(
    habits: &[Habit],
    completions_by_habit: &HashMap<HabitId, Vec<i64>>,
    now_ms: i64,
    zone: &ReferenceZone,
) -> Vec<StreakRecord> {
    habits
        .iter()
        .map(|habit| {
            let summary = completions_by_habit
                .get(&habit.uuid)
                .map(|instants| compute_streak(instants.iter().copied(), now_ms, zone))
                .unwrap_or_default();
            StreakRecord {
                habit_id: habit.uuid,
                habit_name: habit.name.clone(),
                current_streak: summary.current_streak,
                longest_streak: summary.longest_streak,
            }
        })
        .collect()
}

/// Groups completion instants by habit.
pub fn group_completion_instants(completions: &[Completion]) -> HashMap<HabitId, Vec<i64>> {
    let mut grouped: HashMap<HabitId, Vec<i64>> = HashMap::new();
    for completion in completions {
        grouped
            .entry(completion.habit_id)
            .or_default()
            .push(completion.completed_at);
    }
    grouped
}

/// Splits strictly descending distinct days into runs.
fn consecutive_runs(days_desc: impl Iterator<Item = NaiveDate>) -> Vec<DayRun> {
    let mut runs: Vec<DayRun> = Vec::new();
    let mut previous: Option<NaiveDate> = None;

    for day in days_desc {
        let continues = previous.and_then(|prev| prev.pred_opt()) == Some(day);
        match runs.last_mut() {
            Some(run) if continues => run.length += 1,
            _ => runs.push(DayRun {
                newest: day,
                length: 1,
            }),
        }
        previous = Some(day);
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::{compute_streak, compute_user_streaks, group_completion_instants, StreakSummary};
    use crate::calendar::{ReferenceZone, DAY_MS};
    use crate::model::completion::Completion;
    use crate::model::habit::Habit;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    const HOUR_MS: i64 = 60 * 60 * 1000;

    fn now() -> i64 {
        Utc.with_ymd_and_hms(2024, 6, 15, 14, 30, 0)
            .single()
            .expect("valid now")
            .timestamp_millis()
    }

    /// Noon-ish instant `days_ago` calendar days before `now()` (UTC).
    fn days_ago(days: i64) -> i64 {
        now() - days * DAY_MS - 2 * HOUR_MS
    }

    fn streak(days: &[i64]) -> StreakSummary {
        compute_streak(days.iter().map(|d| days_ago(*d)), now(), &ReferenceZone::Utc)
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(streak(&[]), StreakSummary::default());
    }

    #[test]
    fn today_and_yesterday_make_two() {
        let summary = streak(&[0, 1]);
        assert_eq!(summary.current_streak, 2);
        assert_eq!(summary.longest_streak, 2);
    }

    #[test]
    fn gap_after_today_resets_run() {
        assert_eq!(
            streak(&[0, 2]),
            StreakSummary {
                current_streak: 1,
                longest_streak: 1
            }
        );
    }

    #[test]
    fn older_run_can_be_longest() {
        assert_eq!(
            streak(&[0, 1, 5, 4, 3]),
            StreakSummary {
                current_streak: 2,
                longest_streak: 3
            }
        );
    }

    #[test]
    fn run_ending_yesterday_is_still_alive() {
        assert_eq!(
            streak(&[1, 2, 3, 4]),
            StreakSummary {
                current_streak: 4,
                longest_streak: 4
            }
        );
    }

    #[test]
    fn stale_history_has_no_current_streak() {
        assert_eq!(
            streak(&[2, 3, 4, 10, 11]),
            StreakSummary {
                current_streak: 0,
                longest_streak: 3
            }
        );
    }

    #[test]
    fn single_isolated_day_is_run_of_one() {
        assert_eq!(
            streak(&[7]),
            StreakSummary {
                current_streak: 0,
                longest_streak: 1
            }
        );
    }

    #[test]
    fn same_day_duplicates_count_once() {
        let zone = ReferenceZone::Utc;
        let instants = vec![
            days_ago(0),
            days_ago(0) + 1,
            days_ago(0) - HOUR_MS,
            days_ago(1),
            days_ago(1),
        ];
        let summary = compute_streak(instants, now(), &zone);
        assert_eq!(summary.current_streak, 2);
        assert_eq!(summary.longest_streak, 2);
    }

    #[test]
    fn future_days_are_ignored() {
        assert_eq!(
            streak(&[-1, 0, 1]),
            StreakSummary {
                current_streak: 2,
                longest_streak: 2
            }
        );
    }

    #[test]
    fn run_spanning_dst_switch_stays_consecutive() {
        let zone: ReferenceZone = "America/New_York".parse().expect("known zone");
        // Local 23:30 on 2024-03-09, 00:15 on 2024-03-10 (23h day), 23:45 on 2024-03-11.
        let instants = [
            Utc.with_ymd_and_hms(2024, 3, 10, 4, 30, 0),
            Utc.with_ymd_and_hms(2024, 3, 10, 5, 15, 0),
            Utc.with_ymd_and_hms(2024, 3, 12, 3, 45, 0),
        ]
        .map(|dt| dt.single().expect("valid instant").timestamp_millis());
        let now = Utc
            .with_ymd_and_hms(2024, 3, 12, 12, 0, 0)
            .single()
            .expect("valid now")
            .timestamp_millis();

        let summary = compute_streak(instants, now, &zone);
        assert_eq!(summary.current_streak, 3);
        assert_eq!(summary.longest_streak, 3);
    }

    #[test]
    fn longest_never_below_current_for_any_recent_pattern() {
        // Every subset of the last 10 days.
        for mask in 0u32..(1 << 10) {
            let days: Vec<i64> = (0..10).filter(|d| mask & (1 << d) != 0).collect();
            let summary = streak(&days);
            assert!(
                summary.longest_streak >= summary.current_streak,
                "mask {mask:#b}: {summary:?}"
            );
            if days.is_empty() {
                assert_eq!(summary, StreakSummary::default());
            }
        }
    }

    #[test]
    fn user_streaks_follow_habit_order_and_default_to_zero() {
        let user_id = Uuid::new_v4();
        let read = Habit::new(user_id, "Read", 0);
        let run = Habit::new(user_id, "Run", 0);
        let completions = vec![
            Completion::new(read.uuid, user_id, days_ago(0)),
            Completion::new(read.uuid, user_id, days_ago(1)),
        ];
        let grouped = group_completion_instants(&completions);

        let records = compute_user_streaks(
            &[run.clone(), read.clone()],
            &grouped,
            now(),
            &ReferenceZone::Utc,
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].habit_id, run.uuid);
        assert_eq!(records[0].current_streak, 0);
        assert_eq!(records[0].longest_streak, 0);
        assert_eq!(records[1].habit_name, "Read");
        assert_eq!(records[1].current_streak, 2);
    }
}

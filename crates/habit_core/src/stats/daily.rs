use crate::calendar::{weekday_name, ReferenceZone, DAY_MS};
use crate::model::completion::Completion;
use crate::model::habit::Habit;
use crate::streak::StreakRecord;
use chrono::Weekday;
use serde::Serialize;
use std::collections::BTreeMap;

/// Trailing window used for `average_completions_per_day`.
pub const AVERAGE_WINDOW_DAYS: i64 = 30;

/// Scan order for the most-active-day tie-break.
const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Borrowed inputs for one user's statistics.
#[derive(Debug, Clone, Copy)]
pub struct StatisticsInput<'a> {
    pub habits: &'a [Habit],
    pub all_completions: &'a [Completion],
    /// Completions inside today's day window.
    pub today_completions: &'a [Completion],
    pub streaks: &'a [StreakRecord],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyStatistics {
    pub total_habits: usize,
    pub total_completions: usize,
    pub today_completions: usize,
    /// `today_completions / total_habits`, or `0.0` without habits.
    pub completion_rate: f64,
    /// Completions in the trailing 30 days divided by 30.
    pub average_completions_per_day: f64,
    /// English weekday name; `None` when there are no completions.
    pub most_active_day: Option<String>,
    pub category_breakdown: BTreeMap<String, usize>,
    pub streak_data: Vec<StreakRecord>,
}

pub fn compute_statistics(
    input: &StatisticsInput<'_>,
    now_ms: i64,
    zone: &ReferenceZone,
) -> DailyStatistics {
    let total_habits = input.habits.len();
    let today_completions = input.today_completions.len();

    let completion_rate = if total_habits > 0 {
        today_completions as f64 / total_habits as f64
    } else {
        0.0
    };

    let window_start = now_ms - AVERAGE_WINDOW_DAYS * DAY_MS;
    let recent = input
        .all_completions
        .iter()
        .filter(|completion| completion.completed_at >= window_start)
        .count();

    let mut category_breakdown = BTreeMap::new();
    for habit in input.habits {
        *category_breakdown.entry(habit.category.clone()).or_insert(0) += 1;
    }

    DailyStatistics {
        total_habits,
        total_completions: input.all_completions.len(),
        today_completions,
        completion_rate,
        average_completions_per_day: recent as f64 / AVERAGE_WINDOW_DAYS as f64,
        most_active_day: most_active_weekday(input.all_completions, zone)
            .map(|weekday| weekday_name(weekday).to_string()),
        category_breakdown,
        streak_data: input.streaks.to_vec(),
    }
}

/// Weekday with the most completions; ties go to the earliest day of a
/// Monday-first week.
pub fn most_active_weekday(completions: &[Completion], zone: &ReferenceZone) -> Option<Weekday> {
    let mut counts = [0usize; 7];
    for completion in completions {
        let weekday = zone.weekday(completion.completed_at);
        counts[weekday.num_days_from_monday() as usize] += 1;
    }

    let mut best: Option<(Weekday, usize)> = None;
    for weekday in WEEK {
        let count = counts[weekday.num_days_from_monday() as usize];
        if count == 0 {
            continue;
        }
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((weekday, count)),
        }
    }
    best.map(|(weekday, _)| weekday)
}

#[cfg(test)]
mod tests {
    use super::{compute_statistics, most_active_weekday, StatisticsInput};
    use crate::calendar::{ReferenceZone, DAY_MS};
    use crate::model::completion::Completion;
    use crate::model::habit::Habit;
    use crate::streak::StreakRecord;
    use chrono::{TimeZone, Utc, Weekday};
    use uuid::Uuid;

    fn at(y: i32, m: u32, d: u32, h: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0)
            .single()
            .expect("valid instant")
            .timestamp_millis()
    }

    fn habit(user_id: Uuid, name: &str, category: &str) -> Habit {
        let mut habit = Habit::new(user_id, name, 0);
        habit.category = category.to_string();
        habit
    }

    #[test]
    fn empty_collections_yield_finite_zeroes() {
        let stats = compute_statistics(
            &StatisticsInput {
                habits: &[],
                all_completions: &[],
                today_completions: &[],
                streaks: &[],
            },
            at(2024, 6, 15, 12),
            &ReferenceZone::Utc,
        );
        assert_eq!(stats.total_habits, 0);
        assert_eq!(stats.completion_rate, 0.0);
        assert!(stats.completion_rate.is_finite());
        assert_eq!(stats.average_completions_per_day, 0.0);
        assert_eq!(stats.most_active_day, None);
        assert!(stats.category_breakdown.is_empty());
    }

    #[test]
    fn counts_rates_and_categories() {
        let user_id = Uuid::new_v4();
        let habits = vec![
            habit(user_id, "Run", "Health"),
            habit(user_id, "Read", "Learning"),
            habit(user_id, "Stretch", "Health"),
            habit(user_id, "Journal", "Mind"),
        ];
        let now = at(2024, 6, 15, 12);
        let today = vec![Completion::new(habits[0].uuid, user_id, at(2024, 6, 15, 8))];
        let mut all = today.clone();
        all.push(Completion::new(habits[1].uuid, user_id, now - 29 * DAY_MS));
        all.push(Completion::new(habits[1].uuid, user_id, now - 30 * DAY_MS));
        all.push(Completion::new(habits[2].uuid, user_id, now - 31 * DAY_MS));
        let streaks = vec![StreakRecord {
            habit_id: habits[0].uuid,
            habit_name: "Run".to_string(),
            current_streak: 1,
            longest_streak: 4,
        }];

        let stats = compute_statistics(
            &StatisticsInput {
                habits: &habits,
                all_completions: &all,
                today_completions: &today,
                streaks: &streaks,
            },
            now,
            &ReferenceZone::Utc,
        );

        assert_eq!(stats.total_habits, 4);
        assert_eq!(stats.total_completions, 4);
        assert_eq!(stats.today_completions, 1);
        assert_eq!(stats.completion_rate, 0.25);
        // Window is inclusive of exactly 30 days ago.
        assert_eq!(stats.average_completions_per_day, 3.0 / 30.0);
        assert_eq!(stats.category_breakdown.get("Health"), Some(&2));
        assert_eq!(stats.category_breakdown.get("Learning"), Some(&1));
        assert_eq!(stats.category_breakdown.get("Mind"), Some(&1));
        assert_eq!(stats.streak_data, streaks);
    }

    #[test]
    fn most_active_day_counts_all_completions() {
        let habit_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        // 2024-06-12 is a Wednesday, 2024-06-14 a Friday.
        let completions = vec![
            Completion::new(habit_id, user_id, at(2024, 6, 12, 9)),
            Completion::new(habit_id, user_id, at(2024, 6, 12, 18)),
            Completion::new(habit_id, user_id, at(2024, 6, 5, 9)),
            Completion::new(habit_id, user_id, at(2024, 6, 14, 9)),
        ];
        assert_eq!(
            most_active_weekday(&completions, &ReferenceZone::Utc),
            Some(Weekday::Wed)
        );
    }

    #[test]
    fn most_active_day_tie_goes_to_earliest_weekday() {
        let habit_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        // Sunday 2024-06-16 inserted first, Tuesday 2024-06-11 second.
        let completions = vec![
            Completion::new(habit_id, user_id, at(2024, 6, 16, 9)),
            Completion::new(habit_id, user_id, at(2024, 6, 11, 9)),
        ];
        let stats = compute_statistics(
            &StatisticsInput {
                habits: &[],
                all_completions: &completions,
                today_completions: &[],
                streaks: &[],
            },
            at(2024, 6, 16, 12),
            &ReferenceZone::Utc,
        );
        assert_eq!(stats.most_active_day.as_deref(), Some("Tuesday"));
    }

    #[test]
    fn most_active_day_uses_reference_zone() {
        let habit_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        // Monday 23:00 UTC is Tuesday in Tokyo.
        let completions = vec![Completion::new(habit_id, user_id, at(2024, 6, 10, 23))];
        assert_eq!(
            most_active_weekday(&completions, &ReferenceZone::Utc),
            Some(Weekday::Mon)
        );
        assert_eq!(
            most_active_weekday(
                &completions,
                &ReferenceZone::Named(chrono_tz::Asia::Tokyo)
            ),
            Some(Weekday::Tue)
        );
    }
}

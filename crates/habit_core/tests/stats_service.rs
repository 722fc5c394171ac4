use habit_core::calendar::DAY_MS;
use habit_core::db::open_db_in_memory;
use habit_core::{
    CompletionService, Habit, HabitService, NewHabit, ReferenceZone, SqliteCompletionRepository,
    SqliteHabitRepository, SqliteUserRepository, StatsService, User, UserService,
};
use rusqlite::Connection;

const NOON: i64 = 1_710_504_000_000; // Friday 2024-03-15T12:00:00Z

fn stats(conn: &Connection) -> StatsService<SqliteHabitRepository<'_>, SqliteCompletionRepository<'_>> {
    StatsService::new(
        SqliteHabitRepository::try_new(conn).unwrap(),
        SqliteCompletionRepository::try_new(conn).unwrap(),
        ReferenceZone::Utc,
    )
}

fn seed_user(conn: &Connection) -> User {
    UserService::new(SqliteUserRepository::try_new(conn).unwrap(), ReferenceZone::Utc)
        .sign_in("ada@example.com", Some("Ada".to_string()), NOON - 60 * DAY_MS)
        .unwrap()
}

fn add_habit(conn: &Connection, user: &User, name: &str, category: &str, created_at: i64) -> Habit {
    HabitService::new(SqliteHabitRepository::try_new(conn).unwrap())
        .create_habit(
            NewHabit {
                user_id: user.uuid,
                name: name.to_string(),
                category: Some(category.to_string()),
                ..NewHabit::default()
            },
            created_at,
        )
        .unwrap()
}

fn complete_on(conn: &Connection, user: &User, habit: &Habit, instants: &[i64]) {
    let service = CompletionService::new(
        SqliteCompletionRepository::try_new(conn).unwrap(),
        ReferenceZone::Utc,
    );
    for &instant in instants {
        service
            .complete_habit(habit.uuid, user.uuid, instant, None)
            .unwrap();
    }
}

#[test]
fn statistics_for_a_user_without_habits_are_zeroed() {
    let conn = open_db_in_memory().unwrap();
    let user = seed_user(&conn);

    let result = stats(&conn).statistics(user.uuid, NOON).unwrap();

    assert_eq!(result.total_habits, 0);
    assert_eq!(result.total_completions, 0);
    assert_eq!(result.today_completions, 0);
    assert_eq!(result.completion_rate, 0.0);
    assert_eq!(result.average_completions_per_day, 0.0);
    assert_eq!(result.most_active_day, None);
    assert!(result.category_breakdown.is_empty());
    assert!(result.streak_data.is_empty());
}

#[test]
fn statistics_aggregate_habits_completions_and_streaks() {
    let conn = open_db_in_memory().unwrap();
    let user = seed_user(&conn);
    let run = add_habit(&conn, &user, "Run", "Health", NOON - 50 * DAY_MS);
    let read = add_habit(&conn, &user, "Read", "Mind", NOON - 45 * DAY_MS);

    // Wed 13th, Thu 14th, Fri 15th.
    complete_on(&conn, &user, &run, &[NOON - 2 * DAY_MS, NOON - DAY_MS, NOON]);
    // Thu Feb 1st (outside the 30-day window), Fri Mar 1st, Fri 15th.
    complete_on(&conn, &user, &read, &[NOON - 43 * DAY_MS, NOON - 14 * DAY_MS, NOON]);

    let result = stats(&conn).statistics(user.uuid, NOON).unwrap();

    assert_eq!(result.total_habits, 2);
    assert_eq!(result.total_completions, 6);
    assert_eq!(result.today_completions, 2);
    assert_eq!(result.completion_rate, 1.0);
    assert!((result.average_completions_per_day - 5.0 / 30.0).abs() < 1e-9);
    assert_eq!(result.most_active_day.as_deref(), Some("Friday"));
    assert_eq!(result.category_breakdown.get("Health"), Some(&1));
    assert_eq!(result.category_breakdown.get("Mind"), Some(&1));

    let streaks: Vec<_> = result
        .streak_data
        .iter()
        .map(|record| (record.habit_id, record.current_streak, record.longest_streak))
        .collect();
    assert_eq!(streaks, vec![(read.uuid, 1, 1), (run.uuid, 3, 3)]);
}

#[test]
fn completion_rate_tracks_partial_days() {
    let conn = open_db_in_memory().unwrap();
    let user = seed_user(&conn);
    let run = add_habit(&conn, &user, "Run", "Health", NOON - 10 * DAY_MS);
    add_habit(&conn, &user, "Stretch", "Health", NOON - 9 * DAY_MS);
    add_habit(&conn, &user, "Journal", "Mind", NOON - 8 * DAY_MS);
    add_habit(&conn, &user, "Floss", "Health", NOON - 7 * DAY_MS);

    complete_on(&conn, &user, &run, &[NOON]);

    let result = stats(&conn).statistics(user.uuid, NOON).unwrap();
    assert_eq!(result.completion_rate, 0.25);
    assert_eq!(result.category_breakdown.get("Health"), Some(&3));
    assert_eq!(result.category_breakdown.get("Mind"), Some(&1));
}

#[test]
fn user_streaks_break_after_a_missed_day() {
    let conn = open_db_in_memory().unwrap();
    let user = seed_user(&conn);
    let run = add_habit(&conn, &user, "Run", "Health", NOON - 20 * DAY_MS);
    let idle = add_habit(&conn, &user, "Idle", "Health", NOON - 30 * DAY_MS);

    complete_on(
        &conn,
        &user,
        &run,
        &[
            NOON - 10 * DAY_MS,
            NOON - 9 * DAY_MS,
            NOON - 8 * DAY_MS,
            NOON - 7 * DAY_MS,
            NOON - 2 * DAY_MS,
        ],
    );

    let records = stats(&conn).user_streaks(user.uuid, NOON).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].habit_id, run.uuid);
    assert_eq!(records[0].habit_name, "Run");
    assert_eq!(records[0].current_streak, 0);
    assert_eq!(records[0].longest_streak, 4);
    assert_eq!(records[1].habit_id, idle.uuid);
    assert_eq!(records[1].current_streak, 0);
    assert_eq!(records[1].longest_streak, 0);
}

//! Habit repository contract and SQLite implementation.
//!
//! # Invariants
//! - `list_habits` is ordered by `created_at DESC, uuid ASC`.
//! - Deleting a habit removes its completions (foreign-key cascade).
//! - `user_id` and `created_at` are immutable after insert.

use crate::db::ensure_connection_ready;
use crate::model::habit::{Frequency, Habit, HabitId};
use crate::model::user::UserId;
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const HABIT_SELECT_SQL: &str = "SELECT
    uuid,
    user_id,
    name,
    description,
    category,
    frequency,
    reminder_times,
    color,
    icon,
    goal,
    created_at,
    updated_at
FROM habits";

const HABIT_COLUMNS: &[&str] = &[
    "uuid",
    "user_id",
    "name",
    "description",
    "category",
    "frequency",
    "reminder_times",
    "color",
    "icon",
    "goal",
    "created_at",
    "updated_at",
];

pub trait HabitRepository {
    fn create_habit(&self, habit: &Habit) -> RepoResult<HabitId>;
    /// Replaces mutable fields of an existing habit.
    fn update_habit(&self, habit: &Habit) -> RepoResult<()>;
    fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>>;
    /// Lists a user's habits, newest first.
    fn list_habits(&self, user_id: UserId) -> RepoResult<Vec<Habit>>;
    /// Deletes a habit together with all of its completions.
    fn delete_habit(&self, id: HabitId) -> RepoResult<()>;
}

pub struct SqliteHabitRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHabitRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// Fails when the connection is not migrated to the latest schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "habits", HABIT_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl HabitRepository for SqliteHabitRepository<'_> {
    fn create_habit(&self, habit: &Habit) -> RepoResult<HabitId> {
        habit.validate()?;
        if !user_exists(self.conn, habit.user_id)? {
            return Err(RepoError::UserNotFound(habit.user_id));
        }

        self.conn.execute(
            "INSERT INTO habits (
                uuid,
                user_id,
                name,
                description,
                category,
                frequency,
                reminder_times,
                color,
                icon,
                goal,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                habit.uuid.to_string(),
                habit.user_id.to_string(),
                habit.name.as_str(),
                habit.description.as_deref(),
                habit.category.as_str(),
                habit.frequency.as_str(),
                encode_reminder_times(&habit.reminder_times)?,
                habit.color.as_str(),
                habit.icon.as_str(),
                habit.goal,
                habit.created_at,
                habit.updated_at,
            ],
        )?;

        Ok(habit.uuid)
    }

    fn update_habit(&self, habit: &Habit) -> RepoResult<()> {
        habit.validate()?;

        let changed = self.conn.execute(
            "UPDATE habits
             SET
                name = ?1,
                description = ?2,
                category = ?3,
                frequency = ?4,
                reminder_times = ?5,
                color = ?6,
                icon = ?7,
                goal = ?8,
                updated_at = ?9
             WHERE uuid = ?10;",
            params![
                habit.name.as_str(),
                habit.description.as_deref(),
                habit.category.as_str(),
                habit.frequency.as_str(),
                encode_reminder_times(&habit.reminder_times)?,
                habit.color.as_str(),
                habit.icon.as_str(),
                habit.goal,
                habit.updated_at,
                habit.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::HabitNotFound(habit.uuid));
        }
        Ok(())
    }

    fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HABIT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_habit_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_habits(&self, user_id: UserId) -> RepoResult<Vec<Habit>> {
        let mut stmt = self.conn.prepare(&format!(
            "{HABIT_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY created_at DESC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([user_id.to_string()])?;
        let mut habits = Vec::new();
        while let Some(row) = rows.next()? {
            habits.push(parse_habit_row(row)?);
        }
        Ok(habits)
    }

    fn delete_habit(&self, id: HabitId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM habits WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::HabitNotFound(id));
        }
        Ok(())
    }
}

pub(crate) fn user_exists(conn: &Connection, user_id: UserId) -> RepoResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM users WHERE uuid = ?1;",
            [user_id.to_string()],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn encode_reminder_times(times: &[String]) -> RepoResult<String> {
    serde_json::to_string(times)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode reminder times: {err}")))
}

fn parse_habit_row(row: &Row<'_>) -> RepoResult<Habit> {
    let uuid_text: String = row.get("uuid")?;
    let user_text: String = row.get("user_id")?;

    let frequency_text: String = row.get("frequency")?;
    let frequency = Frequency::parse(&frequency_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid frequency `{frequency_text}` in habits.frequency"
        ))
    })?;

    let reminders_text: String = row.get("reminder_times")?;
    let reminder_times: Vec<String> = serde_json::from_str(&reminders_text).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid reminder list `{reminders_text}` in habits.reminder_times: {err}"
        ))
    })?;

    let habit = Habit {
        uuid: parse_uuid(&uuid_text, "habits.uuid")?,
        user_id: parse_uuid(&user_text, "habits.user_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        category: row.get("category")?,
        frequency,
        reminder_times,
        color: row.get("color")?,
        icon: row.get("icon")?,
        goal: row.get("goal")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    habit.validate()?;
    Ok(habit)
}

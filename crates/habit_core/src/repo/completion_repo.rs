//! Completion repository contract and SQLite implementation.
//!
//! # Invariants
//! - Creates never deduplicate: two inserts for the same habit/day both
//!   succeed, and readers collapse them by calendar day.
//! - List results are ordered by `completed_at DESC, uuid ASC`.
//! - Ranges are inclusive on both ends.

use crate::calendar::InstantRange;
use crate::db::ensure_connection_ready;
use crate::model::completion::{Completion, CompletionId};
use crate::model::habit::HabitId;
use crate::model::user::UserId;
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const COMPLETION_SELECT_SQL: &str = "SELECT
    uuid,
    habit_id,
    user_id,
    completed_at,
    notes
FROM completions";

const COMPLETION_COLUMNS: &[&str] = &["uuid", "habit_id", "user_id", "completed_at", "notes"];

pub trait CompletionRepository {
    fn create_completion(&self, completion: &Completion) -> RepoResult<CompletionId>;
    fn delete_completion(&self, id: CompletionId) -> RepoResult<()>;
    /// Deletes every listed completion in one transaction.
    ///
    /// Ids that are already gone are skipped; returns the number removed.
    fn delete_completions(&self, ids: &[CompletionId]) -> RepoResult<usize>;
    /// Owner of `habit_id`, or `None` when the habit does not exist.
    fn habit_owner(&self, habit_id: HabitId) -> RepoResult<Option<UserId>>;
    /// Completions of one habit, optionally restricted to `range`.
    fn list_habit_completions(
        &self,
        habit_id: HabitId,
        range: Option<InstantRange>,
    ) -> RepoResult<Vec<Completion>>;
    /// Completions of every habit owned by `user_id`, optionally restricted to `range`.
    fn list_user_completions(
        &self,
        user_id: UserId,
        range: Option<InstantRange>,
    ) -> RepoResult<Vec<Completion>>;
}

pub struct SqliteCompletionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCompletionRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "completions", COMPLETION_COLUMNS)?;
        Ok(Self { conn })
    }

    fn list_where(
        &self,
        column: &'static str,
        id: String,
        range: Option<InstantRange>,
    ) -> RepoResult<Vec<Completion>> {
        let mut sql = format!("{COMPLETION_SELECT_SQL} WHERE {column} = ?");
        let mut bind_values = vec![Value::Text(id)];

        if let Some(range) = range {
            sql.push_str(" AND completed_at >= ? AND completed_at <= ?");
            bind_values.push(Value::Integer(range.start_ms));
            bind_values.push(Value::Integer(range.end_ms));
        }
        sql.push_str(" ORDER BY completed_at DESC, uuid ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut completions = Vec::new();
        while let Some(row) = rows.next()? {
            completions.push(parse_completion_row(row)?);
        }
        Ok(completions)
    }
}

impl CompletionRepository for SqliteCompletionRepository<'_> {
    fn create_completion(&self, completion: &Completion) -> RepoResult<CompletionId> {
        completion.validate()?;

        match self.habit_owner(completion.habit_id)? {
            None => return Err(RepoError::HabitNotFound(completion.habit_id)),
            Some(owner) if owner != completion.user_id => {
                return Err(RepoError::OwnershipMismatch {
                    habit_id: completion.habit_id,
                    user_id: completion.user_id,
                });
            }
            Some(_) => {}
        }

        self.conn.execute(
            "INSERT INTO completions (
                uuid,
                habit_id,
                user_id,
                completed_at,
                notes
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                completion.uuid.to_string(),
                completion.habit_id.to_string(),
                completion.user_id.to_string(),
                completion.completed_at,
                completion.notes.as_deref(),
            ],
        )?;

        Ok(completion.uuid)
    }

    fn delete_completion(&self, id: CompletionId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM completions WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::CompletionNotFound(id));
        }
        Ok(())
    }

    fn delete_completions(&self, ids: &[CompletionId]) -> RepoResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut removed = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM completions WHERE uuid = ?1;")?;
            for id in ids {
                removed += stmt.execute([id.to_string()])?;
            }
        }
        tx.commit()?;
        Ok(removed)
    }

    fn habit_owner(&self, habit_id: HabitId) -> RepoResult<Option<UserId>> {
        let owner: Option<String> = self
            .conn
            .query_row(
                "SELECT user_id FROM habits WHERE uuid = ?1;",
                [habit_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        owner
            .map(|text| parse_uuid(&text, "habits.user_id"))
            .transpose()
    }

    fn list_habit_completions(
        &self,
        habit_id: HabitId,
        range: Option<InstantRange>,
    ) -> RepoResult<Vec<Completion>> {
        self.list_where("habit_id", habit_id.to_string(), range)
    }

    fn list_user_completions(
        &self,
        user_id: UserId,
        range: Option<InstantRange>,
    ) -> RepoResult<Vec<Completion>> {
        self.list_where("user_id", user_id.to_string(), range)
    }
}

fn parse_completion_row(row: &Row<'_>) -> RepoResult<Completion> {
    let uuid_text: String = row.get("uuid")?;
    let habit_text: String = row.get("habit_id")?;
    let user_text: String = row.get("user_id")?;

    let completion = Completion {
        uuid: parse_uuid(&uuid_text, "completions.uuid")?,
        habit_id: parse_uuid(&habit_text, "completions.habit_id")?,
        user_id: parse_uuid(&user_text, "completions.user_id")?,
        completed_at: row.get("completed_at")?,
        notes: row.get("notes")?,
    };
    completion.validate()?;
    Ok(completion)
}

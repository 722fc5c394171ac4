//! User and settings repository contract and SQLite implementation.
//!
//! # Invariants
//! - A user row and its settings row are created in one transaction.
//! - `email` is unique; a second insert reports `DuplicateEmail`.

use crate::db::ensure_connection_ready;
use crate::model::user::{NotificationPreferences, Theme, User, UserId, UserSettings};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, ErrorCode, Row};

const USER_SELECT_SQL: &str = "SELECT uuid, email, name, avatar, created_at FROM users";
const SETTINGS_SELECT_SQL: &str = "SELECT
    user_id,
    reminders,
    streak_alerts,
    motivational_messages,
    theme,
    timezone
FROM user_settings";

const USER_COLUMNS: &[&str] = &["uuid", "email", "name", "avatar", "created_at"];

pub trait UserRepository {
    /// Inserts a user together with its initial settings.
    fn create_user(&self, user: &User, settings: &UserSettings) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    /// Updates profile fields (`name`, `avatar`).
    fn update_user(&self, user: &User) -> RepoResult<()>;
    fn get_settings(&self, user_id: UserId) -> RepoResult<Option<UserSettings>>;
    fn update_settings(&self, settings: &UserSettings) -> RepoResult<()>;
}

pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "users", USER_COLUMNS)?;
        Ok(Self { conn })
    }

    fn query_one_user(&self, filter: &str, value: String) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE {filter} = ?1;"))?;
        let mut rows = stmt.query([value])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row)?)),
            None => Ok(None),
        }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User, settings: &UserSettings) -> RepoResult<UserId> {
        user.validate()?;
        if settings.user_id != user.uuid {
            return Err(RepoError::InvalidData(format!(
                "settings for {} cannot be attached to user {}",
                settings.user_id, user.uuid
            )));
        }

        let tx = self.conn.unchecked_transaction()?;
        let inserted = tx.execute(
            "INSERT INTO users (uuid, email, name, avatar, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                user.uuid.to_string(),
                user.email.as_str(),
                user.name.as_deref(),
                user.avatar.as_deref(),
                user.created_at,
            ],
        );
        if let Err(err) = inserted {
            return Err(match err.sqlite_error_code() {
                Some(ErrorCode::ConstraintViolation) => RepoError::DuplicateEmail(user.email.clone()),
                _ => err.into(),
            });
        }

        tx.execute(
            "INSERT INTO user_settings (
                user_id,
                reminders,
                streak_alerts,
                motivational_messages,
                theme,
                timezone
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                settings.user_id.to_string(),
                settings.notifications.reminders,
                settings.notifications.streak_alerts,
                settings.notifications.motivational_messages,
                settings.theme.as_str(),
                settings.timezone.as_str(),
            ],
        )?;
        tx.commit()?;

        Ok(user.uuid)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.query_one_user("uuid", id.to_string())
    }

    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.query_one_user("email", email.trim().to_string())
    }

    fn update_user(&self, user: &User) -> RepoResult<()> {
        user.validate()?;
        let changed = self.conn.execute(
            "UPDATE users SET name = ?1, avatar = ?2 WHERE uuid = ?3;",
            params![
                user.name.as_deref(),
                user.avatar.as_deref(),
                user.uuid.to_string()
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::UserNotFound(user.uuid));
        }
        Ok(())
    }

    fn get_settings(&self, user_id: UserId) -> RepoResult<Option<UserSettings>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SETTINGS_SELECT_SQL} WHERE user_id = ?1;"))?;
        let mut rows = stmt.query([user_id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_settings_row(row)?)),
            None => Ok(None),
        }
    }

    fn update_settings(&self, settings: &UserSettings) -> RepoResult<()> {
        settings
            .reference_zone()
            .map_err(|err| RepoError::InvalidData(err.to_string()))?;

        let changed = self.conn.execute(
            "UPDATE user_settings
             SET
                reminders = ?1,
                streak_alerts = ?2,
                motivational_messages = ?3,
                theme = ?4,
                timezone = ?5
             WHERE user_id = ?6;",
            params![
                settings.notifications.reminders,
                settings.notifications.streak_alerts,
                settings.notifications.motivational_messages,
                settings.theme.as_str(),
                settings.timezone.as_str(),
                settings.user_id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::UserNotFound(settings.user_id));
        }
        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let uuid_text: String = row.get("uuid")?;
    let user = User {
        uuid: parse_uuid(&uuid_text, "users.uuid")?,
        email: row.get("email")?,
        name: row.get("name")?,
        avatar: row.get("avatar")?,
        created_at: row.get("created_at")?,
    };
    user.validate()?;
    Ok(user)
}

fn parse_settings_row(row: &Row<'_>) -> RepoResult<UserSettings> {
    let user_text: String = row.get("user_id")?;
    let theme_text: String = row.get("theme")?;
    let theme = Theme::parse(&theme_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid theme `{theme_text}` in user_settings.theme"))
    })?;

    Ok(UserSettings {
        user_id: parse_uuid(&user_text, "user_settings.user_id")?,
        notifications: NotificationPreferences {
            reminders: row.get("reminders")?,
            streak_alerts: row.get("streak_alerts")?,
            motivational_messages: row.get("motivational_messages")?,
        },
        theme,
        timezone: row.get("timezone")?,
    })
}

//! Store contracts and their SQLite implementations.
//!
//! # Responsibility
//! - Define the data access traits the services and engine depend on.
//! - Keep SQL details behind the persistence boundary.
//!
//! # Invariants
//! - Writes call the record's `validate()` before any SQL mutation, so
//!   malformed instants never reach streak computation.
//! - Reads reject corrupt persisted rows instead of masking them.
//! - Semantic misses are reported as `*NotFound`, never as SQL errors.

use crate::db::DbError;
use crate::model::completion::CompletionId;
use crate::model::habit::HabitId;
use crate::model::user::UserId;
use crate::model::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod completion_repo;
pub mod habit_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    HabitNotFound(HabitId),
    CompletionNotFound(CompletionId),
    UserNotFound(UserId),
    /// Completion user differs from the habit owner.
    OwnershipMismatch { habit_id: HabitId, user_id: UserId },
    DuplicateEmail(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::HabitNotFound(id) => write!(f, "habit not found: {id}"),
            Self::CompletionNotFound(id) => write!(f, "completion not found: {id}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::OwnershipMismatch { habit_id, user_id } => {
                write!(f, "habit {habit_id} is not owned by user {user_id}")
            }
            Self::DuplicateEmail(email) => write!(f, "a user with email `{email}` already exists"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<uuid::Uuid> {
    uuid::Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

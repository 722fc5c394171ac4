//! Validation errors shared by all domain records.

use chrono::DateTime;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Invariant violation detected by a record's `validate()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyHabitName,
    EmptyCategory,
    EmptyIcon,
    InvalidColor(String),
    InvalidReminderTime(String),
    ZeroGoal,
    UpdatedBeforeCreated { created_at: i64, updated_at: i64 },
    InvalidInstant { field: &'static str, value: i64 },
    InvalidEmail(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyHabitName => write!(f, "habit name must not be empty"),
            Self::EmptyCategory => write!(f, "habit category must not be empty"),
            Self::EmptyIcon => write!(f, "habit icon must not be empty"),
            Self::InvalidColor(value) => {
                write!(f, "habit color is invalid: `{value}` (expected #RRGGBB)")
            }
            Self::InvalidReminderTime(value) => {
                write!(f, "reminder time is invalid: `{value}` (expected HH:MM)")
            }
            Self::ZeroGoal => write!(f, "habit goal must be greater than zero"),
            Self::UpdatedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({updated_at}) must not be earlier than created_at ({created_at})"
            ),
            Self::InvalidInstant { field, value } => {
                write!(f, "{field} is not a valid epoch-ms instant: {value}")
            }
            Self::InvalidEmail(value) => write!(f, "email is invalid: `{value}`"),
        }
    }
}

impl Error for ValidationError {}

/// Rejects negative instants and instants outside the calendar range.
pub(crate) fn ensure_valid_instant(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value < 0 || DateTime::from_timestamp_millis(value).is_none() {
        return Err(ValidationError::InvalidInstant { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ensure_valid_instant, ValidationError};

    #[test]
    fn rejects_negative_and_out_of_range_instants() {
        assert!(ensure_valid_instant("completed_at", 0).is_ok());
        assert_eq!(
            ensure_valid_instant("completed_at", -1),
            Err(ValidationError::InvalidInstant {
                field: "completed_at",
                value: -1
            })
        );
        assert!(ensure_valid_instant("completed_at", i64::MAX).is_err());
    }
}

//! Calendar-day arithmetic for completion instants.
//!
//! # Responsibility
//! - Map epoch-millisecond instants onto calendar days of a reference zone.
//! - Provide the day windows used by "today" queries and the toggle contract.
//!
//! # Invariants
//! - `start_of_day` is idempotent and monotonic for every zone.
//! - Day identity is always a calendar date, never a millisecond quotient.

mod day;

pub use day::{
    end_of_day, now_ms, start_of_day, weekday_name, CalendarError, InstantRange, ReferenceZone,
    DAY_MS, END_OF_DAY_OFFSET_MS,
};

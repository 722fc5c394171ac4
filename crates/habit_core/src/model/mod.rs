//! Domain records for habits, completions and users.
//!
//! # Responsibility
//! - Define the canonical shapes persisted by stores and read by the engine.
//! - Own write-time validation so every store enforces the same rules.
//!
//! # Invariants
//! - Every record is identified by a stable UUID that is never reused.
//! - Instants are epoch milliseconds (UTC) and never negative.

pub mod completion;
pub mod habit;
pub mod user;
pub mod validation;

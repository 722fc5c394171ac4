//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into habit-tracker use cases.
//! - Feed fetched data into the pure streak and statistics builders.
//!
//! # Invariants
//! - Services never read the wall clock; `now_ms` is always a parameter.
//! - Services stay storage-agnostic and only see repository traits.

pub mod completion_service;
pub mod habit_service;
pub mod stats_service;
pub mod user_service;

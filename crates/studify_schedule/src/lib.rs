// --- File: crates/studify_schedule/src/lib.rs ---
// Declare modules within this crate
pub mod occurrence;
pub mod reminder;
#[cfg(test)]
mod reminder_test;
#[cfg(test)]
mod schedule_proptest;

pub use occurrence::{parse_session_time, upcoming_occurrences, DEFAULT_HORIZON_DAYS};
pub use reminder::{fire_decision, fire_instant, ReminderDecision};

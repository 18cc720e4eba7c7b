//! Database integration for Studify
//!
//! This crate provides a database client that is designed to be database
//! agnostic, using SQLx as the underlying database library. It supports
//! SQLite, PostgreSQL, and MySQL databases through feature flags, and hosts
//! the SQL repositories for the device registry, the SMS send log, the
//! sent-reminder dedup keys, and the read-only enrollment view.

pub mod client;
pub mod error;
pub mod factory;
pub mod repositories;

// Re-export the client and factory for ease of use
pub use client::DbClient;
pub use error::DbError;
pub use factory::DbClientFactory;

// Re-export the repositories module components for ease of use
pub use repositories::{
    DeviceRegistrationRepository, SentReminderRepository, SmsLogRepository, SmsSendLog,
    SqlDeviceRegistrationRepository, SqlEnrollmentRepository, SqlSentReminderRepository,
    SqlSmsLogRepository,
};

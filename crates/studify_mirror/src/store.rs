// --- File: crates/studify_mirror/src/store.rs ---
//! Seams between the mirror scheduler and the device it runs on: the durable
//! bookkeeping store and the OS notification timer queue.
//!
//! Both traits are synchronous. The scheduler runs single-threaded on the
//! device's own event loop, which serializes triggers; there is no concurrent
//! access to either side.

use crate::entry::ScheduledMirrorEntry;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

/// Mirror-specific error types.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Error from the durable bookkeeping store
    #[error("Mirror store error: {0}")]
    StoreError(String),

    /// Error from the OS timer queue
    #[error("Timer queue error: {0}")]
    TimerError(String),
}

/// Durable record of which reminders this device has handed to its OS.
pub trait MirrorStore {
    fn entries(&self) -> Result<Vec<ScheduledMirrorEntry>, MirrorError>;

    /// Insert or overwrite by identifier (identifiers are dedup keys).
    fn insert(&mut self, entry: ScheduledMirrorEntry) -> Result<(), MirrorError>;

    fn remove(&mut self, identifier: &str) -> Result<bool, MirrorError>;

    /// Remove every entry whose identifier starts with `prefix`; returns the
    /// number removed.
    fn remove_by_prefix(&mut self, prefix: &str) -> Result<usize, MirrorError>;

    /// Remove everything; returns the number removed.
    fn clear(&mut self) -> Result<usize, MirrorError>;
}

/// The device's own OS-level notification timer queue.
pub trait OsTimerQueue {
    /// Ask the OS to fire a notification at `entry.fire_at`, keyed by the
    /// entry's identifier. Scheduling an identifier that is already queued
    /// replaces the earlier timer.
    fn schedule(
        &mut self,
        entry: &ScheduledMirrorEntry,
        title: &str,
        body: &str,
    ) -> Result<(), MirrorError>;

    fn cancel(&mut self, identifier: &str) -> Result<bool, MirrorError>;

    fn cancel_by_prefix(&mut self, prefix: &str) -> Result<usize, MirrorError>;

    fn cancel_all(&mut self) -> Result<usize, MirrorError>;

    /// Identifiers the OS reports as still queued. The OS may have dropped
    /// some (app update, reinstall, system cleanup); reconciliation compares
    /// this against the durable record.
    fn pending_identifiers(&self) -> Result<Vec<String>, MirrorError>;
}

/// In-memory mirror store for tests and host apps without their own storage.
#[derive(Debug, Default)]
pub struct MemoryMirrorStore {
    entries: BTreeMap<String, ScheduledMirrorEntry>,
}

impl MemoryMirrorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MirrorStore for MemoryMirrorStore {
    fn entries(&self) -> Result<Vec<ScheduledMirrorEntry>, MirrorError> {
        Ok(self.entries.values().cloned().collect())
    }

    fn insert(&mut self, entry: ScheduledMirrorEntry) -> Result<(), MirrorError> {
        self.entries.insert(entry.identifier.clone(), entry);
        Ok(())
    }

    fn remove(&mut self, identifier: &str) -> Result<bool, MirrorError> {
        Ok(self.entries.remove(identifier).is_some())
    }

    fn remove_by_prefix(&mut self, prefix: &str) -> Result<usize, MirrorError> {
        let doomed: Vec<String> = self
            .entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        for key in &doomed {
            self.entries.remove(key);
        }
        Ok(doomed.len())
    }

    fn clear(&mut self) -> Result<usize, MirrorError> {
        let count = self.entries.len();
        self.entries.clear();
        Ok(count)
    }
}

/// In-memory timer queue for tests and host apps.
///
/// `forget` simulates the OS silently dropping a queued timer, which is what
/// reconciliation exists to detect.
#[derive(Debug, Default)]
pub struct MemoryTimerQueue {
    pending: BTreeMap<String, DateTime<Utc>>,
}

impl MemoryTimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a queued timer without going through cancel, as the OS might.
    pub fn forget(&mut self, identifier: &str) {
        self.pending.remove(identifier);
    }
}

impl OsTimerQueue for MemoryTimerQueue {
    fn schedule(
        &mut self,
        entry: &ScheduledMirrorEntry,
        _title: &str,
        _body: &str,
    ) -> Result<(), MirrorError> {
        self.pending.insert(entry.identifier.clone(), entry.fire_at);
        Ok(())
    }

    fn cancel(&mut self, identifier: &str) -> Result<bool, MirrorError> {
        Ok(self.pending.remove(identifier).is_some())
    }

    fn cancel_by_prefix(&mut self, prefix: &str) -> Result<usize, MirrorError> {
        let doomed: Vec<String> = self
            .pending
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        for key in &doomed {
            self.pending.remove(key);
        }
        Ok(doomed.len())
    }

    fn cancel_all(&mut self) -> Result<usize, MirrorError> {
        let count = self.pending.len();
        self.pending.clear();
        Ok(count)
    }

    fn pending_identifiers(&self) -> Result<Vec<String>, MirrorError> {
        Ok(self.pending.keys().cloned().collect())
    }
}

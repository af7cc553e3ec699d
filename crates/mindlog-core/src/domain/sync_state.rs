//! Synchronization state
//!
//! Only `enabled` and `last_sync` survive a restart; the local store owns
//! those. The rest lives in memory for the lifetime of the synchronizer.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Observable status of the synchronizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Idle,
    Syncing,
    IdleWithError,
}

/// Snapshot of the synchronizer's state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncState {
    pub enabled: bool,
    pub in_progress: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl SyncState {
    /// Derives the status from the flags
    pub fn status(&self) -> SyncStatus {
        if self.in_progress {
            SyncStatus::Syncing
        } else if self.last_error.is_some() {
            SyncStatus::IdleWithError
        } else {
            SyncStatus::Idle
        }
    }
}

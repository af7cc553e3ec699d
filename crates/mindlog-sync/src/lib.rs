//! MindLog Sync - pushes the local diary to the backend
//!
//! Provides:
//! - A single-flight sync pass with per-record fallback
//! - Timer, startup, catch-up and manual triggers
//!
//! ## Modules
//!
//! - [`engine`] - The [`Synchronizer`](engine::Synchronizer) and its pass outcome
//! - [`scheduler`] - The [`AutoSyncScheduler`](scheduler::AutoSyncScheduler) run loop

pub mod engine;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

use thiserror::Error;

use mindlog_core::ports::RemoteError;
use mindlog_core::usecases::StoreError;

/// Errors that fail a sync pass
#[derive(Debug, Error)]
pub enum SyncError {
    /// Reading or writing the local store failed
    #[error("local store error: {0}")]
    Store(#[from] StoreError),

    /// No username has been set on this device
    #[error("no current user; run 'mindlog user set <name>' first")]
    NoCurrentUser,

    /// The backend could not resolve or create the user row
    #[error("could not resolve remote user id for '{0}'")]
    IdentityUnresolved(String),

    /// The bulk upsert failed and every per-record retry failed as well
    #[error("all {total} entries failed to sync: {source}")]
    AllEntriesFailed {
        total: usize,
        #[source]
        source: RemoteError,
    },
}

pub use engine::{SyncOutcome, SyncReport, Synchronizer};
pub use scheduler::{AutoSyncScheduler, SchedulerHandle, SyncTrigger};

//! Diary synchronization engine
//!
//! The [`Synchronizer`] pushes the local diary collection to the backend.
//!
//! ## Sync Flow
//!
//! 1. **Identity**: resolve the remote user id; local-only mode skips the pass
//! 2. **Read**: load and normalize the local collection
//! 3. **Push**: one bulk upsert on the `id` conflict key, falling back to
//!    record-by-record upserts when the batch is rejected
//! 4. **Bookkeeping**: persist the last-sync time, then push pending consent
//!    records (a consent failure does not fail the pass)
//!
//! At most one pass runs at a time. A pass requested while another one is
//! running returns [`SyncOutcome::AlreadyRunning`] without doing anything.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use mindlog_core::domain::{SyncState, UserId};
use mindlog_core::ports::{DiaryUpsert, IRemoteGateway};
use mindlog_core::usecases::{IdentityResolver, LocalStore};

use crate::SyncError;

// ============================================================================
// SyncReport / SyncOutcome
// ============================================================================

/// Summary of a completed sync pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Entries in the local collection
    pub total: usize,
    /// Entries the backend accepted
    pub synced: usize,
    /// The bulk upsert failed and entries were pushed one at a time
    pub fell_back: bool,
    /// Consent records sent after the diary step
    pub consents_pushed: usize,
    /// Why the consent push failed, if it did
    pub consent_error: Option<String>,
    /// Wall-clock duration of the pass in milliseconds
    pub duration_ms: u64,
}

impl SyncReport {
    /// Human-readable one-line summary
    pub fn message(&self) -> String {
        if self.total == 0 {
            "no entries to sync".to_string()
        } else if self.fell_back {
            format!("{}/{} entries synced", self.synced, self.total)
        } else {
            format!("{} entries synced", self.synced)
        }
    }
}

/// Result of asking the synchronizer for a pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The pass ran to completion
    Completed(SyncReport),
    /// Local-only mode: nothing was sent and the timestamp is untouched
    Skipped,
    /// Another pass was already running
    AlreadyRunning,
}

impl SyncOutcome {
    pub fn message(&self) -> String {
        match self {
            SyncOutcome::Completed(report) => report.message(),
            SyncOutcome::Skipped => "local-only mode, nothing to sync".to_string(),
            SyncOutcome::AlreadyRunning => "a sync is already in progress".to_string(),
        }
    }
}

// ============================================================================
// Single-flight guard
// ============================================================================

/// Holds the in-progress flag for the duration of one pass
///
/// Dropping the guard clears the flag, whichever way the pass ended.
struct PassGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> PassGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// ============================================================================
// Synchronizer
// ============================================================================

/// Pushes local diary entries to the backend, one pass at a time
pub struct Synchronizer {
    store: LocalStore,
    gateway: Arc<dyn IRemoteGateway + Send + Sync>,
    resolver: IdentityResolver,
    in_progress: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl Synchronizer {
    pub fn new(store: LocalStore, gateway: Arc<dyn IRemoteGateway + Send + Sync>) -> Self {
        let resolver = IdentityResolver::new(Arc::clone(&gateway));
        Self {
            store,
            gateway,
            resolver,
            in_progress: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Returns true while a pass is running
    pub fn is_syncing(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Error of the most recent pass, cleared by the next successful one
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Snapshot of the persisted and transient sync state
    pub async fn state(&self) -> Result<SyncState, SyncError> {
        Ok(SyncState {
            enabled: self.store.is_auto_sync_enabled().await?,
            in_progress: self.is_syncing(),
            last_sync: self.store.last_sync().await?,
            last_error: self.last_error(),
        })
    }

    /// Persists the auto-sync flag
    pub async fn set_enabled(&self, enabled: bool) -> Result<(), SyncError> {
        self.store.set_auto_sync_enabled(enabled).await?;
        info!(enabled, "Auto-sync preference updated");
        Ok(())
    }

    /// Runs a pass on behalf of the user
    pub async fn trigger_manual_sync(&self) -> Result<SyncOutcome, SyncError> {
        info!("Manual sync requested");
        self.run_pass().await
    }

    /// Runs one sync pass unless another one is in progress
    ///
    /// # Errors
    /// Returns an error if the user cannot be resolved, the local store
    /// fails, or every entry was rejected by the backend
    #[tracing::instrument(skip(self))]
    pub async fn run_pass(&self) -> Result<SyncOutcome, SyncError> {
        let Some(_guard) = PassGuard::acquire(&self.in_progress) else {
            debug!("Sync already in progress, ignoring request");
            return Ok(SyncOutcome::AlreadyRunning);
        };

        let result = self.execute().await;

        let mut last_error = self
            .last_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match &result {
            Ok(_) => *last_error = None,
            Err(e) => {
                warn!(error = %e, "Sync pass failed");
                *last_error = Some(e.to_string());
            }
        }
        result
    }

    async fn execute(&self) -> Result<SyncOutcome, SyncError> {
        let start = Instant::now();

        let Some(user_id) = self.resolve_user().await? else {
            debug!("Local-only mode, skipping sync pass");
            return Ok(SyncOutcome::Skipped);
        };

        let records = self.store.load_diaries().await?;
        let mut report = SyncReport {
            total: records.len(),
            ..SyncReport::default()
        };

        if records.is_empty() {
            debug!("No local entries to push");
        } else {
            let rows: Vec<DiaryUpsert> = records
                .iter()
                .map(|record| DiaryUpsert::from_record(record, &user_id))
                .collect();
            let (synced, fell_back) = self.push_diaries(&rows).await?;
            report.synced = synced;
            report.fell_back = fell_back;
        }

        self.store.set_last_sync(Utc::now()).await?;
        self.push_consents(&mut report).await;

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            user_id = %user_id,
            synced = report.synced,
            total = report.total,
            fell_back = report.fell_back,
            consents = report.consents_pushed,
            duration_ms = report.duration_ms,
            "Sync pass completed"
        );
        Ok(SyncOutcome::Completed(report))
    }

    /// `None` means local-only mode
    async fn resolve_user(&self) -> Result<Option<UserId>, SyncError> {
        if !self.gateway.is_available() {
            return Ok(None);
        }

        let username = self
            .store
            .current_username()
            .await?
            .ok_or(SyncError::NoCurrentUser)?;

        match self.resolver.resolve(&username).await {
            Some(id) if id.is_local() => Ok(None),
            Some(id) => Ok(Some(id)),
            None => Err(SyncError::IdentityUnresolved(username.to_string())),
        }
    }

    /// Returns `(synced, fell_back)`
    async fn push_diaries(&self, rows: &[DiaryUpsert]) -> Result<(usize, bool), SyncError> {
        match self.gateway.upsert_diaries(rows).await {
            Ok(count) => return Ok((count, false)),
            Err(e) => warn!(
                error = %e,
                rows = rows.len(),
                "Bulk upsert failed, retrying entries one at a time"
            ),
        }

        let mut synced = 0;
        let mut last_failure = None;
        for row in rows {
            match self.gateway.upsert_diary(row).await {
                Ok(()) => synced += 1,
                Err(e) => {
                    warn!(entry_id = %row.id, error = %e, "Entry upsert failed");
                    last_failure = Some(e);
                }
            }
        }

        match last_failure {
            Some(source) if synced == 0 => Err(SyncError::AllEntriesFailed {
                total: rows.len(),
                source,
            }),
            _ => Ok((synced, true)),
        }
    }

    async fn push_consents(&self, report: &mut SyncReport) {
        let consents = match self.store.load_consents().await {
            Ok(consents) => consents,
            Err(e) => {
                warn!(error = %e, "Could not read local consent records");
                report.consent_error = Some(e.to_string());
                return;
            }
        };
        if consents.is_empty() {
            return;
        }

        match self.gateway.sync_consent_histories(&consents).await {
            Ok(count) => {
                debug!(count, "Consent records pushed");
                report.consents_pushed = count;
            }
            Err(e) => {
                warn!(error = %e, "Consent push failed");
                report.consent_error = Some(e.to_string());
            }
        }
    }
}

// ============================================================================
// Unit tests
// ============================================================================

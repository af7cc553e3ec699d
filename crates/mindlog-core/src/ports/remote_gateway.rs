//! Remote gateway port (driven/secondary port)
//!
//! This module defines the interface to the hosted relational backend.
//! Authorization is enforced entirely by the backend's row-level policies,
//! so nothing here checks permissions.
//!
//! ## Design Notes
//!
//! - Every operation returns [`RemoteResult`], whose error carries a
//!   [`RemoteErrorKind`]. Callers that only want "rows or nothing" use
//!   [`RemoteResultExt::or_empty`], which logs the failure and substitutes
//!   the default value.
//! - The identity resolver branches on [`RemoteErrorKind::NotFound`], so a
//!   lookup that matches no row must report that kind rather than an empty
//!   success.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    ChatMessage, ChatRoom, ConsentRecord, Counselor, DiaryRecord, EntryId, UserId, UserRecord,
    Username,
};

// ============================================================================
// Relation
// ============================================================================

/// Remote relations known to MindLog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Relation {
    Users,
    DiaryEntries,
    ConsentHistories,
    Counselors,
    ChatRooms,
    Messages,
}

impl Relation {
    /// Every relation, in the order backups list them
    pub const ALL: [Relation; 6] = [
        Relation::Users,
        Relation::DiaryEntries,
        Relation::ConsentHistories,
        Relation::Counselors,
        Relation::ChatRooms,
        Relation::Messages,
    ];

    /// Table name on the backend
    pub fn table_name(&self) -> &'static str {
        match self {
            Relation::Users => "users",
            Relation::DiaryEntries => "diary_entries",
            Relation::ConsentHistories => "consent_histories",
            Relation::Counselors => "counselors",
            Relation::ChatRooms => "chat_rooms",
            Relation::Messages => "messages",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

// ============================================================================
// RemoteError
// ============================================================================

/// Classification of a remote failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteErrorKind {
    /// No endpoint or credential configured, or offline mode is on
    NotConfigured,
    /// The lookup matched no row
    NotFound,
    /// Transport failure: DNS, connect, TLS, reset
    Network,
    /// The backend answered with an error status
    Rejected,
    /// The response body could not be decoded
    InvalidResponse,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RemoteErrorKind::NotConfigured => "not configured",
            RemoteErrorKind::NotFound => "not found",
            RemoteErrorKind::Network => "network error",
            RemoteErrorKind::Rejected => "rejected",
            RemoteErrorKind::InvalidResponse => "invalid response",
        };
        f.write_str(name)
    }
}

/// A classified remote failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Failure reported by a gateway that has no backend to talk to
    pub fn not_configured() -> Self {
        Self::new(
            RemoteErrorKind::NotConfigured,
            "remote backend is not configured",
        )
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::NotFound, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == RemoteErrorKind::NotFound
    }
}

/// Result of a remote operation
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Collapses a remote failure into an empty value
pub trait RemoteResultExt<T> {
    /// Returns the value, or logs the failure under `op` and returns `T::default()`
    fn or_empty(self, op: &str) -> T;
}

impl<T: Default> RemoteResultExt<T> for RemoteResult<T> {
    fn or_empty(self, op: &str) -> T {
        match self {
            Ok(value) => value,
            Err(e) if e.kind == RemoteErrorKind::NotConfigured => {
                tracing::debug!(op, "Remote not configured, using empty result");
                T::default()
            }
            Err(e) => {
                tracing::warn!(op, kind = %e.kind, error = %e.message, "Remote operation failed");
                T::default()
            }
        }
    }
}

// ============================================================================
// DiaryUpsert
// ============================================================================

/// Row pushed to `diary_entries` by the synchronizer
///
/// Counselor annotations are owned by the backend and are not part of the
/// push, so a bulk upsert never overwrites them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryUpsert {
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub emotion: String,
    pub event: String,
    pub realization: String,
    pub self_esteem_score: u8,
    pub worthlessness_score: u8,
    pub created_at: DateTime<Utc>,
}

impl DiaryUpsert {
    pub fn from_record(record: &DiaryRecord, user_id: &UserId) -> Self {
        Self {
            id: record.id.to_string(),
            user_id: user_id.to_string(),
            date: record.date.clone(),
            emotion: record.emotion.clone(),
            event: record.event.clone(),
            realization: record.realization.clone(),
            self_esteem_score: record.self_esteem_score,
            worthlessness_score: record.worthlessness_score,
            created_at: record.created_at,
        }
    }
}

// ============================================================================
// IRemoteGateway trait
// ============================================================================

/// Port trait for the hosted backend
#[async_trait::async_trait]
pub trait IRemoteGateway: Send + Sync {
    /// Returns true if a backend is configured and offline mode is off
    fn is_available(&self) -> bool;

    // --- Users ---

    /// Looks up a user row by username
    ///
    /// Fails with [`RemoteErrorKind::NotFound`] if no row matches.
    async fn find_user_by_username(&self, username: &Username) -> RemoteResult<UserRecord>;

    /// Inserts a user row and returns it with its server-assigned id
    async fn create_user(&self, username: &Username) -> RemoteResult<UserRecord>;

    // --- Diaries ---

    /// Diary rows owned by `user_id`, newest date first
    async fn list_diaries(&self, user_id: &UserId) -> RemoteResult<Vec<DiaryRecord>>;

    /// Bulk upsert keyed on `id`; returns the number of rows sent
    async fn upsert_diaries(&self, rows: &[DiaryUpsert]) -> RemoteResult<usize>;

    /// Upsert of a single row keyed on `id`
    async fn upsert_diary(&self, row: &DiaryUpsert) -> RemoteResult<()>;

    async fn delete_diary(&self, id: &EntryId) -> RemoteResult<()>;

    // --- Chat ---

    /// Messages of a room, oldest first
    async fn list_messages(&self, room_id: &str) -> RemoteResult<Vec<ChatMessage>>;

    /// Inserts a message and returns the stored row
    async fn send_message(&self, message: &ChatMessage) -> RemoteResult<ChatMessage>;

    async fn list_chat_rooms(&self, user_id: &UserId) -> RemoteResult<Vec<ChatRoom>>;

    async fn list_counselors(&self) -> RemoteResult<Vec<Counselor>>;

    // --- Consent ---

    /// Appends one consent record
    async fn save_consent_history(&self, record: &ConsentRecord) -> RemoteResult<()>;

    /// Pushes local consent records, ignoring ones the backend already has
    async fn sync_consent_histories(&self, records: &[ConsentRecord]) -> RemoteResult<usize>;

    /// Consent records of a user, newest consent date first
    async fn list_consent_histories(
        &self,
        username: &Username,
    ) -> RemoteResult<Vec<ConsentRecord>>;

    // --- Backup ---

    /// Every row of a relation, unfiltered
    async fn fetch_relation(&self, relation: Relation) -> RemoteResult<Vec<Value>>;
}

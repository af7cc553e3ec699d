//! Domain entities and business logic
//!
//! This module contains the core domain types for MindLog:
//! - Newtypes for validated identifiers
//! - Diary entries and their stored-shape migration
//! - Users, consent history and counseling chat records
//! - Synchronizer state
//! - The backup document
//! - Domain-specific error types

pub mod backup;
pub mod chat;
pub mod consent;
pub mod diary;
pub mod errors;
pub mod newtypes;
pub mod sync_state;
pub mod user;

// Re-export commonly used types
pub use backup::{BackupDocument, BackupMetadata};
pub use chat::{ChatMessage, ChatRoom, Counselor};
pub use consent::ConsentRecord;
pub use diary::{DiaryRecord, EntryOrigin, UrgencyLevel};
pub use errors::DomainError;
pub use newtypes::*;
pub use sync_state::{SyncState, SyncStatus};
pub use user::UserRecord;

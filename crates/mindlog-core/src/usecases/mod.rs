//! Use cases (interactors) for MindLog
//!
//! This module contains the application use cases that orchestrate
//! domain entities and port interfaces. Use cases are thin coordinators
//! that delegate business rules to domain methods and I/O to ports.
//!
//! ## Use Cases
//!
//! - [`LocalStore`] - Typed access to the local namespace
//! - [`IdentityResolver`] - Username to remote user id, with lazy creation
//! - [`BackupRestoreController`] - Full export and local restore

pub mod backup;
pub mod local_store;
pub mod resolve_identity;

pub use backup::{BackupError, BackupRestoreController, RestoreReport, RestoreScope};
pub use local_store::{LocalStore, StoreError};
pub use resolve_identity::IdentityResolver;

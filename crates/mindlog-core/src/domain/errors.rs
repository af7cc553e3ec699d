//! Domain error types
//!
//! Errors raised while constructing or validating domain values:
//! usernames, identifiers, urgency levels and chat messages.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Username is empty or otherwise unusable as an identity key
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    /// Remote user identifier is malformed
    #[error("Invalid user ID: {0}")]
    InvalidUserId(String),

    /// Diary entry identifier is malformed
    #[error("Invalid entry ID: {0}")]
    InvalidEntryId(String),

    /// Urgency level outside `high`, `medium`, `low`
    #[error("Invalid urgency level: {0}")]
    InvalidUrgency(String),

    /// A chat message violates the sender/counselor exclusivity rule
    #[error("Invalid chat message: {0}")]
    InvalidMessage(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

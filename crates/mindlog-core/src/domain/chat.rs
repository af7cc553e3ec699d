//! Counseling chat records
//!
//! These are read and written on behalf of the user but never reconciled
//! by the synchronizer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// A message in a chat room
///
/// Exactly one of `sender_id` and `counselor_id` is set, and `is_counselor`
/// tells which.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub chat_room_id: String,
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub counselor_id: Option<String>,
    pub content: String,
    pub is_counselor: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// A message written by the user
    pub fn from_user(
        room: impl Into<String>,
        sender_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            chat_room_id: room.into(),
            sender_id: Some(sender_id.into()),
            counselor_id: None,
            content: content.into(),
            is_counselor: false,
            created_at: Utc::now(),
        }
    }

    /// A message written by a counselor
    pub fn from_counselor(
        room: impl Into<String>,
        counselor_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            chat_room_id: room.into(),
            sender_id: None,
            counselor_id: Some(counselor_id.into()),
            content: content.into(),
            is_counselor: true,
            created_at: Utc::now(),
        }
    }

    /// Checks the sender/counselor exclusivity rule
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidMessage`] when both or neither sender
    /// fields are set, or when `is_counselor` disagrees with them
    pub fn validate(&self) -> Result<(), DomainError> {
        match (&self.sender_id, &self.counselor_id) {
            (Some(_), Some(_)) => Err(DomainError::InvalidMessage(
                "message has both a sender and a counselor".to_string(),
            )),
            (None, None) => Err(DomainError::InvalidMessage(
                "message has no author".to_string(),
            )),
            (_, counselor) if counselor.is_some() != self.is_counselor => {
                Err(DomainError::InvalidMessage(format!(
                    "is_counselor is {} but counselor_id is {}",
                    self.is_counselor,
                    if counselor.is_some() { "set" } else { "unset" }
                )))
            }
            _ => Ok(()),
        }
    }
}

/// A room pairing a user with a counselor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRoom {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub counselor_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A counselor row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counselor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

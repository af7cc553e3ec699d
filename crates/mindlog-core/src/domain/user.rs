//! Remote user row

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::{UserId, Username};

/// A row of the remote `users` relation
///
/// Rows are created lazily, at most once per username. The remote
/// uniqueness constraint on `username` makes creation idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: Username,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// The record that stands in for a user with no remote identity
    pub fn local(username: Username) -> Self {
        Self {
            id: UserId::local(),
            username,
            created_at: Utc::now(),
        }
    }
}

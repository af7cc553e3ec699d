//! Identity resolution use case
//!
//! Maps the client's username to the backend's user id, creating the
//! remote user row the first time it is needed.

use std::sync::Arc;

use crate::{
    domain::{UserId, Username},
    ports::{IRemoteGateway, RemoteErrorKind},
};

/// Resolves usernames to remote user ids
pub struct IdentityResolver {
    gateway: Arc<dyn IRemoteGateway + Send + Sync>,
}

impl IdentityResolver {
    pub fn new(gateway: Arc<dyn IRemoteGateway + Send + Sync>) -> Self {
        Self { gateway }
    }

    /// Resolves `username` to a user id
    ///
    /// - local-only mode: the `"local-user"` sentinel, without network access
    /// - existing row: its id
    /// - no row: a new row is created and its id returned
    /// - any other lookup failure, or a failed create: `None`
    #[tracing::instrument(skip(self), fields(username = %username))]
    pub async fn resolve(&self, username: &Username) -> Option<UserId> {
        if !self.gateway.is_available() {
            tracing::debug!("Remote unavailable, using local identity");
            return Some(UserId::local());
        }

        match self.gateway.find_user_by_username(username).await {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, "Found existing user");
                Some(user.id)
            }
            Err(e) if e.kind == RemoteErrorKind::NotFound => {
                match self.gateway.create_user(username).await {
                    Ok(user) => {
                        tracing::info!(user_id = %user.id, "Created remote user");
                        Some(user.id)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to create remote user");
                        None
                    }
                }
            }
            Err(e) if e.kind == RemoteErrorKind::NotConfigured => Some(UserId::local()),
            Err(e) => {
                tracing::warn!(error = %e, "User lookup failed");
                None
            }
        }
    }
}

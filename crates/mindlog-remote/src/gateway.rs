//! RestGateway - IRemoteGateway over PostgREST
//!
//! Maps each port operation onto one REST call against the backend
//! relations. Ordering is requested from the server with `order=`.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use mindlog_core::domain::{
    ChatMessage, ChatRoom, ConsentRecord, Counselor, DiaryRecord, EntryId, UserId, UserRecord,
    Username,
};
use mindlog_core::ports::{
    DiaryUpsert, IRemoteGateway, Relation, RemoteError, RemoteErrorKind, RemoteResult,
};

use crate::client::{Resolution, RestClient};

/// Conflict target of `diary_entries` upserts
const DIARY_CONFLICT_KEY: &str = "id";

/// Conflict target of `consent_histories` upserts
const CONSENT_CONFLICT_KEY: &str = "username,consent_date";

/// Body of a `users` insert
#[derive(Debug, Serialize)]
struct NewUser<'a> {
    username: &'a str,
}

/// `IRemoteGateway` implementation backed by a [`RestClient`]
pub struct RestGateway {
    client: RestClient,
}

impl RestGateway {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RestClient {
        &self.client
    }
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

#[async_trait::async_trait]
impl IRemoteGateway for RestGateway {
    fn is_available(&self) -> bool {
        true
    }

    // --- Users ---

    async fn find_user_by_username(&self, username: &Username) -> RemoteResult<UserRecord> {
        let rows: Vec<UserRecord> = self
            .client
            .select(
                Relation::Users.table_name(),
                &[("username", eq(username)), ("limit", "1".to_string())],
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RemoteError::not_found(format!("no user named '{username}'")))
    }

    async fn create_user(&self, username: &Username) -> RemoteResult<UserRecord> {
        let rows: Vec<UserRecord> = self
            .client
            .insert(
                Relation::Users.table_name(),
                &NewUser {
                    username: username.as_str(),
                },
            )
            .await?;
        rows.into_iter().next().ok_or_else(|| {
            RemoteError::new(
                RemoteErrorKind::InvalidResponse,
                "user insert returned no row",
            )
        })
    }

    // --- Diaries ---

    async fn list_diaries(&self, user_id: &UserId) -> RemoteResult<Vec<DiaryRecord>> {
        let rows: Vec<Value> = self
            .client
            .select(
                Relation::DiaryEntries.table_name(),
                &[("user_id", eq(user_id)), ("order", "date.desc".to_string())],
            )
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            match DiaryRecord::from_stored(row) {
                Ok(record) => records.push(record),
                Err(e) => warn!(error = %e, "Skipping unreadable diary row"),
            }
        }
        Ok(records)
    }

    async fn upsert_diaries(&self, rows: &[DiaryUpsert]) -> RemoteResult<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        self.client
            .upsert(
                Relation::DiaryEntries.table_name(),
                rows,
                DIARY_CONFLICT_KEY,
                Resolution::MergeDuplicates,
            )
            .await?;
        debug!(rows = rows.len(), "Diary batch upserted");
        Ok(rows.len())
    }

    async fn upsert_diary(&self, row: &DiaryUpsert) -> RemoteResult<()> {
        self.client
            .upsert(
                Relation::DiaryEntries.table_name(),
                row,
                DIARY_CONFLICT_KEY,
                Resolution::MergeDuplicates,
            )
            .await?;
        Ok(())
    }

    async fn delete_diary(&self, id: &EntryId) -> RemoteResult<()> {
        self.client
            .delete(Relation::DiaryEntries.table_name(), &[("id", eq(id))])
            .await?;
        Ok(())
    }

    // --- Chat ---

    async fn list_messages(&self, room_id: &str) -> RemoteResult<Vec<ChatMessage>> {
        Ok(self
            .client
            .select(
                Relation::Messages.table_name(),
                &[
                    ("chat_room_id", eq(room_id)),
                    ("order", "created_at.asc".to_string()),
                ],
            )
            .await?)
    }

    async fn send_message(&self, message: &ChatMessage) -> RemoteResult<ChatMessage> {
        message
            .validate()
            .map_err(|e| RemoteError::new(RemoteErrorKind::Rejected, e.to_string()))?;

        let rows: Vec<ChatMessage> = self
            .client
            .insert(Relation::Messages.table_name(), message)
            .await?;
        rows.into_iter().next().ok_or_else(|| {
            RemoteError::new(
                RemoteErrorKind::InvalidResponse,
                "message insert returned no row",
            )
        })
    }

    async fn list_chat_rooms(&self, user_id: &UserId) -> RemoteResult<Vec<ChatRoom>> {
        Ok(self
            .client
            .select(
                Relation::ChatRooms.table_name(),
                &[
                    ("user_id", eq(user_id)),
                    ("order", "created_at.desc".to_string()),
                ],
            )
            .await?)
    }

    async fn list_counselors(&self) -> RemoteResult<Vec<Counselor>> {
        Ok(self
            .client
            .select(
                Relation::Counselors.table_name(),
                &[
                    ("is_active", "eq.true".to_string()),
                    ("order", "name.asc".to_string()),
                ],
            )
            .await?)
    }

    // --- Consent ---

    async fn save_consent_history(&self, record: &ConsentRecord) -> RemoteResult<()> {
        let _: Vec<Value> = self
            .client
            .insert(Relation::ConsentHistories.table_name(), record)
            .await?;
        Ok(())
    }

    async fn sync_consent_histories(&self, records: &[ConsentRecord]) -> RemoteResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        self.client
            .upsert(
                Relation::ConsentHistories.table_name(),
                records,
                CONSENT_CONFLICT_KEY,
                Resolution::IgnoreDuplicates,
            )
            .await?;
        Ok(records.len())
    }

    async fn list_consent_histories(
        &self,
        username: &Username,
    ) -> RemoteResult<Vec<ConsentRecord>> {
        Ok(self
            .client
            .select(
                Relation::ConsentHistories.table_name(),
                &[
                    ("username", eq(username)),
                    ("order", "consent_date.desc".to_string()),
                ],
            )
            .await?)
    }

    // --- Backup ---

    async fn fetch_relation(&self, relation: Relation) -> RemoteResult<Vec<Value>> {
        Ok(self.client.select(relation.table_name(), &[]).await?)
    }
}

//! OfflineGateway - IRemoteGateway for local-only mode
//!
//! Reads succeed with nothing; writes and lookups fail with
//! `NotConfigured`. No operation touches the network.

use serde_json::Value;

use mindlog_core::domain::{
    ChatMessage, ChatRoom, ConsentRecord, Counselor, DiaryRecord, EntryId, UserId, UserRecord,
    Username,
};
use mindlog_core::ports::{DiaryUpsert, IRemoteGateway, Relation, RemoteError, RemoteResult};

/// Gateway used when no backend is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGateway;

#[async_trait::async_trait]
impl IRemoteGateway for OfflineGateway {
    fn is_available(&self) -> bool {
        false
    }

    async fn find_user_by_username(&self, _username: &Username) -> RemoteResult<UserRecord> {
        Err(RemoteError::not_configured())
    }

    async fn create_user(&self, _username: &Username) -> RemoteResult<UserRecord> {
        Err(RemoteError::not_configured())
    }

    async fn list_diaries(&self, _user_id: &UserId) -> RemoteResult<Vec<DiaryRecord>> {
        Ok(Vec::new())
    }

    async fn upsert_diaries(&self, _rows: &[DiaryUpsert]) -> RemoteResult<usize> {
        Err(RemoteError::not_configured())
    }

    async fn upsert_diary(&self, _row: &DiaryUpsert) -> RemoteResult<()> {
        Err(RemoteError::not_configured())
    }

    async fn delete_diary(&self, _id: &EntryId) -> RemoteResult<()> {
        Err(RemoteError::not_configured())
    }

    async fn list_messages(&self, _room_id: &str) -> RemoteResult<Vec<ChatMessage>> {
        Ok(Vec::new())
    }

    async fn send_message(&self, _message: &ChatMessage) -> RemoteResult<ChatMessage> {
        Err(RemoteError::not_configured())
    }

    async fn list_chat_rooms(&self, _user_id: &UserId) -> RemoteResult<Vec<ChatRoom>> {
        Ok(Vec::new())
    }

    async fn list_counselors(&self) -> RemoteResult<Vec<Counselor>> {
        Ok(Vec::new())
    }

    async fn save_consent_history(&self, _record: &ConsentRecord) -> RemoteResult<()> {
        Err(RemoteError::not_configured())
    }

    async fn sync_consent_histories(&self, _records: &[ConsentRecord]) -> RemoteResult<usize> {
        Err(RemoteError::not_configured())
    }

    async fn list_consent_histories(
        &self,
        _username: &Username,
    ) -> RemoteResult<Vec<ConsentRecord>> {
        Ok(Vec::new())
    }

    async fn fetch_relation(&self, _relation: Relation) -> RemoteResult<Vec<Value>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use mindlog_core::ports::{RemoteErrorKind, RemoteResultExt};

    use super::*;

    #[tokio::test]
    async fn test_reads_are_empty() {
        let gateway = OfflineGateway;
        assert!(!gateway.is_available());
        assert!(gateway.list_counselors().await.unwrap().is_empty());
        assert!(gateway
            .fetch_relation(Relation::Users)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_writes_are_not_configured() {
        let gateway = OfflineGateway;
        let user = Username::new("hanako").unwrap();

        let err = gateway.create_user(&user).await.unwrap_err();
        assert_eq!(err.kind, RemoteErrorKind::NotConfigured);

        let err = gateway.upsert_diaries(&[]).await.unwrap_err();
        assert_eq!(err.kind, RemoteErrorKind::NotConfigured);
    }

    #[tokio::test]
    async fn test_or_empty_collapses_lookup() {
        let gateway = OfflineGateway;
        let rooms = gateway
            .list_chat_rooms(&UserId::local())
            .await
            .or_empty("list_chat_rooms");
        assert!(rooms.is_empty());
    }
}

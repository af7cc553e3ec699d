//! Test doubles shared by the engine and scheduler tests

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;

use mindlog_core::domain::{
    ChatMessage, ChatRoom, ConsentRecord, Counselor, DiaryRecord, EntryId, UserId, UserRecord,
    Username,
};
use mindlog_core::ports::{
    DiaryUpsert, IKeyValueStore, IRemoteGateway, Relation, RemoteError, RemoteErrorKind,
    RemoteResult,
};
use mindlog_core::usecases::LocalStore;

// ============================================================================
// MemoryStore
// ============================================================================

#[derive(Default)]
pub(crate) struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

#[async_trait::async_trait]
impl IKeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }

    async fn keys(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.values.lock().unwrap().keys().cloned().collect())
    }

    async fn entries(&self) -> anyhow::Result<Vec<(String, String)>> {
        Ok(self
            .values
            .lock()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.values.lock().unwrap().clear();
        Ok(())
    }

    async fn replace_all(&self, entries: &[(String, String)]) -> anyhow::Result<()> {
        let mut values = self.values.lock().unwrap();
        values.clear();
        values.extend(entries.iter().cloned());
        Ok(())
    }
}

/// A local store holding `entries` diary records and, optionally, a user
pub(crate) async fn seeded_store(entries: usize, username: Option<&str>) -> LocalStore {
    let store = LocalStore::new(Arc::new(MemoryStore::default()));
    if let Some(name) = username {
        store
            .set_current_username(&Username::new(name).unwrap())
            .await
            .unwrap();
    }
    let records: Vec<DiaryRecord> = (0..entries)
        .map(|i| DiaryRecord::new("anxiety", format!("event {i}"), "", 40, 60))
        .collect();
    if !records.is_empty() {
        store.save_diaries(&records).await.unwrap();
    }
    store
}

// ============================================================================
// ScriptedGateway
// ============================================================================

/// Gateway whose diary and consent writes can be told to fail
#[derive(Default)]
pub(crate) struct ScriptedGateway {
    pub available: bool,
    pub lookup_error: Option<RemoteErrorKind>,
    pub fail_batch: bool,
    /// Entry ids whose single-record upsert fails
    pub failing_ids: HashSet<String>,
    pub fail_consents: bool,
    /// Time the batch upsert takes
    pub batch_delay: Duration,
    pub lookups: AtomicUsize,
    pub batch_calls: AtomicUsize,
    pub record_calls: AtomicUsize,
    pub consent_calls: AtomicUsize,
    pub pushed: Mutex<Vec<DiaryUpsert>>,
}

impl ScriptedGateway {
    pub(crate) fn online() -> Self {
        Self {
            available: true,
            ..Default::default()
        }
    }

    pub(crate) fn offline() -> Self {
        Self::default()
    }

    pub(crate) fn batches(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn single_upserts(&self) -> usize {
        self.record_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn fail(kind: RemoteErrorKind) -> RemoteError {
        RemoteError::new(kind, "scripted failure")
    }
}

#[async_trait::async_trait]
impl IRemoteGateway for ScriptedGateway {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn find_user_by_username(&self, username: &Username) -> RemoteResult<UserRecord> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(kind) = self.lookup_error {
            return Err(Self::fail(kind));
        }
        Ok(UserRecord {
            id: UserId::new("user-1").unwrap(),
            username: username.clone(),
            created_at: Utc::now(),
        })
    }

    async fn create_user(&self, _username: &Username) -> RemoteResult<UserRecord> {
        Err(Self::fail(RemoteErrorKind::Rejected))
    }

    async fn list_diaries(&self, _user_id: &UserId) -> RemoteResult<Vec<DiaryRecord>> {
        Ok(Vec::new())
    }

    async fn upsert_diaries(&self, rows: &[DiaryUpsert]) -> RemoteResult<usize> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if !self.batch_delay.is_zero() {
            tokio::time::sleep(self.batch_delay).await;
        }
        if self.fail_batch {
            return Err(Self::fail(RemoteErrorKind::Rejected));
        }
        self.pushed.lock().unwrap().extend_from_slice(rows);
        Ok(rows.len())
    }

    async fn upsert_diary(&self, row: &DiaryUpsert) -> RemoteResult<()> {
        self.record_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_ids.contains(&row.id) {
            return Err(Self::fail(RemoteErrorKind::Rejected));
        }
        self.pushed.lock().unwrap().push(row.clone());
        Ok(())
    }

    async fn delete_diary(&self, _id: &EntryId) -> RemoteResult<()> {
        Ok(())
    }

    async fn list_messages(&self, _room_id: &str) -> RemoteResult<Vec<ChatMessage>> {
        Ok(Vec::new())
    }

    async fn send_message(&self, message: &ChatMessage) -> RemoteResult<ChatMessage> {
        Ok(message.clone())
    }

    async fn list_chat_rooms(&self, _user_id: &UserId) -> RemoteResult<Vec<ChatRoom>> {
        Ok(Vec::new())
    }

    async fn list_counselors(&self) -> RemoteResult<Vec<Counselor>> {
        Ok(Vec::new())
    }

    async fn save_consent_history(&self, _record: &ConsentRecord) -> RemoteResult<()> {
        Ok(())
    }

    async fn sync_consent_histories(&self, records: &[ConsentRecord]) -> RemoteResult<usize> {
        self.consent_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_consents {
            return Err(Self::fail(RemoteErrorKind::Network));
        }
        Ok(records.len())
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

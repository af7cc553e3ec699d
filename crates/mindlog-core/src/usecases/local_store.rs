//! Typed access to the local namespace
//!
//! Wraps an [`IKeyValueStore`] with the key names and value encodings used
//! by every MindLog client. Diary entries pass through
//! [`DiaryRecord::from_stored`] on every read, so callers only ever see
//! normalized records.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::{
    domain::{ConsentRecord, DiaryRecord, Username},
    ports::{keys, IKeyValueStore},
};

/// Errors raised by [`LocalStore`]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying store failed
    #[error("Local storage error: {0}")]
    Storage(#[from] anyhow::Error),

    /// A collection key holds something other than a JSON array
    #[error("Corrupt value under '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}

/// Typed accessor over the local key-value namespace
#[derive(Clone)]
pub struct LocalStore {
    kv: Arc<dyn IKeyValueStore + Send + Sync>,
    auto_sync_default: bool,
}

impl LocalStore {
    pub fn new(kv: Arc<dyn IKeyValueStore + Send + Sync>) -> Self {
        Self {
            kv,
            auto_sync_default: true,
        }
    }

    /// Sets the auto-sync flag reported when none has been persisted
    pub fn with_auto_sync_default(mut self, enabled: bool) -> Self {
        self.auto_sync_default = enabled;
        self
    }

    /// The raw store, for whole-namespace operations such as backup
    pub fn raw(&self) -> Arc<dyn IKeyValueStore + Send + Sync> {
        Arc::clone(&self.kv)
    }

    // --- Diary entries ---

    /// Reads and normalizes the diary collection
    ///
    /// A missing key is an empty collection. Items that are not JSON objects
    /// are skipped with a warning. Entries stored without an `id` or
    /// `created_at` get one assigned and written back, leaving their other
    /// fields as stored.
    pub async fn load_diaries(&self) -> Result<Vec<DiaryRecord>, StoreError> {
        let mut items = self.read_array(keys::DIARY_ENTRIES).await?;
        let mut records = Vec::with_capacity(items.len());
        let mut pinned = 0usize;
        for (index, item) in items.iter_mut().enumerate() {
            match DiaryRecord::from_stored_pinned(item) {
                Ok((record, changed)) => {
                    pinned += usize::from(changed);
                    records.push(record);
                }
                Err(e) => tracing::warn!(index, error = %e, "Skipping unreadable diary entry"),
            }
        }

        if pinned > 0 {
            self.kv
                .set(keys::DIARY_ENTRIES, &Value::Array(items).to_string())
                .await?;
            tracing::info!(pinned, "Assigned ids to legacy diary entries");
        }
        Ok(records)
    }

    /// Replaces the diary collection
    pub async fn save_diaries(&self, records: &[DiaryRecord]) -> Result<(), StoreError> {
        let items: Vec<Value> = records.iter().map(DiaryRecord::to_stored).collect();
        self.kv
            .set(keys::DIARY_ENTRIES, &Value::Array(items).to_string())
            .await?;
        Ok(())
    }

    /// Appends one entry to the diary collection
    pub async fn add_diary(&self, record: DiaryRecord) -> Result<(), StoreError> {
        let mut records = self.load_diaries().await?;
        records.push(record);
        self.save_diaries(&records).await
    }

    /// Removes every entry tagged as sample data; returns how many were removed
    pub async fn purge_sample_entries(&self) -> Result<usize, StoreError> {
        let records = self.load_diaries().await?;
        let before = records.len();
        let kept: Vec<DiaryRecord> = records.into_iter().filter(|r| !r.is_sample()).collect();
        let removed = before - kept.len();
        if removed > 0 {
            self.save_diaries(&kept).await?;
            tracing::info!(removed, remaining = kept.len(), "Purged sample entries");
        }
        Ok(removed)
    }

    // --- Consent history ---

    /// Reads the consent history; unreadable items are skipped with a warning
    pub async fn load_consents(&self) -> Result<Vec<ConsentRecord>, StoreError> {
        let items = self.read_array(keys::CONSENT_HISTORIES).await?;
        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<ConsentRecord>(item) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(index, error = %e, "Skipping unreadable consent record"),
            }
        }
        Ok(records)
    }

    /// Appends one consent record
    pub async fn append_consent(&self, record: ConsentRecord) -> Result<(), StoreError> {
        let mut records = self.load_consents().await?;
        records.push(record);
        let encoded = serde_json::to_string(&records).map_err(|e| StoreError::Corrupt {
            key: keys::CONSENT_HISTORIES.to_string(),
            reason: e.to_string(),
        })?;
        self.kv.set(keys::CONSENT_HISTORIES, &encoded).await?;
        Ok(())
    }

    // --- Sync state ---

    pub async fn is_auto_sync_enabled(&self) -> Result<bool, StoreError> {
        let raw = self.kv.get(keys::AUTO_SYNC_ENABLED).await?;
        Ok(match raw.as_deref().map(str::trim) {
            Some("true") => true,
            Some("false") => false,
            Some(other) => {
                tracing::warn!(value = other, "Unrecognized auto-sync flag, using default");
                self.auto_sync_default
            }
            None => self.auto_sync_default,
        })
    }

    pub async fn set_auto_sync_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        self.kv
            .set(keys::AUTO_SYNC_ENABLED, if enabled { "true" } else { "false" })
            .await?;
        Ok(())
    }

    /// Time of the last successful sync pass
    ///
    /// Accepts RFC 3339 and epoch milliseconds; anything else reads as never.
    pub async fn last_sync(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        let Some(raw) = self.kv.get(keys::LAST_SYNC_TIME).await? else {
            return Ok(None);
        };
        let raw = raw.trim().trim_matches('"');
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Some(dt.with_timezone(&Utc)));
        }
        Ok(raw
            .parse::<i64>()
            .ok()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()))
    }

    pub async fn set_last_sync(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.kv.set(keys::LAST_SYNC_TIME, &at.to_rfc3339()).await?;
        Ok(())
    }

    // --- Session ---

    /// Username of the current session, if one is set and valid
    pub async fn current_username(&self) -> Result<Option<Username>, StoreError> {
        let raw = self.kv.get(keys::CURRENT_USER).await?;
        Ok(raw.and_then(|s| Username::new(s.trim_matches('"')).ok()))
    }

    pub async fn set_current_username(&self, username: &Username) -> Result<(), StoreError> {
        self.kv.set(keys::CURRENT_USER, username.as_str()).await?;
        Ok(())
    }

    pub async fn admin_session(&self) -> Result<Option<String>, StoreError> {
        Ok(self.kv.get(keys::ADMIN_SESSION).await?)
    }

    pub async fn set_admin_session(&self, marker: Option<&str>) -> Result<(), StoreError> {
        match marker {
            Some(value) => self.kv.set(keys::ADMIN_SESSION, value).await?,
            None => self.kv.remove(keys::ADMIN_SESSION).await?,
        }
        Ok(())
    }

    // --- Helpers ---

    async fn read_array(&self, key: &str) -> Result<Vec<Value>, StoreError> {
        let Some(raw) = self.kv.get(key).await? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => Ok(items),
            Ok(Value::Null) => Ok(Vec::new()),
            Ok(other) => Err(StoreError::Corrupt {
                key: key.to_string(),
                reason: format!("expected a JSON array, found {}", json_kind(&other)),
            }),
            Err(e) => Err(StoreError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

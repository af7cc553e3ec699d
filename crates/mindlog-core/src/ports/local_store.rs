//! Local key-value store port (driven/secondary port)
//!
//! The local namespace is a flat map from string keys to string values,
//! most of which hold JSON documents. It survives restarts and is the
//! source of truth for everything the user writes while offline.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific
//!   (SQLite, files, ...) and don't need domain-level classification.
//! - Values are opaque strings at this layer; typed access lives in
//!   [`crate::usecases::LocalStore`].

/// Well-known keys of the local namespace
pub mod keys {
    /// JSON array of diary entries
    pub const DIARY_ENTRIES: &str = "journalEntries";
    /// JSON array of consent records
    pub const CONSENT_HISTORIES: &str = "consent_histories";
    /// `"true"` or `"false"`
    pub const AUTO_SYNC_ENABLED: &str = "auto_sync_enabled";
    /// RFC 3339 timestamp of the last successful sync pass
    pub const LAST_SYNC_TIME: &str = "last_sync_time";
    /// Username of the current session
    pub const CURRENT_USER: &str = "current_user";
    /// Administrative session marker
    pub const ADMIN_SESSION: &str = "admin_session";
}

/// Port trait for the durable local namespace
///
/// ## Implementation Notes
///
/// - `set` replaces any existing value.
/// - `entries` returns every key/value pair ordered by key.
/// - `clear` removes every key.
/// - `replace_all` is all-or-nothing: on error the previous contents remain.
#[async_trait::async_trait]
pub trait IKeyValueStore: Send + Sync {
    /// Reads a value
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Writes a value, replacing any existing one
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Removes a key; removing a missing key is not an error
    async fn remove(&self, key: &str) -> anyhow::Result<()>;

    /// Lists all keys, ordered
    async fn keys(&self) -> anyhow::Result<Vec<String>>;

    /// Lists all key/value pairs, ordered by key
    async fn entries(&self) -> anyhow::Result<Vec<(String, String)>>;

    /// Removes every key
    async fn clear(&self) -> anyhow::Result<()>;

    /// Replaces the whole namespace with `entries`, whose keys must be unique
    async fn replace_all(&self, entries: &[(String, String)]) -> anyhow::Result<()>;
}

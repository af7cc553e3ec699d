//! Backup document
//!
//! ```json
//! {
//!   "metadata": { "version": "1.0", "timestamp": "...", "type": "full_backup", "creator": "admin" },
//!   "localStorage": { "<key>": <value> },
//!   "supabaseData": { "<relation>": [ <row>, ... ] } | null
//! }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Format version written by this release
pub const BACKUP_FORMAT_VERSION: &str = "1.0";

/// Kind tag of a complete export
pub const BACKUP_KIND_FULL: &str = "full_backup";

/// Header identifying a file as a MindLog backup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupMetadata {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub creator: String,
}

impl BackupMetadata {
    /// Metadata for an export taken now
    pub fn now(creator: impl Into<String>) -> Self {
        Self {
            version: BACKUP_FORMAT_VERSION.to_string(),
            timestamp: Utc::now(),
            kind: BACKUP_KIND_FULL.to_string(),
            creator: creator.into(),
        }
    }
}

/// A complete backup of both stores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupDocument {
    pub metadata: BackupMetadata,
    /// Local keys; JSON-shaped values are stored parsed, others as strings
    #[serde(rename = "localStorage", default)]
    pub local_storage: Map<String, Value>,
    /// Remote rows by relation name, `null` when the remote was unavailable
    #[serde(rename = "supabaseData", default)]
    pub remote_data: Option<BTreeMap<String, Vec<Value>>>,
}

impl BackupDocument {
    /// Suggested file name, stamped with the export date
    pub fn file_name(&self) -> String {
        backup_file_name(self.metadata.timestamp.date_naive())
    }

    /// Number of remote rows per relation
    pub fn remote_counts(&self) -> BTreeMap<String, usize> {
        self.remote_data
            .iter()
            .flatten()
            .map(|(relation, rows)| (relation.clone(), rows.len()))
            .collect()
    }
}

/// `mindlog-backup-YYYY-MM-DD.json`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("mindlog-backup-{}.json", date.format("%Y-%m-%d"))
}

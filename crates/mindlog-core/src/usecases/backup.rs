//! Backup and restore use case
//!
//! Export snapshots the whole local namespace plus, when the backend is
//! reachable, every row of every remote relation. Restore only ever writes
//! the local side; remote rows in a backup are counted and reported.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{
    config::BackupConfig,
    domain::{BackupDocument, BackupMetadata},
    ports::{IKeyValueStore, IRemoteGateway, Relation, RemoteError},
};

/// Errors raised by backup and restore
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    /// The document has no `metadata.version`
    #[error("Not a backup file: {0}")]
    NotABackup(String),

    /// The document has a version but does not match the backup shape
    #[error("Malformed backup: {0}")]
    Malformed(String),

    /// A full restore was requested for a backup that carries remote rows
    #[error("Restoring remote data is not supported ({rows} remote rows in backup)")]
    RemoteRestoreUnsupported { rows: usize },

    /// Reading a remote relation failed during export
    #[error("Failed to export {relation}: {source}")]
    Remote {
        relation: Relation,
        #[source]
        source: RemoteError,
    },

    /// The local store failed
    #[error("Local storage error: {0}")]
    Storage(#[from] anyhow::Error),

    /// Reading or writing the backup file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which side of the system a restore writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreScope {
    /// Write local keys; count and skip remote rows
    LocalOnly,
    /// Write local keys and remote rows
    Full,
}

/// Outcome of a successful restore
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct RestoreReport {
    /// Keys written from the backup
    pub keys_restored: usize,
    /// Allow-listed keys whose previous value was kept
    pub keys_preserved: Vec<String>,
    /// Remote rows present in the backup but not written, by relation
    pub remote_skipped: BTreeMap<String, usize>,
    /// Running components should re-read persisted state
    pub reload_required: bool,
}

/// Exports and restores complete backups
pub struct BackupRestoreController {
    store: Arc<dyn IKeyValueStore + Send + Sync>,
    gateway: Arc<dyn IRemoteGateway + Send + Sync>,
    preserved_keys: Vec<String>,
    creator: String,
}

impl BackupRestoreController {
    pub fn new(
        store: Arc<dyn IKeyValueStore + Send + Sync>,
        gateway: Arc<dyn IRemoteGateway + Send + Sync>,
        config: &BackupConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            preserved_keys: config.preserved_keys.clone(),
            creator: config.creator.clone(),
        }
    }

    // --- Export ---

    /// Snapshots both stores into a backup document
    ///
    /// Local values that parse as JSON are embedded parsed; plain strings
    /// and values whose JSON form is itself a string are kept verbatim.
    /// Remote data is `None` when the backend is unavailable.
    ///
    /// # Errors
    /// Fails if the local store fails or any remote relation cannot be read
    #[tracing::instrument(skip(self))]
    pub async fn export(&self) -> Result<BackupDocument, BackupError> {
        let mut local_storage = Map::new();
        for (key, raw) in self.store.entries().await? {
            local_storage.insert(key, embed_local_value(raw));
        }

        let remote_data = if self.gateway.is_available() {
            let mut data = BTreeMap::new();
            for relation in Relation::ALL {
                let rows = self
                    .gateway
                    .fetch_relation(relation)
                    .await
                    .map_err(|source| BackupError::Remote { relation, source })?;
                tracing::debug!(%relation, rows = rows.len(), "Exported relation");
                data.insert(relation.table_name().to_string(), rows);
            }
            Some(data)
        } else {
            tracing::info!("Remote unavailable, exporting local data only");
            None
        };

        let document = BackupDocument {
            metadata: BackupMetadata::now(self.creator.clone()),
            local_storage,
            remote_data,
        };
        tracing::info!(
            keys = document.local_storage.len(),
            remote = document.remote_data.is_some(),
            "Backup exported"
        );
        Ok(document)
    }

    /// Exports into `dir` under the dated file name and returns the path
    pub async fn export_to_dir(&self, dir: &Path) -> Result<PathBuf, BackupError> {
        let document = self.export().await?;
        let path = dir.join(document.file_name());
        write_document(&document, &path).await?;
        Ok(path)
    }

    /// Exports to an explicit path
    pub async fn export_to_file(&self, path: &Path) -> Result<(), BackupError> {
        let document = self.export().await?;
        write_document(&document, path).await
    }

    // --- Restore ---

    /// Parses a backup and checks that it is one
    ///
    /// # Errors
    /// [`BackupError::NotABackup`] if the text is not JSON or lacks
    /// `metadata.version`; [`BackupError::Malformed`] if it has a version
    /// but the rest does not fit
    pub fn parse(json: &str) -> Result<BackupDocument, BackupError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| BackupError::NotABackup(format!("invalid JSON: {e}")))?;

        match value.pointer("/metadata/version") {
            None | Some(Value::Null) => {
                return Err(BackupError::NotABackup(
                    "missing metadata.version".to_string(),
                ))
            }
            Some(_) => {}
        }

        serde_json::from_value(value).map_err(|e| BackupError::Malformed(e.to_string()))
    }

    /// Restores a backup given as JSON text
    ///
    /// Nothing is written unless the document is a valid backup and the
    /// scope can be honored. Allow-listed keys keep their current value.
    /// The namespace is replaced in one step, so a failed write leaves the
    /// previous contents in place.
    #[tracing::instrument(skip(self, json))]
    pub async fn restore(
        &self,
        json: &str,
        scope: RestoreScope,
    ) -> Result<RestoreReport, BackupError> {
        let document = Self::parse(json)?;
        let remote_counts = document.remote_counts();

        if scope == RestoreScope::Full && document.remote_data.is_some() {
            let rows = remote_counts.values().sum();
            return Err(BackupError::RemoteRestoreUnsupported { rows });
        }

        let mut restored: BTreeMap<String, String> = document
            .local_storage
            .iter()
            .map(|(key, value)| {
                let raw = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), raw)
            })
            .collect();

        let mut preserved = Vec::new();
        for key in &self.preserved_keys {
            if let Some(value) = self.store.get(key).await? {
                restored.insert(key.clone(), value);
                preserved.push(key.clone());
            }
        }

        let entries: Vec<(String, String)> = restored.into_iter().collect();
        self.store.replace_all(&entries).await?;

        for (relation, rows) in &remote_counts {
            tracing::info!(relation = %relation, rows, "Remote rows in backup not restored");
        }

        let report = RestoreReport {
            keys_restored: document.local_storage.len(),
            keys_preserved: preserved,
            remote_skipped: remote_counts,
            reload_required: true,
        };
        tracing::info!(
            keys = report.keys_restored,
            preserved = report.keys_preserved.len(),
            "Backup restored"
        );
        Ok(report)
    }

    /// Restores a backup file
    pub async fn restore_file(
        &self,
        path: &Path,
        scope: RestoreScope,
    ) -> Result<RestoreReport, BackupError> {
        let json = tokio::fs::read_to_string(path).await?;
        self.restore(&json, scope).await
    }
}

/// Embeds a raw local value into the backup
fn embed_local_value(raw: String) -> Value {
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::String(_)) | Err(_) => Value::String(raw),
        Ok(parsed) => parsed,
    }
}

async fn write_document(document: &BackupDocument, path: &Path) -> Result<(), BackupError> {
    let json = serde_json::to_string_pretty(document)
        .map_err(|e| BackupError::Malformed(e.to_string()))?;
    tokio::fs::write(path, json).await?;
    tracing::info!(path = %path.display(), "Backup written");
    Ok(())
}

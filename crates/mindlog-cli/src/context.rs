//! Shared command setup
//!
//! Every command starts from a [`CliContext`] (global flags) and, when it
//! touches data, opens a [`Session`]: the loaded configuration, the SQLite
//! store and the remote gateway the configuration calls for.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use mindlog_cache::{DatabasePool, SqliteKeyValueStore};
use mindlog_core::config::Config;
use mindlog_core::domain::{UserId, Username};
use mindlog_core::ports::IRemoteGateway;
use mindlog_core::usecases::{BackupRestoreController, IdentityResolver, LocalStore};
use mindlog_sync::Synchronizer;

use crate::output::{OutputFormat, OutputFormatter};

/// Global flags shared by every command
pub struct CliContext {
    config_path: Option<PathBuf>,
    format: OutputFormat,
}

impl CliContext {
    pub fn new(config_path: Option<PathBuf>, format: OutputFormat) -> Self {
        Self {
            config_path,
            format,
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        self.format.formatter()
    }

    /// `--config` if given, otherwise the platform default
    pub fn config_path(&self) -> PathBuf {
        self.config_path
            .clone()
            .unwrap_or_else(Config::default_path)
    }

    /// Loads the configuration file (defaults if absent) plus environment overrides
    ///
    /// # Errors
    /// Fails if the file exists but cannot be parsed
    pub fn load_config(&self) -> Result<Config> {
        let path = self.config_path();
        let config = if path.exists() {
            Config::load(&path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        } else {
            debug!(path = %path.display(), "No configuration file, using defaults");
            Config::default()
        };
        Ok(config.apply_env())
    }

    /// Loads the configuration and opens the local store and gateway
    pub async fn open(&self) -> Result<Session> {
        let config = self.load_config()?;
        Session::open(config).await
    }
}

/// Everything a data command needs
pub struct Session {
    pub config: Config,
    pool: DatabasePool,
    kv: Arc<SqliteKeyValueStore>,
    pub store: LocalStore,
    pub gateway: Arc<dyn IRemoteGateway + Send + Sync>,
}

impl Session {
    pub async fn open(config: Config) -> Result<Self> {
        let pool = DatabasePool::new(&config.storage.database)
            .await
            .with_context(|| {
                format!(
                    "Failed to open database at {}",
                    config.storage.database.display()
                )
            })?;
        let kv = Arc::new(SqliteKeyValueStore::new(pool.pool().clone()));
        let store = LocalStore::new(kv.clone()).with_auto_sync_default(config.sync.enabled_by_default);
        let gateway = mindlog_remote::connect(&config);

        info!(
            database = %config.storage.database.display(),
            remote = gateway.is_available(),
            "Session opened"
        );

        Ok(Self {
            config,
            pool,
            kv,
            store,
            gateway,
        })
    }

    pub fn synchronizer(&self) -> Synchronizer {
        Synchronizer::new(self.store.clone(), Arc::clone(&self.gateway))
    }

    pub fn backup_controller(&self) -> BackupRestoreController {
        BackupRestoreController::new(
            self.kv.clone(),
            Arc::clone(&self.gateway),
            &self.config.backup,
        )
    }

    /// The stored username, or an error telling the user how to set one
    pub async fn require_username(&self) -> Result<Username> {
        self.store
            .current_username()
            .await?
            .context("No user set. Run 'mindlog user set <name>' first.")
    }

    /// Resolves the stored username to a remote user id
    ///
    /// Local-only mode yields the `local-user` sentinel.
    pub async fn resolve_user(&self) -> Result<UserId> {
        let username = self.require_username().await?;
        IdentityResolver::new(Arc::clone(&self.gateway))
            .resolve(&username)
            .await
            .with_context(|| format!("Could not resolve remote user id for '{username}'"))
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

//! MindLog Daemon - background auto-sync service
//!
//! This binary runs as a user service and handles:
//! - Periodic diary synchronization with the backend
//! - The one-time startup and catch-up passes
//! - Graceful shutdown on SIGTERM/SIGINT
//!
//! # Architecture
//!
//! The daemon opens the local store, builds the gateway the configuration
//! calls for and hands a `Synchronizer` to an `AutoSyncScheduler`. The
//! scheduler runs until a `CancellationToken` is cancelled by a signal;
//! passes already running are allowed to finish.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use mindlog_cache::{DatabasePool, SqliteKeyValueStore};
use mindlog_core::config::Config;
use mindlog_core::usecases::LocalStore;
use mindlog_sync::{AutoSyncScheduler, Synchronizer};

// ============================================================================
// DaemonService
// ============================================================================

/// Owns the store, the synchronizer and the shutdown token
struct DaemonService {
    config: Config,
    db_pool: DatabasePool,
    synchronizer: Arc<Synchronizer>,
    shutdown: CancellationToken,
}

impl DaemonService {
    /// Opens the database and wires the synchronizer for `config`
    async fn new(config: Config, shutdown: CancellationToken) -> Result<Self> {
        let db_pool = DatabasePool::new(&config.storage.database)
            .await
            .with_context(|| {
                format!(
                    "Failed to open database at {}",
                    config.storage.database.display()
                )
            })?;

        let kv = Arc::new(SqliteKeyValueStore::new(db_pool.pool().clone()));
        let store = LocalStore::new(kv).with_auto_sync_default(config.sync.enabled_by_default);
        let gateway = mindlog_remote::connect(&config);
        let synchronizer = Arc::new(Synchronizer::new(store, gateway));

        Ok(Self {
            config,
            db_pool,
            synchronizer,
            shutdown,
        })
    }

    /// Runs the scheduler until shutdown
    async fn run(&self) -> Result<()> {
        let state = self
            .synchronizer
            .state()
            .await
            .context("Failed to read sync state")?;
        info!(
            auto_sync = state.enabled,
            last_sync = ?state.last_sync,
            "Loaded sync state"
        );

        if self
            .synchronizer
            .store()
            .current_username()
            .await
            .context("Failed to read current user")?
            .is_none()
        {
            warn!("No user set; passes will fail until 'mindlog user set <name>' is run");
        }

        let (scheduler, _handle) =
            AutoSyncScheduler::new(Arc::clone(&self.synchronizer), &self.config.sync);
        scheduler.run(self.shutdown.clone()).await;

        self.db_pool.close().await;
        Ok(())
    }
}

// ============================================================================
// Graceful shutdown signal handler
// ============================================================================

/// Waits for SIGTERM or SIGINT and cancels the token
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}

/// Loads the default configuration file with environment overrides
fn load_config() -> Result<Config> {
    let path = Config::default_path();
    let config = if path.exists() {
        Config::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?
    } else {
        Config::default()
    };
    Ok(config.apply_env())
}

// ============================================================================
// Main entry point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();

    info!("MindLog daemon starting (mindlogd)");
    for problem in config.validate() {
        warn!(field = %problem.field, "Configuration problem: {}", problem.message);
    }

    let shutdown_token = CancellationToken::new();

    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal(signal_token).await;
    });

    let service = DaemonService::new(config, shutdown_token.clone()).await?;
    let result = service.run().await;

    match &result {
        Ok(()) => info!("MindLog daemon shut down gracefully"),
        Err(e) => error!(error = %e, "MindLog daemon exiting with error"),
    }

    result
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mindlog_core::config::ConfigBuilder;

    use super::*;

    fn local_config(dir: &tempfile::TempDir) -> Config {
        ConfigBuilder::new()
            .offline_mode(true)
            .storage_database(dir.path().join("mindlog.db"))
            .build()
    }

    #[tokio::test]
    async fn test_run_closes_the_store_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let token = CancellationToken::new();
        let service = DaemonService::new(local_config(&dir), token.clone())
            .await
            .unwrap();
        assert!(!service.db_pool.pool().is_closed());

        token.cancel();
        service.run().await.unwrap();
        assert!(service.db_pool.pool().is_closed());
    }

    #[tokio::test]
    async fn test_service_opens_store_in_local_only_mode() {
        let dir = tempfile::tempdir().unwrap();
        let service = DaemonService::new(local_config(&dir), CancellationToken::new())
            .await
            .unwrap();

        let state = service.synchronizer.state().await.unwrap();
        assert!(state.enabled);
        assert!(state.last_sync.is_none());
        assert!(dir.path().join("mindlog.db").exists());
    }

    #[tokio::test]
    async fn test_run_returns_after_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        let token = CancellationToken::new();
        let service = DaemonService::new(local_config(&dir), token.clone())
            .await
            .unwrap();

        token.cancel();
        tokio::time::timeout(Duration::from_secs(5), service.run())
            .await
            .expect("daemon should stop once cancelled")
            .unwrap();
    }

    #[tokio::test]
    async fn test_enabled_default_comes_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigBuilder::new()
            .offline_mode(true)
            .storage_database(dir.path().join("mindlog.db"))
            .sync_enabled_by_default(false)
            .build();
        let service = DaemonService::new(config, CancellationToken::new())
            .await
            .unwrap();

        assert!(!service.synchronizer.state().await.unwrap().enabled);
    }
}

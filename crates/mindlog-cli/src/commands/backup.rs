//! Backup command - export and restore complete backups
//!
//! `export` writes every local key and, when connected, an unfiltered copy
//! of the backend relations to `mindlog-backup-YYYY-MM-DD.json`. `restore`
//! replaces the local namespace with a backup's, keeping the configured
//! preserved keys; backend rows are only ever reported, never written.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use mindlog_core::usecases::{BackupError, RestoreScope};

use crate::context::CliContext;

#[derive(Debug, Subcommand)]
pub enum BackupCommand {
    /// Write a backup file
    Export {
        /// Target file, or directory for the dated default name
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace local data with a backup
    Restore {
        /// Backup file to read
        file: PathBuf,
        /// Also restore backend rows (fails if the backup has any)
        #[arg(long)]
        full: bool,
    },
}

impl BackupCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let session = ctx.open().await?;
        let controller = session.backup_controller();

        match self {
            BackupCommand::Export { output } => {
                let target = output.clone().unwrap_or_else(default_export_dir);
                let path = if target.is_dir() {
                    controller.export_to_dir(&target).await
                } else {
                    controller.export_to_file(&target).await.map(|()| target)
                }
                .context("Backup export failed")?;

                info!(path = %path.display(), "Backup written");
                if ctx.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "success": true,
                        "path": path.display().to_string(),
                    }));
                } else {
                    formatter.success(&format!("Backup written to {}", path.display()));
                }
            }
            BackupCommand::Restore { file, full } => {
                let scope = if *full {
                    RestoreScope::Full
                } else {
                    RestoreScope::LocalOnly
                };

                match controller.restore_file(file, scope).await {
                    Ok(report) => {
                        if ctx.is_json() {
                            let mut json = serde_json::to_value(&report)?;
                            json["success"] = serde_json::Value::Bool(true);
                            formatter.print_json(&json);
                        } else {
                            formatter.success(&format!(
                                "Restored {} keys from {}",
                                report.keys_restored,
                                file.display()
                            ));
                            for key in &report.keys_preserved {
                                formatter.info(&format!("Kept current value of '{key}'"));
                            }
                            for (relation, rows) in &report.remote_skipped {
                                formatter.info(&format!(
                                    "Skipped {rows} backend rows of {relation}"
                                ));
                            }
                            if report.reload_required {
                                formatter.info("Restart mindlogd to pick up the restored state.");
                            }
                        }
                    }
                    Err(e @ (BackupError::NotABackup(_) | BackupError::RemoteRestoreUnsupported { .. })) => {
                        if ctx.is_json() {
                            formatter.print_json(&serde_json::json!({
                                "success": false,
                                "error": e.to_string(),
                            }));
                        } else {
                            formatter.error(&e.to_string());
                            formatter.info("Nothing was changed.");
                        }
                    }
                    Err(e) => return Err(e).context("Restore failed"),
                }
            }
        }

        session.close().await;
        Ok(())
    }
}

/// Downloads directory, falling back to the working directory
fn default_export_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

//! Sync command - push local diary entries to the backend
//!
//! Provides the `mindlog sync` CLI command which:
//! 1. Loads configuration and opens the local store
//! 2. Builds the gateway (or the offline stand-in) and a synchronizer
//! 3. Runs one manual pass and reports its outcome

use anyhow::Result;
use clap::Args;
use tracing::info;

use mindlog_sync::SyncOutcome;

use crate::context::CliContext;

#[derive(Debug, Args)]
pub struct SyncCommand {}

impl SyncCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let session = ctx.open().await?;
        let synchronizer = session.synchronizer();

        info!("Running manual sync");
        let result = synchronizer.trigger_manual_sync().await;

        match result {
            Ok(outcome) => {
                if ctx.is_json() {
                    let mut json = serde_json::to_value(&outcome)?;
                    json["success"] = serde_json::Value::Bool(true);
                    json["message"] = serde_json::Value::String(outcome.message());
                    formatter.print_json(&json);
                } else {
                    match &outcome {
                        SyncOutcome::Completed(report) => {
                            formatter.success(&format!("Sync completed: {}", report.message()));
                            formatter.info(&format!("Duration: {}ms", report.duration_ms));
                            if report.consents_pushed > 0 {
                                formatter.info(&format!(
                                    "Consent records pushed: {}",
                                    report.consents_pushed
                                ));
                            }
                            if let Some(e) = &report.consent_error {
                                formatter.warn(&format!("Consent records not pushed: {e}"));
                            }
                        }
                        SyncOutcome::Skipped => {
                            formatter.info("Local-only mode: nothing was sent");
                            formatter.info(
                                "Set remote.url and remote.anon_key in the config to enable sync.",
                            );
                        }
                        SyncOutcome::AlreadyRunning => formatter.warn(&outcome.message()),
                    }
                }
            }
            Err(e) => {
                if ctx.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "success": false,
                        "error": e.to_string(),
                    }));
                } else {
                    formatter.error(&format!("Sync failed: {e}"));
                }
            }
        }

        session.close().await;
        Ok(())
    }
}

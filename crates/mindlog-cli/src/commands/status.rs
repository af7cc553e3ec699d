//! Status command - display synchronization status
//!
//! Provides the `mindlog status` CLI command which shows:
//! 1. The local user and whether the backend is reachable by configuration
//! 2. The auto-sync flag and the last successful sync
//! 3. Local diary counts, with seeded sample entries counted separately

use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::context::CliContext;
use crate::output::display_time;

#[derive(Debug, Args)]
pub struct StatusCommand {}

impl StatusCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let session = ctx.open().await?;

        let state = session.synchronizer().state().await?;
        let username = session.store.current_username().await?;
        let diaries = session.store.load_diaries().await?;
        let samples = diaries.iter().filter(|d| d.is_sample()).count();
        let consents = session.store.load_consents().await?.len();
        let remote = session.gateway.is_available();
        let mode = if remote { "remote" } else { "local-only" };

        info!(entries = diaries.len(), remote, "Showing status");

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "user": username.as_ref().map(|u| u.as_str()),
                "mode": mode,
                "remote_url": session.config.remote.url,
                "auto_sync_enabled": state.enabled,
                "status": state.status(),
                "last_sync": state.last_sync.map(|t| t.to_rfc3339()),
                "entries": diaries.len(),
                "sample_entries": samples,
                "consent_records": consents,
                "database": session.config.storage.database.display().to_string(),
            }));
        } else {
            formatter.success("MindLog status");
            formatter.field(
                "User",
                username.as_ref().map(|u| u.as_str()).unwrap_or("(not set)"),
            );
            formatter.field("Mode", mode);
            if let Some(url) = session.config.remote.url.as_deref().filter(|_| remote) {
                formatter.field("Backend", url);
            }
            formatter.field(
                "Auto-sync",
                if state.enabled { "enabled" } else { "disabled" },
            );
            formatter.field("Last sync", &display_time(state.last_sync));
            formatter.field(
                "Entries",
                &format!("{} ({} sample)", diaries.len(), samples),
            );
            formatter.field("Consents", &consents.to_string());
            formatter.field(
                "Database",
                &session.config.storage.database.display().to_string(),
            );
            if username.is_none() && remote {
                formatter.warn("No user set; sync will fail until 'mindlog user set <name>' is run");
            }
        }

        session.close().await;
        Ok(())
    }
}

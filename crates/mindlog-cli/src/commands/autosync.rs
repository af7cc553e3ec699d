//! Autosync command - persist the automatic sync preference
//!
//! The daemon reads the flag before every timer-driven pass, so a change
//! takes effect without restarting it.

use anyhow::Result;
use clap::Subcommand;

use crate::context::CliContext;

#[derive(Debug, Subcommand)]
pub enum AutosyncCommand {
    /// Sync automatically in the background
    Enable,
    /// Only sync when asked with `mindlog sync`
    Disable,
}

impl AutosyncCommand {
    fn enabled(&self) -> bool {
        matches!(self, AutosyncCommand::Enable)
    }

    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let session = ctx.open().await?;
        let enabled = self.enabled();

        session.synchronizer().set_enabled(enabled).await?;

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "auto_sync_enabled": enabled,
            }));
        } else if enabled {
            formatter.success("Automatic sync enabled");
        } else {
            formatter.success("Automatic sync disabled");
        }

        session.close().await;
        Ok(())
    }
}

//! Consent command - record and review data-use consent decisions
//!
//! A decision is appended to the local history first. When the backend is
//! reachable it is also sent right away; otherwise the next sync pass pushes
//! it (duplicates are ignored by the backend).

use anyhow::Result;
use clap::{Args, Subcommand};
use tracing::warn;

use mindlog_core::domain::ConsentRecord;
use mindlog_core::ports::RemoteResultExt;

use crate::context::CliContext;
use crate::output::display_time;

/// Sent as the consent record's user agent
const USER_AGENT: &str = concat!("mindlog-cli/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct Decision {
    /// Agree to the data-use terms
    #[arg(long)]
    agree: bool,
    /// Decline the data-use terms
    #[arg(long)]
    decline: bool,
}

#[derive(Debug, Subcommand)]
pub enum ConsentCommand {
    /// Record a consent decision for the current user
    Record {
        #[command(flatten)]
        decision: Decision,
        /// Network address to store with the decision
        #[arg(long)]
        ip: Option<String>,
    },
    /// Show recorded decisions, newest first
    History,
}

impl ConsentCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let session = ctx.open().await?;
        let username = session.require_username().await?;

        match self {
            ConsentCommand::Record { decision, ip } => {
                let mut record = ConsentRecord::new(username, decision.agree, USER_AGENT);
                if let Some(ip) = ip {
                    record = record.with_ip_address(ip.as_str());
                }
                session.store.append_consent(record.clone()).await?;

                let sent = if session.gateway.is_available() {
                    match session.gateway.save_consent_history(&record).await {
                        Ok(()) => true,
                        Err(e) => {
                            warn!(error = %e, "Consent not sent, will retry on next sync");
                            false
                        }
                    }
                } else {
                    false
                };

                if ctx.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "success": true,
                        "record": record,
                        "sent": sent,
                    }));
                } else {
                    let verb = if record.is_consented { "granted" } else { "declined" };
                    formatter.success(&format!("Consent {verb} for '{}'", record.username));
                    if !sent {
                        formatter.info("Saved locally; it will be sent on the next sync.");
                    }
                }
            }
            ConsentCommand::History => {
                let mut records = if session.gateway.is_available() {
                    session
                        .gateway
                        .list_consent_histories(&username)
                        .await
                        .or_empty("list_consent_histories")
                } else {
                    Vec::new()
                };
                if records.is_empty() {
                    records = session.store.load_consents().await?;
                    records.retain(|r| r.username == username);
                    records.sort_by(|a, b| b.consent_date.cmp(&a.consent_date));
                }

                if ctx.is_json() {
                    formatter.print_json(&serde_json::to_value(&records)?);
                } else if records.is_empty() {
                    formatter.info(&format!("No consent recorded for '{username}'"));
                } else {
                    for record in &records {
                        formatter.field(
                            &display_time(Some(record.consent_date)),
                            if record.is_consented { "agreed" } else { "declined" },
                        );
                    }
                }
            }
        }

        session.close().await;
        Ok(())
    }
}

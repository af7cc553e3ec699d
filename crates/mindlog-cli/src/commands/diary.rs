//! Diary command - write, list, delete and clean up entries
//!
//! Entries are always written locally; the next sync pass pushes them.
//! `list --remote` reads the backend copy instead, which includes counselor
//! annotations the local copy may not have yet.

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::{info, warn};

use mindlog_core::domain::diary::DEFAULT_SCORE;
use mindlog_core::domain::{DiaryRecord, EntryId, EntryOrigin};

use crate::context::{CliContext, Session};
use crate::output::OutputFormatter;

#[derive(Debug, Subcommand)]
pub enum DiaryCommand {
    /// Write a new entry
    Add {
        /// Emotion felt, e.g. "anxiety"
        #[arg(long)]
        emotion: String,
        /// What happened
        #[arg(long, default_value = "")]
        event: String,
        /// What you noticed afterwards
        #[arg(long, default_value = "")]
        realization: String,
        /// Self-esteem score (0-100)
        #[arg(long, default_value_t = DEFAULT_SCORE, value_parser = clap::value_parser!(u8).range(0..=100))]
        self_esteem: u8,
        /// Worthlessness score (0-100)
        #[arg(long, default_value_t = DEFAULT_SCORE, value_parser = clap::value_parser!(u8).range(0..=100))]
        worthlessness: u8,
        /// Date the entry refers to (YYYY-MM-DD), default today
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
        /// Mark the entry as sample data that `purge-samples` may remove
        #[arg(long, hide = true)]
        sample: bool,
    },
    /// List entries, newest first
    List {
        /// Maximum number of entries to show
        #[arg(long, short = 'n')]
        limit: Option<usize>,
        /// Read the backend copy instead of the local one
        #[arg(long)]
        remote: bool,
    },
    /// Delete an entry locally and, when connected, on the backend
    Delete {
        /// Entry id as shown by `list`
        id: String,
    },
    /// Remove every entry created as sample data
    PurgeSamples,
}

impl DiaryCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let session = ctx.open().await?;

        let result = match self {
            DiaryCommand::Add {
                emotion,
                event,
                realization,
                self_esteem,
                worthlessness,
                date,
                sample,
            } => {
                let mut record =
                    DiaryRecord::new(emotion, event, realization, *self_esteem, *worthlessness);
                if let Some(date) = date {
                    record = record.with_date(date.format("%Y-%m-%d").to_string());
                }
                if *sample {
                    record = record.with_origin(EntryOrigin::Sample);
                }
                add(ctx, &session, &*formatter, record).await
            }
            DiaryCommand::List { limit, remote } => {
                list(ctx, &session, &*formatter, *limit, *remote).await
            }
            DiaryCommand::Delete { id } => delete(ctx, &session, &*formatter, id).await,
            DiaryCommand::PurgeSamples => {
                let removed = session.store.purge_sample_entries().await?;
                if ctx.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "success": true,
                        "removed": removed,
                    }));
                } else {
                    formatter.success(&format!("Removed {removed} sample entries"));
                }
                Ok(())
            }
        };

        session.close().await;
        result
    }
}

async fn add(
    ctx: &CliContext,
    session: &Session,
    formatter: &dyn OutputFormatter,
    record: DiaryRecord,
) -> Result<()> {
    let id = record.id.clone();
    session.store.add_diary(record.clone()).await?;
    info!(entry_id = %id, "Diary entry added");

    if ctx.is_json() {
        formatter.print_json(&serde_json::json!({
            "success": true,
            "entry": record,
        }));
    } else {
        formatter.success(&format!("Entry {id} saved for {}", record.date));
        formatter.info("It will be pushed on the next sync.");
    }
    Ok(())
}

async fn list(
    ctx: &CliContext,
    session: &Session,
    formatter: &dyn OutputFormatter,
    limit: Option<usize>,
    remote: bool,
) -> Result<()> {
    let mut entries = if remote {
        if !session.gateway.is_available() {
            formatter.error("No backend configured; only local entries are available.");
            return Ok(());
        }
        let user_id = session.resolve_user().await?;
        session
            .gateway
            .list_diaries(&user_id)
            .await
            .context("Failed to read entries from the backend")?
    } else {
        let mut local = session.store.load_diaries().await?;
        local.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        local
    };
    if let Some(limit) = limit {
        entries.truncate(limit);
    }

    if ctx.is_json() {
        formatter.print_json(&serde_json::to_value(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        formatter.info("No diary entries.");
        return Ok(());
    }
    for entry in &entries {
        formatter.info(&format!(
            "{}  {:<12} self-esteem {:>3}  worthlessness {:>3}  {}",
            entry.date,
            entry.emotion,
            entry.self_esteem_score,
            entry.worthlessness_score,
            entry.id,
        ));
        if !entry.event.is_empty() {
            formatter.info(&format!("    {}", entry.event));
        }
        if let Some(memo) = entry.counselor_memo.as_deref().filter(|_| entry.is_visible_to_user) {
            formatter.info(&format!("    counselor: {memo}"));
        }
    }
    Ok(())
}

async fn delete(
    ctx: &CliContext,
    session: &Session,
    formatter: &dyn OutputFormatter,
    id: &str,
) -> Result<()> {
    let id = EntryId::new(id)?;

    let mut entries = session.store.load_diaries().await?;
    let before = entries.len();
    entries.retain(|entry| entry.id != id);
    let removed_locally = entries.len() != before;
    if removed_locally {
        session.store.save_diaries(&entries).await?;
    }

    let removed_remotely = if session.gateway.is_available() {
        match session.gateway.delete_diary(&id).await {
            Ok(()) => true,
            Err(e) => {
                warn!(entry_id = %id, error = %e, "Remote delete failed");
                formatter.warn(&format!("Backend copy not deleted: {e}"));
                false
            }
        }
    } else {
        false
    };

    if ctx.is_json() {
        formatter.print_json(&serde_json::json!({
            "success": removed_locally || removed_remotely,
            "id": id.as_str(),
            "local": removed_locally,
            "remote": removed_remotely,
        }));
    } else if removed_locally || removed_remotely {
        formatter.success(&format!("Deleted entry {id}"));
    } else {
        formatter.error(&format!("No entry with id {id}"));
    }
    Ok(())
}

//! User command - set or show the local user
//!
//! The username is the only identity the client keeps. `show` resolves it
//! against the backend, creating the remote user row the first time.

use anyhow::Result;
use clap::Subcommand;

use mindlog_core::domain::Username;

use crate::context::CliContext;

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Set the username used for synchronization
    Set {
        /// Username (max 128 characters)
        name: String,
    },
    /// Show the username and its remote user id
    Show,
}

impl UserCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let session = ctx.open().await?;

        match self {
            UserCommand::Set { name } => {
                let username = Username::new(name.as_str())?;
                session.store.set_current_username(&username).await?;

                if ctx.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "success": true,
                        "user": username.as_str(),
                    }));
                } else {
                    formatter.success(&format!("User set to '{username}'"));
                }
            }
            UserCommand::Show => {
                let Some(username) = session.store.current_username().await? else {
                    formatter.error("No user set. Run 'mindlog user set <name>' first.");
                    session.close().await;
                    return Ok(());
                };
                let user_id = session.resolve_user().await;

                if ctx.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "user": username.as_str(),
                        "user_id": user_id.as_ref().ok().map(|id| id.to_string()),
                        "error": user_id.as_ref().err().map(|e| e.to_string()),
                    }));
                } else {
                    formatter.field("User", username.as_str());
                    match &user_id {
                        Ok(id) if id.is_local() => formatter.field("User id", "(local-only)"),
                        Ok(id) => formatter.field("User id", id.as_str()),
                        Err(e) => formatter.warn(&e.to_string()),
                    }
                }
            }
        }

        session.close().await;
        Ok(())
    }
}

//! Chat command - counselor chat rooms and messages
//!
//! Chat lives only on the backend, so every subcommand needs a configured
//! remote. Failed reads show as empty lists with a warning in the log.

use anyhow::{Context, Result};
use clap::Subcommand;

use mindlog_core::domain::ChatMessage;
use mindlog_core::ports::RemoteResultExt;

use crate::context::CliContext;
use crate::output::display_time;

#[derive(Debug, Subcommand)]
pub enum ChatCommand {
    /// List the current user's chat rooms
    Rooms,
    /// Show the messages of a room, oldest first
    Show {
        /// Chat room id
        room: String,
    },
    /// Send a message to a room
    Send {
        /// Chat room id
        room: String,
        /// Message text
        message: String,
    },
    /// List active counselors
    Counselors,
}

impl ChatCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let session = ctx.open().await?;

        if !session.gateway.is_available() {
            formatter.error("Chat needs a backend. Set remote.url and remote.anon_key first.");
            session.close().await;
            return Ok(());
        }

        match self {
            ChatCommand::Rooms => {
                let user_id = session.resolve_user().await?;
                let rooms = session
                    .gateway
                    .list_chat_rooms(&user_id)
                    .await
                    .or_empty("list_chat_rooms");

                if ctx.is_json() {
                    formatter.print_json(&serde_json::to_value(&rooms)?);
                } else if rooms.is_empty() {
                    formatter.info("No chat rooms yet.");
                } else {
                    for room in &rooms {
                        formatter.field(&room.id, room.status.as_deref().unwrap_or("open"));
                    }
                }
            }
            ChatCommand::Show { room } => {
                let messages = session
                    .gateway
                    .list_messages(room)
                    .await
                    .or_empty("list_messages");

                if ctx.is_json() {
                    formatter.print_json(&serde_json::to_value(&messages)?);
                } else if messages.is_empty() {
                    formatter.info("No messages.");
                } else {
                    for message in &messages {
                        let who = if message.is_counselor { "counselor" } else { "you" };
                        formatter.info(&format!(
                            "[{}] {who}: {}",
                            display_time(Some(message.created_at)),
                            message.content
                        ));
                    }
                }
            }
            ChatCommand::Send { room, message } => {
                let user_id = session.resolve_user().await?;
                let sent = session
                    .gateway
                    .send_message(&ChatMessage::from_user(room, user_id.as_str(), message))
                    .await
                    .context("Failed to send message")?;

                if ctx.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "success": true,
                        "message": sent,
                    }));
                } else {
                    formatter.success("Message sent");
                }
            }
            ChatCommand::Counselors => {
                let counselors = session
                    .gateway
                    .list_counselors()
                    .await
                    .or_empty("list_counselors");

                if ctx.is_json() {
                    formatter.print_json(&serde_json::to_value(&counselors)?);
                } else if counselors.is_empty() {
                    formatter.info("No counselors available.");
                } else {
                    for counselor in &counselors {
                        formatter.field(&counselor.name, counselor.email.as_deref().unwrap_or(""));
                    }
                }
            }
        }

        session.close().await;
        Ok(())
    }
}

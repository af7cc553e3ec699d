//! Subcommand implementations, one module per top-level command

pub mod autosync;
pub mod backup;
pub mod chat;
pub mod config;
pub mod consent;
pub mod diary;
pub mod status;
pub mod sync;
pub mod user;

//! MindLog Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `DiaryRecord`, `UserRecord`, `ConsentRecord`, `ChatMessage`, `BackupDocument`
//! - **Use cases** - `LocalStore`, `IdentityResolver`, `BackupRestoreController`
//! - **Port definitions** - Traits for adapters: `IKeyValueStore`, `IRemoteGateway`
//! - **Configuration** - YAML configuration with environment overrides
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no I/O.
//! Ports define trait interfaces that adapter crates implement.
//! Use cases orchestrate domain entities through port interfaces.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;

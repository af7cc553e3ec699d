//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IKeyValueStore`] - Durable string-keyed local namespace
//! - [`IRemoteGateway`] - CRUD operations against the hosted backend

pub mod local_store;
pub mod remote_gateway;

pub use local_store::{keys, IKeyValueStore};
pub use remote_gateway::{
    DiaryUpsert, IRemoteGateway, Relation, RemoteError, RemoteErrorKind, RemoteResult,
    RemoteResultExt,
};

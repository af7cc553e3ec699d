//! Integration tests for mindlog-remote
//!
//! Uses wiremock to simulate the PostgREST endpoint and verifies the
//! requests RestGateway issues and how it reads the responses.

mod common;

mod test_consent_and_chat;
mod test_diaries;
mod test_users;

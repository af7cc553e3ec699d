//! Consent history records
//!
//! Consent is append-only: each agreement or refusal produces a new row and
//! nothing is ever updated or deleted. The pair `(username, consent_date)`
//! identifies a row, which lets repeated pushes of the same local history
//! be ignored by the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::Username;

/// One consent event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentRecord {
    pub username: Username,
    pub is_consented: bool,
    pub consent_date: DateTime<Utc>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
}

impl ConsentRecord {
    /// Records a consent decision made now
    pub fn new(username: Username, is_consented: bool, user_agent: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            username,
            is_consented,
            consent_date: now,
            ip_address: None,
            user_agent: user_agent.into(),
            created_at: now,
        }
    }

    /// Attaches the requester's network address
    pub fn with_ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_dates() {
        let record = ConsentRecord::new(Username::new("hanako").unwrap(), true, "mindlog/0.1");
        assert!(record.is_consented);
        assert_eq!(record.consent_date, record.created_at);
        assert!(record.ip_address.is_none());
    }

    #[test]
    fn test_deserialize_without_optional_fields() {
        let json = r#"{
            "username": "taro",
            "is_consented": false,
            "consent_date": "2026-10-01T09:00:00Z",
            "created_at": "2026-10-01T09:00:00Z"
        }"#;
        let record: ConsentRecord = serde_json::from_str(json).unwrap();
        assert!(!record.is_consented);
        assert_eq!(record.user_agent, "");
    }
}

//! Domain newtypes with validation
//!
//! Strongly-typed wrappers for identifiers that cross the local/remote
//! boundary. Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

// ============================================================================
// Username
// ============================================================================

/// Stable client-side identity string
///
/// The username is the lookup key for remote user rows; surrounding
/// whitespace is trimmed and the result must be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Maximum accepted length in characters
    const MAX_LEN: usize = 128;

    /// Create a new Username
    ///
    /// # Errors
    /// Returns error if the trimmed value is empty or too long
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidUsername(
                "Username cannot be empty".to_string(),
            ));
        }
        if trimmed.chars().count() > Self::MAX_LEN {
            return Err(DomainError::InvalidUsername(format!(
                "Username exceeds {} characters",
                Self::MAX_LEN
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Username {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Username {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Username> for String {
    fn from(name: Username) -> Self {
        name.0
    }
}

// ============================================================================
// UserId
// ============================================================================

/// Remote user identifier
///
/// Either the server-assigned UUID of a `users` row or the fixed sentinel
/// [`UserId::LOCAL`], which means "no remote identity yet" and is returned
/// whenever the system runs in local-only mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Sentinel used when no remote backend is configured
    pub const LOCAL: &'static str = "local-user";

    /// Create a UserId from a server-assigned identifier
    ///
    /// # Errors
    /// Returns error if the identifier is empty
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidUserId(
                "User ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// The local-only sentinel identifier
    #[must_use]
    pub fn local() -> Self {
        Self(Self::LOCAL.to_string())
    }

    /// Returns true if this is the local-only sentinel
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.0 == Self::LOCAL
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for UserId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

// ============================================================================
// EntryId
// ============================================================================

/// Identifier of a diary entry
///
/// Entries are created client-side, so the identifier is generated locally
/// (UUID v4) when absent. Identifiers written by older clients (for example
/// millisecond timestamps) are accepted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryId(String);

impl EntryId {
    /// Generate a fresh random identifier
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing identifier
    ///
    /// # Errors
    /// Returns error if the identifier is empty
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidEntryId(
                "Entry ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for EntryId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<EntryId> for String {
    fn from(id: EntryId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod username_tests {
        use super::*;

        #[test]
        fn test_trims_whitespace() {
            let name = Username::new("  hanako ").unwrap();
            assert_eq!(name.as_str(), "hanako");
        }

        #[test]
        fn test_rejects_empty() {
            assert!(Username::new("").is_err());
            assert!(Username::new("   ").is_err());
        }

        #[test]
        fn test_rejects_too_long() {
            let long = "x".repeat(129);
            assert!(Username::new(long).is_err());
        }

        #[test]
        fn test_serde_roundtrip() {
            let name = Username::new("taro").unwrap();
            let json = serde_json::to_string(&name).unwrap();
            assert_eq!(json, "\"taro\"");
            let back: Username = serde_json::from_str(&json).unwrap();
            assert_eq!(back, name);
        }

        #[test]
        fn test_deserialize_rejects_blank() {
            let result: Result<Username, _> = serde_json::from_str("\"  \"");
            assert!(result.is_err());
        }
    }

    mod user_id_tests {
        use super::*;

        #[test]
        fn test_local_sentinel() {
            let id = UserId::local();
            assert!(id.is_local());
            assert_eq!(id.as_str(), "local-user");
        }

        #[test]
        fn test_remote_id_is_not_local() {
            let id = UserId::new("550e8400-e29b-41d4-a716-446655440000").unwrap();
            assert!(!id.is_local());
        }

        #[test]
        fn test_rejects_empty() {
            assert!(UserId::new("").is_err());
        }
    }

    mod entry_id_tests {
        use super::*;

        #[test]
        fn test_generate_is_unique() {
            assert_ne!(EntryId::generate(), EntryId::generate());
        }

        #[test]
        fn test_accepts_legacy_timestamp_ids() {
            let id: EntryId = "1718000000000".parse().unwrap();
            assert_eq!(id.as_str(), "1718000000000");
        }
    }
}

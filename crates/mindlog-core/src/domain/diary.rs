//! Diary entry domain entity
//!
//! A [`DiaryRecord`] is created and edited entirely on the client and is
//! copied to the remote `diary_entries` relation by the synchronizer.
//!
//! ## Stored shapes
//!
//! Older clients wrote the two scores in camelCase (`selfEsteemScore`,
//! `worthlessnessScore`), newer ones in snake case, and some collections
//! carry both. [`DiaryRecord::from_stored`] is the single migration applied
//! at read time; [`DiaryRecord::to_stored`] writes both spellings back so
//! either generation of reader keeps working.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::DomainError;
use super::newtypes::EntryId;

/// Score assigned when neither spelling carries a usable value
pub const DEFAULT_SCORE: u8 = 50;

/// Upper bound of both score scales
pub const MAX_SCORE: u8 = 100;

/// Canonical and legacy spellings of the self-esteem score
const SELF_ESTEEM_KEYS: (&str, &str) = ("self_esteem_score", "selfEsteemScore");

/// Canonical and legacy spellings of the worthlessness score
const WORTHLESSNESS_KEYS: (&str, &str) = ("worthlessness_score", "worthlessnessScore");

// ============================================================================
// UrgencyLevel
// ============================================================================

/// Counselor-assigned urgency of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    High,
    Medium,
    Low,
}

impl UrgencyLevel {
    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::High => "high",
            UrgencyLevel::Medium => "medium",
            UrgencyLevel::Low => "low",
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UrgencyLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(UrgencyLevel::High),
            "medium" => Ok(UrgencyLevel::Medium),
            "low" => Ok(UrgencyLevel::Low),
            other => Err(DomainError::InvalidUrgency(other.to_string())),
        }
    }
}

// ============================================================================
// EntryOrigin
// ============================================================================

/// Provenance of an entry, recorded when it is created
///
/// Sample entries (seeded demo or test data) can be purged without
/// inspecting their text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrigin {
    #[default]
    User,
    Sample,
}

// ============================================================================
// DiaryRecord
// ============================================================================

/// A single emotional diary entry in normalized form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryRecord {
    pub id: EntryId,
    /// Calendar date the entry refers to (`YYYY-MM-DD`)
    pub date: String,
    pub emotion: String,
    pub event: String,
    pub realization: String,
    pub self_esteem_score: u8,
    pub worthlessness_score: u8,
    pub created_at: DateTime<Utc>,
    pub counselor_memo: Option<String>,
    pub is_visible_to_user: bool,
    pub counselor_name: Option<String>,
    pub assigned_counselor: Option<String>,
    pub urgency_level: Option<UrgencyLevel>,
    pub origin: EntryOrigin,
}

impl DiaryRecord {
    /// Creates a new user-authored entry dated today
    pub fn new(
        emotion: impl Into<String>,
        event: impl Into<String>,
        realization: impl Into<String>,
        self_esteem_score: u8,
        worthlessness_score: u8,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: EntryId::generate(),
            date: now.format("%Y-%m-%d").to_string(),
            emotion: emotion.into(),
            event: event.into(),
            realization: realization.into(),
            self_esteem_score: self_esteem_score.min(MAX_SCORE),
            worthlessness_score: worthlessness_score.min(MAX_SCORE),
            created_at: now,
            counselor_memo: None,
            is_visible_to_user: false,
            counselor_name: None,
            assigned_counselor: None,
            urgency_level: None,
            origin: EntryOrigin::User,
        }
    }

    /// Overrides the entry date
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Overrides the provenance tag
    pub fn with_origin(mut self, origin: EntryOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Returns true if the entry was seeded rather than written by the user
    pub fn is_sample(&self) -> bool {
        self.origin == EntryOrigin::Sample
    }

    /// Normalizes one stored entry, whatever generation wrote it
    ///
    /// - `id` may be a string or a number; a fresh UUID is generated if absent
    /// - scores: canonical spelling first, then legacy; numbers and numeric
    ///   strings are accepted, clamped to `0..=100`, otherwise [`DEFAULT_SCORE`]
    /// - `created_at` may be RFC 3339 or epoch milliseconds; defaults to now
    /// - `date` defaults to the creation date
    ///
    /// # Errors
    /// Returns [`DomainError::ValidationFailed`] if `value` is not an object
    pub fn from_stored(value: &Value) -> Result<Self, DomainError> {
        let obj = value.as_object().ok_or_else(|| {
            DomainError::ValidationFailed("diary entry must be a JSON object".to_string())
        })?;

        let id = match obj.get("id") {
            Some(Value::String(s)) if !s.trim().is_empty() => EntryId::new(s.clone())?,
            Some(Value::Number(n)) => EntryId::new(n.to_string())?,
            _ => EntryId::generate(),
        };

        let created_at = stored_created_at(obj).unwrap_or_else(Utc::now);

        let date = text_field(obj, "date")
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| created_at.format("%Y-%m-%d").to_string());

        let urgency_level = text_field(obj, "urgency_level")
            .and_then(|s| s.parse::<UrgencyLevel>().ok());

        let origin = obj
            .get("origin")
            .and_then(|v| serde_json::from_value::<EntryOrigin>(v.clone()).ok())
            .unwrap_or_default();

        Ok(Self {
            id,
            date,
            emotion: text_field(obj, "emotion").unwrap_or_default(),
            event: text_field(obj, "event").unwrap_or_default(),
            realization: text_field(obj, "realization").unwrap_or_default(),
            self_esteem_score: merged_score(obj, SELF_ESTEEM_KEYS),
            worthlessness_score: merged_score(obj, WORTHLESSNESS_KEYS),
            created_at,
            counselor_memo: text_field(obj, "counselor_memo"),
            is_visible_to_user: obj
                .get("is_visible_to_user")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            counselor_name: text_field(obj, "counselor_name"),
            assigned_counselor: text_field(obj, "assigned_counselor"),
            urgency_level,
            origin,
        })
    }

    /// Normalizes `value` like [`from_stored`](Self::from_stored) and writes
    /// any generated `id` or `created_at` back into it
    ///
    /// Returns the record and whether `value` changed. Once the changed
    /// value is persisted, later reads produce the same identity.
    ///
    /// # Errors
    /// Returns [`DomainError::ValidationFailed`] if `value` is not an object
    pub fn from_stored_pinned(value: &mut Value) -> Result<(Self, bool), DomainError> {
        let record = Self::from_stored(value)?;
        let Some(obj) = value.as_object_mut() else {
            return Ok((record, false));
        };

        let mut changed = false;
        if !has_stored_id(obj) {
            obj.insert("id".to_string(), record.id.as_str().into());
            changed = true;
        }
        if stored_created_at(obj).is_none() {
            obj.insert("created_at".to_string(), record.created_at.to_rfc3339().into());
            changed = true;
        }
        Ok((record, changed))
    }

    /// Serializes the entry for local storage, carrying both score spellings
    pub fn to_stored(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
        if let Value::Object(ref mut obj) = value {
            obj.insert(SELF_ESTEEM_KEYS.1.to_string(), self.self_esteem_score.into());
            obj.insert(
                WORTHLESSNESS_KEYS.1.to_string(),
                self.worthlessness_score.into(),
            );
        }
        value
    }
}

// ============================================================================
// Field helpers
// ============================================================================

/// Reads a string field, treating JSON null and non-strings as absent
fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn has_stored_id(obj: &Map<String, Value>) -> bool {
    match obj.get("id") {
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Number(_)) => true,
        _ => false,
    }
}

fn stored_created_at(obj: &Map<String, Value>) -> Option<DateTime<Utc>> {
    obj.get("created_at")
        .and_then(parse_timestamp)
        .or_else(|| obj.get("createdAt").and_then(parse_timestamp))
}

/// Coerces a score value to `0..=100`
///
/// Returns `None` for anything that is not a finite number or a numeric string.
fn coerce_score(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    Some(raw.round().clamp(0.0, f64::from(MAX_SCORE)) as u8)
}

/// Merges the canonical and legacy spellings of a score
fn merged_score(obj: &Map<String, Value>, (canonical, legacy): (&str, &str)) -> u8 {
    obj.get(canonical)
        .and_then(coerce_score)
        .or_else(|| obj.get(legacy).and_then(coerce_score))
        .unwrap_or(DEFAULT_SCORE)
}

/// Parses an RFC 3339 string or epoch-milliseconds number
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok(),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

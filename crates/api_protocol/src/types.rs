//! Value parsing shared by JSON payloads and panel forms.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A rejected field value; the message is shown to the client as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvalidValue(pub String);

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses a due date given as RFC 3339 or as a naive `YYYY-MM-DDTHH:MM[:SS]`
/// (taken as UTC).
pub fn parse_due_date(raw: &str) -> Result<DateTime<Utc>, InvalidValue> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| InvalidValue("Enter a valid date/time.".to_string()))
}

/// Interprets an HTML checkbox value.
pub fn parse_flag(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("on" | "true" | "1" | "yes")
    )
}

/// Reference to an identity: its UUID, or failing that its username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityRef {
    Id(Uuid),
    Username(String),
}

impl IdentityRef {
    /// Returns `None` for a blank reference.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(match raw.parse::<Uuid>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Username(raw.to_string()),
        })
    }
}

/// Worked hours as sent by clients: a JSON number or a decimal string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HoursValue {
    Number(f64),
    Text(String),
}

impl HoursValue {
    /// Resolves the value; a blank string means "no hours".
    pub fn resolve(&self) -> Result<Option<f64>, InvalidValue> {
        match self {
            Self::Number(hours) => Ok(Some(*hours)),
            Self::Text(text) => parse_hours(text),
        }
    }
}

/// Parses a decimal hours string; blank means absent.
pub fn parse_hours(raw: &str) -> Result<Option<f64>, InvalidValue> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|hours| hours.is_finite())
        .map(Some)
        .ok_or_else(|| InvalidValue("A valid number is required.".to_string()))
}

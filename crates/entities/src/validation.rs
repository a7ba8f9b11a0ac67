//! Field-level validation errors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "nonFieldErrors";

/// Message used when a required field is missing or blank.
pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// A mapping of field name to the messages reported for it.
///
/// Field names use the camelCase spelling of the wire format so the map can
/// be returned to clients unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(transparent)]
#[error("validation failed: {fields:?}")]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Creates an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an error set holding a single message.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Records a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Moves the messages of `other` for fields that have none here yet.
    pub fn merge_missing(&mut self, other: ValidationErrors) {
        for (field, messages) in other.fields {
            self.fields.entry(field).or_insert(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns true if at least one message was recorded for `field`.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns the messages recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Returns the underlying field map.
    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    /// Converts the set into `Ok(())` when empty and `Err(self)` otherwise.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_messages_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add("title", REQUIRED_MESSAGE);
        errors.add("title", "too long");
        errors.add("dueDate", REQUIRED_MESSAGE);

        assert_eq!(errors.get("title").map(<[String]>::len), Some(2));
        assert!(errors.contains("dueDate"));
        assert!(!errors.contains("status"));
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let errors = ValidationErrors::single(NON_FIELD_ERRORS, "Passwords don't match.");
        let json = serde_json::to_value(&errors).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "nonFieldErrors": ["Passwords don't match."] })
        );
    }

    #[test]
    fn test_merge_keeps_existing_field_messages() {
        let mut errors = ValidationErrors::single("workedHours", "A valid number is required.");
        let mut lifecycle = ValidationErrors::single("workedHours", "required when completed");
        lifecycle.add("completionReport", "required when completed");

        errors.merge_missing(lifecycle);

        assert_eq!(
            errors.get("workedHours"),
            Some(&["A valid number is required.".to_string()][..])
        );
        assert!(errors.contains("completionReport"));
    }

    #[test]
    fn test_empty_set_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }
}

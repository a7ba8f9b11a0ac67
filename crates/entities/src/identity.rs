//! Identity entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Profile, REQUIRED_MESSAGE, ValidationErrors};

/// Maximum length of usernames and name parts.
pub const USERNAME_MAX_LEN: usize = 150;

/// A login identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Email address (may be empty).
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Salted password digest. `None` means the identity cannot log in.
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    /// Whether the identity may log in.
    pub is_active: bool,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Creates a new active identity without a password.
    pub fn new(username: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Sets the first and last name.
    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    /// Sets the password digest.
    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(hash.into());
        self
    }

    /// Marks the identity as inactive.
    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Checks the identity's own fields. Uniqueness is the store's concern.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.username.trim().is_empty() {
            errors.add("username", REQUIRED_MESSAGE);
        } else if self.username.chars().count() > USERNAME_MAX_LEN {
            errors.add(
                "username",
                format!("Ensure this field has no more than {USERNAME_MAX_LEN} characters."),
            );
        } else if !self.username.chars().all(is_username_char) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        if !self.email.is_empty() && !looks_like_email(&self.email) {
            errors.add("email", "Enter a valid email address.");
        }

        for (field, value) in [("firstName", &self.first_name), ("lastName", &self.last_name)] {
            if value.chars().count() > USERNAME_MAX_LEN {
                errors.add(
                    field,
                    format!("Ensure this field has no more than {USERNAME_MAX_LEN} characters."),
                );
            }
        }

        errors.into_result()
    }
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// An identity together with its profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub identity: Identity,
    pub profile: Profile,
}

impl Account {
    pub fn new(identity: Identity, profile: Profile) -> Self {
        Self { identity, profile }
    }
}

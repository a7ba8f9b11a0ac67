//! Role and profile definitions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three-tier role hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Works on assigned tasks.
    #[default]
    User,
    /// Creates tasks and oversees assigned users.
    Admin,
    /// Manages admins and user assignments.
    Superadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Superadmin => "superadmin",
        }
    }

    /// Returns true for `admin` and `superadmin`.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::Superadmin)
    }

    pub fn is_superadmin(&self) -> bool {
        matches!(self, Self::Superadmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "superadmin" => Ok(Self::Superadmin),
            other => Err(format!("\"{other}\" is not a valid choice.")),
        }
    }
}

/// Role and admin-assignment metadata attached one-to-one to an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Owning identity.
    pub identity_id: Uuid,
    /// Role of the identity.
    pub role: Role,
    /// Admin overseeing this identity. Only kept for `user` profiles.
    pub assigned_admin: Option<Uuid>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Creates the default `user` profile for an identity.
    pub fn new(identity_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            identity_id,
            role: Role::User,
            assigned_admin: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Sets the overseeing admin.
    pub fn with_assigned_admin(mut self, admin_id: Uuid) -> Self {
        self.assigned_admin = Some(admin_id);
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn is_superadmin(&self) -> bool {
        self.role.is_superadmin()
    }

    /// Drops the admin assignment from non-`user` profiles.
    pub fn normalize(&mut self) {
        if self.role != Role::User {
            self.assigned_admin = None;
        }
    }
}

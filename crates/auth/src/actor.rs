//! The acting identity.

use entities::{Profile, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The identity performing an operation, with the role resolved from its
/// profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Identity ID.
    pub id: Uuid,
    /// Role of the identity.
    pub role: Role,
}

impl Actor {
    /// Creates an actor with an explicit role.
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    /// Builds an actor from an identity's profile.
    ///
    /// A missing profile is treated as the `user` role.
    pub fn from_profile(id: Uuid, profile: Option<&Profile>) -> Self {
        Self {
            id,
            role: profile.map(|p| p.role).unwrap_or_default(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn is_superadmin(&self) -> bool {
        self.role.is_superadmin()
    }
}

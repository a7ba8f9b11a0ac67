//! Revoked access tokens.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::Claims;

/// In-memory set of token IDs revoked by logout.
///
/// Entries are kept until the token would have expired anyway.
#[derive(Debug, Default)]
pub struct RevokedTokens {
    tokens: RwLock<HashMap<String, i64>>,
}

impl RevokedTokens {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Revokes the token described by `claims` and drops expired entries.
    pub async fn revoke(&self, claims: &Claims) {
        let now = Utc::now().timestamp();
        let mut tokens = self.tokens.write().await;
        tokens.retain(|_, exp| *exp >= now);
        tokens.insert(claims.jti.clone(), claims.exp);
        tracing::debug!(jti = %claims.jti, remaining = tokens.len(), "Token revoked");
    }

    /// Returns true if the token ID was revoked.
    pub async fn is_revoked(&self, jti: &str) -> bool {
        self.tokens.read().await.contains_key(jti)
    }

    /// Number of revoked tokens still tracked.
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }
}

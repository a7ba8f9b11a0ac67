//! Business operations shared by the JSON API and the panel.
//!
//! Handlers resolve the actor and decode the request; everything else,
//! authorization included, happens here.

pub mod accounts;
pub mod dashboard;
pub mod tasks;
mod views;

pub use views::*;

use api_protocol::IdentityRef;
use auth::Actor;
use entities::Identity;
use task_store::TaskStore;
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Resolves the acting identity's role, creating a missing profile.
pub async fn resolve_actor<S: TaskStore>(
    state: &AppState<S>,
    identity_id: Uuid,
) -> ServerResult<Actor> {
    let profile = state.store.ensure_profile(identity_id).await?;
    Ok(Actor::from_profile(identity_id, Some(&profile)))
}

/// Looks up an identity by UUID or username.
pub(crate) async fn find_identity<S: TaskStore>(
    store: &S,
    reference: &IdentityRef,
) -> ServerResult<Option<Identity>> {
    let identity = match reference {
        IdentityRef::Id(id) => store.get_identity(*id).await?,
        IdentityRef::Username(username) => store.get_identity_by_username(username).await?,
    };
    Ok(identity)
}

/// Parses a path identifier; anything malformed reads as not found.
pub fn parse_id(entity_type: &str, raw: &str) -> ServerResult<Uuid> {
    raw.parse()
        .map_err(|_| ServerError::NotFound(format!("{entity_type} {raw}")))
}

//! Panel user and admin management.

use std::sync::Arc;

use api_protocol::{AccountForm, AssignUserForm, FlashQuery, PanelAccountsView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    response::Redirect,
};
use task_store::TaskStore;

use super::{ADMINS_PATH, DASHBOARD_PATH, PanelError, PanelResult, USERS_PATH, redirect_with_flash};
use crate::extract::{ApiForm, ApiQuery};
use crate::middleware::AuthenticatedUser;
use crate::services::{
    Usernames,
    accounts::{self, AccountKind},
    parse_id, resolve_actor,
};
use crate::state::AppState;

fn list_path(kind: AccountKind) -> &'static str {
    match kind {
        AccountKind::User => USERS_PATH,
        AccountKind::Admin => ADMINS_PATH,
    }
}

async fn list<S: TaskStore>(
    state: &AppState<S>,
    user: &AuthenticatedUser,
    kind: AccountKind,
    flash: Option<String>,
) -> PanelResult<Json<PanelAccountsView>> {
    let actor = resolve_actor(state, user.id).await?;
    let accounts = accounts::list_accounts(state, &actor, kind)
        .await
        .map_err(PanelError::denied_to(DASHBOARD_PATH))?;

    Ok(Json(PanelAccountsView {
        accounts: Usernames::new(&state.store).accounts(&accounts).await?,
        flash,
    }))
}

async fn create<S: TaskStore>(
    state: &AppState<S>,
    user: &AuthenticatedUser,
    kind: AccountKind,
    form: AccountForm,
) -> PanelResult<Redirect> {
    let actor = resolve_actor(state, user.id).await?;
    let account = accounts::create_account(state, &actor, kind, form)
        .await
        .map_err(PanelError::denied_to(DASHBOARD_PATH))?;

    let flash = format!("{} {} created successfully.", kind.label(), account.identity.username);
    Ok(redirect_with_flash(list_path(kind), &flash))
}

async fn update<S: TaskStore>(
    state: &AppState<S>,
    user: &AuthenticatedUser,
    kind: AccountKind,
    id: &str,
    form: AccountForm,
) -> PanelResult<Redirect> {
    let actor = resolve_actor(state, user.id).await?;
    let id = parse_id(kind.label(), id)?;
    let account = accounts::update_account(state, &actor, kind, id, form)
        .await
        .map_err(PanelError::denied_to(DASHBOARD_PATH))?;

    let flash = format!("{} {} updated successfully.", kind.label(), account.identity.username);
    Ok(redirect_with_flash(list_path(kind), &flash))
}

async fn delete<S: TaskStore>(
    state: &AppState<S>,
    user: &AuthenticatedUser,
    kind: AccountKind,
    id: &str,
) -> PanelResult<Redirect> {
    let actor = resolve_actor(state, user.id).await?;
    let id = parse_id(kind.label(), id)?;
    let username = accounts::delete_account(state, &actor, kind, id)
        .await
        .map_err(PanelError::denied_to(DASHBOARD_PATH))?;

    let flash = format!("{} {username} deleted successfully.", kind.label());
    Ok(redirect_with_flash(list_path(kind), &flash))
}

/// Lists every identity.
pub async fn list_users<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiQuery(query): ApiQuery<FlashQuery>,
) -> PanelResult<Json<PanelAccountsView>> {
    list(&state, &user, AccountKind::User, query.flash).await
}

pub async fn create_user<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiForm(form): ApiForm<AccountForm>,
) -> PanelResult<Redirect> {
    create(&state, &user, AccountKind::User, form).await
}

pub async fn update_user<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ApiForm(form): ApiForm<AccountForm>,
) -> PanelResult<Redirect> {
    update(&state, &user, AccountKind::User, &id, form).await
}

pub async fn delete_user<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> PanelResult<Redirect> {
    delete(&state, &user, AccountKind::User, &id).await
}

/// Lists admins and superadmins.
pub async fn list_admins<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiQuery(query): ApiQuery<FlashQuery>,
) -> PanelResult<Json<PanelAccountsView>> {
    list(&state, &user, AccountKind::Admin, query.flash).await
}

pub async fn create_admin<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiForm(form): ApiForm<AccountForm>,
) -> PanelResult<Redirect> {
    create(&state, &user, AccountKind::Admin, form).await
}

pub async fn update_admin<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ApiForm(form): ApiForm<AccountForm>,
) -> PanelResult<Redirect> {
    update(&state, &user, AccountKind::Admin, &id, form).await
}

pub async fn delete_admin<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> PanelResult<Redirect> {
    delete(&state, &user, AccountKind::Admin, &id).await
}

/// Places a user under an admin.
pub async fn assign_user<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiForm(form): ApiForm<AssignUserForm>,
) -> PanelResult<Redirect> {
    let actor = resolve_actor(&state, user.id).await?;
    let (account, admin_username) = accounts::assign_user(&state, &actor, form)
        .await
        .map_err(PanelError::denied_to(DASHBOARD_PATH))?;

    let flash = format!(
        "User {} assigned to admin {admin_username}.",
        account.identity.username
    );
    Ok(redirect_with_flash(USERS_PATH, &flash))
}

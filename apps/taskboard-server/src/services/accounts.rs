//! Registration, credentials and identity management.

use api_protocol::{AccountForm, AssignUserForm, IdentityRef, RegisterRequest, parse_flag};
use auth::{Actor, AuthError, check_strength, policy};
use entities::{Account, Identity, Profile, REQUIRED_MESSAGE, Role, ValidationErrors};
use task_store::{AccountFilter, TaskStore};
use uuid::Uuid;

use super::find_identity;
use crate::config::BootstrapAdmin;
use crate::error::{ServerError, ServerResult};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

pub const PASSWORD_MISMATCH: &str = "Passwords don't match.";
pub const CREDENTIALS_REQUIRED: &str = "Must include username and password";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
pub const NOT_ASSIGNABLE: &str = "Only accounts with the user role can be assigned to an admin.";

/// Which management listing an account operation goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    /// Every identity.
    User,
    /// Identities with the admin or superadmin role.
    Admin,
}

impl AccountKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Admin => "Admin",
        }
    }

    fn filter(&self) -> AccountFilter {
        match self {
            Self::User => AccountFilter::default(),
            Self::Admin => AccountFilter::with_roles(&[Role::Admin, Role::Superadmin]),
        }
    }

    fn default_role(&self) -> Role {
        match self {
            Self::User => Role::User,
            Self::Admin => Role::Admin,
        }
    }

    fn includes(&self, role: Role) -> bool {
        match self {
            Self::User => true,
            Self::Admin => role.is_admin(),
        }
    }
}

fn errors_of(result: Result<(), ValidationErrors>) -> ValidationErrors {
    result.err().unwrap_or_default()
}

fn check_password(errors: &mut ValidationErrors, password: &str, username: &str) {
    if let Err(problems) = check_strength(password, username) {
        for problem in problems {
            errors.add("password", problem);
        }
    }
}

/// Parses an optional role; blank means "not given".
fn parse_role(raw: Option<&str>, errors: &mut ValidationErrors) -> Option<Role> {
    let raw = raw.map(str::trim).filter(|r| !r.is_empty())?;
    match raw.parse() {
        Ok(role) => Some(role),
        Err(message) => {
            errors.add("role", message);
            None
        }
    }
}

/// Resolves a reference that must point at an admin or superadmin.
async fn resolve_admin<S: TaskStore>(
    store: &S,
    field: &str,
    raw: &str,
    errors: &mut ValidationErrors,
) -> ServerResult<Option<Uuid>> {
    let Some(reference) = IdentityRef::parse(raw) else {
        return Ok(None);
    };
    let Some(identity) = find_identity(store, &reference).await? else {
        errors.add(field, INVALID_CHOICE);
        return Ok(None);
    };
    let is_admin = store
        .get_profile(identity.id)
        .await?
        .is_some_and(|profile| profile.is_admin());
    if !is_admin {
        errors.add(field, INVALID_CHOICE);
        return Ok(None);
    }
    Ok(Some(identity.id))
}

// ============================================================================
// Self-service
// ============================================================================

/// Creates an identity and its profile from a self-registration.
///
/// Field errors come first; the password confirmation is compared only once
/// every field is valid. Nothing is written unless both checks pass.
pub async fn register<S: TaskStore>(
    state: &AppState<S>,
    request: RegisterRequest,
) -> ServerResult<Account> {
    let mut identity = Identity::new(request.username.trim())
        .with_email(request.email.trim())
        .with_name(request.first_name.trim(), request.last_name.trim());
    let mut errors = errors_of(identity.validate());

    if request.password.is_empty() {
        errors.add("password", REQUIRED_MESSAGE);
    } else {
        check_password(&mut errors, &request.password, &identity.username);
    }
    if request.password_confirm.is_empty() {
        errors.add("passwordConfirm", REQUIRED_MESSAGE);
    }
    let requested_role = parse_role(request.role.as_deref(), &mut errors);
    errors.into_result()?;

    if request.password != request.password_confirm {
        return Err(ServerError::non_field(PASSWORD_MISMATCH));
    }

    let role = policy::registration_role(requested_role, state.config.allow_registration_role);
    identity.password_hash = Some(state.hasher.hash(&request.password)?);
    let profile = Profile::new(identity.id).with_role(role);
    let account = state.store.create_account(identity, profile).await?;

    tracing::info!(
        identity_id = %account.identity.id,
        username = %account.identity.username,
        role = %role,
        "Identity registered"
    );
    Ok(account)
}

/// Verifies credentials and issues an access token.
///
/// An unknown username and a wrong password produce the same error.
pub async fn login<S: TaskStore>(
    state: &AppState<S>,
    username: &str,
    password: &str,
) -> ServerResult<(Account, String)> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(ServerError::non_field(CREDENTIALS_REQUIRED));
    }

    let identity = state
        .store
        .get_identity_by_username(username)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;
    let hash = identity
        .password_hash
        .as_deref()
        .ok_or(AuthError::InvalidCredentials)?;
    if !state.hasher.verify(password, hash)? {
        tracing::debug!(username = %username, "Password mismatch");
        return Err(AuthError::InvalidCredentials.into());
    }
    if !identity.is_active {
        return Err(AuthError::AccountDisabled.into());
    }

    let token = state
        .jwt_manager
        .generate_token(identity.id, &identity.username)?;
    let profile = state.store.ensure_profile(identity.id).await?;

    tracing::info!(identity_id = %identity.id, "Identity logged in");
    Ok((Account::new(identity, profile), token))
}

/// Revokes the token the request was authenticated with.
pub async fn logout<S: TaskStore>(state: &AppState<S>, user: &AuthenticatedUser) {
    state.revoked_tokens.revoke(&user.claims).await;
    tracing::info!(identity_id = %user.id, "Identity logged out");
}

/// Loads the account of an authenticated identity.
pub async fn current_account<S: TaskStore>(
    state: &AppState<S>,
    identity_id: Uuid,
) -> ServerResult<Account> {
    let identity = state
        .store
        .get_identity(identity_id)
        .await?
        .ok_or(ServerError::AuthenticationRequired)?;
    let profile = state.store.ensure_profile(identity_id).await?;
    Ok(Account::new(identity, profile))
}

/// Creates the configured superadmin unless the username is taken.
pub async fn bootstrap_superadmin<S: TaskStore>(
    state: &AppState<S>,
    admin: &BootstrapAdmin,
) -> ServerResult<Option<Account>> {
    if state
        .store
        .get_identity_by_username(&admin.username)
        .await?
        .is_some()
    {
        tracing::info!(username = %admin.username, "Bootstrap superadmin already exists");
        return Ok(None);
    }

    let identity = Identity::new(admin.username.as_str())
        .with_email(admin.email.as_str())
        .with_password_hash(state.hasher.hash(&admin.password)?);
    identity.validate()?;
    if let Err(problems) = check_strength(&admin.password, &admin.username) {
        tracing::warn!(?problems, "Bootstrap superadmin password is weak");
    }

    let profile = Profile::new(identity.id).with_role(Role::Superadmin);
    let account = state.store.create_account(identity, profile).await?;
    tracing::info!(
        identity_id = %account.identity.id,
        username = %account.identity.username,
        "Bootstrap superadmin created"
    );
    Ok(Some(account))
}

// ============================================================================
// Management (superadmin only)
// ============================================================================

/// Lists the accounts of one management listing, ordered by username.
pub async fn list_accounts<S: TaskStore>(
    state: &AppState<S>,
    actor: &Actor,
    kind: AccountKind,
) -> ServerResult<Vec<Account>> {
    policy::authorize_management(actor).into_result()?;
    let (accounts, _) = state.store.list_accounts(kind.filter()).await?;
    Ok(accounts)
}

async fn load_account<S: TaskStore>(
    state: &AppState<S>,
    kind: AccountKind,
    id: Uuid,
) -> ServerResult<Account> {
    let not_found = || ServerError::NotFound(format!("{} {id}", kind.label()));
    let identity = state.store.get_identity(id).await?.ok_or_else(not_found)?;
    let profile = state.store.ensure_profile(id).await?;
    if !kind.includes(profile.role) {
        return Err(not_found());
    }
    Ok(Account::new(identity, profile))
}

/// Copies the form onto an account, collecting field errors.
///
/// The password changes only when one is supplied.
async fn apply_form<S: TaskStore>(
    state: &AppState<S>,
    account: &mut Account,
    form: AccountForm,
    default_role: Role,
) -> ServerResult<()> {
    let identity = &mut account.identity;
    identity.username = form.username.trim().to_string();
    identity.email = form.email.trim().to_string();
    identity.first_name = form.first_name.trim().to_string();
    identity.last_name = form.last_name.trim().to_string();
    identity.is_active = parse_flag(form.is_active.as_deref());
    let mut errors = errors_of(identity.validate());

    if !form.password.is_empty() {
        if form.password != form.password_confirm {
            errors.add(entities::NON_FIELD_ERRORS, PASSWORD_MISMATCH);
        } else {
            check_password(&mut errors, &form.password, &identity.username);
        }
    }

    let role = parse_role(form.role.as_deref(), &mut errors).unwrap_or(default_role);
    let assigned_admin = match form.assigned_admin.as_deref() {
        Some(raw) => resolve_admin(&state.store, "assignedAdmin", raw, &mut errors).await?,
        None => None,
    };
    errors.into_result()?;

    if !form.password.is_empty() {
        account.identity.password_hash = Some(state.hasher.hash(&form.password)?);
    }
    account.profile.role = role;
    account.profile.assigned_admin = assigned_admin;
    Ok(())
}

/// Creates an identity from the management form.
///
/// An identity created without a password cannot log in.
pub async fn create_account<S: TaskStore>(
    state: &AppState<S>,
    actor: &Actor,
    kind: AccountKind,
    form: AccountForm,
) -> ServerResult<Account> {
    policy::authorize_management(actor).into_result()?;

    let identity = Identity::new("");
    let profile = Profile::new(identity.id);
    let mut account = Account::new(identity, profile);
    apply_form(state, &mut account, form, kind.default_role()).await?;

    let account = state
        .store
        .create_account(account.identity, account.profile)
        .await?;
    tracing::info!(
        identity_id = %account.identity.id,
        role = %account.profile.role,
        created_by = %actor.id,
        "{} created",
        kind.label()
    );
    Ok(account)
}

/// Updates an identity and its profile from the management form.
pub async fn update_account<S: TaskStore>(
    state: &AppState<S>,
    actor: &Actor,
    kind: AccountKind,
    id: Uuid,
    form: AccountForm,
) -> ServerResult<Account> {
    policy::authorize_management(actor).into_result()?;

    let mut account = load_account(state, kind, id).await?;
    let current_role = account.profile.role;
    apply_form(state, &mut account, form, current_role).await?;

    let account = state.store.update_account(account).await?;
    tracing::info!(identity_id = %id, updated_by = %actor.id, "{} updated", kind.label());
    Ok(account)
}

/// Deletes an identity with its profile and tasks. Returns the username.
pub async fn delete_account<S: TaskStore>(
    state: &AppState<S>,
    actor: &Actor,
    kind: AccountKind,
    id: Uuid,
) -> ServerResult<String> {
    policy::authorize_management(actor).into_result()?;

    let account = load_account(state, kind, id).await?;
    state.store.delete_identity(id).await?;
    tracing::info!(identity_id = %id, deleted_by = %actor.id, "{} deleted", kind.label());
    Ok(account.identity.username)
}

/// Places a user-role identity under an admin.
pub async fn assign_user<S: TaskStore>(
    state: &AppState<S>,
    actor: &Actor,
    form: AssignUserForm,
) -> ServerResult<(Account, String)> {
    policy::authorize_management(actor).into_result()?;

    let mut errors = ValidationErrors::new();
    let user = match IdentityRef::parse(&form.user) {
        Some(reference) => {
            let found = find_identity(&state.store, &reference).await?;
            if found.is_none() {
                errors.add("user", INVALID_CHOICE);
            }
            found
        }
        None => {
            errors.add("user", REQUIRED_MESSAGE);
            None
        }
    };
    let admin_id = if form.admin.trim().is_empty() {
        errors.add("admin", REQUIRED_MESSAGE);
        None
    } else {
        resolve_admin(&state.store, "admin", &form.admin, &mut errors).await?
    };

    let profile = match &user {
        Some(identity) => Some(state.store.ensure_profile(identity.id).await?),
        None => None,
    };
    if profile.as_ref().is_some_and(|p| p.role != Role::User) {
        errors.add("user", NOT_ASSIGNABLE);
    }
    errors.into_result()?;

    let (Some(identity), Some(mut profile), Some(admin_id)) = (user, profile, admin_id)
    else {
        return Err(ServerError::Internal("assignment resolved without errors".to_string()));
    };
    profile.assigned_admin = Some(admin_id);
    let profile = state.store.update_profile(profile).await?;
    let admin_username = state
        .store
        .get_identity(admin_id)
        .await?
        .map(|admin| admin.username)
        .unwrap_or_default();

    tracing::info!(identity_id = %identity.id, admin_id = %admin_id, "User assigned to admin");
    Ok((Account::new(identity, profile), admin_username))
}

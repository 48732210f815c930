//! Password verification and session lifecycle

pub mod password;
mod session;

pub use session::{DEFAULT_SESSION_TTL, SessionStore};

use shared::models::{CredentialSet, Role, Session};
use shared::{AppError, AppResult};

/// Who is trying to log in; `store` is canonical and `staff` lowercased
#[derive(Debug, Clone, Default)]
pub struct LoginScope {
    pub store: String,
    pub staff: String,
}

/// Check `candidate` against the secret configured for `role` at `scope`
///
/// With no secret configured the door is open: verification succeeds and a
/// session is issued anyway.
pub fn verify_password(
    credentials: &CredentialSet,
    sessions: &SessionStore,
    role: Role,
    scope: &LoginScope,
    candidate: &str,
) -> AppResult<Session> {
    match credentials.lookup(role, &scope.store, &scope.staff) {
        None => {
            tracing::warn!(
                role = %role,
                store = %scope.store,
                staff = %scope.staff,
                "No password configured, granting access"
            );
        }
        Some(hash) => {
            if !password::verify_password(candidate, hash) {
                tracing::info!(role = %role, store = %scope.store, "Password rejected");
                return Err(AppError::invalid_credentials());
            }
        }
    }

    let (store, staff) = match role {
        Role::Admin => (None, None),
        Role::Staff => (Some(scope.store.clone()), Some(scope.staff.clone())),
    };
    sessions.create(role, store, staff)
}

/// Hash every plain-text secret in place; returns whether anything changed
///
/// Already-hashed values and the empty "unset" value are left alone.
pub fn hash_plain_secrets(credentials: &mut CredentialSet) -> AppResult<bool> {
    let mut changed = false;
    for secret in credentials.secrets_mut() {
        if !secret.is_empty() && !password::is_hashed(secret) {
            *secret = password::hash_password(secret)?;
            changed = true;
        }
    }
    Ok(changed)
}

//! Session service: register, login, logout, current-user.
//!
//! ARCHITECTURE
//! ============
//! Orchestrates the validator, the user repository, and the session store.
//! Every successful privilege transition goes through `SessionStore::promote`
//! or `SessionStore::demote`, which mint a new session id and CSRF token;
//! callers receive the new [`Session`] and must re-issue both cookies.

use super::session::{Session, SessionStore};
use super::users::{RepoError, User, UserRepository, hash_password};
use super::validate::{self, FieldErrors, LoginRequest, RegisterRequest};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Client-correctable input problem, surfaced field by field.
    #[error("validation failed")]
    Validation(FieldErrors),
    /// Generic by design: must not reveal whether the email exists.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Storage or collaborator failure. Detail stays server-side outside
    /// development mode.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepoError> for AuthError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::DuplicateEmail => {
                let mut errors = FieldErrors::new();
                errors.insert("email".into(), vec!["The email has already been taken.".into()]);
                AuthError::Validation(errors)
            }
            RepoError::Storage(detail) => AuthError::Internal(detail),
        }
    }
}

/// Create a user and establish an authenticated session for it.
///
/// Not retried on failure: a duplicate submission must surface to the
/// caller rather than silently create a second account.
///
/// # Errors
///
/// `Validation` for rule violations or an already-used email, `Internal`
/// for storage failures.
pub async fn register(
    store: &SessionStore,
    users: &dyn UserRepository,
    req: &RegisterRequest,
    current_session: Option<&str>,
) -> Result<(Session, User), AuthError> {
    let mut errors = validate::validate_register(req);

    let email = validate::normalize_email(&req.email);
    if errors.is_empty() {
        // Checked here and again inside create; create's check is the
        // authoritative one under the repository's lock.
        if let Some(email) = &email {
            if users.find_by_email(email).await?.is_some() {
                errors.insert("email".into(), vec!["The email has already been taken.".into()]);
            }
        }
    }
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    let Some(email) = email else {
        return Err(AuthError::Internal("email normalization failed after validation".into()));
    };
    let user = users
        .create(req.name.trim(), &email, &hash_password(&req.password))
        .await?;

    let session = store.promote(current_session, user.id).await;
    tracing::info!(user_id = %user.id, "user registered");
    Ok((session, user))
}

/// Authenticate against stored credentials and promote the session.
///
/// # Errors
///
/// `Validation` for malformed input, `InvalidCredentials` when no user
/// matches, `Internal` for storage failures.
pub async fn login(
    store: &SessionStore,
    users: &dyn UserRepository,
    req: &LoginRequest,
    current_session: Option<&str>,
) -> Result<(Session, User), AuthError> {
    let errors = validate::validate_login(req);
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }
    let Some(email) = validate::normalize_email(&req.email) else {
        return Err(AuthError::InvalidCredentials);
    };

    let user = users
        .find_by_credentials(&email, &hash_password(&req.password))
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let session = store.promote(current_session, user.id).await;
    tracing::info!(user_id = %user.id, "user logged in");
    Ok((session, user))
}

/// Invalidate a session and return the fresh anonymous replacement.
/// Idempotent at this level; the HTTP layer decides who may call it.
pub async fn logout(store: &SessionStore, session_id: &str) -> Session {
    let session = store.demote(session_id).await;
    tracing::info!("session invalidated");
    session
}

/// Pure read of the user behind a session. No side effects.
///
/// # Errors
///
/// `Internal` for storage failures; an anonymous or unknown session is
/// `Ok(None)`, not an error.
pub async fn current_user(
    users: &dyn UserRepository,
    session: Option<&Session>,
) -> Result<Option<User>, AuthError> {
    let Some(user_id) = session.and_then(|s| s.user_id) else {
        return Ok(None);
    };
    Ok(users.find_by_id(user_id).await?)
}

/// Find or create a user for a federated-login profile.
///
/// # Errors
///
/// `Internal` for storage failures.
pub async fn upsert_federated_user(
    users: &dyn UserRepository,
    name: &str,
    email: &str,
) -> Result<User, AuthError> {
    let Some(email) = validate::normalize_email(email) else {
        return Err(AuthError::Internal("federated profile carried no usable email".into()));
    };
    if let Some(existing) = users.find_by_email(&email).await? {
        return Ok(existing);
    }
    // Local password login stays impossible for this account: the stored
    // hash is a random token no password input can reproduce.
    let user = users
        .create(name, &email, &hash_password(&super::session::generate_token()))
        .await?;
    Ok(user)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

//! Auth routes: CSRF priming, register, login, logout, current-user.
//!
//! COOKIE MODEL
//! ============
//! Two cookies with distinct transport:
//! - `session_id` is HttpOnly and addresses the server-side session record.
//! - `XSRF-TOKEN` is script-readable; state-changing requests must echo its
//!   value in the `X-XSRF-TOKEN` header (double-submit cookie). The check in
//!   [`require_csrf`] compares the header against the record behind the
//!   session cookie, so a token lifted from one session never validates
//!   against another.
//! Both cookies are re-issued whenever the session store rotates the record.

use axum::extract::{FromRef, FromRequestParts, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;

use crate::services::auth::{self as auth_svc, AuthError};
use crate::services::session::Session;
use crate::services::users::User;
use crate::services::validate::{LoginRequest, RegisterRequest};
use crate::state::AppState;

pub(crate) const SESSION_COOKIE: &str = "session_id";
pub(crate) const CSRF_COOKIE: &str = "XSRF-TOKEN";
pub(crate) const CSRF_HEADER: &str = "x-xsrf-token";

/// Build the cookie pair for a session record.
pub(crate) fn session_jar(session: &Session, secure: bool) -> CookieJar {
    let session_cookie = Cookie::build((SESSION_COOKIE, session.id.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure);
    let csrf_cookie = Cookie::build((CSRF_COOKIE, session.csrf_token.clone()))
        .path("/")
        .http_only(false)
        .same_site(SameSite::Lax)
        .secure(secure);
    CookieJar::new().add(session_cookie).add(csrf_cookie)
}

fn session_id(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE).map(Cookie::value).filter(|v| !v.is_empty())
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: User,
    pub session: Session,
}

fn unauthenticated() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "message": "Unauthenticated" })),
    )
        .into_response()
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(id) = session_id(&jar) else {
            return Err(unauthenticated());
        };

        let app_state = AppState::from_ref(state);
        let Some(session) = app_state.sessions.get(id).await else {
            return Err(unauthenticated());
        };
        let user = auth_svc::current_user(app_state.users.as_ref(), Some(&session))
            .await
            .map_err(|err| error_response(&app_state, &err, "Authentication check failed"))?
            .ok_or_else(unauthenticated)?;

        Ok(Self { user, session })
    }
}

// =============================================================================
// CSRF MIDDLEWARE
// =============================================================================

fn csrf_mismatch() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "success": false, "message": "CSRF token mismatch" })),
    )
        .into_response()
}

/// Double-submit check applied to every state-changing route.
///
/// The request must carry a known session cookie and an `X-XSRF-TOKEN`
/// header equal to that session's CSRF token. Anything else is rejected
/// before the handler runs.
pub async fn require_csrf(State(state): State<AppState>, jar: CookieJar, req: Request, next: Next) -> Response {
    let Some(id) = session_id(&jar) else {
        return csrf_mismatch();
    };
    let Some(session) = state.sessions.get(id).await else {
        return csrf_mismatch();
    };

    let header = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if header.is_empty() || header != session.csrf_token {
        return csrf_mismatch();
    }

    next.run(req).await
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

fn error_response(state: &AppState, err: &AuthError, generic: &str) -> Response {
    match err {
        AuthError::Validation(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "success": false, "message": "Validation failed", "errors": errors })),
        )
            .into_response(),
        AuthError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Invalid credentials" })),
        )
            .into_response(),
        AuthError::Internal(detail) => {
            tracing::error!(error = %detail, "auth operation failed");
            let message = if state.dev_mode {
                format!("{generic}: {detail}")
            } else {
                generic.to_owned()
            };
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": message })),
            )
                .into_response()
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /api/csrf-cookie` -- idempotent priming endpoint.
///
/// Ensures a session exists and re-issues both cookies. The body is
/// informational only; the Set-Cookie headers are the point.
pub async fn csrf_cookie(State(state): State<AppState>, jar: CookieJar) -> Response {
    let session = match session_id(&jar) {
        Some(id) => match state.sessions.get(id).await {
            Some(existing) => existing,
            None => state.sessions.create_anonymous().await,
        },
        None => state.sessions.create_anonymous().await,
    };

    let jar = session_jar(&session, state.cookie_secure);
    (jar, Json(json!({ "message": "CSRF cookie set" }))).into_response()
}

/// `POST /api/register` -- create an account and an authenticated session.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Response {
    match auth_svc::register(&state.sessions, state.users.as_ref(), &req, session_id(&jar)).await {
        Ok((session, user)) => (
            StatusCode::CREATED,
            session_jar(&session, state.cookie_secure),
            Json(json!({ "success": true, "message": "Account created successfully", "user": user })),
        )
            .into_response(),
        Err(err) => error_response(&state, &err, "Account creation unsuccessful"),
    }
}

/// `POST /api/login` -- authenticate and promote the session.
pub async fn login(State(state): State<AppState>, jar: CookieJar, Json(req): Json<LoginRequest>) -> Response {
    match auth_svc::login(&state.sessions, state.users.as_ref(), &req, session_id(&jar)).await {
        Ok((session, user)) => (
            session_jar(&session, state.cookie_secure),
            Json(json!({ "success": true, "message": "Login successful", "user": user })),
        )
            .into_response(),
        Err(err) => error_response(&state, &err, "Login unsuccessful"),
    }
}

/// `POST /api/logout` -- invalidate the session, issue a fresh anonymous one.
///
/// Requires an authenticated session at this surface even though the service
/// beneath is idempotent.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> Response {
    let session = auth_svc::logout(&state.sessions, &auth.session.id).await;
    (
        session_jar(&session, state.cookie_secure),
        Json(json!({ "success": true, "message": "Logged out" })),
    )
        .into_response()
}

/// `GET /api/user` -- current user projection, 401 when anonymous.
pub async fn me(auth: AuthUser) -> Json<User> {
    Json(auth.user)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

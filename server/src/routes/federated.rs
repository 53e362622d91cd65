//! Federated login routes.
//!
//! The provider handshake itself lives behind the `FederatedExchange` seam;
//! these routes only start the redirect and consume the callback. A
//! successful callback establishes an authenticated session through the
//! exact promote path local login uses, then bounces the browser to the
//! SPA's guest-only callback route.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;

use crate::services::auth as auth_svc;
use crate::services::session::generate_token;
use crate::state::AppState;

use super::auth::session_jar;

const STATE_COOKIE: &str = "federated_state";

fn state_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((STATE_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::minutes(10))
        .build()
}

/// `GET /auth/federated/redirect` -- send the browser to the provider.
pub async fn redirect_to_provider(State(state): State<AppState>) -> Response {
    let Some(federated) = &state.federated else {
        return (StatusCode::SERVICE_UNAVAILABLE, "federated login not configured").into_response();
    };

    let anti_forgery = generate_token();
    let jar = CookieJar::new().add(state_cookie(anti_forgery.clone(), state.cookie_secure));
    (jar, Redirect::temporary(&federated.config.authorize_url(&anti_forgery))).into_response()
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: String,
    state: Option<String>,
}

/// `GET /auth/federated/callback` -- consume the provider redirect.
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackQuery>,
) -> Response {
    let Some(federated) = &state.federated else {
        return (StatusCode::SERVICE_UNAVAILABLE, "federated login not configured").into_response();
    };

    // Anti-forgery state must round-trip through the cookie we set on the
    // way out.
    let Some(callback_state) = params.state.as_deref() else {
        return (StatusCode::BAD_REQUEST, "missing state parameter").into_response();
    };
    let expected = jar.get(STATE_COOKIE).map(Cookie::value).unwrap_or_default();
    if expected.is_empty() || expected != callback_state {
        return (StatusCode::UNAUTHORIZED, "invalid state parameter").into_response();
    }

    let profile = match federated.exchange.exchange_code(&params.code).await {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "federated code exchange failed");
            return (StatusCode::BAD_GATEWAY, "federated login failed").into_response();
        }
    };

    let user = match auth_svc::upsert_federated_user(state.users.as_ref(), &profile.name, &profile.email).await {
        Ok(u) => u,
        Err(e) => {
            tracing::error!(error = %e, "federated user upsert failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "failed to create user").into_response();
        }
    };

    // Same side effect as local login: new session id, new CSRF token.
    let old_id = jar.get(super::auth::SESSION_COOKIE).map(Cookie::value);
    let session = state.sessions.promote(old_id, user.id).await;

    let mut expired_state = state_cookie(String::new(), state.cookie_secure);
    expired_state.set_max_age(Duration::ZERO);

    let cookies = session_jar(&session, state.cookie_secure).add(expired_state);
    (cookies, Redirect::temporary(&state.spa_callback_url)).into_response()
}

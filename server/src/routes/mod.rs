//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The SPA is served from a different origin, so the API carries an explicit
//! CORS policy: one exact allowed origin with credentials, since cookies and
//! a wildcard origin cannot coexist. State-changing routes sit behind the
//! double-submit CSRF middleware; reads do not.

pub mod auth;
pub mod federated;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode, header};
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState, allowed_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(auth::CSRF_HEADER)])
        .allow_credentials(true);

    let csrf_protected = Router::new()
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/logout", post(auth::logout))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_csrf));

    Router::new()
        .merge(csrf_protected)
        .route("/api/csrf-cookie", get(auth::csrf_cookie))
        .route("/api/user", get(auth::me))
        .route("/auth/federated/redirect", get(federated::redirect_to_provider))
        .route("/auth/federated/callback", get(federated::callback))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

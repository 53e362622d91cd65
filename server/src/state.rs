//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the session store, the user-repository seam, the optional federated
//! login collaborator, and the cookie/error policy knobs. Clone is required
//! by Axum; all inner fields are Arc-wrapped or cheap.

use std::sync::Arc;

use crate::config::Config;
use crate::services::federated::{FederatedConfig, FederatedExchange};
use crate::services::session::SessionStore;
use crate::services::users::UserRepository;

/// Federated login collaborator plus the config needed to build the
/// provider redirect.
#[derive(Clone)]
pub struct FederatedLogin {
    pub config: FederatedConfig,
    pub exchange: Arc<dyn FederatedExchange>,
}

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub users: Arc<dyn UserRepository>,
    /// `None` when the provider is not configured; the routes answer 503.
    pub federated: Option<FederatedLogin>,
    pub cookie_secure: bool,
    pub dev_mode: bool,
    pub spa_callback_url: String,
}

impl AppState {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, federated: Option<FederatedLogin>, config: &Config) -> Self {
        Self {
            sessions: SessionStore::new(),
            users,
            federated,
            cookie_secure: config.cookie_secure,
            dev_mode: config.dev_mode,
            spa_callback_url: config.spa_callback_url.clone(),
        }
    }
}

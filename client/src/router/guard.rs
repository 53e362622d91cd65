//! Navigation guard.
//!
//! Runs before every navigation: awaits the auth-state resolution, then
//! applies the two redirect rules synchronously against the cached truth.
//! Both rules are checked on every navigation; a route cannot legally carry
//! both flags (the route table rejects that at construction).

use std::sync::Arc;

use crate::router::routes::RouteMeta;
use crate::state::auth::AuthStateCache;

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Proceed to the requested route.
    Allow,
    /// Navigate to the named route instead.
    Redirect(String),
}

pub struct NavigationGuard {
    auth: Arc<AuthStateCache>,
    login_route: String,
    home_route: String,
}

impl NavigationGuard {
    /// Guard with the conventional destinations: anonymous visitors land on
    /// `login`, authenticated ones on `dashboard`.
    #[must_use]
    pub fn new(auth: Arc<AuthStateCache>) -> Self {
        Self::with_destinations(auth, "login", "dashboard")
    }

    #[must_use]
    pub fn with_destinations(auth: Arc<AuthStateCache>, login_route: &str, home_route: &str) -> Self {
        Self {
            auth,
            login_route: login_route.to_owned(),
            home_route: home_route.to_owned(),
        }
    }

    /// Decide a navigation to a route with the given flags.
    ///
    /// Awaits the exactly-once resolution first, so even the very first
    /// navigation after app start decides against server truth rather than
    /// a default.
    pub async fn before_each(&self, target: RouteMeta) -> GuardDecision {
        self.auth.ensure_resolved().await;

        if target.requires_auth && !self.auth.is_authenticated() {
            return GuardDecision::Redirect(self.login_route.clone());
        }
        if target.guest_only && self.auth.is_authenticated() {
            return GuardDecision::Redirect(self.home_route.clone());
        }
        GuardDecision::Allow
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;

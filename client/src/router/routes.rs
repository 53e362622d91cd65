//! Route table with auth flags.

use std::collections::HashMap;

/// Per-route navigation flags. A route carries at most one of the two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    /// Anonymous visitors are redirected to the login destination.
    pub requires_auth: bool,
    /// Authenticated visitors are redirected to the home destination
    /// (login and signup pages, typically).
    pub guest_only: bool,
}

impl RouteMeta {
    #[must_use]
    pub const fn public() -> Self {
        Self { requires_auth: false, guest_only: false }
    }

    #[must_use]
    pub const fn requiring_auth() -> Self {
        Self { requires_auth: true, guest_only: false }
    }

    #[must_use]
    pub const fn guest_only() -> Self {
        Self { requires_auth: false, guest_only: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteConfigError {
    /// Contradictory by construction; a misconfiguration, not a runtime
    /// case to resolve silently.
    #[error("route {0:?} is tagged both requires_auth and guest_only")]
    ContradictoryFlags(String),
    #[error("route {0:?} is registered twice")]
    DuplicateRoute(String),
}

/// Named routes and their flags.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, RouteMeta>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route, rejecting contradictory or duplicate entries.
    ///
    /// # Errors
    ///
    /// [`RouteConfigError`] on a route tagged with both flags or a name
    /// registered twice.
    pub fn register(&mut self, name: &str, meta: RouteMeta) -> Result<(), RouteConfigError> {
        if meta.requires_auth && meta.guest_only {
            return Err(RouteConfigError::ContradictoryFlags(name.to_owned()));
        }
        if self.routes.contains_key(name) {
            return Err(RouteConfigError::DuplicateRoute(name.to_owned()));
        }
        self.routes.insert(name.to_owned(), meta);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<RouteMeta> {
        self.routes.get(name).copied()
    }

    /// The SPA's standard table: guest-only signup/login/oauth-callback
    /// pages and an auth-required dashboard.
    #[must_use]
    pub fn spa_default() -> Self {
        let mut table = Self::new();
        for (name, meta) in [
            ("signup", RouteMeta::guest_only()),
            ("login", RouteMeta::guest_only()),
            ("dashboard", RouteMeta::requiring_auth()),
            ("oauth-callback", RouteMeta::guest_only()),
        ] {
            // Infallible: every entry carries exactly one flag and names
            // are unique.
            let _ = table.register(name, meta);
        }
        table
    }
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use crate::net::types::User;
use crate::state::auth::{AuthStateCache, CurrentUserSource};

use super::*;

struct FixedSource {
    calls: AtomicUsize,
    user: Option<User>,
}

impl FixedSource {
    fn new(user: Option<User>) -> Self {
        Self { calls: AtomicUsize::new(0), user }
    }
}

#[async_trait]
impl CurrentUserSource for FixedSource {
    async fn fetch_current_user(&self) -> Option<User> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.user.clone()
    }
}

fn test_user() -> User {
    User {
        id: Uuid::new_v4(),
        name: "Ada Lovelace".into(),
        email: "ada@example.com".into(),
    }
}

fn guard_with_user(user: Option<User>) -> (NavigationGuard, Arc<FixedSource>) {
    let source = Arc::new(FixedSource::new(user));
    let cache = Arc::new(AuthStateCache::new(source.clone()));
    (NavigationGuard::new(cache), source)
}

// =============================================================================
// redirect rules
// =============================================================================

#[tokio::test]
async fn anonymous_visitor_on_protected_route_goes_to_login() {
    let (guard, _) = guard_with_user(None);
    let decision = guard.before_each(RouteMeta::requiring_auth()).await;
    assert_eq!(decision, GuardDecision::Redirect("login".into()));
}

#[tokio::test]
async fn authenticated_visitor_on_guest_route_goes_home() {
    let (guard, _) = guard_with_user(Some(test_user()));
    let decision = guard.before_each(RouteMeta::guest_only()).await;
    assert_eq!(decision, GuardDecision::Redirect("dashboard".into()));
}

#[tokio::test]
async fn untagged_route_is_always_allowed() {
    let (anon_guard, _) = guard_with_user(None);
    assert_eq!(anon_guard.before_each(RouteMeta::public()).await, GuardDecision::Allow);

    let (authed_guard, _) = guard_with_user(Some(test_user()));
    assert_eq!(authed_guard.before_each(RouteMeta::public()).await, GuardDecision::Allow);
}

#[tokio::test]
async fn authenticated_visitor_passes_protected_route() {
    let (guard, _) = guard_with_user(Some(test_user()));
    assert_eq!(guard.before_each(RouteMeta::requiring_auth()).await, GuardDecision::Allow);
}

#[tokio::test]
async fn anonymous_visitor_passes_guest_route() {
    let (guard, _) = guard_with_user(None);
    assert_eq!(guard.before_each(RouteMeta::guest_only()).await, GuardDecision::Allow);
}

// =============================================================================
// resolution behavior
// =============================================================================

#[tokio::test]
async fn many_navigations_resolve_once() {
    let (guard, source) = guard_with_user(Some(test_user()));
    for _ in 0..5 {
        guard.before_each(RouteMeta::requiring_auth()).await;
    }
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn custom_destinations_are_used() {
    let source = Arc::new(FixedSource::new(None));
    let cache = Arc::new(AuthStateCache::new(source));
    let guard = NavigationGuard::with_destinations(cache, "signin", "home");
    assert_eq!(
        guard.before_each(RouteMeta::requiring_auth()).await,
        GuardDecision::Redirect("signin".into())
    );
}

#[tokio::test]
async fn guard_reflects_synchronous_cache_updates() {
    let (guard, _) = guard_with_user(None);
    assert_eq!(
        guard.before_each(RouteMeta::requiring_auth()).await,
        GuardDecision::Redirect("login".into())
    );

    // Login outcome lands in the cache; the very next check flips with no
    // further fetch.
    guard.auth.set_authenticated(test_user());
    assert_eq!(guard.before_each(RouteMeta::requiring_auth()).await, GuardDecision::Allow);
    assert_eq!(guard.before_each(RouteMeta::guest_only()).await, GuardDecision::Redirect("dashboard".into()));
}

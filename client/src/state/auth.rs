//! Auth-state cache with exactly-once startup resolution.
//!
//! ARCHITECTURE
//! ============
//! One instance per app load holds the cached authentication truth. Until
//! the first resolution completes the cache is unresolved and guards must
//! await [`AuthStateCache::ensure_resolved`]; afterwards reads are
//! synchronous. The resolution is a memoized shared future owned by the
//! instance, not an ambient flag, so concurrent navigations attach to one
//! in-flight fetch and tests can build isolated instances.
//!
//! TRADE-OFFS
//! ==========
//! A resolution timeout reports "not authenticated" for the navigation at
//! hand but leaves the cache unresolved and the fetch in flight; the next
//! navigation re-awaits the same fetch instead of issuing a duplicate.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::net::types::User;

/// Where current-user truth comes from. The real implementation is
/// `CsrfAwareClient`; tests substitute counting stubs.
#[async_trait]
pub trait CurrentUserSource: Send + Sync {
    /// Fetch the current user. `None` covers both "anonymous" and "fetch
    /// failed": an unresolved login state is never an error.
    async fn fetch_current_user(&self) -> Option<User>;
}

type ResolutionFuture = Shared<BoxFuture<'static, Option<User>>>;

#[derive(Default)]
struct Inner {
    current_user: Option<User>,
    resolved: bool,
    in_flight: Option<ResolutionFuture>,
}

pub struct AuthStateCache {
    source: Arc<dyn CurrentUserSource>,
    resolve_timeout: Option<Duration>,
    inner: Mutex<Inner>,
}

impl AuthStateCache {
    #[must_use]
    pub fn new(source: Arc<dyn CurrentUserSource>) -> Self {
        Self { source, resolve_timeout: None, inner: Mutex::new(Inner::default()) }
    }

    /// Like [`AuthStateCache::new`] but a resolution slower than `timeout`
    /// is treated as "not authenticated" instead of stalling navigation.
    #[must_use]
    pub fn with_timeout(source: Arc<dyn CurrentUserSource>, timeout: Duration) -> Self {
        Self { source, resolve_timeout: Some(timeout), inner: Mutex::new(Inner::default()) }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve the auth state exactly once.
    ///
    /// The first caller starts the fetch; concurrent callers before it
    /// settles await the same shared future. Completion marks the cache
    /// resolved whether or not a user came back.
    pub async fn ensure_resolved(&self) {
        let fut = {
            let mut inner = self.lock();
            if inner.resolved {
                return;
            }
            match &inner.in_flight {
                Some(existing) => existing.clone(),
                None => {
                    let source = Arc::clone(&self.source);
                    let fut = async move { source.fetch_current_user().await }.boxed().shared();
                    inner.in_flight = Some(fut.clone());
                    fut
                }
            }
        };

        let outcome = match self.resolve_timeout {
            Some(limit) => tokio::time::timeout(limit, fut).await.ok(),
            None => Some(fut.await),
        };

        if let Some(user) = outcome {
            let mut inner = self.lock();
            // An explicit login/logout outcome may have landed first; the
            // explicit mutation wins over the stale fetch result.
            if !inner.resolved {
                inner.current_user = user;
                inner.resolved = true;
            }
            inner.in_flight = None;
        }
        // On timeout: resolved stays false and the in-flight fetch is kept.
    }

    /// Record a successful login/register outcome without a round trip.
    pub fn set_authenticated(&self, user: User) {
        let mut inner = self.lock();
        inner.current_user = Some(user);
        inner.resolved = true;
    }

    /// Record a logout outcome without a round trip.
    pub fn clear_authenticated(&self) {
        let mut inner = self.lock();
        inner.current_user = None;
        inner.resolved = true;
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().current_user.is_some()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.lock().current_user.clone()
    }

    #[must_use]
    pub fn resolved(&self) -> bool {
        self.lock().resolved
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

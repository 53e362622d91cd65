use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Semaphore;
use uuid::Uuid;

use super::*;

fn test_user() -> User {
    User {
        id: Uuid::new_v4(),
        name: "Ada Lovelace".into(),
        email: "ada@example.com".into(),
    }
}

/// Stub source that blocks on a gate so tests control when the fetch
/// settles, and counts how many fetches were actually issued.
struct GatedSource {
    calls: AtomicUsize,
    gate: Semaphore,
    user: Option<User>,
}

impl GatedSource {
    fn new(user: Option<User>) -> Self {
        Self { calls: AtomicUsize::new(0), gate: Semaphore::new(0), user }
    }

    fn open(user: Option<User>) -> Self {
        let source = Self::new(user);
        source.gate.add_permits(1);
        source
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CurrentUserSource for GatedSource {
    async fn fetch_current_user(&self) -> Option<User> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let permit = self.gate.acquire().await;
        drop(permit);
        self.user.clone()
    }
}

// =============================================================================
// exactly-once resolution
// =============================================================================

#[tokio::test]
async fn concurrent_callers_share_one_fetch() {
    let source = Arc::new(GatedSource::new(Some(test_user())));
    let cache = AuthStateCache::new(source.clone());

    // Release the gate only after all three callers are in flight.
    let release = {
        let source = Arc::clone(&source);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            source.gate.add_permits(1);
        })
    };

    tokio::join!(cache.ensure_resolved(), cache.ensure_resolved(), cache.ensure_resolved());
    release.await.unwrap();

    assert_eq!(source.calls(), 1);
    assert!(cache.resolved());
    assert!(cache.is_authenticated());
}

#[tokio::test]
async fn repeated_resolution_after_settling_does_not_refetch() {
    let source = Arc::new(GatedSource::open(Some(test_user())));
    let cache = AuthStateCache::new(source.clone());

    cache.ensure_resolved().await;
    cache.ensure_resolved().await;
    cache.ensure_resolved().await;

    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn anonymous_resolution_is_resolved_not_failed() {
    let source = Arc::new(GatedSource::open(None));
    let cache = AuthStateCache::new(source);

    cache.ensure_resolved().await;

    assert!(cache.resolved());
    assert!(!cache.is_authenticated());
    assert!(cache.current_user().is_none());
}

// =============================================================================
// timeout behavior
// =============================================================================

#[tokio::test]
async fn timeout_reports_unauthenticated_but_stays_unresolved() {
    let source = Arc::new(GatedSource::new(Some(test_user())));
    let cache = AuthStateCache::with_timeout(source.clone(), Duration::from_millis(20));

    cache.ensure_resolved().await;

    assert!(!cache.resolved());
    assert!(!cache.is_authenticated());
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn retry_after_timeout_attaches_to_same_fetch() {
    let source = Arc::new(GatedSource::new(Some(test_user())));
    let cache = AuthStateCache::with_timeout(source.clone(), Duration::from_millis(20));

    cache.ensure_resolved().await;
    assert!(!cache.resolved());

    source.gate.add_permits(1);
    cache.ensure_resolved().await;

    assert!(cache.resolved());
    assert!(cache.is_authenticated());
    // Still a single underlying request across timeout and retry.
    assert_eq!(source.calls(), 1);
}

// =============================================================================
// synchronous mutations
// =============================================================================

#[tokio::test]
async fn set_authenticated_is_immediate_and_suppresses_fetch() {
    let source = Arc::new(GatedSource::new(Some(test_user())));
    let cache = AuthStateCache::new(source.clone());

    let user = test_user();
    cache.set_authenticated(user.clone());
    assert!(cache.is_authenticated());
    assert_eq!(cache.current_user(), Some(user));

    // Already resolved: no network call happens.
    cache.ensure_resolved().await;
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn clear_authenticated_is_immediate() {
    let source = Arc::new(GatedSource::open(Some(test_user())));
    let cache = AuthStateCache::new(source);
    cache.ensure_resolved().await;
    assert!(cache.is_authenticated());

    cache.clear_authenticated();
    assert!(!cache.is_authenticated());
    assert!(cache.current_user().is_none());
    assert!(cache.resolved());
}

#[tokio::test]
async fn explicit_outcome_beats_stale_resolution() {
    let source = Arc::new(GatedSource::new(None));
    let cache = Arc::new(AuthStateCache::new(source.clone()));

    let resolving = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.ensure_resolved().await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Login completes while the startup fetch is still pending.
    let user = test_user();
    cache.set_authenticated(user.clone());

    source.gate.add_permits(1);
    resolving.await.unwrap();

    // The anonymous fetch result must not clobber the explicit login.
    assert_eq!(cache.current_user(), Some(user));
}

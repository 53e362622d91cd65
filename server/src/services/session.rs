//! Session store and CSRF secret management.
//!
//! ARCHITECTURE
//! ============
//! Each browser gets one session record keyed by an opaque id carried in an
//! HttpOnly cookie. The record also owns the CSRF token that the client must
//! echo in a header (double-submit cookie). Both values are minted together
//! and rotated together on every privilege transition.
//!
//! TRADE-OFFS
//! ==========
//! Promotion and demotion are destructive: the old record is removed and a
//! new id is minted under the same write lock, so a session id observed
//! before login can never address the authenticated record (fixation).

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;

use rand::Rng;
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Absolute lifetime of a session record, fixed at mint time. Activity does
/// not extend it; a long-lived tab re-authenticates after expiry.
const SESSION_TTL: Duration = Duration::hours(2);

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
///
/// Used for both session ids and CSRF tokens; the two are distinct values
/// with distinct transport, never one token doing double duty.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Authoritative per-browser session record.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque id, travels only in the HttpOnly session cookie.
    pub id: String,
    /// `None` means anonymous.
    pub user_id: Option<Uuid>,
    /// Opaque CSRF secret, travels in the script-readable cookie and must be
    /// echoed back as a header on state-changing requests.
    pub csrf_token: String,
    pub expires_at: OffsetDateTime,
}

impl Session {
    fn anonymous() -> Self {
        Self {
            id: generate_token(),
            user_id: None,
            csrf_token: generate_token(),
            expires_at: OffsetDateTime::now_utc() + SESSION_TTL,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    fn is_expired(&self) -> bool {
        self.expires_at <= OffsetDateTime::now_utc()
    }
}

/// Drop expired records. Called under the write lock on every mutation, so
/// the map never accumulates dead entries.
fn evict_expired(sessions: &mut HashMap<String, Session>) {
    sessions.retain(|_, s| !s.is_expired());
}

/// In-memory session store. Clone is cheap; all clones share the same map.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh anonymous session.
    pub async fn create_anonymous(&self) -> Session {
        let session = Session::anonymous();
        let mut sessions = self.sessions.write().await;
        evict_expired(&mut sessions);
        sessions.insert(session.id.clone(), session.clone());
        session
    }

    /// Look up a session by id. Expired records read as absent.
    pub async fn get(&self, id: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions.get(id).filter(|s| !s.is_expired()).cloned()
    }

    /// Anonymous -> authenticated transition.
    ///
    /// Removes the old record (if any) and mints a new session id and CSRF
    /// token for the given user, all under one write lock so the new record
    /// is committed before any response referencing it can be produced.
    pub async fn promote(&self, old_id: Option<&str>, user_id: Uuid) -> Session {
        let mut session = Session::anonymous();
        session.user_id = Some(user_id);

        let mut sessions = self.sessions.write().await;
        evict_expired(&mut sessions);
        if let Some(old_id) = old_id {
            sessions.remove(old_id);
        }
        sessions.insert(session.id.clone(), session.clone());
        session
    }

    /// Authenticated -> anonymous transition (logout).
    ///
    /// Destroys the old record and returns a fresh anonymous session with an
    /// unrelated CSRF token. Idempotent: demoting an unknown or already
    /// anonymous id still yields a fresh anonymous session.
    pub async fn demote(&self, old_id: &str) -> Session {
        let session = Session::anonymous();
        let mut sessions = self.sessions.write().await;
        evict_expired(&mut sessions);
        sessions.remove(old_id);
        sessions.insert(session.id.clone(), session.clone());
        session
    }

    /// Number of live (non-expired) sessions. Test and introspection helper.
    pub async fn len(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.values().filter(|s| !s.is_expired()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

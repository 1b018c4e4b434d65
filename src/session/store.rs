//! Session registry: maps session keys to onboarding state.
//!
//! Every session sits behind its own mutex. Holding that mutex for a whole
//! turn serializes turns for the same key, while different keys only share
//! the brief map lookup.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::onboarding::Session;

/// Shared handle to one session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Lookup contract for session state.
///
/// The in-memory store is the only implementation today; an external
/// backend would sit behind the same trait.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the session for `key`, creating a fresh one if unseen.
    async fn get_or_create(&self, key: &str) -> SessionHandle;

    /// Fetch the session for `key` without creating it.
    async fn get(&self, key: &str) -> Option<SessionHandle>;

    /// Drop sessions idle for longer than `ttl`. Returns how many were removed.
    async fn prune_idle(&self, ttl: Duration) -> usize;

    /// Number of live sessions.
    async fn len(&self) -> usize;
}

/// Process-local session store.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self, key: &str) -> SessionHandle {
        if let Some(handle) = self.sessions.read().await.get(key) {
            return Arc::clone(handle);
        }

        let mut sessions = self.sessions.write().await;
        let handle = sessions.entry(key.to_string()).or_insert_with(|| {
            debug!(session = %key, "Created session");
            Arc::new(Mutex::new(Session::new()))
        });
        Arc::clone(handle)
    }

    async fn get(&self, key: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(key).cloned()
    }

    async fn prune_idle(&self, ttl: Duration) -> usize {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        // A handle held outside the map belongs to a turn between lookup and
        // lock (or inside it); that session is never idle.
        sessions.retain(|_, handle| {
            if Arc::strong_count(handle) > 1 {
                return true;
            }
            match handle.try_lock() {
                Ok(session) => now.signed_duration_since(session.last_seen) <= ttl,
                Err(_) => true,
            }
        });

        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, remaining = sessions.len(), "Pruned idle sessions");
        }
        removed
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Spawn a background task that prunes idle sessions every `interval`.
pub fn spawn_session_sweeper(
    store: Arc<dyn SessionStore>,
    ttl: Duration,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            store.prune_idle(ttl).await;
        }
    })
}

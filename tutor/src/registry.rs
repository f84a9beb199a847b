//! In-memory registry of live sessions.
//!
//! The map lock is held only for map operations. Each session sits behind its
//! own mutex so turns for one session serialize, and its last-activity stamp
//! is an atomic so the sweep never waits on a session lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, info};

use crate::config::DEFAULT_INACTIVITY_TIMEOUT_SECS;
use crate::session::Session;

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// A registered session plus its activity stamp.
#[derive(Debug)]
pub struct SessionHandle {
    id: String,
    session: Mutex<Session>,
    last_activity_ms: AtomicI64,
}

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        Self {
            id: session.id.clone(),
            session: Mutex::new(session),
            last_activity_ms: AtomicI64::new(now_millis()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Exclusive access to the session for one turn.
    pub async fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().await
    }

    /// Record activity now.
    pub fn touch(&self) {
        self.last_activity_ms.store(now_millis(), Ordering::Relaxed);
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.last_activity_ms.load(Ordering::Relaxed))
            .unwrap_or_default()
    }

    fn idle_millis(&self, now: i64) -> i64 {
        now - self.last_activity_ms.load(Ordering::Relaxed)
    }
}

/// Owned store of live sessions, shared by every request handler.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<SessionHandle>>>,
    inactivity_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(inactivity_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            inactivity_timeout,
        }
    }

    pub fn inactivity_timeout(&self) -> Duration {
        self.inactivity_timeout
    }

    /// Register a session, replacing any previous one with the same id.
    pub async fn insert(&self, session: Session) -> Arc<SessionHandle> {
        let handle = Arc::new(SessionHandle::new(session));
        let mut sessions = self.sessions.write().await;
        sessions.insert(handle.id.clone(), Arc::clone(&handle));
        debug!("Registered session {} ({} live)", handle.id, sessions.len());
        handle
    }

    /// Look up a session and refresh its activity stamp.
    pub async fn get(&self, id: &str) -> Option<Arc<SessionHandle>> {
        let handle = self.sessions.read().await.get(id).cloned()?;
        handle.touch();
        Some(handle)
    }

    /// Refresh a session's activity stamp; false when it is not registered.
    pub async fn touch(&self, id: &str) -> bool {
        match self.sessions.read().await.get(id) {
            Some(handle) => {
                handle.touch();
                true
            }
            None => false,
        }
    }

    pub async fn remove(&self, id: &str) -> Option<Arc<SessionHandle>> {
        self.sessions.write().await.remove(id)
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Evict sessions idle for longer than the inactivity window.
    ///
    /// Returns the number of sessions removed.
    pub async fn sweep_expired(&self) -> usize {
        let timeout = i64::try_from(self.inactivity_timeout.as_millis()).unwrap_or(i64::MAX);
        let now = now_millis();

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, handle| {
            let keep = handle.idle_millis(now) <= timeout;
            if !keep {
                debug!("Evicting idle session {id}");
            }
            keep
        });
        let evicted = before - sessions.len();

        if evicted > 0 {
            info!("Swept {evicted} expired sessions ({} live)", sessions.len());
        }
        evicted
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_INACTIVITY_TIMEOUT_SECS))
    }
}

//! Session pool keyed by server URL
//!
//! Explicit, constructor-injected replacement for a process-global
//! connection registry: owners create a pool, pass it where it is needed,
//! and can reset it for test isolation or teardown.

use crate::error::Result;
use crate::session::McpSession;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Pool of established knowledge-server sessions.
///
/// A cached session is returned unconditionally without a liveness
/// re-check; a server that goes away after a successful connect stays
/// cached until `reset` or `evict`. Known limitation, kept deliberately.
pub struct SessionPool {
    http: reqwest::Client,
    sessions: Mutex<HashMap<String, Arc<McpSession>>>,
}

impl Default for SessionPool {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionPool {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Build a pool on top of an existing HTTP client.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self {
            http,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached session for `url`, or open a new one racing the
    /// handshake against `timeout`.
    ///
    /// The handshake runs outside the pool lock so first-time connects to
    /// different servers proceed in parallel. Two concurrent connects to
    /// the same URL may both handshake; the loser is closed and the
    /// cached winner returned.
    pub async fn connect(&self, url: &str, timeout: Duration) -> Result<Arc<McpSession>> {
        if let Some(existing) = self.sessions.lock().await.get(url) {
            return Ok(Arc::clone(existing));
        }

        let session = McpSession::connect(&self.http, url, timeout).await?;

        let mut sessions = self.sessions.lock().await;
        if let Some(existing) = sessions.get(url) {
            session.close();
            return Ok(Arc::clone(existing));
        }
        sessions.insert(url.to_string(), Arc::clone(&session));
        Ok(session)
    }

    /// Number of cached sessions
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Drop one server's cached session, closing it.
    pub async fn evict(&self, url: &str) {
        if let Some(session) = self.sessions.lock().await.remove(url) {
            session.close();
        }
    }

    /// Teardown hook: close and forget every cached session.
    pub async fn reset(&self) {
        let mut sessions = self.sessions.lock().await;
        for (_, session) in sessions.drain() {
            session.close();
        }
    }
}

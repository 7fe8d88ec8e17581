//! # Session Context
//!
//! Who is signed in at this register. Injected into the checkout instead of
//! being read from ambient storage.
//!
//! ```text
//! sign_in / sign_out ──► watch::Sender<Option<UserSession>>
//!                                 │
//!              ┌──────────────────┼──────────────────┐
//!              ▼                  ▼                  ▼
//!         Checkout           sidebar view       reports view
//!      (current user)     (subscribe → changed) (subscribe → changed)
//! ```
//!
//! Views subscribe and react to changes; nothing polls.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

/// Signed-in cashier.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: i64,
    pub user_name: String,
    /// Bearer token for the backend. Never logged.
    pub token: String,
}

impl std::fmt::Debug for UserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSession")
            .field("user_id", &self.user_id)
            .field("user_name", &self.user_name)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Shared, observable session context. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SessionContext {
    tx: Arc<watch::Sender<Option<UserSession>>>,
}

impl SessionContext {
    /// Creates a context with nobody signed in.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        SessionContext { tx: Arc::new(tx) }
    }

    pub fn sign_in(&self, session: UserSession) {
        info!(user_id = session.user_id, user = %session.user_name, "Cashier signed in");
        self.tx.send_replace(Some(session));
    }

    pub fn sign_out(&self) {
        if let Some(previous) = self.tx.send_replace(None) {
            info!(user_id = previous.user_id, "Cashier signed out");
        }
    }

    /// Snapshot of the current session.
    pub fn current(&self) -> Option<UserSession> {
        self.tx.borrow().clone()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.tx.borrow().as_ref().map(|s| s.user_id)
    }

    /// Receiver that is notified on every sign-in / sign-out.
    pub fn subscribe(&self) -> watch::Receiver<Option<UserSession>> {
        self.tx.subscribe()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

//! Shared guard for the gateway session token.

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Serializes use of the gateway's authentication token.
///
/// The underlying transport refreshes its session token in place and is not
/// safe for concurrent refresh. Mutating calls (create, update, delete) hold
/// the exclusive guard for the duration of the remote call; get and list
/// calls share the read guard. One lock is built per provider session and
/// handed to every reconciler on that session, so independent sessions can
/// coexist without contending.
#[derive(Debug, Default)]
pub struct TokenLock {
    inner: RwLock<()>,
}

impl TokenLock {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(()),
        }
    }

    /// Guard for get/list calls. Concurrent reads are allowed.
    pub async fn shared(&self) -> RwLockReadGuard<'_, ()> {
        self.inner.read().await
    }

    /// Guard for create/update/delete calls. Excludes everything else.
    pub async fn exclusive(&self) -> RwLockWriteGuard<'_, ()> {
        self.inner.write().await
    }
}

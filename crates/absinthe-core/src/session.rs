//! Session context.
//!
//! Holds the id of the account the console currently acts as and broadcasts
//! changes to every screen holding a [`SessionHandle`]. [`SessionContext`] is
//! the only writer: it hydrates from the identity store at startup and writes
//! back on connect and disconnect.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::identity::{IdentityStore, StorageKey};

/// Persisted value meaning "no account".
const DISCONNECTED: &str = "";

/// Owner of the session state.
pub struct SessionContext {
    tx: watch::Sender<Option<String>>,
    store: Arc<dyn IdentityStore>,
}

impl SessionContext {
    /// Build the session from whatever id the store holds.
    pub fn hydrate(store: Arc<dyn IdentityStore>) -> Self {
        let stored = store
            .get(StorageKey::UserId)
            .filter(|id| id.as_str() != DISCONNECTED);
        if let Some(id) = &stored {
            info!(user_id = %id, "Restored session from identity store");
        }
        let (tx, _rx) = watch::channel(stored);
        Self { tx, store }
    }

    /// A read-only view for screens.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            rx: self.tx.subscribe(),
        }
    }

    pub fn current_user(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    /// Become `user_id`, in memory and on disk.
    pub fn connect(&self, user_id: &str) {
        if user_id == DISCONNECTED {
            self.disconnect();
            return;
        }
        self.store.set(StorageKey::UserId, user_id);
        self.tx.send_replace(Some(user_id.to_string()));
        info!(user_id, "Session connected");
    }

    /// Forget the current account. The server-side record is left untouched.
    pub fn disconnect(&self) {
        self.store.set(StorageKey::UserId, DISCONNECTED);
        self.tx.send_replace(None);
        info!("Session disconnected");
    }
}

/// Read-only session view handed to screens.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    rx: watch::Receiver<Option<String>>,
}

impl SessionHandle {
    pub fn current_user(&self) -> Option<String> {
        self.rx.borrow().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Wait for the next session change. Returns `false` once the context is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::identity::{FileIdentityStore, MemoryIdentityStore};

    #[test]
    fn empty_store_hydrates_disconnected() {
        let ctx = SessionContext::hydrate(Arc::new(MemoryIdentityStore::new()));
        assert!(ctx.current_user().is_none());
        assert!(!ctx.handle().is_connected());
    }

    #[test]
    fn empty_string_hydrates_disconnected() {
        let store = Arc::new(MemoryIdentityStore::new());
        store.set(StorageKey::UserId, "");
        let ctx = SessionContext::hydrate(store);
        assert!(ctx.current_user().is_none());
    }

    #[test]
    fn connect_persists_and_broadcasts() {
        let store = Arc::new(MemoryIdentityStore::new());
        let ctx = SessionContext::hydrate(store.clone());
        let handle = ctx.handle();

        ctx.connect("u-42");

        assert_eq!(handle.current_user().as_deref(), Some("u-42"));
        assert_eq!(store.get(StorageKey::UserId).as_deref(), Some("u-42"));
    }

    #[test]
    fn disconnect_clears_memory_and_disk_and_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let ctx = SessionContext::hydrate(Arc::new(FileIdentityStore::new(&path)));
        ctx.connect("u-1");
        let reloaded = SessionContext::hydrate(Arc::new(FileIdentityStore::new(&path)));
        assert_eq!(reloaded.current_user().as_deref(), Some("u-1"));

        reloaded.disconnect();
        assert!(reloaded.current_user().is_none());
        assert_eq!(
            FileIdentityStore::new(&path).get(StorageKey::UserId).as_deref(),
            Some("")
        );

        let after_reload = SessionContext::hydrate(Arc::new(FileIdentityStore::new(&path)));
        assert!(after_reload.current_user().is_none());
    }

    #[test]
    fn connect_with_empty_id_disconnects() {
        let ctx = SessionContext::hydrate(Arc::new(MemoryIdentityStore::new()));
        ctx.connect("u-1");
        ctx.connect("");
        assert!(ctx.current_user().is_none());
    }

    #[tokio::test]
    async fn subscribers_observe_changes() {
        let ctx = SessionContext::hydrate(Arc::new(MemoryIdentityStore::new()));
        let mut handle = ctx.handle();

        ctx.connect("u-9");
        assert!(handle.changed().await);
        assert_eq!(handle.current_user().as_deref(), Some("u-9"));

        drop(ctx);
        assert!(!handle.changed().await);
    }
}

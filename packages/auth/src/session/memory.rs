use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use super::{SessionChanged, SessionKey, SessionOp, SessionStore, CHANGE_CHANNEL_CAPACITY};
use crate::error::AuthResult;

/// Process-local session store. Nothing survives a restart.
pub struct MemorySessionStore {
    entries: RwLock<BTreeMap<SessionKey, String>>,
    changes: broadcast::Sender<SessionChanged>,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            entries: RwLock::new(BTreeMap::new()),
            changes,
        }
    }

    fn notify(&self, change: SessionChanged) {
        // No subscribers is fine
        let _ = self.changes.send(change);
    }
}

/// Apply `ops` to `entries`, returning the changes that actually happened.
pub(super) fn apply_ops(
    entries: &mut BTreeMap<SessionKey, String>,
    ops: Vec<SessionOp>,
) -> Vec<SessionChanged> {
    let mut changes = Vec::with_capacity(ops.len());
    for op in ops {
        match op {
            SessionOp::Set(key, value) => {
                entries.insert(key, value);
                changes.push(SessionChanged::Set(key));
            }
            SessionOp::Remove(key) => {
                if entries.remove(&key).is_some() {
                    changes.push(SessionChanged::Removed(key));
                }
            }
        }
    }
    changes
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: SessionKey) -> AuthResult<Option<String>> {
        Ok(self.entries.read().await.get(&key).cloned())
    }

    async fn apply(&self, ops: Vec<SessionOp>) -> AuthResult<()> {
        let changes = {
            let mut entries = self.entries.write().await;
            apply_ops(&mut entries, ops)
        };
        for change in changes {
            self.notify(change);
        }
        Ok(())
    }

    async fn take(&self, key: SessionKey) -> AuthResult<Option<String>> {
        let taken = self.entries.write().await.remove(&key);
        if taken.is_some() {
            self.notify(SessionChanged::Removed(key));
        }
        Ok(taken)
    }

    async fn clear(&self) -> AuthResult<()> {
        self.entries.write().await.clear();
        self.notify(SessionChanged::Cleared);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChanged> {
        self.changes.subscribe()
    }
}

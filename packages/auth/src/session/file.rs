use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};

use super::memory::apply_ops;
use super::{SessionChanged, SessionKey, SessionOp, SessionStore, CHANGE_CHANNEL_CAPACITY};
use crate::error::{AuthError, AuthResult};

/// Session store persisted as a flat TOML table, e.g. `~/.worksphere/session.toml`.
///
/// The file is rewritten on every mutation (temp file + rename) and is
/// readable by the owner only on unix.
pub struct FileSessionStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<SessionKey, String>>,
    changes: broadcast::Sender<SessionChanged>,
}

impl FileSessionStore {
    /// Load the store from `path`. A missing file is an empty session.
    pub async fn open(path: impl Into<PathBuf>) -> AuthResult<Self> {
        let path = path.into();
        let entries = load_entries(&path).await?;
        debug!(
            "Loaded {} session entries from {}",
            entries.len(),
            path.display()
        );

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self {
            path,
            entries: RwLock::new(entries),
            changes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &BTreeMap<SessionKey, String>) -> AuthResult<()> {
        let table: BTreeMap<&str, &str> = entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        let content = toml::to_string_pretty(&table)
            .map_err(|e| AuthError::Storage(format!("Failed to serialize session: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("toml.tmp");
        write_private(&tmp, content.as_bytes()).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn notify(&self, change: SessionChanged) {
        let _ = self.changes.send(change);
    }
}

async fn load_entries(path: &Path) -> AuthResult<BTreeMap<SessionKey, String>> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(e.into()),
    };

    let table: BTreeMap<String, String> = toml::from_str(&content).map_err(|e| {
        AuthError::Storage(format!("Failed to parse {}: {}", path.display(), e))
    })?;

    let mut entries = BTreeMap::new();
    for (raw_key, value) in table {
        match SessionKey::parse(&raw_key) {
            Some(key) => {
                entries.insert(key, value);
            }
            None => warn!("Ignoring unknown session key '{}'", raw_key),
        }
    }
    Ok(entries)
}

/// Write `content` to a fresh file that only the owner can read on unix.
async fn write_private(path: &Path, content: &[u8]) -> AuthResult<()> {
    // A leftover temp file would keep its old mode
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(content).await?;
    file.sync_all().await?;
    Ok(())
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, key: SessionKey) -> AuthResult<Option<String>> {
        Ok(self.entries.read().await.get(&key).cloned())
    }

    async fn apply(&self, ops: Vec<SessionOp>) -> AuthResult<()> {
        let changes = {
            let mut entries = self.entries.write().await;
            let mut updated = entries.clone();
            let changes = apply_ops(&mut updated, ops);
            if changes.is_empty() {
                return Ok(());
            }
            // Disk first, so a failed write leaves memory untouched
            self.persist(&updated).await?;
            *entries = updated;
            changes
        };

        for change in changes {
            self.notify(change);
        }
        Ok(())
    }

    async fn take(&self, key: SessionKey) -> AuthResult<Option<String>> {
        let taken = {
            let mut entries = self.entries.write().await;
            let Some(value) = entries.get(&key).cloned() else {
                return Ok(None);
            };
            let mut updated = entries.clone();
            updated.remove(&key);
            self.persist(&updated).await?;
            *entries = updated;
            value
        };

        self.notify(SessionChanged::Removed(key));
        Ok(Some(taken))
    }

    async fn clear(&self) -> AuthResult<()> {
        {
            let mut entries = self.entries.write().await;
            match fs::remove_file(&self.path).await {
                Ok(()) => debug!("Removed session file {}", self.path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            entries.clear();
        }

        self.notify(SessionChanged::Cleared);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChanged> {
        self.changes.subscribe()
    }
}

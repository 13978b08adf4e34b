//! Durable subscriber registry.
//!
//! Chat ids live in a JSON array on disk and are mirrored in memory behind a
//! mutex. Registration is idempotent and survives restarts; a broken or
//! missing file degrades to an empty registry instead of refusing to start.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::telegram::ChatId;

pub struct SubscriberStore {
    path: PathBuf,
    inner: Mutex<HashSet<ChatId>>,
}

impl SubscriberStore {
    /// Load the registry from `path`. Missing file means first run; a corrupt
    /// file is logged and treated as empty rather than aborting startup.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let initial = match read_set(&path) {
            Ok(set) => {
                info!(path = %path.display(), count = set.len(), "subscriber registry loaded");
                set
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = ?e,
                    "subscriber registry unreadable; starting empty"
                );
                HashSet::new()
            }
        };
        Self {
            path,
            inner: Mutex::new(initial),
        }
    }

    /// Register a chat. Returns `true` when the chat was new. The updated set
    /// is persisted before the lock is released so concurrent registrations
    /// cannot interleave a stale write.
    pub fn add(&self, chat: ChatId) -> bool {
        let mut set = self.inner.lock().expect("subscriber mutex poisoned");
        if !set.insert(chat) {
            return false;
        }
        if let Err(e) = write_set(&self.path, &set) {
            // The registration stays live for this process; it is only the
            // on-disk copy that is stale.
            warn!(
                path = %self.path.display(),
                error = ?e,
                "subscriber persist failed; registration kept in memory"
            );
        }
        true
    }

    /// Stable snapshot of all recipients, sorted by chat id.
    pub fn snapshot(&self) -> Vec<ChatId> {
        let set = self.inner.lock().expect("subscriber mutex poisoned");
        let mut ids: Vec<ChatId> = set.iter().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("subscriber mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn read_set(path: &Path) -> Result<HashSet<ChatId>> {
    if !path.exists() {
        return Ok(HashSet::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let ids: Vec<ChatId> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(ids.into_iter().collect())
}

fn write_set(path: &Path, set: &HashSet<ChatId>) -> Result<()> {
    let mut ids: Vec<ChatId> = set.iter().copied().collect();
    ids.sort();
    let json = serde_json::to_string_pretty(&ids).context("serializing subscriber registry")?;
    // Write-then-rename keeps a crash from truncating the registry.
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("renaming {} into place", tmp.display()))?;
    Ok(())
}

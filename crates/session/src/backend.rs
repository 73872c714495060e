// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage backends for the credential store.
//!
//! Two implementations mirror the two stores the session layer keeps in sync:
//! [`MemoryBackend`] is the ephemeral, routing-visible store and
//! [`FileBackend`] is the durable store, persisted as a JSON file with
//! atomic tmp+rename writes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::claims::epoch_secs;

/// A key/value store holding credential entries with expiry metadata.
///
/// Implementations are synchronous; the store never awaits while holding one,
/// so individual operations are serialized by the caller's executor.
pub trait Backend: Send + Sync {
    /// Return the live value for `key`, or `None` if absent or expired.
    fn get(&self, key: &str) -> Option<String>;
    /// Write `key`, superseding any previous entry.
    fn set(&self, key: &str, value: &str, ttl: Duration, secure: bool);
    /// Remove `key`. A no-op if the entry is already absent.
    fn remove(&self, key: &str);
}

impl<B: Backend> Backend for std::sync::Arc<B> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
    fn set(&self, key: &str, value: &str, ttl: Duration, secure: bool) {
        (**self).set(key, value, ttl, secure)
    }
    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// A single stored entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    value: String,
    /// Expiry as epoch seconds.
    expires_at: u64,
    /// Whether the entry was written under a secure transport.
    #[serde(default)]
    secure: bool,
}

impl Entry {
    fn live(&self) -> bool {
        self.expires_at > epoch_secs()
    }
}

// ---------------------------------------------------------------------------
// Memory backend
// ---------------------------------------------------------------------------

/// In-process backend. Entries vanish when the process exits.
#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;
        if entry.live() {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    fn set(&self, key: &str, value: &str, ttl: Duration, secure: bool) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                key.to_owned(),
                Entry {
                    value: value.to_owned(),
                    expires_at: epoch_secs().saturating_add(ttl.as_secs()),
                    secure,
                },
            );
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }
}

// ---------------------------------------------------------------------------
// File backend
// ---------------------------------------------------------------------------

/// Serialized shape of the durable store file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct FileState {
    entries: HashMap<String, Entry>,
}

/// Durable backend persisted as a JSON file.
///
/// Every mutation rewrites the whole file; the entry set is three keys, so
/// no incremental format is warranted.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Create a backend persisting to `dir/credentials.json`.
    pub fn new(dir: &Path) -> Self {
        Self { path: dir.join("credentials.json") }
    }

    fn load(&self) -> FileState {
        let Ok(contents) = std::fs::read_to_string(&self.path) else {
            return FileState::default();
        };
        serde_json::from_str(&contents).unwrap_or_default()
    }

    /// Save atomically (write tmp + rename).
    ///
    /// Uses a unique temp filename (PID + counter) to avoid corruption when
    /// concurrent saves race on the same `.tmp` file — a shorter write can
    /// leave trailing bytes from a longer previous write.
    fn save(&self, state: &FileState) {
        use std::sync::atomic::{AtomicU32, Ordering};
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        if let Some(dir) = self.path.parent() {
            if !dir.exists() {
                if let Err(e) = std::fs::create_dir_all(dir) {
                    tracing::warn!(err = %e, "failed to create durable store dir");
                    return;
                }
            }
        }

        let json = match serde_json::to_string_pretty(state) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(err = %e, "failed to serialize durable store");
                return;
            }
        };
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp_name = format!(
            "{}.{}.{}.tmp",
            self.path.file_name().unwrap_or_default().to_string_lossy(),
            std::process::id(),
            seq,
        );
        let tmp_path = self.path.with_file_name(tmp_name);
        let result = std::fs::write(&tmp_path, json)
            .and_then(|()| std::fs::rename(&tmp_path, &self.path));
        if let Err(e) = result {
            tracing::warn!(err = %e, "failed to persist durable store");
        }
    }
}

impl Backend for FileBackend {
    fn get(&self, key: &str) -> Option<String> {
        let state = self.load();
        let entry = state.entries.get(key)?;
        if entry.live() {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    fn set(&self, key: &str, value: &str, ttl: Duration, secure: bool) {
        let mut state = self.load();
        state.entries.insert(
            key.to_owned(),
            Entry {
                value: value.to_owned(),
                expires_at: epoch_secs().saturating_add(ttl.as_secs()),
                secure,
            },
        );
        self.save(&state);
    }

    fn remove(&self, key: &str) {
        let mut state = self.load();
        if state.entries.remove(key).is_some() {
            self.save(&state);
        }
    }
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;

//! Key-Value Storage Substrates
//!
//! Synchronous string stores with the semantics of the Web Storage API.
//! `wasm32` builds get `localStorage` / `sessionStorage` backends; every
//! target gets [`MemoryStore`], which is also what tests run against.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

/// Storage substrate errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The substrate cannot be reached (private browsing, no window, ...)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The browser refused the write
    #[error("Storage write rejected for key {key}: {reason}")]
    WriteRejected { key: String, reason: String },
}

/// A string-keyed, string-valued store
///
/// Reads never fail: an unreachable substrate reads as empty.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str);
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a store (e.g. to simulate what a previous page load left)
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.lock().remove(key);
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{KeyValueStore, StorageError};

    /// Which Web Storage area a store is bound to
    #[derive(Debug, Clone, Copy)]
    enum Area {
        Local,
        Session,
    }

    impl Area {
        /// `None` when the browser denies access (private browsing, sandboxed frames)
        fn storage(self) -> Option<web_sys::Storage> {
            let window = web_sys::window()?;
            let storage = match self {
                Self::Local => window.local_storage(),
                Self::Session => window.session_storage(),
            };
            storage.ok().flatten()
        }

        fn get(self, key: &str) -> Option<String> {
            self.storage()?.get_item(key).ok().flatten()
        }

        fn set(self, key: &str, value: &str) -> Result<(), StorageError> {
            let storage = self
                .storage()
                .ok_or_else(|| StorageError::Unavailable(format!("{:?} storage", self)))?;
            storage
                .set_item(key, value)
                .map_err(|e| StorageError::WriteRejected {
                    key: key.to_string(),
                    reason: format!("{:?}", e),
                })
        }

        fn remove(self, key: &str) {
            if let Some(storage) = self.storage() {
                let _ = storage.remove_item(key);
            }
        }
    }

    /// `window.localStorage`
    #[derive(Debug, Clone, Copy, Default)]
    pub struct BrowserLocalStore;

    impl KeyValueStore for BrowserLocalStore {
        fn get(&self, key: &str) -> Option<String> {
            Area::Local.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            Area::Local.set(key, value)
        }

        fn remove(&self, key: &str) {
            Area::Local.remove(key)
        }
    }

    /// `window.sessionStorage`
    #[derive(Debug, Clone, Copy, Default)]
    pub struct BrowserSessionStore;

    impl KeyValueStore for BrowserSessionStore {
        fn get(&self, key: &str) -> Option<String> {
            Area::Session.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            Area::Session.set(key, value)
        }

        fn remove(&self, key: &str) {
            Area::Session.remove(key)
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{BrowserLocalStore, BrowserSessionStore};

//! Durable key-value storage used to persist preferences.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::StorageError;

/// String key-value storage with `localStorage` semantics.
///
/// Reads never fail: a missing or unreadable key is `None`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store.
///
/// Clones share the same map, so a test can keep a handle, drop the
/// preferences built on top of it, and load them again to simulate a
/// page reload.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail, like a browser with storage
    /// disabled or over quota.
    pub fn read_only() -> Self {
        MemoryStore {
            entries: Rc::default(),
            read_only: true,
        }
    }

    /// Seed a store with existing entries.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        {
            let mut map = store.entries.borrow_mut();
            for (k, v) in entries {
                map.insert(k.to_string(), v.to_string());
            }
        }
        store
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Unavailable);
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_entries() {
        let a = MemoryStore::new();
        let b = a.clone();
        a.set("k", "v").unwrap();
        assert_eq!(b.get("k").as_deref(), Some("v"));
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn read_only_rejects_writes() {
        let store = MemoryStore::read_only();
        assert_eq!(store.set("k", "v"), Err(StorageError::Unavailable));
        assert!(store.is_empty());
    }

    #[test]
    fn seeded_entries_readable() {
        let store = MemoryStore::with_entries([("soundsEnabled", "false")]);
        assert_eq!(store.get("soundsEnabled").as_deref(), Some("false"));
        assert_eq!(store.get("soundVolume"), None);
    }
}

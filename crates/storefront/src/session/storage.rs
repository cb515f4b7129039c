//! Storage adapter behind the session store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Durable per-visitor key/value storage.
///
/// Every operation is synchronous and infallible from the caller's point of
/// view; an implementation that cannot reach its medium behaves as if the key
/// were absent.
pub trait SessionStorage: Send + Sync {
    /// Read the raw value stored under `key`.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: String);

    /// Remove `key`. Removing a missing key is a no-op.
    fn remove_item(&self, key: &str);
}

/// A pending write recorded by [`MemoryStorage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Set(String),
    Removed,
}

#[derive(Debug, Default)]
struct Inner {
    items: HashMap<String, String>,
    journal: HashMap<String, Change>,
}

/// In-memory storage with a change journal.
///
/// Used as the request-scoped snapshot of the visitor's session: it is seeded
/// from the persistent session, serves reads synchronously, and hands its
/// journal back so the changes can be written through afterwards. Only the
/// last change per key is kept.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<Inner>,
}

impl MemoryStorage {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-filled with `items`. Seeding is not journaled.
    #[must_use]
    pub fn with_items<I, K, V>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let items = items
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            inner: Mutex::new(Inner {
                items,
                journal: HashMap::new(),
            }),
        }
    }

    /// Drain the writes made since the last call.
    pub fn take_changes(&self) -> Vec<(String, Change)> {
        self.lock().journal.drain().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock cannot leave the maps half-written.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.lock().items.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: String) {
        let mut inner = self.lock();
        inner.items.insert(key.to_string(), value.clone());
        inner.journal.insert(key.to_string(), Change::Set(value));
    }

    fn remove_item(&self, key: &str) {
        let mut inner = self.lock();
        inner.items.remove(key);
        inner.journal.insert(key.to_string(), Change::Removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_items_are_readable_but_not_dirty() {
        let storage = MemoryStorage::with_items([("token", "t1")]);
        assert_eq!(storage.get_item("token").as_deref(), Some("t1"));
        assert!(storage.take_changes().is_empty());
    }

    #[test]
    fn test_journal_keeps_last_change_per_key() {
        let storage = MemoryStorage::new();
        storage.set_item("token", "t1".to_string());
        storage.set_item("token", "t2".to_string());
        storage.set_item("user", "{}".to_string());
        storage.remove_item("user");

        let mut changes = storage.take_changes();
        changes.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            changes,
            vec![
                ("token".to_string(), Change::Set("t2".to_string())),
                ("user".to_string(), Change::Removed),
            ]
        );
        assert!(storage.take_changes().is_empty());
        assert_eq!(storage.get_item("token").as_deref(), Some("t2"));
        assert_eq!(storage.get_item("user"), None);
    }

    #[test]
    fn test_remove_missing_key_is_noop_read() {
        let storage = MemoryStorage::new();
        storage.remove_item("token");
        assert_eq!(storage.get_item("token"), None);
    }
}

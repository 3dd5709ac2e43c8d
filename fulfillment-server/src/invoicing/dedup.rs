//! In-flight dedup guard
//!
//! Process-local set of document identifiers currently being generated.
//! Claims are RAII tokens, so release happens on every exit path of the
//! pipeline (success, degraded result, panic unwind).

use dashmap::DashMap;
use std::sync::Arc;

/// Concurrent set of in-flight keys
#[derive(Debug, Clone, Default)]
pub struct InFlightSet {
    keys: Arc<DashMap<String, ()>>,
}

impl InFlightSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim `key`. Returns `None` when the key is already claimed
    /// by a concurrent caller.
    pub fn acquire(&self, key: &str) -> Option<InFlightGuard> {
        use dashmap::mapref::entry::Entry;
        match self.keys.entry(key.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(InFlightGuard {
                    keys: self.keys.clone(),
                    key: key.to_string(),
                })
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// An acquired claim; the key is released on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    keys: Arc<DashMap<String, ()>>,
    key: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.keys.remove(&self.key);
    }
}

//! Single-flight identity cache
//!
//! Maps a natural key to its persisted ID for the lifetime of a scan. The
//! first caller for an unseen key runs the resolver; every concurrent caller
//! for the same key waits on that same cell and receives the same ID. The
//! outer map lock is only held long enough to fetch or insert the cell, never
//! across the resolver.

use crate::models::EntityId;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

/// Artist natural key: trimmed name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtistKey(pub String);

/// Album natural key: owning artist, year, title
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlbumKey {
    pub artist_id: EntityId,
    pub year: Option<i32>,
    pub title: String,
}

/// Per-key memoization with at-most-one in-flight resolver
pub struct IdentityCache<K> {
    cells: Mutex<HashMap<K, Arc<OnceCell<EntityId>>>>,
}

impl<K> IdentityCache<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Cached ID for `key`, running `resolver` if this key is unseen
    ///
    /// A failed resolver leaves the key unresolved; the next waiter (or a
    /// later caller) runs its own resolver.
    pub async fn get_or_create<F, Fut, E>(&self, key: K, resolver: F) -> Result<EntityId, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<EntityId, E>>,
    {
        let cell = {
            let mut cells = self
                .cells
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            Arc::clone(cells.entry(key).or_default())
        };

        cell.get_or_try_init(resolver).await.copied()
    }

    /// Already-resolved ID, without resolving
    pub fn get(&self, key: &K) -> Option<EntityId> {
        let cells = self
            .cells
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cells.get(key).and_then(|cell| cell.get().copied())
    }

    /// Number of resolved keys
    pub fn len(&self) -> usize {
        let cells = self
            .cells
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cells.values().filter(|cell| cell.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K> Default for IdentityCache<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

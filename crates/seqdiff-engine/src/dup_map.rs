#![forbid(unsafe_code)]

//! Duplicate map: track key -> FIFO chain of records.
//!
//! A list may hold several equal items. Each occurrence keeps its own record
//! (and so its own position history); the map chains them in observation
//! order through the records' `prev_dup`/`next_dup` links. Lookups return
//! the first record in the chain that qualifies, which gives stable
//! first-in first-out matching of equal items between passes.

use std::collections::HashMap;
use std::hash::Hash;

use ahash::RandomState;

use crate::pool::{RecordId, RecordPool};

#[derive(Debug, Clone, Copy)]
struct Chain {
    head: RecordId,
    tail: RecordId,
}

/// Mapping from key to the chain of records sharing it.
#[derive(Debug)]
pub(crate) struct DuplicateMap<K> {
    chains: HashMap<K, Chain, RandomState>,
}

impl<K: Hash + Eq + Clone> DuplicateMap<K> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            chains: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
        }
    }

    /// Append `id` to the tail of its key's chain.
    pub(crate) fn put<T>(&mut self, pool: &mut RecordPool<T, K>, id: RecordId) {
        let key = pool[id].key.clone();
        pool[id].next_dup = None;
        match self.chains.get_mut(&key) {
            Some(chain) => {
                let tail = chain.tail;
                pool[tail].next_dup = Some(id);
                pool[id].prev_dup = Some(tail);
                chain.tail = id;
            }
            None => {
                pool[id].prev_dup = None;
                self.chains.insert(key, Chain { head: id, tail: id });
            }
        }
    }

    /// First record with `key` whose current index is at or after
    /// `at_or_after`, or the chain head when `at_or_after` is `None`.
    pub(crate) fn get<T>(
        &self,
        pool: &RecordPool<T, K>,
        key: &K,
        at_or_after: Option<usize>,
    ) -> Option<RecordId> {
        let chain = self.chains.get(key)?;
        let Some(from) = at_or_after else {
            return Some(chain.head);
        };
        let mut cursor = Some(chain.head);
        while let Some(id) = cursor {
            let record = &pool[id];
            if record.current_index.is_some_and(|current| from <= current) {
                return Some(id);
            }
            cursor = record.next_dup;
        }
        None
    }

    /// Detach `id` from its chain, dropping the key once the chain empties.
    pub(crate) fn remove<T>(&mut self, pool: &mut RecordPool<T, K>, id: RecordId) {
        let (prev, next) = (pool[id].prev_dup.take(), pool[id].next_dup.take());
        if let Some(p) = prev {
            pool[p].next_dup = next;
        }
        if let Some(n) = next {
            pool[n].prev_dup = prev;
        }

        let key = &pool[id].key;
        if prev.is_none() && next.is_none() {
            self.chains.remove(key);
            return;
        }
        if let Some(chain) = self.chains.get_mut(key) {
            if let (None, Some(n)) = (prev, next) {
                chain.head = n;
            }
            if let (Some(p), None) = (prev, next) {
                chain.tail = p;
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.chains.clear();
    }

    /// Number of distinct keys.
    pub(crate) fn len(&self) -> usize {
        self.chains.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

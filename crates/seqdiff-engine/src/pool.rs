#![forbid(unsafe_code)]

//! Index-addressed record pool.
//!
//! Every tracked item lives in a [`RecordPool`] slot and is referred to by
//! its [`RecordId`]. Intrusive links between records (collection order,
//! previous order, duplicate chains, change lists) are ids, not pointers, so
//! the structure has no reference cycles and no unsafe code.
//!
//! Released slots go on a free list and are reused before the pool grows,
//! which keeps a differ that observes a list of stable size at a stable
//! footprint across passes.
//!
//! # Usage
//!
//! ```ignore
//! let mut pool = RecordPool::with_capacity(4);
//! let id = pool.alloc(Record::new("a", "a"));
//! assert_eq!(pool[id].item, "a");
//! pool.release(id);
//! assert_eq!(pool.pooled(), 1);
//! ```

use std::fmt;
use std::ops::{Index, IndexMut};

/// Stable identity of a tracked record.
///
/// Ids are unique among live records. A view patcher should key rendered
/// segments on the id, not on an index: the id survives moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(u32);

impl RecordId {
    /// Slot index inside the pool.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Raw id value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Bookkeeping for one logical occurrence of an item.
#[derive(Debug, Clone)]
pub(crate) struct Record<T, K> {
    pub(crate) item: T,
    pub(crate) key: K,
    pub(crate) previous_index: Option<usize>,
    pub(crate) current_index: Option<usize>,

    // Collection order.
    pub(crate) prev: Option<RecordId>,
    pub(crate) next: Option<RecordId>,
    // Collection order as of the start of the pass.
    pub(crate) next_previous: Option<RecordId>,
    // Chain of records sharing a key in one duplicate map.
    pub(crate) prev_dup: Option<RecordId>,
    pub(crate) next_dup: Option<RecordId>,
    // Change lists.
    pub(crate) next_added: Option<RecordId>,
    pub(crate) next_moved: Option<RecordId>,
    pub(crate) prev_removed: Option<RecordId>,
    pub(crate) next_removed: Option<RecordId>,
}

impl<T, K> Record<T, K> {
    pub(crate) fn new(item: T, key: K) -> Self {
        Self {
            item,
            key,
            previous_index: None,
            current_index: None,
            prev: None,
            next: None,
            next_previous: None,
            prev_dup: None,
            next_dup: None,
            next_added: None,
            next_moved: None,
            prev_removed: None,
            next_removed: None,
        }
    }
}

enum Slot<T, K> {
    Occupied(Record<T, K>),
    Vacant { next_free: Option<RecordId> },
}

/// Arena of records with an explicit free list.
pub(crate) struct RecordPool<T, K> {
    slots: Vec<Slot<T, K>>,
    free_head: Option<RecordId>,
    live: usize,
}

impl<T, K> RecordPool<T, K> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            live: 0,
        }
    }

    /// Store `record`, reusing a released slot when one is available.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` records are live at once.
    pub(crate) fn alloc(&mut self, record: Record<T, K>) -> RecordId {
        self.live += 1;
        if let Some(id) = self.free_head {
            let slot = &mut self.slots[id.index()];
            let Slot::Vacant { next_free } = *slot else {
                unreachable!("free list points at live record {id}");
            };
            self.free_head = next_free;
            *slot = Slot::Occupied(record);
            return id;
        }
        let raw = u32::try_from(self.slots.len())
            .unwrap_or_else(|_| panic!("record pool exhausted u32 id space"));
        self.slots.push(Slot::Occupied(record));
        RecordId(raw)
    }

    /// Drop the record at `id` and put its slot on the free list.
    pub(crate) fn release(&mut self, id: RecordId) {
        let slot = &mut self.slots[id.index()];
        debug_assert!(
            matches!(slot, Slot::Occupied(_)),
            "double release of record {id}"
        );
        *slot = Slot::Vacant {
            next_free: self.free_head,
        };
        self.free_head = Some(id);
        self.live -= 1;
    }

    /// Number of live records.
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    /// Number of released slots waiting for reuse.
    pub(crate) fn pooled(&self) -> usize {
        self.slots.len() - self.live
    }
}

impl<T, K> Index<RecordId> for RecordPool<T, K> {
    type Output = Record<T, K>;

    #[inline]
    fn index(&self, id: RecordId) -> &Record<T, K> {
        match &self.slots[id.index()] {
            Slot::Occupied(record) => record,
            Slot::Vacant { .. } => unreachable!("record {id} was released"),
        }
    }
}

impl<T, K> IndexMut<RecordId> for RecordPool<T, K> {
    #[inline]
    fn index_mut(&mut self, id: RecordId) -> &mut Record<T, K> {
        match &mut self.slots[id.index()] {
            Slot::Occupied(record) => record,
            Slot::Vacant { .. } => unreachable!("record {id} was released"),
        }
    }
}

impl<T, K> fmt::Debug for RecordPool<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordPool")
            .field("live", &self.live)
            .field("pooled", &self.pooled())
            .finish()
    }
}

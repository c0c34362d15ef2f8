#![forbid(unsafe_code)]

//! Change records and their rendering.
//!
//! A diff pass is read back through [`ChangeRecord`] views: borrowed,
//! `Copy`, and carrying the record's stable [`RecordId`] plus its previous
//! and current index. [`ChangeSet`] is the owned equivalent for callers that
//! must keep a pass's result past the next pass.
//!
//! # Text format
//!
//! A record renders as `item` when its index did not change and as
//! `item[prev->curr]` otherwise, with `null` for a missing index. A whole
//! pass renders as five lines:
//!
//! ```text
//! collection: b[null->0], a[0->1]
//! previous: a[0->1]
//! additions: b[null->0]
//! moves: a[0->1]
//! removals:
//! ```

use std::fmt;

use crate::pool::{Record, RecordId, RecordPool};

/// Borrowed view of one tracked record after a pass.
#[derive(Debug)]
pub struct ChangeRecord<'a, T> {
    /// Stable identity of the record.
    pub id: RecordId,
    /// Most recently observed item.
    pub item: &'a T,
    /// Index in the previous pass, `None` for additions.
    pub previous_index: Option<usize>,
    /// Index in this pass, `None` for removals.
    pub current_index: Option<usize>,
}

impl<T> Clone for ChangeRecord<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ChangeRecord<'_, T> {}

impl<'a, T> ChangeRecord<'a, T> {
    pub(crate) fn from_record<K>(id: RecordId, record: &'a Record<T, K>) -> Self {
        Self {
            id,
            item: &record.item,
            previous_index: record.previous_index,
            current_index: record.current_index,
        }
    }

    /// `true` when the record did not change position.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.previous_index == self.current_index
    }

    /// Clone into an owned [`RecordChange`].
    #[must_use]
    pub fn to_owned_change(&self) -> RecordChange<T>
    where
        T: Clone,
    {
        RecordChange {
            id: self.id.raw(),
            item: self.item.clone(),
            previous_index: self.previous_index,
            current_index: self.current_index,
        }
    }
}

impl<T: fmt::Display> fmt::Display for ChangeRecord<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_record(f, self.item, self.previous_index, self.current_index)
    }
}

/// Which intrusive list a [`Records`] iterator follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Link {
    Collection,
    Previous,
    Additions,
    Moves,
    Removals,
}

impl Link {
    #[inline]
    fn next<T, K>(self, record: &Record<T, K>) -> Option<RecordId> {
        match self {
            Self::Collection => record.next,
            Self::Previous => record.next_previous,
            Self::Additions => record.next_added,
            Self::Moves => record.next_moved,
            Self::Removals => record.next_removed,
        }
    }
}

/// Iterator over one of a differ's record lists.
pub struct Records<'a, T, K> {
    pool: &'a RecordPool<T, K>,
    cursor: Option<RecordId>,
    link: Link,
}

impl<'a, T, K> Records<'a, T, K> {
    pub(crate) fn new(pool: &'a RecordPool<T, K>, head: Option<RecordId>, link: Link) -> Self {
        Self {
            pool,
            cursor: head,
            link,
        }
    }
}

impl<'a, T, K> Iterator for Records<'a, T, K> {
    type Item = ChangeRecord<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let record = &self.pool[id];
        self.cursor = self.link.next(record);
        Some(ChangeRecord::from_record(id, record))
    }
}

impl<T, K> fmt::Debug for Records<'_, T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Records")
            .field("cursor", &self.cursor)
            .field("link", &self.link)
            .finish()
    }
}

/// Owned copy of one record's state after a pass.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RecordChange<T> {
    /// Raw [`RecordId`] value.
    pub id: u32,
    /// Item as last observed.
    pub item: T,
    /// Index in the previous pass.
    pub previous_index: Option<usize>,
    /// Index in this pass.
    pub current_index: Option<usize>,
}

impl<T: fmt::Display> fmt::Display for RecordChange<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_record(f, &self.item, self.previous_index, self.current_index)
    }
}

/// Owned snapshot of a whole pass.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChangeSet<T> {
    /// Records in new order.
    pub collection: Vec<RecordChange<T>>,
    /// Records in old order, including removed ones.
    pub previous: Vec<RecordChange<T>>,
    /// Records new in this pass.
    pub additions: Vec<RecordChange<T>>,
    /// Retained records whose index changed.
    pub moves: Vec<RecordChange<T>>,
    /// Records absent from this pass.
    pub removals: Vec<RecordChange<T>>,
}

impl<T> ChangeSet<T> {
    /// `true` when the pass added, moved, and removed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.moves.is_empty() && self.removals.is_empty()
    }
}

impl<T: fmt::Display> fmt::Display for ChangeSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_changes(
            f,
            [
                ("collection", self.collection.iter()),
                ("previous", self.previous.iter()),
                ("additions", self.additions.iter()),
                ("moves", self.moves.iter()),
                ("removals", self.removals.iter()),
            ],
        )
    }
}

struct Index(Option<usize>);

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(i) => write!(f, "{i}"),
            None => f.write_str("null"),
        }
    }
}

fn write_record<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    item: &T,
    previous: Option<usize>,
    current: Option<usize>,
) -> fmt::Result {
    if previous == current {
        write!(f, "{item}")
    } else {
        write!(f, "{item}[{}->{}]", Index(previous), Index(current))
    }
}

/// Write labelled, comma-joined lines, one per list.
pub(crate) fn write_changes<I, D>(
    f: &mut fmt::Formatter<'_>,
    sections: [(&str, I); 5],
) -> fmt::Result
where
    I: Iterator<Item = D>,
    D: fmt::Display,
{
    for (label, records) in sections {
        write!(f, "{label}: ")?;
        for (i, record) in records.enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{record}")?;
        }
        f.write_str("\n")?;
    }
    Ok(())
}

#![forbid(unsafe_code)]

//! Iterable differ: incremental change detection for ordered collections.
//!
//! An [`IterableDiffer`] remembers the collection it saw last and, on every
//! pass, reports what happened to it: which records were added, which were
//! removed, and which retained records changed index. Records keep their
//! [`RecordId`] across passes so a view layer can reuse the node it rendered
//! for a record instead of recreating it.
//!
//! # Algorithm
//!
//! One forward walk over the new items, O(n) expected and O(n·k) worst case
//! for k equal items:
//!
//! 1. **Reset.** Release records reported removed last pass, snapshot the
//!    current order as the previous order, and fold current indices into
//!    previous indices for last pass's additions and moves.
//! 2. **Walk.** While items line up with the snapshot (same track key at the
//!    cursor), nothing happens. On a mismatch the cursor record is detached
//!    into the removals list and the item is looked up, first among records
//!    still in the collection (a move), then among records detached earlier
//!    in this pass (a reinsertion), and only then allocated (an addition).
//!    After the first mismatch, every matching record is also checked
//!    against the detached records, and an index change is recorded as a
//!    move.
//! 3. **Truncate.** Records left past the cursor are removed.
//!
//! Removed records stay readable until the next pass, then go back to the
//! pool's free list.
//!
//! # Equality
//!
//! Items are compared through a [`TrackBy`] strategy. For [`Value`] items
//! the default [`ValueIdentity`] compares scalars and strings by value
//! (`NaN` included) and everything else by identity.
//!
//! # Example
//!
//! ```
//! use seqdiff_core::Value;
//! use seqdiff_engine::IterableDiffer;
//!
//! let mut differ = IterableDiffer::for_values();
//! differ.check(&Value::list(["a"])).unwrap();
//!
//! let changes = differ.diff(&Value::list(["b", "a"])).unwrap().expect("changed");
//! assert_eq!(changes.additions().count(), 1);
//! assert_eq!(changes.moves().count(), 1);
//!
//! assert!(differ.diff(&Value::list(["b", "a"])).unwrap().is_none());
//! ```

use std::fmt;

use seqdiff_core::{ByValue, DiffError, TrackBy, Value, ValueIdentity};

use crate::changes::{self, ChangeRecord, ChangeSet, Link, Records};
use crate::config::DifferConfig;
use crate::dup_map::DuplicateMap;
use crate::pool::{Record, RecordId, RecordPool};
use crate::reorder::longest_weighted_run;

/// Counters for the most recent pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    /// Items in the collection after the pass.
    pub length: usize,
    /// Records added.
    pub additions: usize,
    /// Records listed as moved.
    pub moves: usize,
    /// Records removed.
    pub removals: usize,
    /// Live records, including removed ones still reported.
    pub live_records: usize,
    /// Released slots waiting for reuse.
    pub pooled_records: usize,
}

/// Default differ over dynamic [`Value`] items.
pub type ValueDiffer = IterableDiffer<Value, ValueIdentity>;

/// Change detector for an ordered collection.
///
/// Single writer: every pass takes `&mut self`, and the result of a pass is
/// read back through `&self` until the next one.
pub struct IterableDiffer<T, S: TrackBy<T>> {
    strategy: S,
    config: DifferConfig,
    pool: RecordPool<T, S::Key>,
    // Records in the collection, by key.
    linked: DuplicateMap<S::Key>,
    // Records detached during the current pass, by key.
    unlinked: DuplicateMap<S::Key>,
    length: usize,

    it_head: Option<RecordId>,
    it_tail: Option<RecordId>,
    previous_it_head: Option<RecordId>,
    additions_head: Option<RecordId>,
    additions_tail: Option<RecordId>,
    moves_head: Option<RecordId>,
    moves_tail: Option<RecordId>,
    removals_head: Option<RecordId>,
    removals_tail: Option<RecordId>,

    stats: DiffStats,
}

impl ValueDiffer {
    /// Differ over [`Value`] items with the default config.
    #[must_use]
    pub fn for_values() -> Self {
        Self::new(ValueIdentity)
    }
}

impl<T: std::hash::Hash + Eq + Clone> IterableDiffer<T, ByValue> {
    /// Differ over typed items compared by their own equality.
    #[must_use]
    pub fn by_value() -> Self {
        Self::new(ByValue)
    }
}

impl<T, S: TrackBy<T> + Default> Default for IterableDiffer<T, S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<T, S: TrackBy<T>> IterableDiffer<T, S> {
    /// Create a differ with the given track-by strategy.
    pub fn new(strategy: S) -> Self {
        Self::with_config(strategy, DifferConfig::default())
    }

    /// Create a differ with an explicit configuration.
    pub fn with_config(strategy: S, config: DifferConfig) -> Self {
        let capacity = config.initial_capacity;
        Self {
            strategy,
            config,
            pool: RecordPool::with_capacity(capacity),
            linked: DuplicateMap::with_capacity(capacity),
            unlinked: DuplicateMap::with_capacity(0),
            length: 0,
            it_head: None,
            it_tail: None,
            previous_it_head: None,
            additions_head: None,
            additions_tail: None,
            moves_head: None,
            moves_tail: None,
            removals_head: None,
            removals_tail: None,
            stats: DiffStats::default(),
        }
    }

    /// The track-by strategy.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// The configuration this differ was built with.
    pub fn config(&self) -> &DifferConfig {
        &self.config
    }

    /// Number of items in the collection as of the last pass.
    pub fn len(&self) -> usize {
        self.length
    }

    /// `true` when the last pass saw an empty collection.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// `true` when the last pass added, moved, or removed anything.
    pub fn is_dirty(&self) -> bool {
        self.additions_head.is_some() || self.moves_head.is_some() || self.removals_head.is_some()
    }

    /// Counters for the last pass.
    pub fn stats(&self) -> DiffStats {
        self.stats
    }

    /// Run a pass over `items`; return `self` when anything changed.
    pub fn diff_items<I>(&mut self, items: I) -> Option<&Self>
    where
        I: IntoIterator<Item = T>,
    {
        if self.check_items(items) {
            Some(self)
        } else {
            None
        }
    }

    /// Run a pass over `items`; return whether anything changed.
    pub fn check_items<I>(&mut self, items: I) -> bool
    where
        I: IntoIterator<Item = T>,
    {
        let items = items.into_iter();
        #[cfg(feature = "tracing")]
        let _span =
            seqdiff_core::logging::debug_span!("seqdiff.check", len_hint = items.size_hint().0)
                .entered();

        self.reset();

        let mut record = self.it_head;
        let mut may_be_dirty = false;
        let mut index = 0;
        for item in items {
            let key = self.strategy.track_key(&item);
            let placed = match record {
                Some(id) if self.pool[id].key == key => {
                    if may_be_dirty {
                        self.verify_reinsertion(id, item, key, index)
                    } else {
                        self.pool[id].item = item;
                        id
                    }
                }
                _ => {
                    may_be_dirty = true;
                    self.mismatch(record, item, key, index)
                }
            };
            record = self.pool[placed].next;
            index += 1;
        }
        self.truncate(record);
        self.length = index;

        self.stats.length = index;
        self.stats.live_records = self.pool.live();
        self.stats.pooled_records = self.pool.pooled();
        self.log_pass();

        self.is_dirty()
    }

    /// Lifecycle hook; the differ holds no external resources.
    pub fn on_destroy(&mut self) {}

    // --- Reading a pass ---------------------------------------------------

    /// Records in current order.
    pub fn items(&self) -> Records<'_, T, S::Key> {
        Records::new(&self.pool, self.it_head, Link::Collection)
    }

    /// Records in the order of the previous pass, removed ones included.
    pub fn previous_items(&self) -> Records<'_, T, S::Key> {
        Records::new(&self.pool, self.previous_it_head, Link::Previous)
    }

    /// Records added by the last pass, in current order.
    pub fn additions(&self) -> Records<'_, T, S::Key> {
        Records::new(&self.pool, self.additions_head, Link::Additions)
    }

    /// Retained records whose index changed in the last pass.
    ///
    /// This includes records that only shifted because of an insertion or
    /// removal elsewhere. See [`reordered`](Self::reordered) for the records
    /// whose relative order changed.
    pub fn moves(&self) -> Records<'_, T, S::Key> {
        Records::new(&self.pool, self.moves_head, Link::Moves)
    }

    /// Records removed by the last pass, in previous order.
    pub fn removals(&self) -> Records<'_, T, S::Key> {
        Records::new(&self.pool, self.removals_head, Link::Removals)
    }

    /// Moved records whose order relative to other retained records
    /// changed, in current order.
    ///
    /// A uniform shift never shows up here; swapping two neighbours reports
    /// one of them. Records that kept their index are never reported, so the
    /// result is always a subset of [`moves`](Self::moves). Leaving the
    /// reported records out, the retained records are in previous order.
    /// This is the set a view patcher needs to physically move.
    pub fn reordered(&self) -> Vec<ChangeRecord<'_, T>> {
        let retained: Vec<ChangeRecord<'_, T>> = self
            .items()
            .filter(|record| record.previous_index.is_some())
            .collect();
        let previous: Vec<usize> = retained
            .iter()
            .filter_map(|record| record.previous_index)
            .collect();
        // Unmoved records are increasing in previous index and outweigh
        // every moved record together, so all of them stay on the run.
        let heavy = retained.len() as u64 + 1;
        let weights: Vec<u64> = retained
            .iter()
            .map(|record| if record.is_unchanged() { heavy } else { 1 })
            .collect();
        let on_run = longest_weighted_run(&previous, &weights);
        retained
            .into_iter()
            .zip(on_run)
            .filter_map(|(record, stays)| (!stays).then_some(record))
            .collect()
    }

    /// Look up the record currently tracked under `id`.
    pub fn record(&self, id: RecordId) -> Option<ChangeRecord<'_, T>> {
        self.items()
            .chain(self.removals())
            .find(|record| record.id == id)
    }

    /// Owned snapshot of the last pass.
    pub fn change_set(&self) -> ChangeSet<T>
    where
        T: Clone,
    {
        fn owned<T: Clone, K>(records: Records<'_, T, K>) -> Vec<changes::RecordChange<T>> {
            records.map(|record| record.to_owned_change()).collect()
        }
        ChangeSet {
            collection: owned(self.items()),
            previous: owned(self.previous_items()),
            additions: owned(self.additions()),
            moves: owned(self.moves()),
            removals: owned(self.removals()),
        }
    }

    // --- Pass internals ---------------------------------------------------

    fn reset(&mut self) {
        if !self.is_dirty() {
            return;
        }

        // Records reported removed last pass are now gone for good.
        let mut cursor = self.removals_head.take();
        self.removals_tail = None;
        while let Some(id) = cursor {
            cursor = self.pool[id].next_removed;
            self.pool.release(id);
        }

        self.previous_it_head = self.it_head;
        let mut cursor = self.it_head;
        while let Some(id) = cursor {
            let next = self.pool[id].next;
            self.pool[id].next_previous = next;
            cursor = next;
        }

        let mut cursor = self.additions_head.take();
        self.additions_tail = None;
        while let Some(id) = cursor {
            let record = &mut self.pool[id];
            record.previous_index = record.current_index;
            cursor = record.next_added;
        }

        let mut cursor = self.moves_head.take();
        self.moves_tail = None;
        while let Some(id) = cursor {
            let record = &mut self.pool[id];
            record.previous_index = record.current_index;
            cursor = record.next_moved;
        }

        self.stats = DiffStats::default();
    }

    /// Place `item` at `index` when the cursor record does not match it.
    fn mismatch(
        &mut self,
        record: Option<RecordId>,
        item: T,
        key: S::Key,
        index: usize,
    ) -> RecordId {
        let previous = match record {
            Some(id) => {
                let prev = self.pool[id].prev;
                self.remove(id);
                prev
            }
            None => self.it_tail,
        };

        if let Some(found) = self.linked.get(&self.pool, &key, Some(index)) {
            self.pool[found].item = item;
            self.move_after(found, previous, index)
        } else if let Some(found) = self.unlinked.get(&self.pool, &key, None) {
            self.pool[found].item = item;
            self.reinsert_after(found, previous, index)
        } else {
            let id = self.pool.alloc(Record::new(item, key));
            self.add_after(id, previous, index)
        }
    }

    /// The cursor record matches, but an equal record detached earlier in
    /// this pass takes precedence so duplicates keep FIFO order.
    fn verify_reinsertion(&mut self, id: RecordId, item: T, key: S::Key, index: usize) -> RecordId {
        if let Some(reinsert) = self.unlinked.get(&self.pool, &key, None) {
            // The detached record takes this slot; the cursor record is
            // revisited at the next index.
            let prev = self.pool[id].prev;
            self.pool[reinsert].item = item;
            self.reinsert_after(reinsert, prev, index)
        } else {
            self.pool[id].item = item;
            if self.pool[id].current_index != Some(index) {
                self.pool[id].current_index = Some(index);
                self.add_to_moves(id, index);
            }
            id
        }
    }

    fn truncate(&mut self, mut record: Option<RecordId>) {
        while let Some(id) = record {
            record = self.pool[id].next;
            self.remove(id);
        }
        self.unlinked.clear();
    }

    fn reinsert_after(&mut self, id: RecordId, prev: Option<RecordId>, index: usize) -> RecordId {
        self.unlinked.remove(&mut self.pool, id);

        let (before, after) = (self.pool[id].prev_removed, self.pool[id].next_removed);
        match before {
            Some(b) => self.pool[b].next_removed = after,
            None => self.removals_head = after,
        }
        match after {
            Some(a) => self.pool[a].prev_removed = before,
            None => self.removals_tail = before,
        }
        self.pool[id].prev_removed = None;
        self.pool[id].next_removed = None;
        self.stats.removals -= 1;

        self.insert_after(id, prev, index);
        self.add_to_moves(id, index);
        id
    }

    fn move_after(&mut self, id: RecordId, prev: Option<RecordId>, index: usize) -> RecordId {
        self.unlink(id);
        self.insert_after(id, prev, index);
        self.add_to_moves(id, index);
        id
    }

    fn add_after(&mut self, id: RecordId, prev: Option<RecordId>, index: usize) -> RecordId {
        self.insert_after(id, prev, index);
        self.pool[id].next_added = None;
        match self.additions_tail {
            Some(tail) => self.pool[tail].next_added = Some(id),
            None => self.additions_head = Some(id),
        }
        self.additions_tail = Some(id);
        self.stats.additions += 1;
        id
    }

    fn insert_after(&mut self, id: RecordId, prev: Option<RecordId>, index: usize) {
        let next = match prev {
            Some(p) => self.pool[p].next,
            None => self.it_head,
        };
        self.pool[id].next = next;
        self.pool[id].prev = prev;
        match next {
            Some(n) => self.pool[n].prev = Some(id),
            None => self.it_tail = Some(id),
        }
        match prev {
            Some(p) => self.pool[p].next = Some(id),
            None => self.it_head = Some(id),
        }
        self.linked.put(&mut self.pool, id);
        self.pool[id].current_index = Some(index);
    }

    fn remove(&mut self, id: RecordId) {
        self.unlink(id);
        self.add_to_removals(id);
    }

    fn unlink(&mut self, id: RecordId) {
        self.linked.remove(&mut self.pool, id);
        let (prev, next) = (self.pool[id].prev, self.pool[id].next);
        match prev {
            Some(p) => self.pool[p].next = next,
            None => self.it_head = next,
        }
        match next {
            Some(n) => self.pool[n].prev = prev,
            None => self.it_tail = prev,
        }
        self.pool[id].prev = None;
        self.pool[id].next = None;
    }

    fn add_to_moves(&mut self, id: RecordId, to_index: usize) {
        if self.pool[id].previous_index == Some(to_index) {
            return;
        }
        self.pool[id].next_moved = None;
        match self.moves_tail {
            Some(tail) => self.pool[tail].next_moved = Some(id),
            None => self.moves_head = Some(id),
        }
        self.moves_tail = Some(id);
        self.stats.moves += 1;
    }

    fn add_to_removals(&mut self, id: RecordId) {
        self.unlinked.put(&mut self.pool, id);
        let record = &mut self.pool[id];
        record.current_index = None;
        record.next_removed = None;
        record.prev_removed = self.removals_tail;
        match self.removals_tail {
            Some(tail) => self.pool[tail].next_removed = Some(id),
            None => self.removals_head = Some(id),
        }
        self.removals_tail = Some(id);
        self.stats.removals += 1;
    }

    #[cfg(feature = "tracing")]
    fn log_pass(&self) {
        seqdiff_core::logging::trace!(
            length = self.stats.length,
            additions = self.stats.additions,
            moves = self.stats.moves,
            removals = self.stats.removals,
            pooled = self.stats.pooled_records,
            "iterable pass"
        );
        if self.config.trace_passes && self.is_dirty() {
            seqdiff_core::logging::debug!(
                length = self.stats.length,
                live = self.stats.live_records,
                dirty = true,
                "iterable pass changed collection"
            );
        }
    }

    #[cfg(not(feature = "tracing"))]
    fn log_pass(&self) {}
}

impl<S: TrackBy<Value>> IterableDiffer<Value, S> {
    /// Run a pass over a bound value; return `self` when anything changed.
    ///
    /// [`Value::Null`] is an empty collection. Anything other than a list or
    /// null is rejected before any state is touched.
    pub fn diff(&mut self, collection: &Value) -> Result<Option<&Self>, DiffError> {
        Ok(if self.check(collection)? { Some(self) } else { None })
    }

    /// Run a pass over a bound value; return whether anything changed.
    pub fn check(&mut self, collection: &Value) -> Result<bool, DiffError> {
        let items: &[Value] = match collection {
            Value::Null => &[],
            Value::List(items) => items,
            other => {
                #[cfg(feature = "tracing")]
                seqdiff_core::logging::warn!(kind = other.kind(), "rejected non-iterable input");
                return Err(DiffError::invalid_input(other));
            }
        };
        Ok(self.check_items(items.iter().cloned()))
    }
}

impl<T: fmt::Display, S: TrackBy<T>> fmt::Display for IterableDiffer<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        changes::write_changes(
            f,
            [
                ("collection", self.items()),
                ("previous", self.previous_items()),
                ("additions", self.additions()),
                ("moves", self.moves()),
                ("removals", self.removals()),
            ],
        )
    }
}

impl<T, S: TrackBy<T>> fmt::Debug for IterableDiffer<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterableDiffer")
            .field("length", &self.length)
            .field("dirty", &self.is_dirty())
            .field("pool", &self.pool)
            .field("linked_keys", &self.linked.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<T: fmt::Display>(records: Records<'_, T, impl Sized>) -> Vec<String> {
        records.map(|r| r.to_string()).collect()
    }

    #[test]
    fn first_pass_over_empty_is_clean() {
        let mut differ = IterableDiffer::<&str, ByValue>::by_value();
        assert!(!differ.check_items([]));
        assert!(differ.is_empty());
        assert_eq!(differ.items().count(), 0);
    }

    #[test]
    fn append_adds_at_end() {
        let mut differ = IterableDiffer::by_value();
        differ.check_items(["a", "b"]);
        assert!(differ.check_items(["a", "b", "c"]));
        assert_eq!(render(differ.additions()), ["c[null->2]"]);
        assert_eq!(differ.moves().count(), 0);
        assert_eq!(differ.len(), 3);
    }

    #[test]
    fn ids_survive_moves() {
        let mut differ = IterableDiffer::by_value();
        differ.check_items(["a", "b"]);
        let a_id = differ.items().next().map(|r| r.id);
        differ.check_items(["b", "a"]);
        let a_after = differ.items().find(|r| *r.item == "a").map(|r| r.id);
        assert_eq!(a_id, a_after);
    }

    #[test]
    fn removed_records_are_pooled_after_next_pass() {
        let mut differ = IterableDiffer::by_value();
        differ.check_items(["a", "b", "c"]);
        differ.check_items(["a"]);
        assert_eq!(differ.stats().removals, 2);
        assert_eq!(differ.stats().live_records, 3);
        assert_eq!(differ.stats().pooled_records, 0);

        differ.check_items(["a", "d"]);
        assert_eq!(differ.stats().live_records, 2);
        assert_eq!(differ.stats().pooled_records, 1);
    }

    #[test]
    fn pool_does_not_grow_for_stable_churn() {
        let mut differ = IterableDiffer::by_value();
        for round in 0..20u32 {
            differ.check_items([round, round + 1, round + 2]);
        }
        let stats = differ.stats();
        assert!(stats.live_records + stats.pooled_records <= 6, "{stats:?}");
    }

    #[test]
    fn record_lookup_by_id() {
        let mut differ = IterableDiffer::by_value();
        differ.check_items(["x", "y"]);
        let y = differ.items().nth(1).map(|r| r.id).expect("y tracked");
        differ.check_items(["x"]);
        let found = differ.record(y).expect("still reported");
        assert_eq!(*found.item, "y");
        assert_eq!(found.current_index, None);
        differ.check_items(["x"]);
        assert!(differ.record(y).is_none());
    }

    #[test]
    fn latest_item_is_kept_on_match() {
        let by_id = seqdiff_core::TrackByFn::new(|row: &(u32, &'static str)| row.0);
        let mut differ = IterableDiffer::new(by_id);
        differ.check_items([(1, "old")]);
        assert!(!differ.check_items([(1, "new")]));
        assert_eq!(differ.items().next().map(|r| r.item.1), Some("new"));
    }

    #[test]
    fn reordered_ignores_uniform_shift() {
        let mut differ = IterableDiffer::by_value();
        differ.check_items(["a", "b", "c", "d"]);
        differ.check_items(["b", "c", "d"]);
        assert_eq!(differ.moves().count(), 3);
        assert!(differ.reordered().is_empty());
    }

    #[test]
    fn reordered_reports_minimal_set() {
        let mut differ = IterableDiffer::by_value();
        differ.check_items(["a", "b", "c", "d"]);
        differ.check_items(["d", "a", "b", "c"]);
        let reordered: Vec<_> = differ.reordered().iter().map(|r| *r.item).collect();
        assert_eq!(reordered, ["d"]);
    }

    #[test]
    fn reordered_never_names_a_record_that_kept_its_index() {
        let mut differ = IterableDiffer::by_value();
        differ.check_items([3, 2]);
        differ.check_items([4, 2, 3]);

        // 2 stays at index 1; only 3 moved.
        let moves: Vec<String> = differ.moves().map(|r| r.to_string()).collect();
        assert_eq!(moves, ["3[0->2]"]);
        let reordered: Vec<String> = differ.reordered().iter().map(|r| r.to_string()).collect();
        assert_eq!(reordered, ["3[0->2]"]);
    }

    #[test]
    fn reordered_keeps_unmoved_records_over_a_longer_run() {
        let mut differ = IterableDiffer::by_value();
        differ.check_items(["a", "b", "c", "d", "e"]);
        // c keeps index 2; a, b, d, e are rotated around it.
        differ.check_items(["d", "e", "c", "a", "b"]);

        let reordered: Vec<_> = differ.reordered().iter().map(|r| *r.item).collect();
        assert!(!reordered.contains(&"c"));
        let moved: Vec<_> = differ.moves().map(|r| r.id).collect();
        assert!(differ.reordered().iter().all(|r| moved.contains(&r.id)));
    }

    #[test]
    fn value_check_rejects_scalars_without_touching_state() {
        let mut differ = IterableDiffer::for_values();
        differ.check(&Value::list(["a", "b"])).expect("list");
        let before = differ.to_string();

        let err = differ.check(&Value::from("invalid")).unwrap_err();
        assert_eq!(err.to_string(), "Error trying to diff 'invalid'");
        assert_eq!(differ.to_string(), before);

        let err = differ.check(&Value::map([("k", 1)])).unwrap_err();
        assert_eq!(err.value(), "[object Map]");
    }

    #[test]
    fn config_reserves_capacity() {
        let config = DifferConfig::default().with_initial_capacity(64);
        let differ = IterableDiffer::with_config(ByValue, config.clone());
        let _: &IterableDiffer<u8, ByValue> = &differ;
        assert_eq!(differ.config(), &config);
    }
}

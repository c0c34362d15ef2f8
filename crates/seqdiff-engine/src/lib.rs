#![forbid(unsafe_code)]

//! Diff kernel: record pool, duplicate map, iterable differ, and change output.
//!
//! # Role in seqdiff
//! `seqdiff-engine` is the change-detection kernel. It takes the collection a
//! list binding produced this pass, compares it with what it saw last pass,
//! and reports additions, removals, and moves per record, keeping record
//! identity stable so a view layer can reuse what it already rendered.
//!
//! # Primary responsibilities
//! - **IterableDiffer**: the single-pass diff over any ordered collection.
//! - **RecordPool / DuplicateMap**: arena-backed bookkeeping with FIFO
//!   matching of equal items.
//! - **ChangeRecord / ChangeSet**: borrowed and owned views of a pass, with
//!   a stable text rendering.
//! - **Reorder analysis**: the minimal set of records whose relative order
//!   changed.
//! - **IterableDiffers**: factory registry that picks a differ for a value.
//!
//! # How it fits in the system
//! Values and equality come from `seqdiff-core`; the `seqdiff` facade
//! re-exports the pieces applications use.

pub mod changes;
pub mod config;
mod dup_map;
pub mod factory;
pub mod iterable;
mod pool;
pub mod reorder;

pub use changes::{ChangeRecord, ChangeSet, RecordChange, Records};
pub use config::{ConfigError, DifferConfig};
pub use factory::{DefaultIterableDifferFactory, IterableDifferFactory, IterableDiffers};
pub use iterable::{DiffStats, IterableDiffer, ValueDiffer};
pub use pool::RecordId;

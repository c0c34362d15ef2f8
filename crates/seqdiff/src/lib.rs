#![forbid(unsafe_code)]

//! seqdiff public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users. It
//! re-exports common types from the internal crates and offers a small
//! prelude for day-to-day usage.
//!
//! ```
//! use seqdiff::prelude::*;
//!
//! let differs = IterableDiffers::default();
//! let rows = Value::list(["a", "b", "c"]);
//! let mut differ = differs.find(&rows)?.create();
//! differ.check(&rows)?;
//!
//! let changes = differ.diff(&Value::list(["a", "c"]))?.expect("b removed");
//! assert_eq!(changes.removals().count(), 1);
//! # Ok::<(), seqdiff::Error>(())
//! ```

use thiserror::Error;

// --- Core re-exports -------------------------------------------------------

pub use seqdiff_core::{
    ByValue, DiffError, ObjectRef, RefKey, TrackBy, TrackByFn, TrackKey, Value, ValueIdentity,
};

// --- Engine re-exports -----------------------------------------------------

pub use seqdiff_engine::{
    ChangeRecord, ChangeSet, ConfigError, DefaultIterableDifferFactory, DiffStats, DifferConfig,
    IterableDiffer, IterableDifferFactory, IterableDiffers, RecordChange, RecordId, Records,
    ValueDiffer,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for seqdiff users.
#[derive(Debug, Error)]
pub enum Error {
    /// A diff pass or differ lookup rejected its input.
    #[error(transparent)]
    Diff(#[from] DiffError),
    /// Loading or validating a configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Standard result type for seqdiff APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ChangeRecord, DifferConfig, Error, IterableDiffer, IterableDifferFactory, IterableDiffers,
        Result, TrackBy, Value,
    };

    pub use crate::{core, engine};
}

pub use seqdiff_core as core;
pub use seqdiff_engine as engine;

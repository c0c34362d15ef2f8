#![forbid(unsafe_code)]

//! Core: item values, track-key equality, and errors for seqdiff.
//!
//! # Role in seqdiff
//! `seqdiff-core` is the value layer. It defines the dynamic [`Value`] a
//! bound expression produces, the [`TrackBy`] strategies that decide when two
//! observed items are the same logical slot, and the error type raised for
//! unsupported input.
//!
//! # Primary responsibilities
//! - **Value**: null, booleans, numbers, strings, lists, maps and objects.
//! - **TrackBy**: equality as a strategy (value for scalars, identity for
//!   everything else, or caller supplied).
//! - **DiffError**: synchronous rejection of unsupported input.
//!
//! # How it fits in the system
//! The engine (`seqdiff-engine`) stores the track key of every item it sees
//! and compares keys, never items, so the equality policy lives entirely in
//! this crate.

pub mod error;
pub mod logging;
pub mod track;
pub mod value;

pub use error::DiffError;
pub use track::{ByValue, RefKey, TrackBy, TrackByFn, TrackKey, ValueIdentity};
pub use value::{ObjectRef, Value};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

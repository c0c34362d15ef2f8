//! Logging facade.
//!
//! With the `tracing` feature enabled this module re-exports the `tracing`
//! macros so downstream crates can log through `seqdiff_core::logging`
//! without naming `tracing` themselves. Without the feature it is empty and
//! every call site is compiled out behind `#[cfg(feature = "tracing")]`.

#[cfg(feature = "tracing")]
pub use tracing::{
    Level, Span, debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn,
    warn_span,
};

/// Whether structured logging was compiled in.
#[must_use]
pub const fn enabled() -> bool {
    cfg!(feature = "tracing")
}

#![forbid(unsafe_code)]

//! Error types.

use std::fmt::Display;

use thiserror::Error;

/// Errors raised by a diff pass or a differ lookup.
///
/// Both variants are programming errors in the binding that produced the
/// value, never transient faults: callers fix the input rather than retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    /// The differ was handed a value that is not an iterable sequence.
    #[error("Error trying to diff '{value}'")]
    InvalidInput {
        /// Rendering of the offending value.
        value: String,
    },
    /// No registered differ factory supports the value.
    #[error("Cannot find a differ supporting object '{value}'")]
    NoSupportingDiffer {
        /// Rendering of the offending value.
        value: String,
    },
}

impl DiffError {
    /// Build an [`DiffError::InvalidInput`] for `value`.
    pub fn invalid_input(value: &impl Display) -> Self {
        Self::InvalidInput {
            value: value.to_string(),
        }
    }

    /// Build a [`DiffError::NoSupportingDiffer`] for `value`.
    pub fn no_supporting_differ(value: &impl Display) -> Self {
        Self::NoSupportingDiffer {
            value: value.to_string(),
        }
    }

    /// Rendering of the value that caused the error.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::InvalidInput { value } | Self::NoSupportingDiffer { value } => value,
        }
    }
}

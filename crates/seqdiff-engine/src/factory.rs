#![forbid(unsafe_code)]

//! Differ factories and the registry that picks one for a value.
//!
//! A list binding does not know up front what its expression evaluates to.
//! [`IterableDiffers`] holds an ordered list of [`IterableDifferFactory`]
//! implementations and hands out the first one that supports the value.
//! Child registries built with [`IterableDiffers::extend`] consult their own
//! factories before the parent's.

use std::fmt;
use std::sync::Arc;

use seqdiff_core::{DiffError, Value};

use crate::config::DifferConfig;
use crate::iterable::{IterableDiffer, ValueDiffer};

/// Produces differs for the values it supports.
pub trait IterableDifferFactory: Send + Sync {
    /// Whether values shaped like `value` can be diffed by this factory.
    fn supports(&self, value: &Value) -> bool;

    /// Create a fresh differ.
    fn create(&self) -> ValueDiffer;
}

/// Factory for ordered lists, tracked with the default value rule.
///
/// Supports [`Value::List`] only: keyed maps, scalars, strings, objects,
/// and null are rejected.
#[derive(Debug, Clone, Default)]
pub struct DefaultIterableDifferFactory {
    config: DifferConfig,
}

impl DefaultIterableDifferFactory {
    /// Factory with the default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory whose differs use `config`.
    #[must_use]
    pub fn with_config(config: DifferConfig) -> Self {
        Self { config }
    }
}

impl IterableDifferFactory for DefaultIterableDifferFactory {
    fn supports(&self, value: &Value) -> bool {
        value.is_list()
    }

    fn create(&self) -> ValueDiffer {
        IterableDiffer::with_config(seqdiff_core::ValueIdentity, self.config.clone())
    }
}

/// Ordered registry of differ factories.
#[derive(Clone)]
pub struct IterableDiffers {
    factories: Vec<Arc<dyn IterableDifferFactory>>,
}

impl IterableDiffers {
    /// Registry over `factories`, consulted in order.
    pub fn new(factories: Vec<Arc<dyn IterableDifferFactory>>) -> Self {
        Self { factories }
    }

    /// A child registry: `factories` first, then this registry's.
    #[must_use]
    pub fn extend(&self, factories: Vec<Arc<dyn IterableDifferFactory>>) -> Self {
        let mut merged = factories;
        merged.extend(self.factories.iter().cloned());
        Self { factories: merged }
    }

    /// First factory supporting `value`.
    pub fn find(&self, value: &Value) -> Result<&dyn IterableDifferFactory, DiffError> {
        self.factories
            .iter()
            .find(|factory| factory.supports(value))
            .map(|factory| &**factory)
            .ok_or_else(|| DiffError::no_supporting_differ(value))
    }

    /// Number of registered factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// `true` when no factory is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for IterableDiffers {
    fn default() -> Self {
        Self::new(vec![Arc::new(DefaultIterableDifferFactory::new())])
    }
}

impl fmt::Debug for IterableDiffers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterableDiffers")
            .field("factories", &self.factories.len())
            .finish()
    }
}

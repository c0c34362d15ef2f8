#![forbid(unsafe_code)]

//! Differ configuration.
//!
//! [`DifferConfig`] holds the few knobs a differ exposes. It can be built in
//! code, read from the environment, or, with the `differ-config` feature,
//! loaded from TOML or JSON.
//!
//! ```toml
//! # seqdiff.toml
//! initial_capacity = 256
//! trace_passes = true
//! ```
//!
//! ```rust,ignore
//! let config = DifferConfig::from_toml_file("seqdiff.toml")?;
//! let config = DifferConfig::from_json_str(r#"{"initial_capacity": 64}"#)?;
//! ```

#[cfg(feature = "differ-config")]
use std::path::Path;

use thiserror::Error;

/// Largest record count a differ can address.
pub const MAX_RECORDS: usize = u32::MAX as usize;

/// Configuration for an iterable differ.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DifferConfig {
    /// Records (and duplicate-map entries) to reserve up front.
    /// Env: `SEQDIFF_INITIAL_CAPACITY`
    pub initial_capacity: usize,
    /// Emit a debug event summarising every pass (requires the `tracing`
    /// feature).
    /// Env: `SEQDIFF_TRACE_PASSES=1`
    pub trace_passes: bool,
}

impl DifferConfig {
    /// Defaults overridden by environment variables.
    ///
    /// Unparseable values are ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(capacity) = std::env::var("SEQDIFF_INITIAL_CAPACITY")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
        {
            config.initial_capacity = capacity;
        }
        config.trace_passes = std::env::var("SEQDIFF_TRACE_PASSES")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        config
    }

    /// Builder-style capacity override.
    #[must_use]
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Builder-style pass tracing override.
    #[must_use]
    pub fn with_trace_passes(mut self, enabled: bool) -> Self {
        self.trace_passes = enabled;
        self
    }

    /// Load from a TOML string.
    #[cfg(feature = "differ-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "differ-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "differ-config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "differ-config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.initial_capacity > MAX_RECORDS {
            errors.push(format!(
                "initial_capacity must be <= {MAX_RECORDS}, got {}",
                self.initial_capacity
            ));
        }
        errors
    }

    /// [`validate`](Self::validate), as a `Result`.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors that can occur when loading a differ configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "differ-config")]
    #[error("TOML parse error: {0}")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "differ-config")]
    #[error("JSON parse error: {0}")]
    Json(serde_json::Error),
    /// Validation errors.
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = DifferConfig::default();
        assert_eq!(config.initial_capacity, 0);
        assert!(!config.trace_passes);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn builders_override_fields() {
        let config = DifferConfig::default()
            .with_initial_capacity(16)
            .with_trace_passes(true);
        assert_eq!(config.initial_capacity, 16);
        assert!(config.trace_passes);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn oversized_capacity_fails_validation() {
        let config = DifferConfig::default().with_initial_capacity(MAX_RECORDS + 1);
        let errors = config.clone().validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("initial_capacity"));
        let err = config.validated().unwrap_err();
        assert!(err.to_string().starts_with("validation errors: "));
    }

    #[cfg(feature = "differ-config")]
    #[test]
    fn loads_from_toml_and_json() {
        let from_toml = DifferConfig::from_toml_str("initial_capacity = 32\ntrace_passes = true\n")
            .expect("valid toml");
        assert_eq!(
            from_toml,
            DifferConfig {
                initial_capacity: 32,
                trace_passes: true,
            }
        );

        let from_json = DifferConfig::from_json_str(r#"{"initial_capacity": 8}"#).expect("valid json");
        assert_eq!(from_json.initial_capacity, 8);
        assert!(!from_json.trace_passes);
    }

    #[cfg(feature = "differ-config")]
    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("seqdiff.toml");
        std::fs::write(&path, "initial_capacity = 4\n").expect("write config");
        let config = DifferConfig::from_toml_file(&path).expect("load config");
        assert_eq!(config.initial_capacity, 4);

        let missing = DifferConfig::from_json_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[cfg(feature = "differ-config")]
    #[test]
    fn malformed_toml_reports_parse_error() {
        let err = DifferConfig::from_toml_str("initial_capacity = \"many\"").unwrap_err();
        assert!(err.to_string().starts_with("TOML parse error"));
    }
}

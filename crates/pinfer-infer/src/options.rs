//! Engine options.
//!
//! Every field has a default, so `{}` is a valid configuration and embedders
//! only spell out what they change.

use pinfer_common::limits::DEFAULT_RESOLUTION_DEPTH;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InferOptions {
    /// Resolve each definition right after its body is analysed instead of
    /// on first demand or in the late pass.
    pub resolve_on_analysis: bool,
    /// Widen variables reassigned inside loop bodies.
    pub widen_loop_assignments: bool,
    /// Untyped parameters become function templates (`TA`); otherwise `mixed`.
    pub untyped_parameters_as_templates: bool,
    /// Depth of the resolution guard.
    pub max_resolution_depth: u32,
    /// Class the builtin collection extension matches (subclasses included).
    pub collection_class: String,
}

impl Default for InferOptions {
    fn default() -> Self {
        InferOptions {
            resolve_on_analysis: false,
            widen_loop_assignments: true,
            untyped_parameters_as_templates: true,
            max_resolution_depth: DEFAULT_RESOLUTION_DEPTH,
            collection_class: "Illuminate\\Support\\Collection".to_string(),
        }
    }
}

impl InferOptions {
    /// Parse options from JSON and validate them.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let options: InferOptions = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_resolution_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "maxResolutionDepth",
                message: "must be at least 1".to_string(),
            });
        }
        if self.collection_class.trim_matches('\\').is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "collectionClass",
                message: "must name a class".to_string(),
            });
        }
        Ok(())
    }
}

/// Error returned when options cannot be loaded.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(err) => write!(f, "invalid options: {err}"),
            ConfigError::InvalidValue { field, message } => {
                write!(f, "invalid value for `{field}`: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(err) => Some(err),
            ConfigError::InvalidValue { .. } => None,
        }
    }
}

#[cfg(test)]
#[path = "../tests/options_tests.rs"]
mod options_tests;

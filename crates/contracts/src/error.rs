//! Layered error definitions
//!
//! Categorized by source: config / blueprint / geometry / io

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Blueprint Errors =====
    /// Attribute does not exist on the blueprint
    #[error("blueprint '{blueprint}' has no attribute '{attribute}'")]
    UnknownAttribute {
        blueprint: String,
        attribute: String,
    },

    /// Attribute exists but is read-only
    #[error("attribute '{attribute}' of blueprint '{blueprint}' is not modifiable")]
    ReadOnlyAttribute {
        blueprint: String,
        attribute: String,
    },

    // ===== Geometry Errors =====
    /// Array length does not match the vector dimension
    #[error("dimension mismatch: expected {expected} components, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Color string is not `R,G,B`
    #[error("invalid color '{value}': expected 'R,G,B' with components in 0..=255")]
    InvalidColor { value: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn unknown_attribute(blueprint: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::UnknownAttribute {
            blueprint: blueprint.into(),
            attribute: attribute.into(),
        }
    }

    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    pub fn invalid_color(value: impl Into<String>) -> Self {
        Self::InvalidColor {
            value: value.into(),
        }
    }
}

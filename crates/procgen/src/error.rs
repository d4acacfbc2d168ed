//! Errors raised by procedural generators.

use thiserror::Error;

/// A generator was called with parameters outside its contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl GeometryError {
    /// Build an [`GeometryError::InvalidParameter`].
    pub fn invalid(name: &'static str, value: impl Into<f64>, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value: value.into(),
            reason,
        }
    }

    /// Name of the offending parameter.
    pub fn parameter(&self) -> &'static str {
        match self {
            Self::InvalidParameter { name, .. } => name,
        }
    }
}

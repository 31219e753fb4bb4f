//! Structured error types shared across EPG crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`EpgError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (quantities, indices, pool kinds).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the EPG engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum EpgError {
    /// A quantity was used where an incompatible dimension is required.
    #[error("dimension error: {0}")]
    Dimension(ErrorInfo),
    /// Operation shape inconsistent with the model's pool kind.
    #[error("pool error: {0}")]
    Pool(ErrorInfo),
    /// Gradient moment not representable by the configuration store.
    #[error("gradient error: {0}")]
    Gradient(ErrorInfo),
    /// Physically invalid construction or option parameter.
    #[error("parameter error: {0}")]
    Parameter(ErrorInfo),
    /// Lookup of a configuration state that is not stored.
    #[error("state error: {0}")]
    State(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl EpgError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            EpgError::Dimension(info)
            | EpgError::Pool(info)
            | EpgError::Gradient(info)
            | EpgError::Parameter(info)
            | EpgError::State(info)
            | EpgError::Serde(info) => info,
        }
    }

    /// Shorthand for a [`EpgError::Parameter`] error.
    pub fn parameter(code: &str, message: impl Into<String>) -> Self {
        EpgError::Parameter(ErrorInfo::new(code, message))
    }

    /// Shorthand for a [`EpgError::Pool`] error.
    pub fn pool(code: &str, message: impl Into<String>) -> Self {
        EpgError::Pool(ErrorInfo::new(code, message))
    }

    /// Shorthand for a [`EpgError::State`] error.
    pub fn state(code: &str, message: impl Into<String>) -> Self {
        EpgError::State(ErrorInfo::new(code, message))
    }
}

/// Rejects non-finite or negative values for a named parameter.
pub fn require_non_negative(name: &str, value: f64) -> Result<f64, EpgError> {
    if !value.is_finite() || value < 0.0 {
        return Err(EpgError::Parameter(
            ErrorInfo::new("negative-parameter", "parameter must be finite and non-negative")
                .with_context("parameter", name)
                .with_context("value", value),
        ));
    }
    Ok(value)
}

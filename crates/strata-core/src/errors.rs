//! Structured error types shared across the strata crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`StrataError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (identifiers, sizes, etc.).
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
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the strata engine.
///
/// These are the hard failures of the engine: malformed constructor input,
/// lookups of unknown legs/edges, or BIC-only data requested on a non-BIC
/// graph. Advisory admissibility problems are reported as data, never as
/// errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum StrataError {
    /// Level graph structural errors.
    #[error("graph error: {0}")]
    Graph(ErrorInfo),
    /// Signature errors.
    #[error("signature error: {0}")]
    Signature(ErrorInfo),
    /// Isomorphism and embedding errors.
    #[error("iso error: {0}")]
    Iso(ErrorInfo),
    /// Residue matrix errors.
    #[error("residue error: {0}")]
    Residue(ErrorInfo),
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

impl StrataError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            StrataError::Graph(info)
            | StrataError::Signature(info)
            | StrataError::Iso(info)
            | StrataError::Residue(info) => info,
        }
    }

    /// Adds a context entry to the payload, preserving the variant.
    pub fn with_context(self, key: impl Into<String>, value: impl ToString) -> Self {
        let attach = |info: ErrorInfo| info.with_context(key, value.to_string());
        match self {
            StrataError::Graph(info) => StrataError::Graph(attach(info)),
            StrataError::Signature(info) => StrataError::Signature(attach(info)),
            StrataError::Iso(info) => StrataError::Iso(attach(info)),
            StrataError::Residue(info) => StrataError::Residue(attach(info)),
        }
    }
}

/// Shorthand for a graph-family error.
pub fn graph_error(code: impl Into<String>, message: impl Into<String>) -> StrataError {
    StrataError::Graph(ErrorInfo::new(code, message))
}

/// Shorthand for a signature-family error.
pub fn signature_error(code: impl Into<String>, message: impl Into<String>) -> StrataError {
    StrataError::Signature(ErrorInfo::new(code, message))
}

/// Shorthand for an iso-family error.
pub fn iso_error(code: impl Into<String>, message: impl Into<String>) -> StrataError {
    StrataError::Iso(ErrorInfo::new(code, message))
}

/// Shorthand for a residue-family error.
pub fn residue_error(code: impl Into<String>, message: impl Into<String>) -> StrataError {
    StrataError::Residue(ErrorInfo::new(code, message))
}

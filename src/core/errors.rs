/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use super::types::{Megabytes, Pid};
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Inflation operation result
pub type InflationResult<T> = Result<T, InflationError>;

/// Errors surfaced to callers of the inflation engine
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum InflationError {
    #[error("Allocation failed: requested {requested_mb} MB with {allocated_mb} MB already held ({reason})")]
    #[diagnostic(
        code(inflation::allocation_failed),
        help("The host refused more memory. This is the condition the tool is meant to provoke.")
    )]
    AllocationFailed {
        requested_mb: Megabytes,
        allocated_mb: Megabytes,
        reason: String,
    },

    #[error("Invalid inflation parameters: {0}")]
    #[diagnostic(
        code(inflation::invalid_parameters),
        help("Target must be non-negative and step must be positive.")
    )]
    InvalidParameters(String),

    #[error("Inflation cancelled by reset after {completed_mb} of {target_mb} MB")]
    #[diagnostic(
        code(inflation::cancelled),
        help("A reset was issued while this inflation was running. Start a new one if needed.")
    )]
    Cancelled {
        completed_mb: Megabytes,
        target_mb: Megabytes,
    },
}

impl InflationError {
    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }

    /// True for the condition the tool exists to trigger
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, Self::AllocationFailed { .. })
    }
}

/// Introspection result, internal to the platform strategies
pub type IntrospectionResult<T> = Result<T, IntrospectionError>;

/// Failures inside a platform strategy.
///
/// These never leave the introspection provider: the public call degrades
/// to the own-process report instead.
#[derive(Error, Debug)]
pub enum IntrospectionError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Process {0} not present in snapshot")]
    ProcessNotFound(Pid),

    #[error("Process snapshot unavailable: {0}")]
    Snapshot(String),
}

impl IntrospectionError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

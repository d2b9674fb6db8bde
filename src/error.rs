//! Error types for atboot
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::bootstrap::BootStepKind;
use crate::core::capability::CapabilityFlag;
use crate::infra::sim::Operation;

/// Failure reported by an external collaborator (storage, radio, transport...)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed: {reason}")]
pub struct PlatformError {
    /// Operation that failed
    pub operation: String,
    /// Collaborator-provided reason
    pub reason: String,
}

impl PlatformError {
    /// Create a new platform error
    pub fn new(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

/// Fatal boot errors
///
/// Any of these halts the boot: no module is registered and no radio memory
/// is released afterwards.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BootError {
    /// A critical boot step failed
    #[error("Critical boot step '{step}' failed: {source}")]
    StepFailed {
        step: BootStepKind,
        source: PlatformError,
    },
}

/// Capability file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Capability file not found
    #[error("Capability file not found at '{path}'")]
    NotFound { path: PathBuf },

    /// Failed to read the capability file
    #[error("Failed to read '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// Failed to write the capability file
    #[error("Failed to write '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Capability file already exists
    #[error("Capability file already exists at '{path}'. Use --force to overwrite it")]
    AlreadyExists { path: PathBuf },

    /// TOML parse error (includes unknown capability names)
    #[error("Failed to parse capability file: {source}")]
    Parse { source: toml::de::Error },

    /// A flag is enabled without one of its prerequisites
    #[error("Capability '{flag}' requires '{missing}' to be enabled")]
    MissingPrerequisite {
        flag: CapabilityFlag,
        missing: CapabilityFlag,
    },

    /// Command terminator must be exactly one byte
    #[error("Command terminator must be a single ASCII character, got {value:?}")]
    InvalidTerminator { value: String },

    /// At least one socket connection is required
    #[error("socket_max_conn must be at least 1")]
    ZeroSocketConnections,

    /// A simulated failure names an operation with no failure mode
    #[error("Operation '{operation}' cannot fail and may not appear in fail_operations")]
    InfallibleOperation { operation: Operation },
}

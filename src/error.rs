// src/error.rs

//! Error types for the workon library

use thiserror::Error;

use crate::store::LiveState;

/// Errors produced while resolving, tracking, or reporting live packages
#[derive(Error, Debug)]
pub enum Error {
    /// Bad or missing arguments, ambiguous target
    #[error("Usage error: {0}")]
    Usage(String),

    /// The token resolved to a package that cannot be worked on
    #[error("'{token}' is not a live-eligible package (no cros-workon ebuild)")]
    NotLiveEligible { token: String },

    /// The package-query tool could not resolve the token
    #[error("Failed to look up '{token}': {reason}")]
    LookupFailed { token: String, reason: String },

    /// Package is already in the requested state
    #[error("{key} is already {state}")]
    AlreadyInState { key: String, state: LiveState },

    /// Writing a state file failed
    #[error("Failed to update {path}: {reason}")]
    Persistence { path: String, reason: String },

    /// Board sysroot is missing
    #[error("Board '{board}' is not set up ({path} does not exist)")]
    TargetNotSetUp { board: String, path: String },

    /// An external tool could not be run or exited with failure
    #[error("{tool} failed: {reason}")]
    Tool { tool: String, reason: String },

    /// Malformed tool output, package key, or state line
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration file could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for workon operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn tool(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn persistence(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::Persistence {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

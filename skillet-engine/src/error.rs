//! Error taxonomy for a generation run.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type for skillet-engine operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad configuration; surfaced before any I/O.
    #[error("invalid configuration: {0}")]
    Config(#[from] skillet_config::ValueError),

    /// A referenced input could not be read while fingerprinting.
    #[error("failed to read input '{path}'")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The staging area could not be prepared.
    #[error("failed to prepare staging directory")]
    Staging {
        #[source]
        source: std::io::Error,
    },

    /// The engine command could not be spawned or driven.
    #[error("failed to run engine command '{command}'")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine failed; the output directory is unchanged.
    #[error("code generation failed{}", exit_note(.status))]
    Generation {
        status: Option<i32>,
        diagnostics: String,
    },

    /// Filesystem failure or sandbox violation while promoting output;
    /// the manifest keeps its last-known-good contents.
    #[error("reconciliation failed: {message}")]
    Reconciliation {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The invocation exceeded its time budget; the manifest is untouched.
    #[error("code generation timed out after {limit:?}")]
    Timeout { limit: Duration },

    /// The caller cancelled the invocation; the manifest is untouched.
    #[error("code generation was cancelled")]
    Cancelled,

    /// The run manifest could not be persisted.
    #[error("failed to persist run manifest '{path}': {message}")]
    Manifest { path: PathBuf, message: String },

    /// Generation was requested without an engine command configured.
    #[error("no engine command configured (set [engine] command in skillet.toml)")]
    MissingEngineCommand,
}

impl Error {
    /// Sandbox or consistency violation without an underlying I/O error.
    pub(crate) fn reconciliation(message: impl Into<String>) -> Self {
        Error::Reconciliation {
            message: message.into(),
            source: None,
        }
    }

    /// Filesystem failure during promotion or cleanup.
    pub(crate) fn reconciliation_io(message: impl Into<String>, source: std::io::Error) -> Self {
        Error::Reconciliation {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Engine diagnostics captured for the caller, if any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Error::Generation { diagnostics, .. } if !diagnostics.is_empty() => Some(diagnostics),
            _ => None,
        }
    }
}

fn exit_note(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!(" (engine exited with status {code})"),
        None => String::new(),
    }
}

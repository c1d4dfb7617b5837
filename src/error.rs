//! Error types for process language classification.
//!
//! Every failure a tier can hit is modelled here with thiserror. None of
//! these ever escape the public `classify*` entry points: the orchestrator
//! turns them into "no answer" and moves on to the next tier.

use std::io;
use std::path::Path;
use thiserror::Error;

/// Main error type for classification operations.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// A tier ran but found no signal.
    #[error("No language signal found")]
    NoMatch,

    /// argv[0] could not be mapped to an existing, openable file.
    #[error("Could not resolve '{command}': {reason}")]
    ResolutionFailure { command: String, reason: String },

    /// A candidate exists but the caller may not open it.
    #[error("Access denied: {path}")]
    AccessDenied { path: String },

    /// The process or file vanished between observation and inspection.
    #[error("Target vanished during inspection: {what}")]
    TransientRace { what: String },

    /// The privileged collaborator is not configured or not reachable.
    #[error("Privileged detector unavailable: {0}")]
    CollaboratorUnavailable(String),

    /// Operation exceeded its time budget.
    #[error("Operation timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// Configuration could not be parsed or is inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unclassified I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for classification operations
pub type Result<T> = std::result::Result<T, ClassifyError>;

impl ClassifyError {
    /// Map an I/O error raised while touching `path` onto the taxonomy.
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        let shown = path.display().to_string();
        match err.kind() {
            io::ErrorKind::NotFound => ClassifyError::TransientRace { what: shown },
            io::ErrorKind::PermissionDenied => ClassifyError::AccessDenied { path: shown },
            _ => match err.raw_os_error() {
                // ESRCH: the process exited under us.
                Some(3) => ClassifyError::TransientRace { what: shown },
                _ => ClassifyError::Io(err),
            },
        }
    }

    /// Whether the pipeline may simply advance past this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ClassifyError::InvalidConfig(_) | ClassifyError::Internal(_)
        )
    }
}

impl From<serde_json::Error> for ClassifyError {
    fn from(err: serde_json::Error) -> Self {
        ClassifyError::InvalidConfig(err.to_string())
    }
}

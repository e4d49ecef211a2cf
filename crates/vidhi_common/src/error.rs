//! Error type shared across the daemon and its collaborator seams.

use thiserror::Error;

/// Faults crossing a collaborator boundary. Collaborators signal through
/// these variants, never by panicking.
#[derive(Debug, Error)]
pub enum VidhiError {
    #[error("retrieval failed: {0}")]
    Retrieval(String),

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl VidhiError {
    /// Stable lowercase tag for audit records.
    pub fn kind(&self) -> &'static str {
        match self {
            VidhiError::Retrieval(_) => "retrieval",
            VidhiError::Generation(_) => "generation",
            VidhiError::Config(_) => "config",
            VidhiError::Io(_) => "io",
        }
    }
}

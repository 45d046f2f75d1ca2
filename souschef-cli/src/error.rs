//! CLI error type.

use souschef::cluster::{PlacementError, RoleParseError};
use souschef::config::ConfigError;
use souschef::provider::GenerationError;
use souschef::router::RouterClosed;
use souschef::worker::WorkerClosed;
use thiserror::Error;

/// Errors surfaced to the command-line user.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No usable generation backend
    #[error("generation service error: {0}")]
    Generation(#[from] GenerationError),

    /// Capability missing on this node's role
    #[error("{0}")]
    Placement(#[from] PlacementError),

    /// Unknown role name on the command line
    #[error("{0}")]
    Role(#[from] RoleParseError),

    /// The router task is gone
    #[error("{0}")]
    RouterClosed(#[from] RouterClosed),

    /// A worker task is gone
    #[error("{0}")]
    WorkerClosed(#[from] WorkerClosed),

    /// A reply channel closed before delivering a response
    #[error("no reply received: {0}")]
    NoReply(#[from] tokio::sync::oneshot::error::RecvError),

    /// Terminal or file I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// One or more self-test checks failed
    #[error("{failed} self-test check(s) failed")]
    SelfTest { failed: usize },
}

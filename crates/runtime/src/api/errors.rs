//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, repositories, phase transitions
//! and rule validation so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use horde_core::{ConfigError, DenialReason, ErrorSeverity, GameError, GridError};

pub use crate::phase::PhaseError;
pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("world worker command channel closed")]
    CommandChannelClosed,

    #[error("world worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("world worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Phase(#[from] PhaseError),

    #[error("action denied: {0}")]
    Denied(#[from] DenialReason),

    #[error("no world exists: no cached state and no settlement")]
    NoWorld,

    #[error("invalid world rules: {0}")]
    Rules(#[from] ConfigError),

    #[error("invalid runtime configuration: {0}")]
    Config(String),

    #[error("runtime requires a {0} before building")]
    MissingCollaborator(&'static str),
}

impl RuntimeError {
    /// Whether the caller can recover by changing its input.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::Grid(err) => err.severity(),
            RuntimeError::Denied(_) | RuntimeError::NoWorld => ErrorSeverity::Validation,
            RuntimeError::Phase(PhaseError::Resolution(err)) => err.severity(),
            _ => ErrorSeverity::Fatal,
        }
    }
}

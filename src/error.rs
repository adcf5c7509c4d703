//! Setup-time errors.
//!
//! Everything here is detected before traffic is served and is fatal to
//! startup. Per-request failures never surface as `SetupError`.

use axum::http::Method;
use thiserror::Error;

use crate::routing::PatternError;

/// Configuration errors raised while assembling a server.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Route pattern could not be parsed.
    #[error("invalid route pattern: {0}")]
    InvalidPattern(#[from] PatternError),

    /// A structurally identical pattern is already registered for the method.
    #[error("duplicate route {method} {pattern} (conflicts with {existing})")]
    DuplicateRoute {
        method: Method,
        pattern: String,
        existing: String,
    },

    /// The middleware chain was already composed.
    #[error("middleware chain is sealed; no further changes allowed")]
    ChainSealed,

    /// The server has already been started.
    #[error("server already started; registration and restart are not allowed")]
    AlreadyStarted,
}

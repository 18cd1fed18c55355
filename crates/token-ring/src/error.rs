//! Token ring errors.

use coordsim_types::{MembershipError, ProcessId};
use std::time::Duration;
use thiserror::Error;

/// Errors from a token ring run.
#[derive(Debug, Error)]
pub enum TokenRingError {
    /// Invalid topology, holder, or interest map; nothing was started.
    #[error(transparent)]
    Membership(#[from] MembershipError),

    /// The pass did not complete in time; process tasks were aborted and the
    /// token is abandoned wherever it was.
    #[error("token pass did not complete within {0:?}")]
    TimedOut(Duration),

    /// A hand-off slot closed without delivering the token.
    #[error("token lost in hand-off to {0}")]
    TokenLost(ProcessId),

    /// A process task panicked or was cancelled.
    #[error("process task failed: {0}")]
    TaskFailed(String),
}

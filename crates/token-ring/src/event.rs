//! Token ring trace events.

use coordsim_types::ProcessId;
use serde::Serialize;
use std::fmt;

/// One observable step of a token ring pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TokenEvent {
    /// `holder` now owns the token.
    Received { holder: ProcessId },

    /// `holder` entered the critical section.
    Entered { holder: ProcessId },

    /// `holder` left the critical section.
    Exited { holder: ProcessId },

    /// `holder` did not want the critical section.
    Declined { holder: ProcessId },

    /// Token handed from `from` to its successor `to`.
    Forwarded { from: ProcessId, to: ProcessId },
}

impl fmt::Display for TokenEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Received { holder } => write!(f, "{} has the token.", holder),
            Self::Entered { holder } => {
                write!(f, "{} is entering the critical section.", holder)
            }
            Self::Exited { holder } => write!(f, "{} is leaving the critical section.", holder),
            Self::Declined { holder } => {
                write!(f, "{} does not want to enter the critical section.", holder)
            }
            Self::Forwarded { from, to } => write!(f, "{} passes the token to {}.", from, to),
        }
    }
}

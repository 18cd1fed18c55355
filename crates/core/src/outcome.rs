//! Result of one election run.

use coordsim_types::{ElectionTrace, ProcessId};
use serde::Serialize;

/// What a single `start_election` call produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElectionOutcome {
    /// Process that started the election.
    pub initiator: ProcessId,

    /// Newly elected coordinator.
    pub coordinator: ProcessId,

    /// Messages exchanged, in send order.
    pub trace: ElectionTrace,

    /// IDs collected by the circulating election message.
    ///
    /// Only the ring algorithm accumulates one; Bully leaves it `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_list: Option<Vec<ProcessId>>,
}

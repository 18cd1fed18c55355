//! Membership validation errors.

use crate::ProcessId;
use thiserror::Error;

/// Errors raised while validating an operation against the current membership.
///
/// Every engine checks its preconditions before simulating a single message,
/// so an operation that returns one of these leaves engine state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MembershipError {
    /// Referenced process is not part of the current membership.
    #[error("{0} is not a member of the current membership")]
    UnknownProcess(ProcessId),

    /// Operation attempted on a topology, ring, or set with no members.
    #[error("membership is empty")]
    EmptyMembership,

    /// Coordinator failure requested while no coordinator is set.
    #[error("no active coordinator")]
    NoActiveCoordinator,

    /// The same process ID was supplied more than once.
    #[error("{0} appears more than once in the membership")]
    DuplicateProcess(ProcessId),
}

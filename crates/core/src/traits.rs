//! Core traits for election engines.

use crate::ElectionOutcome;
use coordsim_types::{MembershipError, ProcessId};

/// Console wording for a coordinator value, shared by engines and reports.
pub fn describe_coordinator(coordinator: Option<ProcessId>) -> String {
    match coordinator {
        Some(coordinator) => format!("Current coordinator: {}", coordinator),
        None => "No coordinator currently.".to_string(),
    }
}

/// A leader-election engine over a closed, statically known membership.
///
/// Engines are synchronous simulations of message exchange:
///
/// - **Sequential**: one election at a time per instance (`&mut self`)
/// - **Deterministic**: same membership and initiator = same trace and result
/// - **Validate first**: every precondition is checked before any message is
///   simulated, so an `Err` leaves the engine exactly as it was
///
/// # Example
///
/// ```ignore
/// fn failover(engine: &mut dyn ElectionEngine, initiator: ProcessId) {
///     println!("{}", engine.display_coordinator());
///     engine.fail_coordinator()?;
///     let outcome = engine.start_election(initiator)?;
///     assert_eq!(Some(outcome.coordinator), engine.coordinator());
/// }
/// ```
pub trait ElectionEngine {
    /// Short algorithm name for reports.
    fn name(&self) -> &'static str;

    /// Current coordinator, or `None` after a failure and before a new election.
    fn coordinator(&self) -> Option<ProcessId>;

    /// Live members, in the engine's own order.
    fn members(&self) -> Vec<ProcessId>;

    /// Remove the current coordinator from the membership.
    ///
    /// # Errors
    ///
    /// [`MembershipError::NoActiveCoordinator`] if no coordinator is set; the
    /// membership is left unchanged.
    ///
    /// # Returns
    ///
    /// The ID of the process that failed.
    fn fail_coordinator(&mut self) -> Result<ProcessId, MembershipError>;

    /// Run one election started by `initiator`.
    ///
    /// # Errors
    ///
    /// - [`MembershipError::EmptyMembership`] if no process is left
    /// - [`MembershipError::UnknownProcess`] if `initiator` is not a member
    fn start_election(&mut self, initiator: ProcessId)
        -> Result<ElectionOutcome, MembershipError>;

    /// Human-readable report of the current coordinator.
    fn display_coordinator(&self) -> String {
        describe_coordinator(self.coordinator())
    }

    /// Check if a process is currently a member.
    fn is_member(&self, id: ProcessId) -> bool {
        self.members().contains(&id)
    }
}

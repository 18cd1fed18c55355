//! Ring election: one message around the ring, highest collected ID wins.

use crate::{ElectionConfig, RingOrder};
use coordsim_core::{ElectionEngine, ElectionOutcome};
use coordsim_types::{ElectionMessage, ElectionTrace, MembershipError, ProcessId, RingTopology};
use tracing::{debug, info, warn};

/// Ring election state.
#[derive(Debug, Clone)]
pub struct RingElection {
    /// Live processes in traversal order.
    ring: RingTopology,

    /// Current coordinator; `None` between a failure and the next election.
    coordinator: Option<ProcessId>,
}

impl RingElection {
    /// Create an engine whose ring is sorted ascending.
    ///
    /// The highest ID starts out as coordinator.
    pub fn new(ids: impl IntoIterator<Item = ProcessId>) -> Result<Self, MembershipError> {
        Self::with_config(ids, &ElectionConfig::default())
    }

    /// Create an engine with an explicit configuration.
    pub fn with_config(
        ids: impl IntoIterator<Item = ProcessId>,
        config: &ElectionConfig,
    ) -> Result<Self, MembershipError> {
        let ring = match config.ring_order {
            RingOrder::Sorted => RingTopology::sorted(ids)?,
            RingOrder::AsGiven => RingTopology::new(ids)?,
        };
        let coordinator = ring.max().ok_or(MembershipError::EmptyMembership)?;

        debug!(
            members = ring.len(),
            coordinator = %coordinator,
            order = ?config.ring_order,
            "Ring election engine created"
        );

        Ok(Self {
            ring,
            coordinator: Some(coordinator),
        })
    }

    /// Current coordinator.
    pub fn coordinator(&self) -> Option<ProcessId> {
        self.coordinator
    }

    /// Remove the coordinator from the ring; its neighbours close the gap.
    pub fn fail_coordinator(&mut self) -> Result<ProcessId, MembershipError> {
        let failed = self
            .coordinator
            .ok_or(MembershipError::NoActiveCoordinator)?;
        self.ring.remove_and_renumber(failed)?;
        self.coordinator = None;

        warn!(process = %failed, remaining = self.ring.len(), "Coordinator failed");
        Ok(failed)
    }

    /// Circulate an election message from `initiator` once around the ring.
    ///
    /// Each hop appends the receiving process to the active list, except the
    /// final hop back to the initiator; the initiator is appended once at the
    /// end. The highest ID in the list becomes coordinator.
    pub fn start_election(
        &mut self,
        initiator: ProcessId,
    ) -> Result<ElectionOutcome, MembershipError> {
        let walk = self.ring.walk_from(initiator)?;

        info!(initiator = %initiator, "Process starts election");

        let mut trace = ElectionTrace::new();
        let mut active_list = Vec::with_capacity(walk.len());
        for hop in walk {
            trace.push(ElectionMessage::election(hop.from, hop.to));
            debug!(from = %hop.from, to = %hop.to, "Election message passed");
            if hop.to != initiator {
                active_list.push(hop.to);
            }
        }
        active_list.push(initiator);

        let coordinator = active_list.iter().max().copied().unwrap_or(initiator);
        self.coordinator = Some(coordinator);

        info!(
            coordinator = %coordinator,
            active_list = ?active_list,
            "Process becomes the new coordinator"
        );

        Ok(ElectionOutcome {
            initiator,
            coordinator,
            trace,
            active_list: Some(active_list),
        })
    }
}

impl ElectionEngine for RingElection {
    fn name(&self) -> &'static str {
        "ring"
    }

    fn coordinator(&self) -> Option<ProcessId> {
        self.coordinator
    }

    fn members(&self) -> Vec<ProcessId> {
        self.ring.to_vec()
    }

    fn fail_coordinator(&mut self) -> Result<ProcessId, MembershipError> {
        RingElection::fail_coordinator(self)
    }

    fn start_election(
        &mut self,
        initiator: ProcessId,
    ) -> Result<ElectionOutcome, MembershipError> {
        RingElection::start_election(self, initiator)
    }
}

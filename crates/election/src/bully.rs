//! Bully election: the highest live ID takes over.

use crate::{BullyStrategy, ElectionConfig};
use coordsim_core::{ElectionEngine, ElectionOutcome};
use coordsim_types::{ElectionMessage, ElectionTrace, MembershipError, ProcessId, RingTopology};
use std::collections::{BTreeSet, VecDeque};
use tracing::{debug, info, warn};

/// Bully election state.
///
/// The membership is kept as a [`RingTopology`] only for its uniqueness and
/// removal handling; ring order plays no part in who wins.
#[derive(Debug, Clone)]
pub struct BullyElection {
    /// Live processes.
    processes: RingTopology,

    /// Current coordinator; `None` between a failure and the next election.
    coordinator: Option<ProcessId>,

    /// How answers are resolved.
    strategy: BullyStrategy,
}

impl BullyElection {
    /// Create an engine with the default (collapsed) strategy.
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
        let processes = RingTopology::new(ids)?;
        let coordinator = processes.max().ok_or(MembershipError::EmptyMembership)?;

        debug!(
            members = processes.len(),
            coordinator = %coordinator,
            strategy = ?config.bully_strategy,
            "Bully election engine created"
        );

        Ok(Self {
            processes,
            coordinator: Some(coordinator),
            strategy: config.bully_strategy,
        })
    }

    /// Current coordinator.
    pub fn coordinator(&self) -> Option<ProcessId> {
        self.coordinator
    }

    /// Configured answer resolution.
    pub fn strategy(&self) -> BullyStrategy {
        self.strategy
    }

    /// Remove the coordinator from the membership.
    pub fn fail_coordinator(&mut self) -> Result<ProcessId, MembershipError> {
        let failed = self
            .coordinator
            .ok_or(MembershipError::NoActiveCoordinator)?;
        self.processes.remove_and_renumber(failed)?;
        self.coordinator = None;

        warn!(process = %failed, remaining = self.processes.len(), "Coordinator failed");
        Ok(failed)
    }

    /// Run an election started by `initiator`.
    ///
    /// Afterwards the coordinator is always the highest live ID.
    pub fn start_election(
        &mut self,
        initiator: ProcessId,
    ) -> Result<ElectionOutcome, MembershipError> {
        if self.processes.is_empty() {
            return Err(MembershipError::EmptyMembership);
        }
        if !self.processes.contains(initiator) {
            return Err(MembershipError::UnknownProcess(initiator));
        }

        info!(initiator = %initiator, strategy = ?self.strategy, "Process starts election");

        let mut trace = ElectionTrace::new();
        let coordinator = match self.strategy {
            BullyStrategy::Collapsed => self.collapsed_round(initiator, &mut trace),
            BullyStrategy::Cascade => self.cascade(initiator, &mut trace),
        };
        self.coordinator = Some(coordinator);

        info!(
            coordinator = %coordinator,
            messages = trace.len(),
            "Process becomes the new coordinator"
        );

        Ok(ElectionOutcome {
            initiator,
            coordinator,
            trace,
            active_list: None,
        })
    }

    /// Send an election message to every higher process and collect answers.
    ///
    /// Every higher process is live in this model, so every one answers.
    fn query_higher(&self, from: ProcessId, trace: &mut ElectionTrace) -> Vec<ProcessId> {
        let higher: Vec<ProcessId> = self.processes.higher_than(from).collect();
        for &peer in &higher {
            trace.push(ElectionMessage::election(from, peer));
            trace.push(ElectionMessage::answer(peer, from));
            debug!(from = %from, to = %peer, "Election message answered");
        }
        higher
    }

    /// Single round: nobody higher means the initiator wins, otherwise the
    /// highest surviving process takes over without further rounds.
    fn collapsed_round(&self, initiator: ProcessId, trace: &mut ElectionTrace) -> ProcessId {
        let answered = self.query_higher(initiator, trace);
        if answered.is_empty() {
            return initiator;
        }
        self.processes.max().unwrap_or(initiator)
    }

    /// Every answering process holds its own election, once. The process
    /// that gets no answer wins and announces itself to everyone else.
    fn cascade(&self, initiator: ProcessId, trace: &mut ElectionTrace) -> ProcessId {
        let mut started = BTreeSet::from([initiator]);
        let mut pending = VecDeque::from([initiator]);
        let mut winner = initiator;

        while let Some(candidate) = pending.pop_front() {
            let answered = self.query_higher(candidate, trace);
            if answered.is_empty() {
                winner = candidate;
                continue;
            }
            for peer in answered {
                if started.insert(peer) {
                    debug!(process = %peer, "Takes over election");
                    pending.push_back(peer);
                }
            }
        }

        for peer in self.processes.iter().filter(|p| *p != winner) {
            trace.push(ElectionMessage::coordinator(winner, peer));
        }
        winner
    }
}

impl ElectionEngine for BullyElection {
    fn name(&self) -> &'static str {
        "bully"
    }

    fn coordinator(&self) -> Option<ProcessId> {
        self.coordinator
    }

    fn members(&self) -> Vec<ProcessId> {
        self.processes.to_vec()
    }

    fn fail_coordinator(&mut self) -> Result<ProcessId, MembershipError> {
        BullyElection::fail_coordinator(self)
    }

    fn start_election(
        &mut self,
        initiator: ProcessId,
    ) -> Result<ElectionOutcome, MembershipError> {
        BullyElection::start_election(self, initiator)
    }
}

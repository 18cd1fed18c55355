//! Token ring engine: wires the ring, launches the processes, waits for one pass.

use crate::occupancy::Occupancy;
use crate::process::{ProcessActor, ProcessOutcome};
use crate::{Token, TokenEvent, TokenRingConfig, TokenRingError};
use coordsim_types::{MembershipError, ProcessId, RingTopology};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Result of one completed token pass.
#[derive(Debug, Clone, Serialize)]
pub struct TokenRingReport {
    /// Process that held the token when the pass started.
    pub initial_holder: ProcessId,

    /// Number of processes in the ring.
    pub ring_size: usize,

    /// Every step of the pass, in causal order.
    pub events: Vec<TokenEvent>,

    /// Hand-offs performed; equals `ring_size` for a full pass.
    pub hand_offs: usize,

    /// Processes that occupied the critical section, in pass order.
    pub entered: Vec<ProcessId>,

    /// Most processes ever observed inside the critical section at once.
    pub peak_occupancy: usize,
}

impl TokenRingReport {
    /// Order in which processes received the token.
    pub fn visit_order(&self) -> Vec<ProcessId> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TokenEvent::Received { holder } => Some(*holder),
                _ => None,
            })
            .collect()
    }

    /// Check that every process was visited exactly once and the token made
    /// it all the way around.
    pub fn completed_full_pass(&self) -> bool {
        let visits = self.visit_order();
        let mut unique = visits.clone();
        unique.sort();
        unique.dedup();

        self.hand_offs == self.ring_size
            && visits.len() == self.ring_size
            && unique.len() == self.ring_size
    }
}

/// Drives token-ring mutual exclusion over a fixed ring.
#[derive(Debug, Clone, Default)]
pub struct TokenRingEngine {
    config: TokenRingConfig,
}

impl TokenRingEngine {
    /// Create a new engine.
    pub fn new(config: TokenRingConfig) -> Self {
        Self { config }
    }

    /// Run one full pass of the token around `topology`.
    ///
    /// # Arguments
    ///
    /// * `topology` - Ring order; the token travels to `successor(holder)`
    /// * `wants_entry` - Critical-section interest per process; absent means no
    /// * `initial_holder` - Process granted the token first; defaults to the
    ///   first process in ring order
    ///
    /// # Errors
    ///
    /// Membership errors are reported before any process is started. Once
    /// started, the pass fails only on timeout or a lost hand-off.
    pub async fn start(
        &self,
        topology: &RingTopology,
        wants_entry: &HashMap<ProcessId, bool>,
        initial_holder: Option<ProcessId>,
    ) -> Result<TokenRingReport, TokenRingError> {
        let holder = Self::validate(topology, wants_entry, initial_holder)?;
        // The process before the initial holder ends the pass.
        let last = topology.predecessor(holder)?;
        let ring_size = topology.len();

        info!(
            ring_size,
            initial_holder = %holder,
            critical_section = ?self.config.critical_section,
            "Starting token ring pass"
        );

        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let occupancy = Arc::new(Occupancy::default());

        // One single-use slot per ring edge, keyed by the receiving process.
        let mut inboxes = HashMap::with_capacity(ring_size);
        let mut slots = HashMap::with_capacity(ring_size);
        for id in topology.iter() {
            let (tx, rx) = oneshot::channel::<Token>();
            slots.insert(id, tx);
            inboxes.insert(id, rx);
        }

        // The holder's slot is fed by the engine, and the edge back into the
        // holder is replaced by the completion slot.
        let grant = slots
            .remove(&holder)
            .ok_or(MembershipError::UnknownProcess(holder))?;
        let (completion_tx, completion_rx) = oneshot::channel::<Token>();
        let mut completion_tx = Some(completion_tx);

        let mut tasks = JoinSet::new();
        for id in topology.iter() {
            let successor = topology.successor(id)?;
            let outbox = if id == last {
                completion_tx.take()
            } else {
                slots.remove(&successor)
            };
            let outbox = outbox.ok_or(MembershipError::UnknownProcess(successor))?;
            let inbox = inboxes
                .remove(&id)
                .ok_or(MembershipError::UnknownProcess(id))?;

            let actor = ProcessActor {
                id,
                successor,
                wants_critical_section: wants_entry.get(&id).copied().unwrap_or(false),
                critical_section: self.config.critical_section,
                inbox,
                outbox,
                events: event_tx.clone(),
                occupancy: Arc::clone(&occupancy),
            };
            tasks.spawn(actor.run());
        }
        drop(event_tx);

        grant
            .send(Token::mint())
            .map_err(|_| TokenRingError::TokenLost(holder))?;
        debug!(process = %holder, "Token granted");

        let pass = async {
            let token = completion_rx
                .await
                .map_err(|_| TokenRingError::TokenLost(holder))?;

            let mut outcomes = Vec::with_capacity(ring_size);
            while let Some(joined) = tasks.join_next().await {
                let outcome = joined.map_err(|e| TokenRingError::TaskFailed(e.to_string()))??;
                outcomes.push(outcome);
            }
            Ok::<_, TokenRingError>((token, outcomes))
        };

        let waited = match self.config.pass_timeout {
            Some(limit) => tokio::time::timeout(limit, pass).await.map_err(|_| limit),
            None => Ok(pass.await),
        };
        let (token, outcomes) = match waited {
            Ok(result) => result?,
            Err(limit) => {
                // Whoever holds the token now keeps it; there is no recovery.
                tasks.abort_all();
                warn!(?limit, "Token pass timed out, abandoning the token");
                return Err(TokenRingError::TimedOut(limit));
            }
        };

        let mut events = Vec::new();
        while let Some(event) = event_rx.recv().await {
            events.push(event);
        }

        let entered = Self::entered_in_pass_order(topology, holder, &outcomes)?;
        let report = TokenRingReport {
            initial_holder: holder,
            ring_size,
            events,
            hand_offs: token.hand_offs(),
            entered,
            peak_occupancy: occupancy.peak(),
        };

        info!(
            hand_offs = report.hand_offs,
            entered = report.entered.len(),
            "Token ring pass complete"
        );
        Ok(report)
    }

    /// Check every precondition before anything is spawned.
    fn validate(
        topology: &RingTopology,
        wants_entry: &HashMap<ProcessId, bool>,
        initial_holder: Option<ProcessId>,
    ) -> Result<ProcessId, MembershipError> {
        if topology.is_empty() {
            return Err(MembershipError::EmptyMembership);
        }
        let holder = match initial_holder {
            Some(holder) => holder,
            None => topology.first()?,
        };
        if !topology.contains(holder) {
            return Err(MembershipError::UnknownProcess(holder));
        }
        if let Some(unknown) = wants_entry
            .keys()
            .copied()
            .filter(|id| !topology.contains(*id))
            .min()
        {
            return Err(MembershipError::UnknownProcess(unknown));
        }
        Ok(holder)
    }

    fn entered_in_pass_order(
        topology: &RingTopology,
        holder: ProcessId,
        outcomes: &[ProcessOutcome],
    ) -> Result<Vec<ProcessId>, MembershipError> {
        let entered: HashMap<ProcessId, bool> = outcomes
            .iter()
            .map(|o| (o.id, o.entered_critical_section))
            .collect();

        Ok(topology
            .walk_from(holder)?
            .map(|hop| hop.from)
            .filter(|id| entered.get(id).copied().unwrap_or(false))
            .collect())
    }
}

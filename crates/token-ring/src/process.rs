//! One ring participant.

use crate::occupancy::Occupancy;
use crate::{Token, TokenEvent, TokenRingError};
use coordsim_types::ProcessId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// What a process did during the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ProcessOutcome {
    pub id: ProcessId,
    pub entered_critical_section: bool,
}

/// A process task's state: its identity, its interest in the critical
/// section, and the two ends of the ring edges it sits between.
///
/// Holding the token is not a flag here. The process holds it exactly
/// between taking it out of `inbox` and moving it into `outbox`.
pub(crate) struct ProcessActor {
    pub id: ProcessId,
    pub successor: ProcessId,
    pub wants_critical_section: bool,
    pub critical_section: Duration,
    pub inbox: oneshot::Receiver<Token>,
    pub outbox: oneshot::Sender<Token>,
    pub events: mpsc::UnboundedSender<TokenEvent>,
    pub occupancy: Arc<Occupancy>,
}

impl ProcessActor {
    /// Wait for the token, use it once, forward it, terminate.
    pub(crate) async fn run(mut self) -> Result<ProcessOutcome, TokenRingError> {
        let token = (&mut self.inbox)
            .await
            .map_err(|_| TokenRingError::TokenLost(self.id))?;

        debug!(process = %self.id, hand_offs = token.hand_offs(), "Holding token");
        self.emit(TokenEvent::Received { holder: self.id });

        let entered = self.wants_critical_section;
        if self.wants_critical_section {
            self.emit(TokenEvent::Entered { holder: self.id });
            self.occupancy.enter();
            info!(process = %self.id, "Entering critical section");

            tokio::time::sleep(self.critical_section).await;

            self.occupancy.exit();
            self.wants_critical_section = false;
            info!(process = %self.id, "Leaving critical section");
            self.emit(TokenEvent::Exited { holder: self.id });
        } else {
            debug!(process = %self.id, "Does not want the critical section");
            self.emit(TokenEvent::Declined { holder: self.id });
        }

        // Events go out before the token so the trace follows causal order.
        self.emit(TokenEvent::Forwarded {
            from: self.id,
            to: self.successor,
        });
        self.outbox
            .send(token.pass())
            .map_err(|_| TokenRingError::TokenLost(self.successor))?;

        debug!(process = %self.id, successor = %self.successor, "Token forwarded");

        Ok(ProcessOutcome {
            id: self.id,
            entered_critical_section: entered,
        })
    }

    fn emit(&self, event: TokenEvent) {
        // Receiver gone means the run was abandoned; nothing left to observe.
        let _ = self.events.send(event);
    }
}

//! Berkeley clock synchronisation.

use crate::{ClockOffset, ClockTime, NodeClock};
use coordsim_types::{MembershipError, ProcessId};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// One message of a synchronisation round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "message", rename_all = "snake_case")]
pub enum SyncMessage {
    /// Master asks a node for its clock.
    TimeRequest { from: ProcessId, to: ProcessId },

    /// Node reports its clock to the master.
    TimeReply {
        from: ProcessId,
        to: ProcessId,
        time: ClockTime,
    },

    /// Master sends a node its correction.
    Adjust {
        from: ProcessId,
        to: ProcessId,
        offset: ClockOffset,
    },
}

impl fmt::Display for SyncMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimeRequest { from, to } => {
                write!(f, "{} requests the time from {}", from, to)
            }
            Self::TimeReply { from, to, time } => write!(f, "{} reports {} to {}", from, time, to),
            Self::Adjust { from, to, offset } => {
                write!(f, "{} tells {} to adjust by {}", from, to, offset)
            }
        }
    }
}

/// What happened to one node's clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClockAdjustment {
    pub node: ProcessId,
    pub before: ClockTime,
    pub offset: ClockOffset,
    pub after: ClockTime,
}

/// Result of one synchronisation round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub master: ProcessId,

    /// Floor of the mean of every collected reading, the master's included.
    pub average: ClockTime,

    /// Per-node corrections, in node order.
    pub adjustments: Vec<ClockAdjustment>,

    /// Messages exchanged, in send order.
    pub trace: Vec<SyncMessage>,
}

impl SyncOutcome {
    /// Correction sent to `node`, if it took part.
    pub fn offset_of(&self, node: ProcessId) -> Option<ClockOffset> {
        self.adjustments
            .iter()
            .find(|a| a.node == node)
            .map(|a| a.offset)
    }
}

/// Berkeley synchronisation over a fixed set of node clocks.
///
/// The master polls every other node, averages all readings including its
/// own, and sends each node the signed offset that moves it onto the
/// average. The master corrects its own clock locally.
#[derive(Debug, Clone)]
pub struct BerkeleySync {
    clocks: IndexMap<ProcessId, ClockTime>,
    master: ProcessId,
}

impl BerkeleySync {
    /// Create an engine.
    ///
    /// # Errors
    ///
    /// - [`MembershipError::EmptyMembership`] if `clocks` is empty
    /// - [`MembershipError::DuplicateProcess`] if a node appears twice
    /// - [`MembershipError::UnknownProcess`] if `master` has no clock
    pub fn new(
        clocks: impl IntoIterator<Item = NodeClock>,
        master: ProcessId,
    ) -> Result<Self, MembershipError> {
        let mut map = IndexMap::new();
        for clock in clocks {
            if map.insert(clock.id, clock.time).is_some() {
                return Err(MembershipError::DuplicateProcess(clock.id));
            }
        }
        if map.is_empty() {
            return Err(MembershipError::EmptyMembership);
        }
        if !map.contains_key(&master) {
            return Err(MembershipError::UnknownProcess(master));
        }

        debug!(nodes = map.len(), master = %master, "Berkeley engine created");
        Ok(Self { clocks: map, master })
    }

    pub fn master(&self) -> ProcessId {
        self.master
    }

    /// Current clock of every node, in node order.
    pub fn clocks(&self) -> Vec<NodeClock> {
        self.clocks
            .iter()
            .map(|(&id, &time)| NodeClock::new(id, time))
            .collect()
    }

    /// Run one round and apply every correction.
    pub fn synchronize(&mut self) -> SyncOutcome {
        let master = self.master;
        let mut trace = Vec::with_capacity(3 * self.clocks.len());

        info!(
            master = %master,
            nodes = self.clocks.len(),
            "Master starts clock synchronisation"
        );

        for (&node, &time) in self.clocks.iter().filter(|(id, _)| **id != master) {
            trace.push(SyncMessage::TimeRequest { from: master, to: node });
            trace.push(SyncMessage::TimeReply {
                from: node,
                to: master,
                time,
            });
            debug!(node = %node, %time, "Clock collected");
        }

        // The constructor guarantees at least the master's own reading.
        let average = ClockTime::average(self.clocks.values().copied())
            .unwrap_or(self.clocks[&master]);

        let mut adjustments = Vec::with_capacity(self.clocks.len());
        for (&node, time) in self.clocks.iter_mut() {
            let before = *time;
            let offset = before.offset_to(average);
            *time = before.adjusted(offset);

            if node != master {
                trace.push(SyncMessage::Adjust {
                    from: master,
                    to: node,
                    offset,
                });
            }
            adjustments.push(ClockAdjustment {
                node,
                before,
                offset,
                after: *time,
            });
        }

        info!(master = %master, %average, "Clocks synchronised");

        SyncOutcome {
            master,
            average,
            adjustments,
            trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coordsim_test_helpers::ids;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use tracing_test::traced_test;

    fn hm(raw: &str) -> ClockTime {
        raw.parse().unwrap()
    }

    fn clocks(raw: &[(u64, &str)]) -> Vec<NodeClock> {
        raw.iter()
            .map(|&(id, time)| NodeClock::new(ProcessId(id), hm(time)))
            .collect()
    }

    #[traced_test]
    #[test]
    fn test_three_node_round() {
        let mut sync = BerkeleySync::new(
            clocks(&[(1, "14:00"), (2, "13:46"), (3, "14:20")]),
            ProcessId(1),
        )
        .unwrap();

        let outcome = sync.synchronize();
        assert_eq!(outcome.average, hm("14:02"));
        assert_eq!(outcome.offset_of(ProcessId(1)), Some(ClockOffset(2 * 60)));
        assert_eq!(outcome.offset_of(ProcessId(2)), Some(ClockOffset(16 * 60)));
        assert_eq!(outcome.offset_of(ProcessId(3)), Some(ClockOffset(-18 * 60)));
        assert!(outcome.adjustments.iter().all(|a| a.after == hm("14:02")));

        let lines: Vec<String> = outcome.trace.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "Process(1) requests the time from Process(2)",
                "Process(2) reports 13:46 to Process(1)",
                "Process(1) requests the time from Process(3)",
                "Process(3) reports 14:20 to Process(1)",
                "Process(1) tells Process(2) to adjust by +16m",
                "Process(1) tells Process(3) to adjust by -18m",
            ]
        );

        assert_eq!(sync.clocks(), clocks(&[(1, "14:02"), (2, "14:02"), (3, "14:02")]));
        assert!(logs_contain("Clocks synchronised"));
    }

    #[test]
    fn test_single_node_keeps_its_clock() {
        let mut sync = BerkeleySync::new(clocks(&[(4, "08:15")]), ProcessId(4)).unwrap();

        let outcome = sync.synchronize();
        assert_eq!(outcome.average, hm("08:15"));
        assert_eq!(outcome.offset_of(ProcessId(4)), Some(ClockOffset(0)));
        assert!(outcome.trace.is_empty());
    }

    #[test]
    fn test_invalid_setups() {
        assert_eq!(
            BerkeleySync::new(Vec::new(), ProcessId(1)).unwrap_err(),
            MembershipError::EmptyMembership
        );
        assert_eq!(
            BerkeleySync::new(clocks(&[(1, "10:00"), (2, "10:05")]), ProcessId(9)).unwrap_err(),
            MembershipError::UnknownProcess(ProcessId(9))
        );
        assert_eq!(
            BerkeleySync::new(clocks(&[(1, "10:00"), (1, "10:05")]), ProcessId(1)).unwrap_err(),
            MembershipError::DuplicateProcess(ProcessId(1))
        );
    }

    #[test]
    fn test_second_round_is_a_no_op() {
        let mut sync = BerkeleySync::new(
            clocks(&[(1, "10:00"), (2, "10:07"), (3, "09:50")]),
            ProcessId(2),
        )
        .unwrap();

        sync.synchronize();
        let again = sync.synchronize();
        assert!(again.adjustments.iter().all(|a| a.offset == ClockOffset(0)));
    }

    #[test]
    fn test_random_rounds_converge() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);

        for _ in 0..50 {
            let len = rng.gen_range(1..=8);
            let nodes: Vec<NodeClock> = ids(&(1..=len).collect::<Vec<u64>>())
                .into_iter()
                .map(|id| NodeClock::new(id, ClockTime::from_hms(0, 0, rng.gen_range(0..86_400))))
                .collect();
            let master = nodes[rng.gen_range(0..nodes.len())].id;

            let mut sync = BerkeleySync::new(nodes.clone(), master).unwrap();
            let outcome = sync.synchronize();

            assert_eq!(outcome.trace.len(), 3 * (nodes.len() - 1));
            assert_eq!(outcome.adjustments.len(), nodes.len());
            for (adjustment, node) in outcome.adjustments.iter().zip(&nodes) {
                assert_eq!(adjustment.node, node.id);
                assert_eq!(adjustment.before.adjusted(adjustment.offset), outcome.average);
            }

            let min = nodes.iter().map(|n| n.time).min();
            let max = nodes.iter().map(|n| n.time).max();
            assert!(Some(outcome.average) >= min && Some(outcome.average) <= max);
        }
    }
}

//! Election message traces.

use crate::ProcessId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of message exchanged during an election.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Election message sent to a higher process (Bully) or to the ring successor (Ring).
    Election,

    /// A higher process answering an election message (Bully).
    Answer,

    /// Victory announcement from the new coordinator.
    Coordinator,
}

/// One message of an election run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionMessage {
    pub from: ProcessId,
    pub to: ProcessId,
    pub kind: MessageKind,
}

impl ElectionMessage {
    pub fn election(from: ProcessId, to: ProcessId) -> Self {
        Self {
            from,
            to,
            kind: MessageKind::Election,
        }
    }

    pub fn answer(from: ProcessId, to: ProcessId) -> Self {
        Self {
            from,
            to,
            kind: MessageKind::Answer,
        }
    }

    pub fn coordinator(from: ProcessId, to: ProcessId) -> Self {
        Self {
            from,
            to,
            kind: MessageKind::Coordinator,
        }
    }
}

impl fmt::Display for ElectionMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MessageKind::Election => {
                write!(f, "Election message sent from {} to {}", self.from, self.to)
            }
            MessageKind::Answer => write!(f, "{} responds to {}", self.from, self.to),
            MessageKind::Coordinator => {
                write!(f, "{} announces itself coordinator to {}", self.from, self.to)
            }
        }
    }
}

/// Ordered log of the messages produced while electing a coordinator.
///
/// Used for observability and tests only; the election result never depends on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElectionTrace {
    messages: Vec<ElectionMessage>,
}

impl ElectionTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message.
    pub fn push(&mut self, message: ElectionMessage) {
        self.messages.push(message);
    }

    /// All messages in send order.
    pub fn messages(&self) -> &[ElectionMessage] {
        &self.messages
    }

    /// Messages of one kind, as `(from, to)` pairs.
    pub fn pairs(&self, kind: MessageKind) -> Vec<(ProcessId, ProcessId)> {
        self.messages
            .iter()
            .filter(|m| m.kind == kind)
            .map(|m| (m.from, m.to))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElectionMessage> {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_filters_by_kind() {
        let mut trace = ElectionTrace::new();
        trace.push(ElectionMessage::election(ProcessId(3), ProcessId(5)));
        trace.push(ElectionMessage::answer(ProcessId(5), ProcessId(3)));

        assert_eq!(trace.len(), 2);
        assert_eq!(
            trace.pairs(MessageKind::Answer),
            vec![(ProcessId(5), ProcessId(3))]
        );
        assert_eq!(
            trace.messages()[0].to_string(),
            "Election message sent from Process(3) to Process(5)"
        );
    }
}

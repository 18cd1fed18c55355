//! Election configuration.

use serde::{Deserialize, Serialize};

/// How the Bully algorithm resolves the answers it receives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BullyStrategy {
    /// One round: the initiator queries every higher process and the highest
    /// live ID takes over directly.
    #[default]
    Collapsed,

    /// Textbook cascade: every process that answers runs its own election
    /// (at most once), until the one that gets no answer announces itself.
    Cascade,
}

/// Ring order used by the ring election.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RingOrder {
    /// Sort members ascending at construction.
    #[default]
    Sorted,

    /// Keep the order the members were supplied in.
    AsGiven,
}

/// Configuration for the election engines.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectionConfig {
    /// Bully answer resolution.
    pub bully_strategy: BullyStrategy,

    /// Ring traversal order.
    pub ring_order: RingOrder,
}

impl ElectionConfig {
    /// Set the Bully strategy.
    pub fn with_bully_strategy(mut self, strategy: BullyStrategy) -> Self {
        self.bully_strategy = strategy;
        self
    }

    /// Use the textbook cascading Bully election.
    pub fn with_cascade(self) -> Self {
        self.with_bully_strategy(BullyStrategy::Cascade)
    }

    /// Set the ring order.
    pub fn with_ring_order(mut self, order: RingOrder) -> Self {
        self.ring_order = order;
        self
    }

    /// Keep the caller's ring order instead of sorting.
    pub fn with_given_order(self) -> Self {
        self.with_ring_order(RingOrder::AsGiven)
    }
}

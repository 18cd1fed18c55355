//! Leader election after a coordinator failure.
//!
//! Two synchronous engines over a closed membership, both implementing
//! [`ElectionEngine`](coordsim_core::ElectionEngine):
//!
//! - [`BullyElection`]: the initiator queries every higher-ID process directly
//!   and yields to any that answer. The highest live ID always wins.
//! - [`RingElection`]: the initiator circulates an election message once
//!   around the ring, collecting every live ID it passes. The highest
//!   collected ID wins.
//!
//! Both end with the same guarantee (coordinator = highest live ID) through
//! different message patterns, which the returned
//! [`ElectionTrace`](coordsim_types::ElectionTrace) makes visible.

mod bully;
mod config;
mod ring;

pub use bully::BullyElection;
pub use config::{BullyStrategy, ElectionConfig, RingOrder};
pub use ring::RingElection;

//! Core types shared by every coordsim protocol engine.
//!
//! - [`ProcessId`] identifies one logical participant of a run.
//! - [`RingTopology`] is the ordered, cyclic membership that the token ring
//!   and the ring election route over (and that Bully uses as a plain set).
//! - [`ElectionTrace`] records the messages exchanged while electing a
//!   coordinator.
//! - [`MembershipError`] is the validation error every engine surfaces
//!   before simulating any protocol message.

mod error;
mod identifiers;
mod topology;
mod trace;

pub use error::MembershipError;
pub use identifiers::ProcessId;
pub use topology::{Hop, RingTopology, RingWalk};
pub use trace::{ElectionMessage, ElectionTrace, MessageKind};

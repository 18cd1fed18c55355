//! Clock synchronisation for coordsim.
//!
//! [`BerkeleySync`] runs the Berkeley algorithm: a master collects every
//! node's clock, averages the readings (its own included) and sends each node
//! the signed correction that moves it onto the average. There is no
//! external reference clock; the group agrees with itself.

mod berkeley;
mod clock;

pub use berkeley::{BerkeleySync, ClockAdjustment, SyncMessage, SyncOutcome};
pub use clock::{ClockOffset, ClockParseError, ClockTime, NodeClock};

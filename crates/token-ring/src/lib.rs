//! Token-ring mutual exclusion.
//!
//! One tokio task per process, wired into a ring by one-slot hand-off
//! channels. A single [`Token`] value is moved from holder to successor, so
//! exclusivity comes from ownership rather than from a shared flag.
//!
//! # Architecture
//!
//! ```text
//!            grant
//!   engine ─────────► P0 ──oneshot──► P1 ──oneshot──► P2
//!     ▲                                                │
//!     └─────────────── completion slot ◄───────────────┘
//! ```
//!
//! Each process waits on its inbound slot, optionally occupies the critical
//! section, then forwards the token and terminates. The last process of the
//! pass forwards into the engine's completion slot, which ends the run after
//! exactly one hand-off per process.

mod config;
mod engine;
mod error;
mod event;
mod occupancy;
mod process;
mod token;

pub use config::TokenRingConfig;
pub use engine::{TokenRingEngine, TokenRingReport};
pub use error::TokenRingError;
pub use event::TokenEvent;
pub use token::Token;

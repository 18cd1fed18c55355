//! Core abstractions shared by the coordsim engines and drivers.
//!
//! - [`ElectionEngine`]: the seam both election algorithms implement, so a
//!   driver can display, fail, and re-elect a coordinator without knowing
//!   which algorithm it is talking to.
//! - [`ElectionOutcome`]: what one election run produced.
//! - [`collaborator`]: capability-style interface to the external request
//!   services (calculator, list sorter).

pub mod collaborator;
mod outcome;
mod traits;

pub use collaborator::{
    CalculatorRequest, CollaboratorError, LocalCalculator, LocalSorter, RemoteService,
};
pub use outcome::ElectionOutcome;
pub use traits::{describe_coordinator, ElectionEngine};

//! Coordsim Simulator
//!
//! Drives the protocol engines from a scenario and turns their results into
//! console traces.
//!
//! # Example
//!
//! ```ignore
//! use coordsim_simulator::{Algorithm, ElectionScenario, ScenarioConfig, Simulator};
//! use coordsim_types::ProcessId;
//!
//! let processes = vec![ProcessId(1), ProcessId(3), ProcessId(5), ProcessId(7)];
//! let config = ScenarioConfig::default()
//!     .with_election(ElectionScenario::new(Algorithm::Bully, processes, ProcessId(3)));
//!
//! let report = Simulator::new(config).run().await?;
//! for line in report.lines() {
//!     println!("{}", line);
//! }
//! ```

pub mod config;
pub mod report;
pub mod runner;

pub use config::{
    Algorithm, ClockSyncScenario, ConfigError, ElectionScenario, ScenarioConfig, TokenRingScenario,
};
pub use report::{render_clock_sync, render_election, render_token_ring};
pub use runner::{ElectionRun, ScenarioReport, Simulator, SimulatorError};

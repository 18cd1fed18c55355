//! Scenario runner.

use crate::config::{
    Algorithm, ClockSyncScenario, ElectionScenario, ScenarioConfig, TokenRingScenario,
};
use crate::ConfigError;
use coordsim_clock_sync::{BerkeleySync, SyncOutcome};
use coordsim_core::{ElectionEngine, ElectionOutcome};
use coordsim_election::{BullyElection, RingElection};
use coordsim_token_ring::{TokenRingEngine, TokenRingError, TokenRingReport};
use coordsim_types::{MembershipError, ProcessId, RingTopology};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

/// Errors from running a scenario.
#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error(transparent)]
    Membership(#[from] MembershipError),

    #[error(transparent)]
    TokenRing(#[from] TokenRingError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Scenario has no part to run.
    #[error("scenario has nothing to run")]
    EmptyScenario,
}

/// One failover run: report, optionally fail, elect.
#[derive(Debug, Clone, Serialize)]
pub struct ElectionRun {
    pub algorithm: Algorithm,

    /// Membership before the failure, in engine order.
    pub members_before: Vec<ProcessId>,

    pub initial_coordinator: Option<ProcessId>,

    /// Coordinator removed before the election, if any.
    pub failed: Option<ProcessId>,

    /// Membership the election ran over.
    pub members_after: Vec<ProcessId>,

    pub outcome: ElectionOutcome,
}

/// Everything a scenario produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScenarioReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_ring: Option<TokenRingReport>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub election: Option<ElectionRun>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_sync: Option<SyncOutcome>,
}

/// Runs scenarios against the protocol engines.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    config: ScenarioConfig,
}

impl Simulator {
    /// Create a simulator for a scenario.
    pub fn new(config: ScenarioConfig) -> Self {
        Self { config }
    }

    /// Create a simulator from a scenario file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, SimulatorError> {
        Ok(Self::new(ScenarioConfig::load(path)?))
    }

    /// Run every part of the scenario: token ring, then election, then clocks.
    pub async fn run(&self) -> Result<ScenarioReport, SimulatorError> {
        if self.config.is_empty() {
            return Err(SimulatorError::EmptyScenario);
        }

        let mut report = ScenarioReport::default();
        if let Some(scenario) = &self.config.token_ring {
            report.token_ring = Some(Self::run_token_ring(scenario).await?);
        }
        if let Some(scenario) = &self.config.election {
            report.election = Some(Self::run_election(scenario)?);
        }
        if let Some(scenario) = &self.config.clock_sync {
            report.clock_sync = Some(Self::run_clock_sync(scenario)?);
        }
        Ok(report)
    }

    /// Run one token pass.
    pub async fn run_token_ring(
        scenario: &TokenRingScenario,
    ) -> Result<TokenRingReport, SimulatorError> {
        let topology = RingTopology::new(scenario.processes.iter().copied())?;
        let engine = TokenRingEngine::new(scenario.engine_config());

        let report = engine
            .start(&topology, &scenario.wants_entry(), scenario.initial_holder)
            .await?;

        info!(
            hand_offs = report.hand_offs,
            entered = report.entered.len(),
            "Token ring scenario finished"
        );
        Ok(report)
    }

    /// Run one failover with the configured algorithm.
    pub fn run_election(scenario: &ElectionScenario) -> Result<ElectionRun, SimulatorError> {
        let config = scenario.election_config();
        let ids = scenario.processes.iter().copied();
        let mut engine: Box<dyn ElectionEngine> = match scenario.algorithm {
            Algorithm::Bully => Box::new(BullyElection::with_config(ids, &config)?),
            Algorithm::Ring => Box::new(RingElection::with_config(ids, &config)?),
        };

        let members_before = engine.members();
        let initial_coordinator = engine.coordinator();

        let failed = if scenario.fail_coordinator {
            Some(engine.fail_coordinator()?)
        } else {
            None
        };

        let members_after = engine.members();
        if !engine.is_member(scenario.initiator) {
            warn!(
                initiator = %scenario.initiator,
                failed = ?failed,
                "Initiator is not a live member"
            );
        }
        let outcome = engine.start_election(scenario.initiator)?;

        info!(
            algorithm = engine.name(),
            coordinator = %outcome.coordinator,
            "Election scenario finished"
        );

        Ok(ElectionRun {
            algorithm: scenario.algorithm,
            members_before,
            initial_coordinator,
            failed,
            members_after,
            outcome,
        })
    }

    /// Run one Berkeley round.
    pub fn run_clock_sync(scenario: &ClockSyncScenario) -> Result<SyncOutcome, SimulatorError> {
        let mut sync = BerkeleySync::new(scenario.clocks.iter().copied(), scenario.master)?;
        let outcome = sync.synchronize();

        info!(
            master = %sync.master(),
            average = %outcome.average,
            "Clock sync scenario finished"
        );
        Ok(outcome)
    }
}

//! Scenario configuration for the simulator.
//!
//! A scenario file is TOML with up to three tables:
//!
//! ```toml
//! [token_ring]
//! processes = [0, 1, 2]
//! wants_critical_section = [1]
//! initial_holder = 0
//! critical_section = "1s"
//! pass_timeout = "30s"
//!
//! [election]
//! algorithm = "bully"
//! processes = [1, 3, 5, 7]
//! initiator = 3
//! bully_strategy = "cascade"
//!
//! [clock_sync]
//! master = 1
//! clocks = ["1=14:00", "2=13:46", "3=14:20"]
//! ```

use coordsim_clock_sync::NodeClock;
use coordsim_election::{BullyStrategy, ElectionConfig, RingOrder};
use coordsim_token_ring::TokenRingConfig;
use coordsim_types::ProcessId;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors loading a scenario file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Scenario file could not be read.
    #[error("failed to read scenario file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scenario file is not valid TOML for a scenario.
    #[error("invalid scenario: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A full scenario: any combination of a token ring pass, an election and a
/// clock synchronisation round.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Token ring pass to run.
    pub token_ring: Option<TokenRingScenario>,

    /// Election failover to run.
    pub election: Option<ElectionScenario>,

    /// Berkeley round to run.
    pub clock_sync: Option<ClockSyncScenario>,
}

impl ScenarioConfig {
    /// Parse a scenario from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a scenario from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Set the token ring part.
    pub fn with_token_ring(mut self, scenario: TokenRingScenario) -> Self {
        self.token_ring = Some(scenario);
        self
    }

    /// Set the election part.
    pub fn with_election(mut self, scenario: ElectionScenario) -> Self {
        self.election = Some(scenario);
        self
    }

    /// Set the clock synchronisation part.
    pub fn with_clock_sync(mut self, scenario: ClockSyncScenario) -> Self {
        self.clock_sync = Some(scenario);
        self
    }

    /// Check if the scenario has no part to run.
    pub fn is_empty(&self) -> bool {
        self.token_ring.is_none() && self.election.is_none() && self.clock_sync.is_none()
    }
}

/// One token ring pass.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenRingScenario {
    /// Ring order.
    pub processes: Vec<ProcessId>,

    /// Processes that want the critical section.
    #[serde(default)]
    pub wants_critical_section: Vec<ProcessId>,

    /// First token holder; defaults to the first process.
    #[serde(default)]
    pub initial_holder: Option<ProcessId>,

    /// Critical-section occupation time, e.g. `"1s"`, `"250ms"`.
    #[serde(default, deserialize_with = "humantime_opt")]
    pub critical_section: Option<Duration>,

    /// Abort the pass after this long.
    #[serde(default, deserialize_with = "humantime_opt")]
    pub pass_timeout: Option<Duration>,
}

impl TokenRingScenario {
    /// Create a scenario where nobody wants the critical section.
    pub fn new(processes: Vec<ProcessId>) -> Self {
        Self {
            processes,
            wants_critical_section: Vec::new(),
            initial_holder: None,
            critical_section: None,
            pass_timeout: None,
        }
    }

    /// Set which processes want the critical section.
    pub fn with_wants(mut self, wants: Vec<ProcessId>) -> Self {
        self.wants_critical_section = wants;
        self
    }

    /// Set the initial token holder.
    pub fn with_initial_holder(mut self, holder: ProcessId) -> Self {
        self.initial_holder = Some(holder);
        self
    }

    /// Set the critical-section occupation time.
    pub fn with_critical_section(mut self, duration: Duration) -> Self {
        self.critical_section = Some(duration);
        self
    }

    /// Set the pass timeout.
    pub fn with_pass_timeout(mut self, timeout: Duration) -> Self {
        self.pass_timeout = Some(timeout);
        self
    }

    /// Engine configuration for this scenario.
    pub fn engine_config(&self) -> TokenRingConfig {
        let mut config = TokenRingConfig::default();
        if let Some(critical_section) = self.critical_section {
            config = config.with_critical_section(critical_section);
        }
        if let Some(timeout) = self.pass_timeout {
            config = config.with_pass_timeout(timeout);
        }
        config
    }

    /// Interest map for the engine.
    pub fn wants_entry(&self) -> HashMap<ProcessId, bool> {
        self.wants_critical_section
            .iter()
            .map(|&id| (id, true))
            .collect()
    }
}

/// Election algorithm selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    Bully,
    Ring,
}

/// One coordinator failover: report, fail, elect.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElectionScenario {
    /// Which election algorithm to run.
    pub algorithm: Algorithm,

    /// Membership.
    pub processes: Vec<ProcessId>,

    /// Process that starts the election.
    pub initiator: ProcessId,

    /// Fail the initial coordinator before electing (the classic failover run).
    #[serde(default = "default_fail_coordinator")]
    pub fail_coordinator: bool,

    #[serde(default)]
    pub bully_strategy: BullyStrategy,

    #[serde(default)]
    pub ring_order: RingOrder,
}

fn default_fail_coordinator() -> bool {
    true
}

impl ElectionScenario {
    /// Create a failover scenario with default engine settings.
    pub fn new(algorithm: Algorithm, processes: Vec<ProcessId>, initiator: ProcessId) -> Self {
        Self {
            algorithm,
            processes,
            initiator,
            fail_coordinator: true,
            bully_strategy: BullyStrategy::default(),
            ring_order: RingOrder::default(),
        }
    }

    /// Elect without failing the coordinator first.
    pub fn without_failure(mut self) -> Self {
        self.fail_coordinator = false;
        self
    }

    /// Apply engine settings.
    pub fn with_config(mut self, config: &ElectionConfig) -> Self {
        self.bully_strategy = config.bully_strategy;
        self.ring_order = config.ring_order;
        self
    }

    /// Engine configuration for this scenario.
    pub fn election_config(&self) -> ElectionConfig {
        ElectionConfig::default()
            .with_bully_strategy(self.bully_strategy)
            .with_ring_order(self.ring_order)
    }
}

/// One Berkeley synchronisation round.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClockSyncScenario {
    /// Node that polls the others and sends corrections.
    pub master: ProcessId,

    /// Node clocks as `"ID=HH:MM"` or `"ID=HH:MM:SS"`.
    #[serde(deserialize_with = "node_clocks")]
    pub clocks: Vec<NodeClock>,
}

impl ClockSyncScenario {
    pub fn new(master: ProcessId, clocks: Vec<NodeClock>) -> Self {
        Self { master, clocks }
    }
}

fn node_clocks<'de, D>(deserializer: D) -> Result<Vec<NodeClock>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<String> = Vec::deserialize(deserializer)?;
    raw.iter()
        .map(|entry| entry.parse().map_err(serde::de::Error::custom))
        .collect()
}

fn humantime_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|text| humantime::parse_duration(&text).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_scenario() {
        let config = ScenarioConfig::from_toml_str(
            r#"
            [token_ring]
            processes = [0, 1, 2]
            wants_critical_section = [1]
            critical_section = "250ms"

            [election]
            algorithm = "ring"
            processes = [2, 4, 6, 8]
            initiator = 4
            ring_order = "as-given"
            "#,
        )
        .unwrap();

        let token_ring = config.token_ring.unwrap();
        assert_eq!(token_ring.processes.len(), 3);
        assert_eq!(token_ring.critical_section, Some(Duration::from_millis(250)));
        assert_eq!(token_ring.pass_timeout, None);
        assert_eq!(token_ring.wants_entry().get(&ProcessId(1)), Some(&true));
        assert_eq!(
            token_ring.engine_config().critical_section,
            Duration::from_millis(250)
        );

        let election = config.election.unwrap();
        assert_eq!(election.algorithm, Algorithm::Ring);
        assert!(election.fail_coordinator);
        assert_eq!(election.election_config().ring_order, RingOrder::AsGiven);
        assert_eq!(
            election.election_config().bully_strategy,
            BullyStrategy::Collapsed
        );
    }

    #[test]
    fn test_parse_clock_sync() {
        let config = ScenarioConfig::from_toml_str(
            r#"
            [clock_sync]
            master = 2
            clocks = ["1=09:00", "2=09:10:30"]
            "#,
        )
        .unwrap();
        assert!(!config.is_empty());

        let clock_sync = config.clock_sync.unwrap();
        assert_eq!(clock_sync.master, ProcessId(2));
        assert_eq!(clock_sync.clocks[1].id, ProcessId(2));
        assert_eq!(clock_sync.clocks[1].time.to_string(), "09:10:30");
    }

    #[test]
    fn test_bad_clock_rejected() {
        let result = ScenarioConfig::from_toml_str(
            r#"
            [clock_sync]
            master = 1
            clocks = ["1=25h"]
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_bad_duration_rejected() {
        let result = ScenarioConfig::from_toml_str(
            r#"
            [token_ring]
            processes = [0]
            critical_section = "soon"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = ScenarioConfig::from_toml_str(
            r#"
            [election]
            algorithm = "bully"
            processes = [1]
            initiator = 1
            leader = 1
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = ScenarioConfig::load("/nonexistent/coordsim.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}

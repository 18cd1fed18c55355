//! End-to-end scenario runs through the simulator.

use coordsim_clock_sync::{ClockOffset, NodeClock};
use coordsim_election::{BullyStrategy, RingOrder};
use coordsim_simulator::{
    Algorithm, ClockSyncScenario, ElectionScenario, ScenarioConfig, Simulator, SimulatorError,
    TokenRingScenario,
};
use coordsim_test_helpers::ids;
use coordsim_token_ring::TokenRingError;
use coordsim_types::{MembershipError, MessageKind, ProcessId};
use std::time::Duration;

fn node_clocks(raw: &[&str]) -> Vec<NodeClock> {
    raw.iter().map(|entry| entry.parse().unwrap()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_token_ring_three_processes() {
    let scenario = TokenRingScenario::new(ids(&[0, 1, 2])).with_wants(ids(&[1]));
    let simulator = Simulator::new(ScenarioConfig::default().with_token_ring(scenario));

    let report = simulator.run().await.unwrap();
    assert!(report.election.is_none());

    let token_ring = report.token_ring.as_ref().unwrap();
    assert!(token_ring.completed_full_pass());
    assert_eq!(token_ring.entered, ids(&[1]));
    assert_eq!(token_ring.peak_occupancy, 1);

    assert_eq!(
        report.lines(),
        vec![
            "Process(0) has the token.",
            "Process(0) does not want to enter the critical section.",
            "Process(0) passes the token to Process(1).",
            "Process(1) has the token.",
            "Process(1) is entering the critical section.",
            "Process(1) is leaving the critical section.",
            "Process(1) passes the token to Process(2).",
            "Process(2) has the token.",
            "Process(2) does not want to enter the critical section.",
            "Process(2) passes the token to Process(0).",
            "Token completed a full pass over 3 processes (3 hand-offs).",
        ]
    );
}

#[tokio::test]
async fn test_bully_failover_lines() {
    let scenario = ElectionScenario::new(Algorithm::Bully, ids(&[1, 3, 5, 7]), ProcessId(3));
    let report = Simulator::new(ScenarioConfig::default().with_election(scenario))
        .run()
        .await
        .unwrap();

    let run = report.election.as_ref().unwrap();
    assert_eq!(run.initial_coordinator, Some(ProcessId(7)));
    assert_eq!(run.failed, Some(ProcessId(7)));
    assert_eq!(run.members_after, ids(&[1, 3, 5]));
    assert_eq!(run.outcome.coordinator, ProcessId(5));

    assert_eq!(
        report.lines(),
        vec![
            "Processes: [1, 3, 5, 7]",
            "Current coordinator: Process(7)",
            "Process(7) has failed.",
            "No coordinator currently.",
            "Process(3) starts an election.",
            "Election message sent from Process(3) to Process(5)",
            "Process(5) responds to Process(3)",
            "Process(5) becomes the new coordinator.",
            "Current coordinator: Process(5)",
        ]
    );
}

#[tokio::test]
async fn test_ring_failover_collects_active_list() {
    let scenario = ElectionScenario::new(Algorithm::Ring, ids(&[8, 2, 6, 4]), ProcessId(4));
    let run = Simulator::run_election(&scenario).unwrap();

    assert_eq!(run.members_before, ids(&[2, 4, 6, 8]));
    assert_eq!(run.outcome.active_list, Some(ids(&[6, 2, 4])));
    assert_eq!(run.outcome.coordinator, ProcessId(6));

    let lines = coordsim_simulator::render_election(&run);
    assert!(lines.contains(&"Active list: [6, 2, 4]".to_string()));
    assert_eq!(
        lines.last().map(String::as_str),
        Some("Current coordinator: Process(6)")
    );
}

#[test]
fn test_election_without_failure_keeps_membership() {
    let scenario =
        ElectionScenario::new(Algorithm::Bully, ids(&[2, 4, 9]), ProcessId(2)).without_failure();
    let run = Simulator::run_election(&scenario).unwrap();

    assert_eq!(run.failed, None);
    assert_eq!(run.members_after, run.members_before);
    assert_eq!(run.outcome.coordinator, ProcessId(9));
}

#[test]
fn test_failed_initiator_is_rejected() {
    let scenario = ElectionScenario::new(Algorithm::Ring, ids(&[1, 2, 3]), ProcessId(3));
    let err = Simulator::run_election(&scenario).unwrap_err();

    assert!(matches!(
        err,
        SimulatorError::Membership(MembershipError::UnknownProcess(ProcessId(3)))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_toml_scenario_runs_both_parts() {
    let config = ScenarioConfig::from_toml_str(
        r#"
        [token_ring]
        processes = [4, 5, 6, 7]
        wants_critical_section = [4, 6]
        initial_holder = 6
        critical_section = "2s"

        [election]
        algorithm = "bully"
        processes = [1, 2, 3, 4, 5]
        initiator = 1
        bully_strategy = "cascade"
        "#,
    )
    .unwrap();
    let election = config.election.as_ref().unwrap();
    assert_eq!(election.bully_strategy, BullyStrategy::Cascade);
    assert_eq!(election.ring_order, RingOrder::Sorted);

    let report = Simulator::new(config).run().await.unwrap();

    let token_ring = report.token_ring.unwrap();
    assert_eq!(token_ring.initial_holder, ProcessId(6));
    assert_eq!(token_ring.visit_order(), ids(&[6, 7, 4, 5]));
    assert_eq!(token_ring.entered, ids(&[6, 4]));

    let run = report.election.unwrap();
    assert_eq!(run.outcome.coordinator, ProcessId(4));
    assert_eq!(
        run.outcome.trace.pairs(MessageKind::Coordinator),
        vec![
            (ProcessId(4), ProcessId(1)),
            (ProcessId(4), ProcessId(2)),
            (ProcessId(4), ProcessId(3)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_slow_critical_section_times_out() {
    let scenario = TokenRingScenario::new(ids(&[0, 1]))
        .with_wants(ids(&[0]))
        .with_critical_section(Duration::from_secs(10))
        .with_pass_timeout(Duration::from_secs(1));

    let err = Simulator::run_token_ring(&scenario).await.unwrap_err();
    assert!(matches!(
        err,
        SimulatorError::TokenRing(TokenRingError::TimedOut(limit)) if limit == Duration::from_secs(1)
    ));
}

#[tokio::test]
async fn test_unknown_holder_is_rejected() {
    let scenario = TokenRingScenario::new(ids(&[0, 1, 2])).with_initial_holder(ProcessId(9));

    let err = Simulator::run_token_ring(&scenario).await.unwrap_err();
    assert!(matches!(
        err,
        SimulatorError::TokenRing(TokenRingError::Membership(
            MembershipError::UnknownProcess(ProcessId(9))
        ))
    ));
}

#[tokio::test]
async fn test_duplicate_processes_are_rejected() {
    let scenario = TokenRingScenario::new(ids(&[0, 1, 1]));

    let err = Simulator::run_token_ring(&scenario).await.unwrap_err();
    assert!(matches!(
        err,
        SimulatorError::Membership(MembershipError::DuplicateProcess(ProcessId(1)))
    ));
}

#[tokio::test]
async fn test_empty_scenario_is_rejected() {
    let err = Simulator::new(ScenarioConfig::default())
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, SimulatorError::EmptyScenario));
}

#[test]
fn test_missing_scenario_file() {
    let err = Simulator::from_file("/nonexistent/scenario.toml").unwrap_err();
    assert!(matches!(err, SimulatorError::Config(_)));
}

#[tokio::test(start_paused = true)]
async fn test_single_process_summary_is_singular() {
    let scenario = TokenRingScenario::new(ids(&[7])).with_wants(ids(&[7]));
    let report = Simulator::new(ScenarioConfig::default().with_token_ring(scenario))
        .run()
        .await
        .unwrap();

    assert_eq!(
        report.lines().last().map(String::as_str),
        Some("Token completed a full pass over 1 process (1 hand-off).")
    );
}

#[tokio::test]
async fn test_berkeley_round_lines() {
    let scenario = ClockSyncScenario::new(
        ProcessId(1),
        node_clocks(&["1=14:00", "2=13:46", "3=14:20"]),
    );
    let report = Simulator::new(ScenarioConfig::default().with_clock_sync(scenario))
        .run()
        .await
        .unwrap();

    let outcome = report.clock_sync.as_ref().unwrap();
    assert_eq!(outcome.average.to_string(), "14:02");
    assert_eq!(outcome.offset_of(ProcessId(2)), Some(ClockOffset(16 * 60)));

    assert_eq!(
        report.lines(),
        vec![
            "Original clock times:",
            "Process(1): 14:00",
            "Process(2): 13:46",
            "Process(3): 14:20",
            "Process(1) requests the time from Process(2)",
            "Process(2) reports 13:46 to Process(1)",
            "Process(1) requests the time from Process(3)",
            "Process(3) reports 14:20 to Process(1)",
            "Process(1) tells Process(2) to adjust by +16m",
            "Process(1) tells Process(3) to adjust by -18m",
            "Master Process(1) computes the average time 14:02.",
            "Corrections:",
            "Process(1): +2m",
            "Process(2): +16m",
            "Process(3): -18m",
            "Synchronised clock times:",
            "Process(1): 14:02",
            "Process(2): 14:02",
            "Process(3): 14:02",
        ]
    );
}

#[tokio::test]
async fn test_toml_clock_sync_scenario() {
    let config = ScenarioConfig::from_toml_str(
        r#"
        [clock_sync]
        master = 3
        clocks = ["1=10:00", "2=10:10", "3=10:20"]
        "#,
    )
    .unwrap();

    let report = Simulator::new(config).run().await.unwrap();
    assert!(report.token_ring.is_none() && report.election.is_none());

    let outcome = report.clock_sync.unwrap();
    assert_eq!(outcome.master, ProcessId(3));
    assert_eq!(outcome.average.to_string(), "10:10");
    assert_eq!(outcome.offset_of(ProcessId(3)), Some(ClockOffset(-600)));
}

#[test]
fn test_berkeley_rejects_unknown_master_and_empty_group() {
    let unknown = ClockSyncScenario::new(ProcessId(9), node_clocks(&["1=10:00"]));
    assert!(matches!(
        Simulator::run_clock_sync(&unknown),
        Err(SimulatorError::Membership(MembershipError::UnknownProcess(ProcessId(9))))
    ));

    let empty = ClockSyncScenario::new(ProcessId(1), Vec::new());
    assert!(matches!(
        Simulator::run_clock_sync(&empty),
        Err(SimulatorError::Membership(MembershipError::EmptyMembership))
    ));
}

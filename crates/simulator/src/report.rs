//! Console rendering of scenario results.

use crate::runner::{ElectionRun, ScenarioReport};
use coordsim_clock_sync::SyncOutcome;
use coordsim_core::describe_coordinator;
use coordsim_token_ring::TokenRingReport;
use coordsim_types::ProcessId;

fn id_list(ids: &[ProcessId]) -> String {
    let parts: Vec<String> = ids.iter().map(|id| id.as_u64().to_string()).collect();
    format!("[{}]", parts.join(", "))
}

fn count(n: usize, singular: &str, plural: &str) -> String {
    format!("{} {}", n, if n == 1 { singular } else { plural })
}

/// Trace lines for a token pass, ending with a completion summary.
pub fn render_token_ring(report: &TokenRingReport) -> Vec<String> {
    let mut lines: Vec<String> = report.events.iter().map(ToString::to_string).collect();

    let hand_offs = count(report.hand_offs, "hand-off", "hand-offs");
    if report.completed_full_pass() {
        lines.push(format!(
            "Token completed a full pass over {} ({}).",
            count(report.ring_size, "process", "processes"),
            hand_offs
        ));
    } else {
        lines.push(format!(
            "Token pass incomplete: {} of {} expected.",
            hand_offs, report.ring_size
        ));
    }
    lines
}

/// Trace lines for a failover run.
pub fn render_election(run: &ElectionRun) -> Vec<String> {
    let mut lines = vec![
        format!("Processes: {}", id_list(&run.members_before)),
        describe_coordinator(run.initial_coordinator),
    ];

    if let Some(failed) = run.failed {
        lines.push(format!("{} has failed.", failed));
        lines.push(describe_coordinator(None));
    }

    lines.push(format!("{} starts an election.", run.outcome.initiator));
    lines.extend(run.outcome.trace.iter().map(ToString::to_string));

    if let Some(active_list) = &run.outcome.active_list {
        lines.push(format!("Active list: {}", id_list(active_list)));
    }
    lines.push(format!(
        "{} becomes the new coordinator.",
        run.outcome.coordinator
    ));
    lines.push(describe_coordinator(Some(run.outcome.coordinator)));
    lines
}

/// Trace lines for a Berkeley round: readings, messages, corrections.
pub fn render_clock_sync(outcome: &SyncOutcome) -> Vec<String> {
    let mut lines = vec!["Original clock times:".to_string()];
    lines.extend(
        outcome
            .adjustments
            .iter()
            .map(|a| format!("{}: {}", a.node, a.before)),
    );

    lines.extend(outcome.trace.iter().map(ToString::to_string));
    lines.push(format!(
        "Master {} computes the average time {}.",
        outcome.master, outcome.average
    ));

    lines.push("Corrections:".to_string());
    lines.extend(
        outcome
            .adjustments
            .iter()
            .map(|a| format!("{}: {}", a.node, a.offset)),
    );

    lines.push("Synchronised clock times:".to_string());
    lines.extend(
        outcome
            .adjustments
            .iter()
            .map(|a| format!("{}: {}", a.node, a.after)),
    );
    lines
}

impl ScenarioReport {
    /// All console lines: token ring, then election, then clocks.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(token_ring) = &self.token_ring {
            lines.extend(render_token_ring(token_ring));
        }
        if let Some(election) = &self.election {
            lines.extend(render_election(election));
        }
        if let Some(clock_sync) = &self.clock_sync {
            lines.extend(render_clock_sync(clock_sync));
        }
        lines
    }
}

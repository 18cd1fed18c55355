//! Coordsim CLI
//!
//! Runs token ring passes, coordinator elections and clock synchronisation
//! rounds, and prints their traces.

use anyhow::Context;
use clap::{Parser, Subcommand};
use coordsim_clock_sync::NodeClock;
use coordsim_core::{CalculatorRequest, LocalCalculator, LocalSorter, RemoteService};
use coordsim_election::ElectionConfig;
use coordsim_simulator::{
    Algorithm, ClockSyncScenario, ElectionScenario, ScenarioConfig, ScenarioReport, Simulator,
    TokenRingScenario,
};
use coordsim_types::ProcessId;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coordsim")]
#[command(about = "Distributed coordination protocol simulator")]
#[command(version)]
struct Cli {
    /// Print results as JSON instead of trace lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pass the token once around a ring
    TokenRing {
        /// Ring order (comma-separated IDs)
        #[arg(long, value_delimiter = ',', required = true)]
        processes: Vec<ProcessId>,

        /// Processes that want the critical section
        #[arg(long, value_delimiter = ',')]
        wants: Vec<ProcessId>,

        /// Initial token holder (defaults to the first process)
        #[arg(long)]
        holder: Option<ProcessId>,

        /// Time spent inside the critical section (e.g., "1s", "250ms")
        #[arg(long, default_value = "1s")]
        critical_section: humantime::Duration,

        /// Abandon the pass after this long
        #[arg(long)]
        timeout: Option<humantime::Duration>,
    },

    /// Fail the coordinator and run a Bully election
    Bully {
        /// Membership (comma-separated IDs)
        #[arg(long, value_delimiter = ',', required = true)]
        processes: Vec<ProcessId>,

        /// Process that starts the election
        #[arg(long)]
        initiator: ProcessId,

        /// Let every answering process hold its own election
        #[arg(long)]
        cascade: bool,
    },

    /// Fail the coordinator and run a Ring election
    Ring {
        /// Membership (comma-separated IDs)
        #[arg(long, value_delimiter = ',', required = true)]
        processes: Vec<ProcessId>,

        /// Process that starts the election
        #[arg(long)]
        initiator: ProcessId,

        /// Traverse in the given order instead of sorting
        #[arg(long)]
        keep_order: bool,
    },

    /// Synchronise node clocks with the Berkeley algorithm
    Berkeley {
        /// Node that polls the others and sends corrections
        #[arg(long)]
        master: ProcessId,

        /// Node clocks as ID=HH:MM (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        clocks: Vec<NodeClock>,
    },

    /// Run a TOML scenario file
    Scenario {
        #[arg(long)]
        file: std::path::PathBuf,
    },

    /// Submit a request to the calculator service
    Calc {
        /// add, sub, mul or div
        op: String,
        #[arg(allow_negative_numbers = true)]
        a: f64,
        #[arg(allow_negative_numbers = true)]
        b: f64,
    },

    /// Submit a list to the sorting service
    Sort {
        #[arg(allow_negative_numbers = true, required = true)]
        values: Vec<i64>,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_report(report: &ScenarioReport, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(report);
    }
    for line in report.lines() {
        println!("{}", line);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so the trace on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::TokenRing {
            processes,
            wants,
            holder,
            critical_section,
            timeout,
        } => {
            let mut scenario = TokenRingScenario::new(processes)
                .with_wants(wants)
                .with_critical_section(*critical_section);
            if let Some(holder) = holder {
                scenario = scenario.with_initial_holder(holder);
            }
            if let Some(timeout) = timeout {
                scenario = scenario.with_pass_timeout(*timeout);
            }

            let simulator = Simulator::new(ScenarioConfig::default().with_token_ring(scenario));
            let report = simulator.run().await.context("token ring pass failed")?;
            print_report(&report, cli.json)?;
        }

        Commands::Bully {
            processes,
            initiator,
            cascade,
        } => {
            let mut config = ElectionConfig::default();
            if cascade {
                config = config.with_cascade();
            }
            let scenario =
                ElectionScenario::new(Algorithm::Bully, processes, initiator).with_config(&config);

            let simulator = Simulator::new(ScenarioConfig::default().with_election(scenario));
            let report = simulator.run().await.context("bully election failed")?;
            print_report(&report, cli.json)?;
        }

        Commands::Ring {
            processes,
            initiator,
            keep_order,
        } => {
            let mut config = ElectionConfig::default();
            if keep_order {
                config = config.with_given_order();
            }
            let scenario =
                ElectionScenario::new(Algorithm::Ring, processes, initiator).with_config(&config);

            let simulator = Simulator::new(ScenarioConfig::default().with_election(scenario));
            let report = simulator.run().await.context("ring election failed")?;
            print_report(&report, cli.json)?;
        }

        Commands::Berkeley { master, clocks } => {
            let scenario = ClockSyncScenario::new(master, clocks);

            let simulator = Simulator::new(ScenarioConfig::default().with_clock_sync(scenario));
            let report = simulator.run().await.context("clock synchronisation failed")?;
            print_report(&report, cli.json)?;
        }

        Commands::Scenario { file } => {
            let simulator = Simulator::from_file(&file)
                .with_context(|| format!("loading {}", file.display()))?;
            let report = simulator.run().await.context("scenario failed")?;
            print_report(&report, cli.json)?;
        }

        Commands::Calc { op, a, b } => {
            let request = CalculatorRequest::parse(&op, a, b)
                .with_context(|| format!("unknown operation: {}", op))?;
            let result = LocalCalculator.submit(request)?;
            if cli.json {
                print_json(&serde_json::json!({
                    "request": request.to_string(),
                    "result": result,
                }))?;
            } else {
                println!("{} = {}", request, result);
            }
        }

        Commands::Sort { values } => {
            let sorted = LocalSorter.submit(values)?;
            if cli.json {
                print_json(&sorted)?;
            } else {
                println!("{:?}", sorted);
            }
        }
    }

    Ok(())
}

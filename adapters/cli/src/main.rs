#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Skirmish battle to completion.

mod decision;
mod scenario;
mod terminal;

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use skirmish_battle::{BattleConfig, Battlefield};
use skirmish_rendering::{BattleReport, BattlefieldScene, HistoryChart, RenderingBackend};
use skirmish_system_movement::{MovementPolicy, RandomWalk, Stationary, TeamPolicies};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{scenario::ScenarioFile, terminal::TerminalBackend};

/// Movement policies selectable for team A.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PolicyChoice {
    /// Soldiers hold their position.
    Stationary,
    /// Soldiers wander one cell per axis.
    RandomWalk,
    /// Soldiers follow an external decision program.
    Exec,
}

/// Runs a turn-based battle between two teams on a grid.
#[derive(Debug, Parser)]
#[command(name = "skirmish", version, about)]
struct Args {
    /// Scenario file describing the grid and both teams (defaults to the built-in demo).
    #[arg(long, value_name = "FILE")]
    scenario: Option<PathBuf>,

    /// Overrides the scenario grid width.
    #[arg(long, allow_negative_numbers = true)]
    width: Option<i64>,

    /// Overrides the scenario grid height.
    #[arg(long, allow_negative_numbers = true)]
    height: Option<i64>,

    /// Overrides the scenario random seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Overrides the scenario turn budget.
    #[arg(long)]
    max_turns: Option<u64>,

    /// Movement policy for team A. Team B always walks randomly.
    ///
    /// With the default `stationary` policy team A holds its ground and only
    /// fights what wanders into range. Pass `exec` with `--decision-command`
    /// to steer team A from an external program.
    #[arg(long, value_enum, default_value_t = PolicyChoice::Stationary)]
    team_a_policy: PolicyChoice,

    /// Program consulted by the `exec` policy, called as `<program> <x> <y>`.
    #[arg(long, value_name = "PROGRAM")]
    decision_command: Option<PathBuf>,

    /// Writes a JSON battle report to this path.
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Skips the terminal rendering of the final battlefield and history.
    #[arg(long)]
    no_render: bool,

    /// Log filter directive, overriding `RUST_LOG`.
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

/// Entry point for the Skirmish command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref())?;
    run(&args)
}

fn init_tracing(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log filter `{directive}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| anyhow!("failed to install tracing subscriber: {error}"))
}

fn run(args: &Args) -> Result<()> {
    let mut file = match &args.scenario {
        Some(path) => ScenarioFile::load(path)?,
        None => ScenarioFile::demo(),
    };
    if let Some(width) = args.width {
        file.width = width;
    }
    if let Some(height) = args.height {
        file.height = height;
    }
    if let Some(seed) = args.seed {
        file.seed = seed;
    }
    if let Some(max_turns) = args.max_turns {
        file.max_turns = max_turns;
    }
    let scenario = file.validate().context("invalid scenario")?;

    let policies = TeamPolicies::against_random_walk(team_a_policy(args)?);
    let config = BattleConfig::new(scenario.grid, scenario.seed);
    let mut battlefield = Battlefield::new(config, policies);
    for deployment in &scenario.teams {
        let _ = battlefield.deploy(deployment);
    }

    let outcome = battlefield.run(scenario.max_turns).context("battle aborted")?;

    if !args.no_render {
        let stdout = io::stdout();
        let mut backend = TerminalBackend::new(stdout.lock());
        backend.render_battlefield(&BattlefieldScene::new(
            battlefield.turn(),
            battlefield.grid(),
            &battlefield.soldiers(),
        ))?;
        backend.render_history(&HistoryChart::new(battlefield.history()))?;
    }

    match outcome.winner {
        Some(team) => println!("Team {team} wins after {} turns", outcome.turns),
        None if outcome.reached_turn_limit => {
            println!("No winner after {} turns (turn limit)", outcome.turns)
        }
        None => println!("No winner after {} turns", outcome.turns),
    }

    if let Some(path) = &args.report {
        let report = BattleReport::new(
            battlefield.grid(),
            battlefield.turn(),
            &battlefield.soldiers(),
            battlefield.history(),
        );
        write_report(path, &report)?;
        info!(path = %path.display(), "battle report written");
    }
    Ok(())
}

fn team_a_policy(args: &Args) -> Result<Box<dyn MovementPolicy>> {
    Ok(match args.team_a_policy {
        PolicyChoice::Stationary => Box::new(Stationary),
        PolicyChoice::RandomWalk => Box::new(RandomWalk),
        PolicyChoice::Exec => {
            let Some(program) = args.decision_command.clone() else {
                bail!("--team-a-policy exec requires --decision-command");
            };
            decision::process_decision(program)
        }
    })
}

fn write_report(path: &Path, report: &BattleReport) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create report at {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .with_context(|| format!("failed to serialize report to {}", path.display()))?;
    writeln!(writer).context("failed to finish report")?;
    writer.flush().context("failed to flush report")
}

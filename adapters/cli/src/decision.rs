//! Decision capability backed by an external program.
//!
//! The program is run once per soldier per turn with the soldier's current
//! position as two arguments and must print the absolute target as two
//! numbers on stdout.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{bail, Context, Result};
use skirmish_core::{BoxError, GridPoint};
use skirmish_system_movement::{ExternalDecision, MovementPolicy};

/// Builds a movement policy that shells out to `program` for every decision.
pub(crate) fn process_decision(program: PathBuf) -> Box<dyn MovementPolicy> {
    Box::new(ExternalDecision::new(move |current: GridPoint| {
        ask(&program, current).map_err(BoxError::from)
    }))
}

fn ask(program: &Path, current: GridPoint) -> Result<(f64, f64)> {
    let output = Command::new(program)
        .arg(current.x().to_string())
        .arg(current.y().to_string())
        .output()
        .with_context(|| format!("failed to run decision program {}", program.display()))?;

    if !output.status.success() {
        bail!(
            "decision program {} exited with {} for position {current}",
            program.display(),
            output.status
        );
    }

    let stdout = String::from_utf8(output.stdout).context("decision output is not utf-8")?;
    parse_target(&stdout)
}

/// Parses two numbers separated by whitespace or a comma.
pub(crate) fn parse_target(output: &str) -> Result<(f64, f64)> {
    let mut values = output
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty());

    let mut next = |axis: &str| -> Result<f64> {
        let token = values
            .next()
            .with_context(|| format!("decision output is missing the {axis} coordinate"))?;
        token
            .parse::<f64>()
            .with_context(|| format!("invalid {axis} coordinate `{token}`"))
    };
    let x = next("x")?;
    let y = next("y")?;

    if let Some(extra) = values.next() {
        bail!("unexpected trailing decision output `{extra}`");
    }
    Ok((x, y))
}

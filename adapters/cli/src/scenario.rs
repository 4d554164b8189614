//! Scenario files describing the grid, the seed and both team compositions.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use skirmish_core::{
    Composition, ConfigError, DeploymentRange, GridSize, Team, UnitKind, UnitProfile,
};
use skirmish_system_deployment::TeamDeployment;

/// Scenario exactly as written on disk, before validation.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScenarioFile {
    pub(crate) width: i64,
    pub(crate) height: i64,
    pub(crate) seed: u64,
    pub(crate) max_turns: u64,
    #[serde(default)]
    pub(crate) teams: Vec<TeamEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TeamEntry {
    team: String,
    x_range: [i32; 2],
    #[serde(default)]
    units: Vec<UnitEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct UnitEntry {
    kind: String,
    count: i64,
    strength: i64,
    range: i64,
}

/// Validated scenario ready to seed a battlefield.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Scenario {
    pub(crate) grid: GridSize,
    pub(crate) seed: u64,
    pub(crate) max_turns: u64,
    pub(crate) teams: Vec<TeamDeployment>,
}

impl ScenarioFile {
    /// Reads and parses a scenario file without validating its values.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse scenario at {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("scenario is not valid toml")
    }

    /// Small two-team skirmish on a 4x4 grid.
    pub(crate) fn demo() -> Self {
        let units = |soldiers: i64| {
            vec![
                UnitEntry {
                    kind: "soldier".to_owned(),
                    count: soldiers,
                    strength: 10,
                    range: 1,
                },
                UnitEntry {
                    kind: "knight".to_owned(),
                    count: 1,
                    strength: 15,
                    range: 1,
                },
                UnitEntry {
                    kind: "archer".to_owned(),
                    count: 1,
                    strength: 6,
                    range: 3,
                },
            ]
        };

        Self {
            width: 4,
            height: 4,
            seed: 42,
            max_turns: 100,
            teams: vec![
                TeamEntry {
                    team: "A".to_owned(),
                    x_range: [0, 1],
                    units: units(2),
                },
                TeamEntry {
                    team: "B".to_owned(),
                    x_range: [2, 3],
                    units: units(2),
                },
            ],
        }
    }

    /// Checks every value and converts the file into a scenario.
    pub(crate) fn validate(&self) -> Result<Scenario, ConfigError> {
        let grid = GridSize::try_new(self.width, self.height)?;
        let teams = self
            .teams
            .iter()
            .map(TeamEntry::validate)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Scenario {
            grid,
            seed: self.seed,
            max_turns: self.max_turns,
            teams,
        })
    }
}

impl TeamEntry {
    fn validate(&self) -> Result<TeamDeployment, ConfigError> {
        let team: Team = self.team.parse()?;
        let range = DeploymentRange::try_new(self.x_range[0], self.x_range[1])?;
        let mut composition = Composition::new();
        for unit in &self.units {
            let kind: UnitKind = unit.kind.parse()?;
            let profile = UnitProfile::try_new(kind, unit.count, unit.strength, unit.range)?;
            composition.insert(kind, profile);
        }

        Ok(TeamDeployment {
            team,
            composition,
            range,
        })
    }
}

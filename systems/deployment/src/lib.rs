#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deployment system responsible for emitting soldier deploy commands.

use rand::{Rng, RngCore};
use skirmish_core::{Command, Composition, DeploymentRange, GridPoint, GridSize, SoldierSpec, Team};

/// Where and how a team enters the battlefield.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeamDeployment {
    /// Team receiving the soldiers.
    pub team: Team,
    /// Unit kinds and their profiles, deployed in insertion order.
    pub composition: Composition,
    /// Inclusive x range the soldiers are scattered across.
    pub range: DeploymentRange,
}

/// Pure system that scatters a team's composition across its deployment range.
#[derive(Debug, Default)]
pub struct Deployment {
    scratch: Vec<Command>,
}

impl Deployment {
    /// Creates a new deployment system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits one `Command::DeploySoldier` per soldier described by the request.
    ///
    /// Each soldier draws its x coordinate uniformly from the deployment range
    /// and then its y coordinate uniformly from the full grid height. The x
    /// range is not clamped to the grid.
    pub fn handle(
        &mut self,
        request: &TeamDeployment,
        grid: GridSize,
        rng: &mut dyn RngCore,
        out: &mut Vec<Command>,
    ) {
        self.scratch.clear();

        for (kind, profile) in request.composition.iter() {
            for _ in 0..profile.count {
                let x = rng.gen_range(request.range.min_x()..=request.range.max_x());
                let y = rng.gen_range(0..=grid.max_y());
                self.scratch.push(Command::DeploySoldier {
                    spec: SoldierSpec {
                        position: GridPoint::new(x, y),
                        strength: profile.strength,
                        kind,
                        team: request.team,
                        engagement_range: profile.engagement_range,
                    },
                });
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

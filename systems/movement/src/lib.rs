#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement system that asks each team's policy for soldier targets.

mod policy;

pub use policy::{coordinate, ExternalDecision, MovementPolicy, RandomWalk, Stationary};

use rand::RngCore;
use skirmish_core::{BattleError, Command, SoldierView, Team};

/// Movement policy assigned to each team.
#[derive(Debug)]
pub struct TeamPolicies {
    team_a: Box<dyn MovementPolicy>,
    team_b: Box<dyn MovementPolicy>,
}

impl TeamPolicies {
    /// Assigns an explicit policy to each team.
    #[must_use]
    pub fn new(team_a: Box<dyn MovementPolicy>, team_b: Box<dyn MovementPolicy>) -> Self {
        Self { team_a, team_b }
    }

    /// Steers team A with the provided decision policy and team B with a random walk.
    #[must_use]
    pub fn against_random_walk(team_a: Box<dyn MovementPolicy>) -> Self {
        Self::new(team_a, Box::new(RandomWalk))
    }

    /// Policy responsible for the provided team.
    #[must_use]
    pub fn for_team(&self, team: Team) -> &dyn MovementPolicy {
        match team {
            Team::A => self.team_a.as_ref(),
            Team::B => self.team_b.as_ref(),
        }
    }
}

impl Default for TeamPolicies {
    fn default() -> Self {
        Self::against_random_walk(Box::new(Stationary))
    }
}

/// Pure system that turns policy proposals into move commands.
#[derive(Debug, Default)]
pub struct Movement {
    scratch: Vec<Command>,
}

impl Movement {
    /// Creates a new movement system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits one `Command::MoveSoldier` per live soldier in roster order.
    ///
    /// Every policy observes the positions captured in `soldiers`. If any
    /// policy fails, nothing is appended to `out` and the failure is returned
    /// tagged with the soldier that triggered it.
    pub fn handle(
        &mut self,
        soldiers: &SoldierView,
        policies: &TeamPolicies,
        rng: &mut dyn RngCore,
        out: &mut Vec<Command>,
    ) -> Result<(), BattleError> {
        self.scratch.clear();
        if soldiers.is_empty() {
            return Ok(());
        }

        for soldier in soldiers.iter() {
            let target = policies
                .for_team(soldier.team)
                .target(soldier, rng)
                .map_err(|source| BattleError::ExternalPolicyFailure {
                    soldier: soldier.id,
                    team: soldier.team,
                    source,
                })?;
            self.scratch.push(Command::MoveSoldier {
                soldier: soldier.id,
                target,
            });
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
        Ok(())
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Battle controller that drives the Skirmish world one turn at a time.
//!
//! The [`Battlefield`] owns the authoritative world, the seeded random number
//! generator, and the pure systems. Each [`Battlefield::step`] runs the fixed
//! turn pipeline: every soldier proposes a move through its team's policy,
//! the world clamps and applies the moves, one combat pass removes the
//! losers, and the turn closes by appending survivor counts to the history.
//! Termination is left to the caller, who checks
//! [`Battlefield::is_battle_over`] between steps.
//!
//! The event buffer only holds what the latest operation broadcast; callers
//! that want a full log collect [`TurnReport::events`] themselves.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skirmish_core::{
    BattleError, Command, Composition, DeploymentRange, Engagement, Event, GridSize, SoldierId,
    SoldierSpec, SoldierView, SurvivorCounts, Team,
};
use skirmish_system_combat::Combat;
use skirmish_system_deployment::{Deployment, TeamDeployment};
use skirmish_system_movement::{Movement, TeamPolicies};
use skirmish_world::{self as world, query, History, World};
use tracing::{debug, info, warn};

/// Parameters fixed for the lifetime of a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BattleConfig {
    grid: GridSize,
    seed: u64,
}

impl BattleConfig {
    /// Creates a configuration from validated grid dimensions and an RNG seed.
    #[must_use]
    pub const fn new(grid: GridSize, seed: u64) -> Self {
        Self { grid, seed }
    }

    /// Validates raw grid dimensions before creating the configuration.
    pub fn try_new(width: i64, height: i64, seed: u64) -> Result<Self, BattleError> {
        Ok(Self::new(GridSize::try_new(width, height)?, seed))
    }

    /// Battlefield dimensions.
    #[must_use]
    pub const fn grid(&self) -> GridSize {
        self.grid
    }

    /// Seed of the battle's random number generator.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

/// Summary of a completed turn.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnReport {
    /// Turn index after the increment.
    pub turn: u64,
    /// Survivor counts recorded for the turn.
    pub survivors: SurvivorCounts,
    /// Fights resolved during the turn, in resolution order.
    pub engagements: Vec<Engagement>,
    /// Events the world broadcast while processing the turn.
    pub events: Vec<Event>,
}

/// Result of driving a battle with [`Battlefield::run`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BattleOutcome {
    /// Surviving team, if exactly one team has soldiers left.
    pub winner: Option<Team>,
    /// Number of completed turns when the run stopped.
    pub turns: u64,
    /// Survivor counts when the run stopped.
    pub survivors: SurvivorCounts,
    /// Whether the run stopped because the turn budget ran out.
    pub reached_turn_limit: bool,
}

/// Owns the battlefield and runs the per-turn pipeline.
#[derive(Debug)]
pub struct Battlefield {
    world: World,
    rng: ChaCha8Rng,
    policies: TeamPolicies,
    movement: Movement,
    combat: Combat,
    deployment: Deployment,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Battlefield {
    /// Creates an empty battlefield steered by the provided team policies.
    #[must_use]
    pub fn new(config: BattleConfig, policies: TeamPolicies) -> Self {
        Self {
            world: World::new(config.grid()),
            rng: ChaCha8Rng::seed_from_u64(config.seed()),
            policies,
            movement: Movement::new(),
            combat: Combat::new(),
            deployment: Deployment::new(),
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Adds a single soldier to the end of the roster.
    pub fn add_soldier(&mut self, spec: SoldierSpec) -> SoldierId {
        self.events.clear();
        self.commands.push(Command::DeploySoldier { spec });
        self.flush_commands();
        deployed_ids(&self.events)
            .next()
            .unwrap_or_else(|| unreachable!("deploying a soldier always emits SoldierDeployed"))
    }

    /// Scatters a team's composition across the inclusive x range `x_range`.
    ///
    /// Soldiers are created entry by entry in composition order. Their x
    /// coordinate is drawn from `x_range`, which may lie outside the grid,
    /// and their y coordinate from the full grid height.
    pub fn initialize_team(
        &mut self,
        team: Team,
        composition: &Composition,
        x_range: (i32, i32),
    ) -> Result<Vec<SoldierId>, BattleError> {
        let request = TeamDeployment {
            team,
            composition: composition.clone(),
            range: DeploymentRange::try_new(x_range.0, x_range.1)?,
        };
        Ok(self.deploy(&request))
    }

    /// Deploys an already validated team request.
    pub fn deploy(&mut self, request: &TeamDeployment) -> Vec<SoldierId> {
        self.events.clear();
        let grid = query::grid(&self.world);
        self.deployment
            .handle(request, grid, &mut self.rng, &mut self.commands);
        self.flush_commands();
        let deployed: Vec<SoldierId> = deployed_ids(&self.events).collect();
        info!(
            team = %request.team,
            soldiers = deployed.len(),
            min_x = request.range.min_x(),
            max_x = request.range.max_x(),
            "team deployed"
        );
        deployed
    }

    /// Moves every live soldier according to its team's policy.
    ///
    /// Targets are clamped to the grid. If any policy fails, no soldier moves.
    pub fn move_soldiers(&mut self) -> Result<(), BattleError> {
        self.events.clear();
        self.move_phase()
    }

    /// Runs a single combat pass and removes every defeated soldier.
    pub fn resolve_combat(&mut self) -> Vec<Engagement> {
        self.events.clear();
        self.combat_phase()
    }

    /// Executes one full turn: movement, combat, turn increment, history.
    ///
    /// On failure nothing has changed and the event buffer is empty.
    pub fn step(&mut self) -> Result<TurnReport, BattleError> {
        self.events.clear();
        self.move_phase()?;
        let engagements = self.combat_phase();
        self.commands.push(Command::CompleteTurn);
        self.flush_commands();

        let turn = query::turn(&self.world);
        let survivors = query::history(&self.world)
            .latest()
            .map(|record| record.survivors)
            .unwrap_or_default();
        info!(
            turn,
            team_a = survivors.team_a,
            team_b = survivors.team_b,
            engagements = engagements.len(),
            "turn completed"
        );

        Ok(TurnReport {
            turn,
            survivors,
            engagements,
            events: self.events.clone(),
        })
    }

    fn move_phase(&mut self) -> Result<(), BattleError> {
        let view = query::soldier_view(&self.world);
        if let Err(error) =
            self.movement
                .handle(&view, &self.policies, &mut self.rng, &mut self.commands)
        {
            warn!(turn = query::turn(&self.world), %error, "movement aborted");
            return Err(error);
        }
        let first_new = self.events.len();
        self.flush_commands();
        for event in &self.events[first_new..] {
            if let Event::SoldierMoved { soldier, from, to } = event {
                debug!(%soldier, %from, %to, "soldier moved");
            }
        }
        Ok(())
    }

    fn combat_phase(&mut self) -> Vec<Engagement> {
        let view = query::soldier_view(&self.world);
        let engagements = self
            .combat
            .handle(&view, &mut self.rng, &mut self.commands);
        for engagement in &engagements {
            debug!(
                attacker = %engagement.attacker,
                defender = %engagement.defender,
                attacker_roll = engagement.attacker_roll,
                defender_roll = engagement.defender_roll,
                victor = %engagement.victor,
                "engagement resolved"
            );
        }
        self.flush_commands();
        engagements
    }

    /// Steps until one team is wiped out or `max_turns` further turns elapse.
    pub fn run(&mut self, max_turns: u64) -> Result<BattleOutcome, BattleError> {
        let mut remaining = max_turns;
        while !self.is_battle_over() && remaining > 0 {
            let _ = self.step()?;
            remaining -= 1;
        }

        let outcome = BattleOutcome {
            winner: self.winner(),
            turns: self.turn(),
            survivors: self.survivor_counts(),
            reached_turn_limit: !self.is_battle_over(),
        };
        match outcome.winner {
            Some(team) => info!(%team, turns = outcome.turns, "battle won"),
            None => info!(
                turns = outcome.turns,
                reached_turn_limit = outcome.reached_turn_limit,
                "battle ended without a winner"
            ),
        }
        Ok(outcome)
    }

    /// Reports whether either team has no soldiers left.
    #[must_use]
    pub fn is_battle_over(&self) -> bool {
        self.survivor_counts().is_decided()
    }

    /// The surviving team when exactly one team has soldiers left.
    #[must_use]
    pub fn winner(&self) -> Option<Team> {
        self.survivor_counts().winner()
    }

    /// Live soldiers per team, recounted on every call.
    #[must_use]
    pub fn survivor_counts(&self) -> SurvivorCounts {
        query::survivor_counts(&self.world)
    }

    /// Number of completed turns.
    #[must_use]
    pub fn turn(&self) -> u64 {
        query::turn(&self.world)
    }

    /// Survivor counts recorded after every completed turn.
    #[must_use]
    pub fn history(&self) -> &History {
        query::history(&self.world)
    }

    /// Snapshot of the live soldiers in roster order.
    #[must_use]
    pub fn soldiers(&self) -> SoldierView {
        query::soldier_view(&self.world)
    }

    /// Battlefield dimensions.
    #[must_use]
    pub fn grid(&self) -> GridSize {
        query::grid(&self.world)
    }

    /// Events broadcast by the most recent operation.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }
}

fn deployed_ids(events: &[Event]) -> impl Iterator<Item = SoldierId> + '_ {
    events.iter().filter_map(|event| match event {
        Event::SoldierDeployed { soldier, .. } => Some(*soldier),
        _ => None,
    })
}

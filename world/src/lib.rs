#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battlefield state management for Skirmish.

mod history;

pub use history::History;

use skirmish_core::{
    Command, Event, GridPoint, GridSize, SoldierId, SoldierSnapshot, SoldierSpec, Team, UnitKind,
};

/// Represents the authoritative battlefield state.
#[derive(Debug)]
pub struct World {
    grid: GridSize,
    soldiers: Vec<Soldier>,
    next_soldier_id: u32,
    turn: u64,
    history: History,
}

impl World {
    /// Creates an empty battlefield with the provided grid dimensions.
    #[must_use]
    pub fn new(grid: GridSize) -> Self {
        Self {
            grid,
            soldiers: Vec::new(),
            next_soldier_id: 0,
            turn: 0,
            history: History::default(),
        }
    }

    fn soldier_mut(&mut self, soldier_id: SoldierId) -> Option<&mut Soldier> {
        self.soldiers.iter_mut().find(|soldier| soldier.id == soldier_id)
    }

    fn soldier_index(&self, soldier_id: SoldierId) -> Option<usize> {
        self.soldiers.iter().position(|soldier| soldier.id == soldier_id)
    }

    fn allocate_soldier_id(&mut self) -> SoldierId {
        let id = SoldierId::new(self.next_soldier_id);
        self.next_soldier_id = self.next_soldier_id.wrapping_add(1);
        id
    }
}

#[derive(Clone, Copy, Debug)]
struct Soldier {
    id: SoldierId,
    position: GridPoint,
    strength: u32,
    kind: UnitKind,
    team: Team,
    engagement_range: u32,
}

impl Soldier {
    fn from_spec(id: SoldierId, spec: SoldierSpec) -> Self {
        Self {
            id,
            position: spec.position,
            strength: spec.strength,
            kind: spec.kind,
            team: spec.team,
            engagement_range: spec.engagement_range,
        }
    }

    fn snapshot(&self) -> SoldierSnapshot {
        SoldierSnapshot {
            id: self.id,
            position: self.position,
            strength: self.strength,
            kind: self.kind,
            team: self.team,
            engagement_range: self.engagement_range,
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::DeploySoldier { spec } => {
            let id = world.allocate_soldier_id();
            world.soldiers.push(Soldier::from_spec(id, spec));
            out_events.push(Event::SoldierDeployed {
                soldier: id,
                team: spec.team,
                kind: spec.kind,
                position: spec.position,
            });
        }
        Command::MoveSoldier { soldier, target } => {
            let destination = world.grid.clamp(target);
            if let Some(entry) = world.soldier_mut(soldier) {
                let from = entry.position;
                entry.position = destination;
                if from != destination {
                    out_events.push(Event::SoldierMoved {
                        soldier,
                        from,
                        to: destination,
                    });
                }
            }
        }
        Command::DefeatSoldier { soldier, victor } => {
            if let Some(index) = world.soldier_index(soldier) {
                let removed = world.soldiers.remove(index);
                out_events.push(Event::SoldierDefeated {
                    soldier,
                    team: removed.team,
                    victor,
                });
            }
        }
        Command::CompleteTurn => {
            world.turn = world.turn.saturating_add(1);
            let survivors = query::survivor_counts(world);
            let record = world.history.record(world.turn, survivors);
            out_events.push(Event::TurnCompleted { record });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{History, World};
    use skirmish_core::{GridSize, SoldierView, SurvivorCounts};

    /// Provides the battlefield dimensions.
    #[must_use]
    pub fn grid(world: &World) -> GridSize {
        world.grid
    }

    /// Number of completed turns.
    #[must_use]
    pub fn turn(world: &World) -> u64 {
        world.turn
    }

    /// Captures a read-only view of the live soldiers in roster order.
    #[must_use]
    pub fn soldier_view(world: &World) -> SoldierView {
        SoldierView::from_snapshots(
            world
                .soldiers
                .iter()
                .map(|soldier| soldier.snapshot())
                .collect(),
        )
    }

    /// Counts live soldiers per team with a fresh scan of the roster.
    #[must_use]
    pub fn survivor_counts(world: &World) -> SurvivorCounts {
        SurvivorCounts::tally(world.soldiers.iter().map(|soldier| soldier.team))
    }

    /// Provides read-only access to the per-turn survivor history.
    #[must_use]
    pub fn history(world: &World) -> &History {
        &world.history
    }
}

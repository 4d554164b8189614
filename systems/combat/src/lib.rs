#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves pairwise fights between opposing soldiers.

use rand::{Rng, RngCore};
use skirmish_core::{Command, Engagement, SoldierSnapshot, SoldierView};

/// Width of the uniform bonus added to a soldier's strength on every roll.
pub const ROLL_SPREAD: f64 = 10.0;

/// Combat system that emits defeat commands for soldiers losing a fight.
#[derive(Debug, Default)]
pub struct Combat {
    defeated: Vec<bool>,
    scratch: Vec<Command>,
}

impl Combat {
    /// Creates a new combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one combat pass over the roster and returns every fight in order.
    ///
    /// Pairs `(i, j)` with `i < j` are visited in roster order. A pair fights
    /// when neither soldier has fallen earlier in the pass and soldier `i`
    /// can engage soldier `j`; soldier `j`'s own range is never consulted.
    /// Fallen soldiers stay in place until the pass ends, at which point one
    /// `Command::DefeatSoldier` per loss is appended to `out`.
    pub fn handle(
        &mut self,
        soldiers: &SoldierView,
        rng: &mut dyn RngCore,
        out: &mut Vec<Command>,
    ) -> Vec<Engagement> {
        let roster = soldiers.as_slice();
        self.defeated.clear();
        self.defeated.resize(roster.len(), false);
        self.scratch.clear();

        let mut engagements = Vec::new();
        for (i, first) in roster.iter().enumerate() {
            for (j, second) in roster.iter().enumerate().skip(i + 1) {
                if self.defeated[i] {
                    break;
                }
                if self.defeated[j] || !first.can_engage(second) {
                    continue;
                }

                let engagement = fight(first, second, rng);
                let loser = if engagement.victor == first.id { j } else { i };
                self.defeated[loser] = true;
                self.scratch.push(Command::DefeatSoldier {
                    soldier: engagement.defeated(),
                    victor: engagement.victor,
                });
                engagements.push(engagement);
            }
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
        engagements
    }
}

/// Rolls for both soldiers; the attacker wins ties.
fn fight(
    attacker: &SoldierSnapshot,
    defender: &SoldierSnapshot,
    rng: &mut dyn RngCore,
) -> Engagement {
    let attacker_roll = roll(attacker, rng);
    let defender_roll = roll(defender, rng);
    let victor = if attacker_roll >= defender_roll {
        attacker.id
    } else {
        defender.id
    };

    Engagement {
        attacker: attacker.id,
        defender: defender.id,
        attacker_roll,
        defender_roll,
        victor,
    }
}

fn roll(soldier: &SoldierSnapshot, rng: &mut dyn RngCore) -> f64 {
    f64::from(soldier.strength) + rng.gen_range(0.0..ROLL_SPREAD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use skirmish_core::{GridPoint, SoldierId, Team, UnitKind};

    /// Produces the same word forever so both rolls draw identical bonuses.
    struct ConstantRng;

    impl RngCore for ConstantRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    fn soldier(id: u32, team: Team, x: i32, strength: u32, range: u32) -> SoldierSnapshot {
        SoldierSnapshot {
            id: SoldierId::new(id),
            position: GridPoint::new(x, 0),
            strength,
            kind: UnitKind::Soldier,
            team,
            engagement_range: range,
        }
    }

    fn defeated(out: &[Command]) -> Vec<u32> {
        out.iter()
            .filter_map(|command| match command {
                Command::DefeatSoldier { soldier, .. } => Some(soldier.get()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn overwhelming_strength_always_wins() {
        for seed in 0..64 {
            let view = SoldierView::from_snapshots(vec![
                soldier(0, Team::A, 0, 100, 5),
                soldier(1, Team::B, 1, 1, 5),
            ]);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut out = Vec::new();

            let engagements = Combat::new().handle(&view, &mut rng, &mut out);

            assert_eq!(engagements.len(), 1);
            assert_eq!(engagements[0].victor, SoldierId::new(0));
            assert_eq!(defeated(&out), vec![1]);
        }
    }

    #[test]
    fn distant_soldiers_do_not_fight() {
        let view = SoldierView::from_snapshots(vec![
            soldier(0, Team::A, 0, 10, 1),
            soldier(1, Team::B, 10, 10, 1),
        ]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut out = Vec::new();

        let engagements = Combat::new().handle(&view, &mut rng, &mut out);

        assert!(engagements.is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn engagement_is_checked_from_the_earlier_soldier_only() {
        let view = SoldierView::from_snapshots(vec![
            soldier(0, Team::B, 0, 10, 0),
            soldier(1, Team::A, 2, 10, 3),
        ]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut out = Vec::new();

        let engagements = Combat::new().handle(&view, &mut rng, &mut out);

        assert!(engagements.is_empty(), "the archer's reach is never used");
    }

    #[test]
    fn ties_favor_the_earlier_soldier() {
        let view = SoldierView::from_snapshots(vec![
            soldier(3, Team::B, 0, 10, 1),
            soldier(8, Team::A, 1, 10, 1),
        ]);
        let mut out = Vec::new();

        let engagements = Combat::new().handle(&view, &mut ConstantRng, &mut out);

        assert_eq!(engagements.len(), 1);
        assert_eq!(engagements[0].attacker_roll, engagements[0].defender_roll);
        assert_eq!(engagements[0].victor, SoldierId::new(3));
        assert_eq!(defeated(&out), vec![8]);
    }

    #[test]
    fn fallen_soldiers_are_skipped_for_the_rest_of_the_pass() {
        let view = SoldierView::from_snapshots(vec![
            soldier(0, Team::A, 0, 0, 5),
            soldier(1, Team::B, 1, 100, 5),
            soldier(2, Team::A, 2, 0, 5),
            soldier(3, Team::B, 3, 0, 5),
        ]);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut out = Vec::new();

        let engagements = Combat::new().handle(&view, &mut rng, &mut out);

        let pairs: Vec<_> = engagements
            .iter()
            .map(|engagement| (engagement.attacker.get(), engagement.defender.get()))
            .collect();
        assert_eq!(pairs, vec![(0, 1), (1, 2)]);
        assert_eq!(defeated(&out), vec![0, 2]);
    }

    #[test]
    fn every_soldier_falls_at_most_once() {
        let roster: Vec<_> = (0..12)
            .map(|id| {
                let team = if id % 2 == 0 { Team::A } else { Team::B };
                soldier(id, team, (id % 3) as i32, id, 4)
            })
            .collect();
        let view = SoldierView::from_snapshots(roster);
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut out = Vec::new();

        let engagements = Combat::new().handle(&view, &mut rng, &mut out);

        let mut fallen = defeated(&out);
        let total = fallen.len();
        fallen.sort_unstable();
        fallen.dedup();
        assert_eq!(fallen.len(), total);
        assert_eq!(engagements.len(), total);
    }
}

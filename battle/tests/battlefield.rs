use proptest::prelude::*;
use skirmish_battle::{BattleConfig, Battlefield};
use skirmish_core::{
    BattleError, Composition, Event, GridPoint, PolicyFailure, SoldierSnapshot, SoldierSpec,
    SurvivorCounts, Team, UnitKind, UnitProfile,
};
use skirmish_system_movement::{ExternalDecision, MovementPolicy, RandomWalk, Stationary, TeamPolicies};

fn config(width: i64, height: i64, seed: u64) -> BattleConfig {
    BattleConfig::try_new(width, height, seed).expect("valid grid")
}

fn stationary() -> TeamPolicies {
    TeamPolicies::new(Box::new(Stationary), Box::new(Stationary))
}

fn spec(team: Team, x: i32, y: i32, strength: u32, range: u32) -> SoldierSpec {
    SoldierSpec {
        position: GridPoint::new(x, y),
        strength,
        kind: UnitKind::Soldier,
        team,
        engagement_range: range,
    }
}

#[test]
fn overwhelming_strength_decides_the_battle() {
    for seed in 0..32 {
        let mut battlefield = Battlefield::new(config(4, 4, seed), stationary());
        let _ = battlefield.add_soldier(spec(Team::A, 0, 0, 100, 5));
        let _ = battlefield.add_soldier(spec(Team::B, 1, 0, 1, 5));

        let engagements = battlefield.resolve_combat();

        assert_eq!(engagements.len(), 1);
        assert_eq!(battlefield.survivor_counts(), SurvivorCounts::new(1, 0));
        assert_eq!(battlefield.winner(), Some(Team::A));
        assert!(battlefield.is_battle_over());
    }
}

#[test]
fn soldiers_out_of_range_both_survive() {
    let mut battlefield = Battlefield::new(config(12, 12, 3), stationary());
    let _ = battlefield.add_soldier(spec(Team::A, 0, 0, 10, 1));
    let _ = battlefield.add_soldier(spec(Team::B, 10, 0, 10, 1));

    let engagements = battlefield.resolve_combat();

    assert!(engagements.is_empty());
    assert_eq!(battlefield.survivor_counts(), SurvivorCounts::new(1, 1));
    assert!(!battlefield.is_battle_over());
    assert_eq!(battlefield.winner(), None);
}

#[test]
fn initialize_team_places_soldiers_in_the_requested_column() {
    let mut battlefield = Battlefield::new(config(4, 4, 8), stationary());
    let composition = Composition::new().with(UnitKind::Soldier, UnitProfile::new(3, 10, 2));

    let deployed = battlefield
        .initialize_team(Team::A, &composition, (0, 0))
        .expect("valid deployment");

    assert_eq!(deployed.len(), 3);
    let soldiers = battlefield.soldiers();
    assert_eq!(soldiers.len(), 3);
    for soldier in soldiers.iter() {
        assert_eq!(soldier.team, Team::A);
        assert_eq!(soldier.kind, UnitKind::Soldier);
        assert_eq!(soldier.strength, 10);
        assert_eq!(soldier.engagement_range, 2);
        assert_eq!(soldier.position.x(), 0);
        assert!((0..4).contains(&soldier.position.y()));
    }
}

#[test]
fn step_advances_turn_and_appends_matching_history() {
    let mut battlefield = Battlefield::new(config(5, 5, 21), TeamPolicies::default());
    let composition = Composition::new()
        .with(UnitKind::Soldier, UnitProfile::new(3, 10, 1))
        .with(UnitKind::Archer, UnitProfile::new(2, 6, 3));
    let _ = battlefield
        .initialize_team(Team::A, &composition, (0, 1))
        .expect("valid deployment");
    let _ = battlefield
        .initialize_team(Team::B, &composition, (3, 4))
        .expect("valid deployment");

    for expected_turn in 1..=10 {
        let before = battlefield.history().len();
        let report = battlefield.step().expect("built-in policies never fail");

        assert_eq!(report.turn, expected_turn);
        assert_eq!(battlefield.turn(), expected_turn);
        assert_eq!(battlefield.history().len(), before + 1);
        let latest = battlefield.history().latest().copied().expect("recorded");
        assert_eq!(latest.turn, expected_turn);
        assert_eq!(latest.survivors, battlefield.survivor_counts());
        assert_eq!(report.survivors, latest.survivors);
    }
}

#[test]
fn policy_failure_leaves_the_battle_untouched() {
    #[derive(Debug)]
    struct Broken;

    impl MovementPolicy for Broken {
        fn target(
            &self,
            _soldier: &SoldierSnapshot,
            _rng: &mut dyn rand::RngCore,
        ) -> Result<GridPoint, PolicyFailure> {
            Err(PolicyFailure::Capability("decision backend unavailable".into()))
        }
    }

    let mut battlefield = Battlefield::new(
        config(4, 4, 2),
        TeamPolicies::new(Box::new(Broken), Box::new(RandomWalk)),
    );
    let _ = battlefield.add_soldier(spec(Team::B, 1, 1, 5, 1));
    let _ = battlefield.add_soldier(spec(Team::A, 3, 3, 5, 1));
    let before = battlefield.soldiers();

    let error = battlefield.step().expect_err("policy failure is fatal");

    assert!(matches!(
        error,
        BattleError::ExternalPolicyFailure { team: Team::A, .. }
    ));
    assert_eq!(battlefield.soldiers(), before);
    assert_eq!(battlefield.turn(), 0);
    assert!(battlefield.history().is_empty());
}

#[test]
fn non_integral_decisions_are_rejected() {
    let decision = ExternalDecision::new(|current: GridPoint| {
        Ok((f64::from(current.x()) + 0.5, f64::from(current.y())))
    });
    let mut battlefield = Battlefield::new(
        config(4, 4, 2),
        TeamPolicies::against_random_walk(Box::new(decision)),
    );
    let _ = battlefield.add_soldier(spec(Team::A, 0, 0, 5, 1));

    let error = battlefield.step().expect_err("fractional coordinate");

    assert!(matches!(
        error,
        BattleError::ExternalPolicyFailure {
            source: PolicyFailure::Fractional { .. },
            ..
        }
    ));
}

#[test]
fn run_stops_when_a_team_is_eliminated() {
    let mut battlefield = Battlefield::new(config(4, 4, 5), stationary());
    let _ = battlefield.add_soldier(spec(Team::A, 0, 0, 100, 3));
    let _ = battlefield.add_soldier(spec(Team::B, 1, 1, 0, 3));
    let _ = battlefield.add_soldier(spec(Team::B, 2, 1, 0, 0));

    let outcome = battlefield.run(50).expect("stationary never fails");

    assert_eq!(outcome.winner, Some(Team::A));
    assert!(!outcome.reached_turn_limit);
    assert_eq!(outcome.turns, 1);
    assert_eq!(battlefield.history().len(), 1);
}

#[test]
fn run_honours_the_turn_budget() {
    let mut battlefield = Battlefield::new(config(10, 10, 5), stationary());
    let _ = battlefield.add_soldier(spec(Team::A, 0, 0, 1, 0));
    let _ = battlefield.add_soldier(spec(Team::B, 9, 9, 1, 0));

    let outcome = battlefield.run(7).expect("stationary never fails");

    assert_eq!(outcome.turns, 7);
    assert!(outcome.reached_turn_limit);
    assert_eq!(outcome.winner, None);
    assert_eq!(battlefield.history().len(), 7);
}

#[test]
fn event_log_reports_defeats() {
    let mut battlefield = Battlefield::new(config(4, 4, 9), stationary());
    let strong = battlefield.add_soldier(spec(Team::A, 0, 0, 100, 5));
    let weak = battlefield.add_soldier(spec(Team::B, 1, 0, 1, 5));

    let _ = battlefield.step().expect("stationary never fails");

    assert!(battlefield.events().contains(&Event::SoldierDefeated {
        soldier: weak,
        team: Team::B,
        victor: strong,
    }));
}

#[test]
fn event_buffer_only_holds_the_latest_turn() {
    let mut battlefield = Battlefield::new(
        config(6, 6, 17),
        TeamPolicies::new(Box::new(RandomWalk), Box::new(RandomWalk)),
    );
    let _ = battlefield.add_soldier(spec(Team::A, 0, 0, 1, 0));
    let _ = battlefield.add_soldier(spec(Team::A, 5, 5, 1, 0));
    let _ = battlefield.add_soldier(spec(Team::A, 0, 5, 1, 0));
    assert_eq!(battlefield.events().len(), 1);

    for _ in 0..500 {
        let report = battlefield.step().expect("random walk never fails");

        assert_eq!(battlefield.events(), report.events.as_slice());
        assert!(report.events.len() <= 4, "three moves and one turn record");
        assert!(matches!(
            report.events.last(),
            Some(Event::TurnCompleted { record }) if record.turn == report.turn
        ));
    }
}

fn arbitrary_battle(seed: u64, width: i64, height: i64) -> Battlefield {
    let mut battlefield = Battlefield::new(
        config(width, height, seed),
        TeamPolicies::new(Box::new(RandomWalk), Box::new(RandomWalk)),
    );
    let composition = Composition::new()
        .with(UnitKind::Soldier, UnitProfile::new(4, 10, 1))
        .with(UnitKind::Knight, UnitProfile::new(2, 15, 1))
        .with(UnitKind::Archer, UnitProfile::new(2, 5, 3));
    let _ = battlefield
        .initialize_team(Team::A, &composition, (-2, 1))
        .expect("valid deployment");
    let _ = battlefield
        .initialize_team(Team::B, &composition, (width as i32 - 2, width as i32 + 2))
        .expect("valid deployment");
    battlefield
}

proptest! {
    #[test]
    fn steps_preserve_battle_invariants(
        seed in any::<u64>(),
        width in 1i64..8,
        height in 1i64..8,
        turns in 1usize..25,
    ) {
        let mut battlefield = arbitrary_battle(seed, width, height);
        let grid = battlefield.grid();
        let mut previous = battlefield.survivor_counts();

        for _ in 0..turns {
            let turn_before = battlefield.turn();
            let _ = battlefield.step().expect("random walk never fails");
            let counts = battlefield.survivor_counts();

            prop_assert!(battlefield
                .soldiers()
                .iter()
                .all(|soldier| grid.contains(soldier.position)));
            prop_assert!(counts.team_a <= previous.team_a);
            prop_assert!(counts.team_b <= previous.team_b);
            prop_assert_eq!(battlefield.turn(), turn_before + 1);
            prop_assert_eq!(
                battlefield.history().latest().map(|record| record.survivors),
                Some(counts)
            );
            prop_assert_eq!(
                battlefield.is_battle_over(),
                counts.team_a == 0 || counts.team_b == 0
            );
            previous = counts;
        }
    }
}

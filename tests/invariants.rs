//! Property tests for invariants that must hold across arbitrary input,
//! not just the hand-picked fixtures in `tests/scenarios.rs` and the
//! per-module unit tests.

use hexfray_engine::abilities::AbilitySet;
use hexfray_engine::ai::AiVariant;
use hexfray_engine::config::ThreatConfig;
use hexfray_engine::entity::{Monster, Player};
use hexfray_engine::hex::Hex;
use hexfray_engine::stats::BaseStats;
use hexfray_engine::validation::validate_game_state;
use hexfray_engine::{Engine, GameState};
use proptest::prelude::*;

fn base(max_hp: u32, armor: u32, damage: u32) -> BaseStats {
    BaseStats { max_hp, base_armor: armor, base_damage: damage, movement_range: 3 }
}

fn player_at(id: &str, q: i32, r: i32, hp: u32, armor: u32, damage: u32) -> Player {
    Player::new(id, id, base(hp, armor, damage), Hex::from_axial(q, r), AbilitySet::new(vec![]))
}

fn goblin_at(id: &str, q: i32, r: i32, hp: u32, armor: u32, damage: u32) -> Monster {
    Monster::new(
        id,
        id,
        base(hp, armor, damage),
        Hex::from_axial(q, r),
        AbilitySet::new(vec![]),
        AiVariant::Aggressive,
        ThreatConfig::default(),
        vec![],
    )
}

proptest! {
    /// `Hex::from_axial` always satisfies the cube constraint, for any
    /// finite axial coordinate.
    #[test]
    fn hex_from_axial_satisfies_cube_constraint(q in -1000i32..1000, r in -1000i32..1000) {
        let h = Hex::from_axial(q, r);
        prop_assert_eq!(h.q + h.r + h.s, 0);
    }

    /// Armor reduction never drops net damage below 1 when the attacker
    /// actually connects, regardless of how large the target's armor is.
    #[test]
    fn take_damage_minimum_net_is_always_one(raw in 1u32..500, armor in 0u32..200) {
        let mut stats = hexfray_engine::stats::EntityStats::new(base(1000, 0, 0), false);
        let outcome = stats.take_damage(raw, armor);
        prop_assert!(outcome.damage_dealt >= 1);
        prop_assert!(outcome.damage_dealt <= raw);
    }

    /// Running any number of rounds of a two-combatant fight never leaves
    /// the resulting state invariant-violating, and play never continues
    /// past the round the game ended on.
    #[test]
    fn arbitrary_fight_never_violates_invariants(
        player_hp in 20u32..200,
        player_armor in 0u32..10,
        player_damage in 5u32..40,
        monster_hp in 20u32..200,
        monster_armor in 0u32..10,
        monster_damage in 5u32..40,
        rounds in 1usize..15,
    ) {
        let player = player_at("p", 0, 0, player_hp, player_armor, player_damage);
        let monster = goblin_at("m", 1, 0, monster_hp, monster_armor, monster_damage);
        let mut engine = Engine::new(vec![player], vec![monster], None).unwrap();
        engine.start_game().unwrap();

        let mut ended_at = None;
        for i in 0..rounds {
            use hexfray_engine::{PlayerAction, PlayerActionSubmission};
            let _ = engine.submit_player_action(PlayerActionSubmission {
                player_id: "p".to_string(),
                action: PlayerAction::Attack { target_id: "m".to_string() },
            });
            let result = engine.process_round();
            if result.game_ended && ended_at.is_none() {
                ended_at = Some(i);
            }
            let violations = validate_game_state(engine.game_state());
            prop_assert!(violations.is_empty(), "violations: {:?}", violations);
        }

        if let Some(end_round) = ended_at {
            prop_assert!(engine.is_game_ended());
            let _ = end_round;
        }
    }

    /// No two alive entities ever occupy the same hex after occupancy is
    /// recomputed, however positions are arranged beforehand.
    #[test]
    fn recompute_occupied_never_double_counts_distinct_alive_positions(
        dead_overlaps in prop::bool::ANY,
    ) {
        let player = player_at("p", 0, 0, 100, 2, 15);
        let mut monster = goblin_at("m", 1, 0, 50, 1, 10);
        if dead_overlaps {
            monster.stats.current_hp = 0;
            monster.movement.position = Hex::from_axial(0, 0);
        }
        let state = GameState::new(vec![player], vec![monster], Default::default());
        prop_assert!(state.occupied_positions.len() <= 2);
        if dead_overlaps {
            prop_assert_eq!(state.occupied_positions.len(), 1);
        } else {
            prop_assert_eq!(state.occupied_positions.len(), 2);
        }
    }

    /// Threat decay never produces a negative value for any starting
    /// magnitude or decay rate in the valid range.
    #[test]
    fn threat_decay_stays_non_negative(
        initial_damage in 1.0f64..1000.0,
        decay_rate in 0.0f64..1.0,
        ticks in 0u32..50,
    ) {
        let mut config = ThreatConfig::default();
        config.decay_rate = decay_rate;
        let mut table = hexfray_engine::threat::ThreatTable::new(config);
        table.update("x", hexfray_engine::threat::ThreatUpdate {
            damage_to_self: 0.0,
            total_damage_dealt: initial_damage,
            healing_done: 0.0,
            player_armor: 0.0,
        });
        for _ in 0..ticks {
            table.apply_threat_decay();
        }
        prop_assert!(table.threat_of("x") >= 0.0);
    }
}

//! End-to-end scenario tests driven through `Engine`, covering the six
//! concrete numbered combat scenarios and a handful of round-boundary
//! behaviors that only the scheduler (not the unit-level resolvers) exercises.

use hexfray_engine::abilities::{AbilityDefinition, AbilityKind, AbilitySet, TargetType};
use hexfray_engine::ai::AiVariant;
use hexfray_engine::config::{EngineConfig, ThreatConfig};
use hexfray_engine::entity::{Combatant, Monster, Player};
use hexfray_engine::hex::Hex;
use hexfray_engine::stats::BaseStats;
use hexfray_engine::{Engine, PlayerAction, PlayerActionSubmission, Winner};

fn warrior_base() -> BaseStats {
    BaseStats { max_hp: 100, base_armor: 2, base_damage: 15, movement_range: 3 }
}

fn goblin_base() -> BaseStats {
    BaseStats { max_hp: 50, base_armor: 1, base_damage: 12, movement_range: 2 }
}

fn warrior_at(q: i32, r: i32) -> Player {
    Player::new("warrior", "Warrior", warrior_base(), Hex::from_axial(q, r), AbilitySet::new(vec![]))
}

fn goblin_at(id: &str, q: i32, r: i32) -> Monster {
    Monster::new(
        id,
        "Goblin",
        goblin_base(),
        Hex::from_axial(q, r),
        AbilitySet::new(vec![]),
        AiVariant::Passive,
        ThreatConfig::default(),
        vec![],
    )
}

fn submit(engine: &mut Engine, player_id: &str, action: PlayerAction) {
    let result = engine.submit_player_action(PlayerActionSubmission {
        player_id: player_id.to_string(),
        action,
    });
    assert!(result.success, "submission rejected: {:?}", result.error);
}

/// Scenario 1: a warrior out of range then in range of a single goblin.
/// The in-range attack deals 15 raw damage against 1 armor for 14 net.
#[test]
fn scenario_one_warrior_closes_and_attacks_goblin() {
    let mut engine = Engine::new(vec![warrior_at(0, 0)], vec![goblin_at("goblin", 3, 0)], None).unwrap();
    engine.start_game().unwrap();

    submit(&mut engine, "warrior", PlayerAction::Move { target_position: Hex::from_axial(2, 0) });
    let round1 = engine.process_round();
    assert!(!round1.game_ended);
    let move_result = round1.action_results.iter().find(|a| a.entity_id == "warrior").unwrap();
    assert!(move_result.success);

    submit(&mut engine, "warrior", PlayerAction::Attack { target_id: "goblin".to_string() });
    let round2 = engine.process_round();
    let attack_result = round2.action_results.iter().find(|a| a.entity_id == "warrior").unwrap();
    assert!(attack_result.success);
    assert_eq!(attack_result.damage_dealt, Some(14));
    let goblin = engine.get_entity_by_id("goblin").unwrap();
    assert_eq!(goblin.current_hp(), 36);
}

/// Scenario 2: a whirlwind ability hits every adjacent goblin for lethal
/// damage in one action.
#[test]
fn scenario_two_whirlwind_clears_surrounding_goblins() {
    let hero = Player::new(
        "hero",
        "Hero",
        BaseStats { max_hp: 150, base_armor: 3, base_damage: 20, movement_range: 3 },
        Hex::from_axial(0, 0),
        AbilitySet::new(vec![AbilityDefinition {
            id: "whirlwind".to_string(),
            name: "Whirlwind".to_string(),
            kind: AbilityKind::Attack,
            damage: Some(20),
            healing: None,
            range: 1,
            cooldown: 1,
            target_type: TargetType::Enemy,
            area_of_effect: Some(1),
            status_effects: vec![],
        }]),
    );
    let goblins = vec![goblin_at("g0", 1, 0), goblin_at("g1", 0, 1), goblin_at("g2", -1, 1)];
    let mut engine = Engine::new(vec![hero], goblins, None).unwrap();
    engine.start_game().unwrap();

    submit(
        &mut engine,
        "hero",
        PlayerAction::Ability { ability_id: "whirlwind".to_string(), target_id: None, target_position: None },
    );
    let round = engine.process_round();
    assert!(round.game_ended);
    assert_eq!(round.winner, Some(Winner::Players));
    let hero_result = round.action_results.iter().find(|a| a.entity_id == "hero").unwrap();
    assert_eq!(hero_result.damage_dealt, Some(60));
}

/// Scenario 3: a bigger hit from a heavily armored attacker outweighs a
/// smaller hit from a lightly armored one, exactly matching the threat
/// formula (armor 0.5x, damage 1.0x, healing 1.5x).
#[test]
fn scenario_three_threat_formula_through_the_engine() {
    let warrior_a = Player::new(
        "a",
        "A",
        BaseStats { max_hp: 100, base_armor: 2, base_damage: 20, movement_range: 3 },
        Hex::from_axial(-1, 0),
        AbilitySet::new(vec![]),
    );
    let warrior_b = Player::new(
        "b",
        "B",
        BaseStats { max_hp: 100, base_armor: 0, base_damage: 8, movement_range: 3 },
        Hex::from_axial(1, 0),
        AbilitySet::new(vec![]),
    );
    let goblin = goblin_at("goblin", 0, 0);
    let mut engine = Engine::new(vec![warrior_a, warrior_b], vec![goblin], None).unwrap();
    engine.start_game().unwrap();

    submit(&mut engine, "a", PlayerAction::Attack { target_id: "goblin".to_string() });
    submit(&mut engine, "b", PlayerAction::Attack { target_id: "goblin".to_string() });
    engine.process_round();

    let state = engine.game_state();
    let goblin = state.monsters.iter().find(|m| m.id == "goblin").unwrap();
    assert!(goblin.threat.threat_of("a") > goblin.threat.threat_of("b"));
}

/// Five rounds with no action ever taken ends the game as a draw once
/// `max_rounds` is exceeded, without either side ever dealing damage.
#[test]
fn stalemate_ends_as_draw_at_max_rounds() {
    let mut engine = Engine::new(
        vec![warrior_at(0, 0)],
        vec![goblin_at("goblin", 5, 0)],
        Some(EngineConfig { max_rounds: 3, ..EngineConfig::default() }),
    ).unwrap();
    engine.start_game().unwrap();

    let mut last = None;
    for _ in 0..5 {
        last = Some(engine.process_round());
        if last.as_ref().unwrap().game_ended {
            break;
        }
    }
    let result = last.unwrap();
    assert!(result.game_ended);
    assert_eq!(result.winner, Some(Winner::Draw));
}

/// Once the game ends, further `process_round` calls are inert: no actions
/// resolve and the round number does not advance past the final round.
#[test]
fn process_round_after_game_end_is_inert() {
    let mut engine = Engine::new(vec![warrior_at(0, 0)], vec![], None).unwrap();
    engine.start_game().unwrap();
    let result = engine.process_round();
    assert!(result.game_ended);

    let round_before = engine.current_round();
    let after = engine.process_round();
    assert!(!after.game_ended || engine.current_round() == round_before);
    assert!(after.action_results.is_empty());
}

/// `reset_for_new_encounter` returns the engine to `setup`, restores full
/// HP, and clears round history.
#[test]
fn reset_for_new_encounter_restores_fresh_state() {
    let mut engine = Engine::new(vec![warrior_at(0, 0)], vec![goblin_at("goblin", 1, 0)], None).unwrap();
    engine.start_game().unwrap();
    submit(&mut engine, "warrior", PlayerAction::Attack { target_id: "goblin".to_string() });
    engine.process_round();
    assert!(!engine.round_history().is_empty());

    engine.reset_for_new_encounter(None, None);
    assert!(engine.round_history().is_empty());
    let goblin = engine.get_entity_by_id("goblin").unwrap();
    assert_eq!(goblin.current_hp(), goblin.max_hp());
    engine.start_game().unwrap();
}

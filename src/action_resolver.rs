//! Validates and executes one action per entity per round. Spec.md §4.8.
//!
//! Resolution order is the scheduler's responsibility (players in list
//! order, then monster AI decisions); this module resolves one action at a
//! time against a `GameState` and never aborts — every failure becomes a
//! `{success: false, reason}` result.

use crate::abilities::AbilityKind;
use crate::action::{AIDecision, ActionResult, ActionResultVariant, PlayerAction};
use crate::entity::Combatant;
use crate::hex::Hex;
use crate::rng;
use crate::state::GameState;
use crate::threat::ThreatUpdate;

/// Resolves the action a player submitted this round (or an implicit
/// `wait` if none was submitted — a player who never acts does not stall
/// the round). Consumes `submitted_action`.
pub fn resolve_player_turn(state: &mut GameState, index: usize) -> ActionResult {
    let player_id = state.players[index].id.clone();
    let player_name = state.players[index].name.clone();
    if !state.players[index].is_alive() {
        return ActionResult::failure(&player_id, &player_name, ActionResultVariant::Wait, "actor is dead");
    }
    let action = state.players[index].submitted_action.take().unwrap_or(PlayerAction::Wait);
    resolve_player_action(state, &player_id, &player_name, &action)
}

fn resolve_player_action(state: &mut GameState, actor_id: &str, actor_name: &str, action: &PlayerAction) -> ActionResult {
    match action {
        PlayerAction::Move { target_position } => resolve_move(state, actor_id, actor_name, *target_position),
        PlayerAction::Attack { target_id } => resolve_basic_attack(state, actor_id, actor_name, target_id),
        PlayerAction::Ability { ability_id, target_id, target_position } => {
            resolve_ability(state, actor_id, actor_name, ability_id, target_id.clone(), *target_position)
        }
        PlayerAction::Wait => resolve_wait(actor_id, actor_name),
    }
}

/// Resolves a monster's cached AI decision for this round.
pub fn resolve_monster_turn(state: &mut GameState, index: usize) -> ActionResult {
    let monster_id = state.monsters[index].id.clone();
    let monster_name = state.monsters[index].name.clone();
    if !state.monsters[index].is_alive() {
        return ActionResult::failure(&monster_id, &monster_name, ActionResultVariant::Wait, "actor is dead");
    }
    let Some(decision) = state.monsters[index].last_decision.clone() else {
        return resolve_wait(&monster_id, &monster_name);
    };
    match decision {
        AIDecision::Attack { target_id, .. } => resolve_basic_attack(state, &monster_id, &monster_name, &target_id),
        AIDecision::Ability { ability_id, target_id, target_position, .. } => {
            resolve_ability(state, &monster_id, &monster_name, &ability_id, target_id, target_position)
        }
        AIDecision::Move { target_position, .. } => resolve_move(state, &monster_id, &monster_name, target_position),
        AIDecision::Wait { .. } => resolve_wait(&monster_id, &monster_name),
        AIDecision::CallForHelp { .. } => resolve_call_for_help(state, &monster_id, &monster_name),
    }
}

fn resolve_wait(actor_id: &str, actor_name: &str) -> ActionResult {
    ActionResult {
        entity_id: actor_id.to_string(),
        entity_name: actor_name.to_string(),
        variant: ActionResultVariant::Wait,
        success: true,
        reason: None,
        damage_dealt: None,
        healing_done: None,
        new_position: None,
        target_id: None,
        ability_used: None,
    }
}

fn resolve_move(state: &mut GameState, actor_id: &str, actor_name: &str, target_position: Hex) -> ActionResult {
    // Read from `state.occupied_positions` directly (not a snapshot) so a
    // move resolved earlier in this same round is visible to one resolved
    // later — `occupied_positions` is only rebuilt wholesale at round end
    // (`GameState::recompute_occupied`), so each successful move must patch
    // it incrementally below.
    let occupied = state.occupied_positions.clone();
    let obstacles = state.obstacles.clone();
    let Some(actor) = state.combatant_mut(actor_id) else {
        log::warn!("move submitted for unknown actor {actor_id}");
        return ActionResult::failure(actor_id, actor_name, ActionResultVariant::Move, "unknown actor");
    };
    let can_move = actor.status().can_move();
    let origin_key = actor.position().key();
    match actor.movement_mut().try_move(target_position, &occupied, &obstacles, can_move) {
        Ok(()) => {
            state.occupied_positions.remove(&origin_key);
            state.occupied_positions.insert(target_position.key());
            ActionResult {
                entity_id: actor_id.to_string(),
                entity_name: actor_name.to_string(),
                variant: ActionResultVariant::Move,
                success: true,
                reason: None,
                damage_dealt: None,
                healing_done: None,
                new_position: Some(target_position),
                target_id: None,
                ability_used: None,
            }
        }
        Err(reason) => ActionResult::failure(actor_id, actor_name, ActionResultVariant::Move, reason),
    }
}

fn resolve_basic_attack(state: &mut GameState, actor_id: &str, actor_name: &str, target_id: &str) -> ActionResult {
    let Some(actor) = state.combatant(actor_id) else {
        log::warn!("attack submitted for unknown actor {actor_id}");
        return ActionResult::failure(actor_id, actor_name, ActionResultVariant::Attack, "unknown actor");
    };
    if !actor.status().can_act() {
        return ActionResult::failure(actor_id, actor_name, ActionResultVariant::Attack, "status effects prevent acting");
    }
    let actor_position = actor.position();
    let raw = (actor.stats().calculate_damage_output(None) as f64 * actor.status().damage_modifier()).max(0.0);

    let Some(target) = state.combatant(target_id) else {
        log::warn!("attack from {actor_id} referenced unknown target {target_id}");
        return ActionResult::failure(actor_id, actor_name, ActionResultVariant::Attack, "unknown target");
    };
    if !target.is_alive() {
        return ActionResult::failure(actor_id, actor_name, ActionResultVariant::Attack, "target is dead");
    }
    if !target.can_be_targeted() {
        return ActionResult::failure(actor_id, actor_name, ActionResultVariant::Attack, "target cannot be targeted");
    }
    if actor_position.distance(&target.position()) > 1 {
        return ActionResult::failure(actor_id, actor_name, ActionResultVariant::Attack, "out of range");
    }
    let target_armor = target.effective_armor();
    let taken_modifier = target.status().damage_taken_modifier();
    let adjusted = (raw * taken_modifier).round().max(0.0) as u32;

    let outcome = state
        .combatant_mut(target_id)
        .expect("target existence already checked")
        .stats_mut()
        .take_damage(adjusted, target_armor);

    maybe_emit_attack_threat(state, actor_id, target_id, outcome.damage_dealt);

    ActionResult {
        entity_id: actor_id.to_string(),
        entity_name: actor_name.to_string(),
        variant: ActionResultVariant::Attack,
        success: true,
        reason: None,
        damage_dealt: Some(outcome.damage_dealt),
        healing_done: None,
        new_position: None,
        target_id: Some(target_id.to_string()),
        ability_used: None,
    }
}

fn resolve_ability(
    state: &mut GameState,
    actor_id: &str,
    actor_name: &str,
    ability_id: &str,
    target_id: Option<String>,
    target_position: Option<Hex>,
) -> ActionResult {
    let Some(actor) = state.combatant(actor_id) else {
        log::warn!("ability {ability_id} submitted for unknown actor {actor_id}");
        return ActionResult::failure(actor_id, actor_name, ActionResultVariant::Ability, "unknown actor");
    };
    if !actor.status().can_act() {
        return ActionResult::failure(actor_id, actor_name, ActionResultVariant::Ability, "status effects prevent acting");
    }
    let Some(def) = actor.abilities().get(ability_id).cloned() else {
        return ActionResult::failure(actor_id, actor_name, ActionResultVariant::Ability, "unknown ability");
    };
    let actor_position = actor.position();
    let actor_damage_modifier = actor.status().damage_modifier();

    if let Err(reason) = state
        .combatant_mut(actor_id)
        .expect("actor existence already checked")
        .abilities_mut()
        .use_ability(ability_id)
    {
        return ActionResult::failure(actor_id, actor_name, ActionResultVariant::Ability, reason);
    }

    // Spec.md §4.8: require a target for attack abilities (unless they're
    // AoE, which targets by position/area instead) and for healing/defense
    // abilities only once they have a nonzero range — a range-0 heal falls
    // through to `resolve_ability_heal`'s self-default.
    let requires_target = match def.kind {
        AbilityKind::Attack => def.area_of_effect.is_none(),
        AbilityKind::Healing | AbilityKind::Defense => def.range > 0,
        _ => false,
    };
    if requires_target && target_id.is_none() && target_position.is_none() {
        return ActionResult::failure(actor_id, actor_name, ActionResultVariant::Ability, "missing required target");
    }

    match def.kind {
        AbilityKind::Attack if def.area_of_effect.is_some() => {
            resolve_ability_aoe_attack(state, actor_id, actor_name, &def, actor_position, actor_damage_modifier)
        }
        AbilityKind::Attack => resolve_ability_single_attack(
            state,
            actor_id,
            actor_name,
            &def,
            actor_position,
            actor_damage_modifier,
            target_id,
        ),
        AbilityKind::Healing => resolve_ability_heal(state, actor_id, actor_name, &def, target_id),
        _ => ActionResult {
            entity_id: actor_id.to_string(),
            entity_name: actor_name.to_string(),
            variant: ActionResultVariant::Ability,
            success: true,
            reason: None,
            damage_dealt: None,
            healing_done: None,
            new_position: None,
            target_id: None,
            ability_used: Some(def.id.clone()),
        },
    }
}

fn resolve_ability_single_attack(
    state: &mut GameState,
    actor_id: &str,
    actor_name: &str,
    def: &crate::abilities::AbilityDefinition,
    actor_position: Hex,
    actor_damage_modifier: f64,
    target_id: Option<String>,
) -> ActionResult {
    let Some(target_id) = target_id else {
        return ActionResult::failure(actor_id, actor_name, ActionResultVariant::Ability, "missing required target");
    };
    let Some(target) = state.combatant(&target_id) else {
        log::warn!("ability {} from {actor_id} referenced unknown target {target_id}", def.id);
        return ActionResult::failure(actor_id, actor_name, ActionResultVariant::Ability, "unknown target");
    };
    if !target.is_alive() {
        return ActionResult::failure(actor_id, actor_name, ActionResultVariant::Ability, "target is dead");
    }
    if actor_position.distance(&target.position()) > def.range as i32 {
        return ActionResult::failure(actor_id, actor_name, ActionResultVariant::Ability, "out of range");
    }
    let target_armor = target.effective_armor();
    let taken_modifier = target.status().damage_taken_modifier();
    let raw = (def.damage.unwrap_or(0) as f64 * actor_damage_modifier * taken_modifier).round().max(0.0) as u32;

    let outcome = state
        .combatant_mut(&target_id)
        .expect("target existence already checked")
        .stats_mut()
        .take_damage(raw, target_armor);

    maybe_emit_attack_threat(state, actor_id, &target_id, outcome.damage_dealt);
    apply_status_effects(state, &target_id, &def.status_effects);

    ActionResult {
        entity_id: actor_id.to_string(),
        entity_name: actor_name.to_string(),
        variant: ActionResultVariant::Ability,
        success: true,
        reason: None,
        damage_dealt: Some(outcome.damage_dealt),
        healing_done: None,
        new_position: None,
        target_id: Some(target_id),
        ability_used: Some(def.id.clone()),
    }
}

/// A self-centered AoE attack (e.g. whirlwind): hits every living enemy
/// within `def.range` of the actor's position.
fn resolve_ability_aoe_attack(
    state: &mut GameState,
    actor_id: &str,
    actor_name: &str,
    def: &crate::abilities::AbilityDefinition,
    actor_position: Hex,
    actor_damage_modifier: f64,
) -> ActionResult {
    let enemy_ids = state.enemy_ids(actor_id);
    let mut total_damage = 0u32;
    let mut any_hit = false;

    for enemy_id in enemy_ids {
        let Some(enemy) = state.combatant(&enemy_id) else { continue };
        if actor_position.distance(&enemy.position()) > def.range as i32 {
            continue;
        }
        let armor = enemy.effective_armor();
        let taken_modifier = enemy.status().damage_taken_modifier();
        let raw = (def.damage.unwrap_or(0) as f64 * actor_damage_modifier * taken_modifier).round().max(0.0) as u32;
        let outcome = state
            .combatant_mut(&enemy_id)
            .expect("enemy existence already checked")
            .stats_mut()
            .take_damage(raw, armor);
        total_damage += outcome.damage_dealt;
        any_hit = true;
        maybe_emit_attack_threat(state, actor_id, &enemy_id, outcome.damage_dealt);
        apply_status_effects(state, &enemy_id, &def.status_effects);
    }

    ActionResult {
        entity_id: actor_id.to_string(),
        entity_name: actor_name.to_string(),
        variant: ActionResultVariant::Ability,
        success: true,
        reason: if any_hit { None } else { Some("no targets in range".to_string()) },
        damage_dealt: Some(total_damage),
        healing_done: None,
        new_position: None,
        target_id: None,
        ability_used: Some(def.id.clone()),
    }
}

fn resolve_ability_heal(
    state: &mut GameState,
    actor_id: &str,
    actor_name: &str,
    def: &crate::abilities::AbilityDefinition,
    target_id: Option<String>,
) -> ActionResult {
    let target_id = target_id.unwrap_or_else(|| actor_id.to_string());
    let Some(target) = state.combatant(&target_id) else {
        return ActionResult::failure(actor_id, actor_name, ActionResultVariant::Ability, "unknown target");
    };
    if !target.is_alive() {
        return ActionResult::failure(actor_id, actor_name, ActionResultVariant::Ability, "target is dead");
    }
    let actor_position = state.combatant(actor_id).map(|c| c.position());
    if let Some(actor_position) = actor_position {
        if actor_position.distance(&target.position()) > def.range as i32 {
            return ActionResult::failure(actor_id, actor_name, ActionResultVariant::Ability, "out of range");
        }
    }
    let healing_modifier = target.status().healing_modifier();
    let raw = (def.healing.unwrap_or(0) as f64 * healing_modifier).round().max(0.0) as u32;

    let healed = state
        .combatant_mut(&target_id)
        .expect("target existence already checked")
        .stats_mut()
        .heal(raw);

    apply_status_effects(state, &target_id, &def.status_effects);

    if target_id != actor_id && state.is_player(actor_id) {
        emit_healing_threat_to_all_monsters(state, actor_id, healed);
    }

    ActionResult {
        entity_id: actor_id.to_string(),
        entity_name: actor_name.to_string(),
        variant: ActionResultVariant::Ability,
        success: true,
        reason: None,
        damage_dealt: None,
        healing_done: Some(healed),
        new_position: None,
        target_id: Some(target_id),
        ability_used: Some(def.id.clone()),
    }
}

fn resolve_call_for_help(state: &mut GameState, monster_id: &str, monster_name: &str) -> ActionResult {
    if let Some(monster) = state.monsters.iter_mut().find(|m| m.id == monster_id) {
        monster.reinforcement_requested = true;
    }
    ActionResult {
        entity_id: monster_id.to_string(),
        entity_name: monster_name.to_string(),
        variant: ActionResultVariant::CallForHelp,
        success: true,
        reason: Some("reinforcements requested".to_string()),
        damage_dealt: None,
        healing_done: None,
        new_position: None,
        target_id: None,
        ability_used: None,
    }
}

/// Threat is tracked only on monsters; when an attack's target is a
/// monster, credit the attacker's own armor against it (spec.md §8
/// scenario 3: `playerArmor` is the attacker's own armor, not the
/// target's — see DESIGN.md Open Questions).
fn maybe_emit_attack_threat(state: &mut GameState, attacker_id: &str, target_id: &str, damage_dealt: u32) {
    if damage_dealt == 0 {
        return;
    }
    let Some(attacker_armor) = state.combatant(attacker_id).map(|c| c.effective_armor()) else {
        return;
    };
    if let Some(monster) = state.monsters.iter_mut().find(|m| m.id == target_id) {
        monster.threat.update(
            attacker_id,
            ThreatUpdate {
                damage_to_self: damage_dealt as f64,
                total_damage_dealt: damage_dealt as f64,
                healing_done: 0.0,
                player_armor: attacker_armor as f64,
            },
        );
    }
}

fn emit_healing_threat_to_all_monsters(state: &mut GameState, healer_id: &str, healing_done: u32) {
    if healing_done == 0 {
        return;
    }
    for monster in state.monsters.iter_mut().filter(|m| m.is_alive()) {
        monster.threat.update(
            healer_id,
            ThreatUpdate {
                damage_to_self: 0.0,
                total_damage_dealt: 0.0,
                healing_done: healing_done as f64,
                player_armor: 0.0,
            },
        );
    }
}

fn apply_status_effects(state: &mut GameState, target_id: &str, effects: &[crate::abilities::AbilityStatusEffect]) {
    for effect in effects {
        if rng::unit() < effect.chance {
            if let Some(target) = state.combatant_mut(target_id) {
                let _ = target.status_mut().add_effect(effect.name, effect.duration, effect.value);
            }
        }
    }
}

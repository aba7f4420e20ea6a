//! Diagnostic invariant checks over a `GameState`. Spec.md §7/§8: internal
//! inconsistencies are never silently repaired, only surfaced here for
//! tests and tooling.

use crate::entity::Combatant;
use crate::state::{GameState, Phase};
use std::collections::HashSet;

/// Returns every invariant violation found, empty if the state is
/// consistent. Never mutates `state`.
pub fn validate_game_state(state: &GameState) -> Vec<String> {
    let mut violations = Vec::new();

    let mut ids = HashSet::new();
    for p in &state.players {
        if !ids.insert(p.id.clone()) {
            violations.push(format!("duplicate entity id: {}", p.id));
        }
    }
    for m in &state.monsters {
        if !ids.insert(m.id.clone()) {
            violations.push(format!("duplicate entity id: {}", m.id));
        }
    }

    let mut seen_positions: HashSet<String> = HashSet::new();
    for p in state.players.iter().filter(|p| p.is_alive()) {
        let key = p.position().key();
        if !seen_positions.insert(key.clone()) {
            violations.push(format!("duplicate position among alive entities: {}", key));
        }
    }
    for m in state.monsters.iter().filter(|m| m.is_alive()) {
        let key = m.position().key();
        if !seen_positions.insert(key.clone()) {
            violations.push(format!("duplicate position among alive entities: {}", key));
        }
    }

    for p in &state.players {
        check_entity_invariants(&mut violations, &p.id, p);
    }
    for m in &state.monsters {
        check_entity_invariants(&mut violations, &m.id, m);
    }

    match state.phase {
        Phase::Setup => {
            if state.current_round > 0 {
                violations.push("current_round > 0 while phase is setup".to_string());
            }
        }
        Phase::Ended => {
            if state.winner.is_none() {
                violations.push("phase is ended but winner is unset".to_string());
            }
        }
        Phase::Playing => {
            if state.current_round == 0 {
                violations.push("phase is playing but current_round is 0".to_string());
            }
        }
    }

    violations
}

fn check_entity_invariants(violations: &mut Vec<String>, id: &str, entity: &impl Combatant) {
    if entity.current_hp() > entity.max_hp() {
        violations.push(format!("{}: current_hp exceeds max_hp", id));
    }
    if entity.is_alive() != (entity.current_hp() > 0) {
        violations.push(format!("{}: is_alive disagrees with current_hp", id));
    }
    if entity.effective_armor() < entity.stats().base.base_armor {
        violations.push(format!("{}: effective armor below base armor", id));
    }
}

pub fn is_valid(state: &GameState) -> bool {
    validate_game_state(state).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::AbilitySet;
    use crate::entity::Player;
    use crate::hex::Hex;
    use crate::stats::BaseStats;

    fn base() -> BaseStats {
        BaseStats { max_hp: 100, base_armor: 2, base_damage: 15, movement_range: 3 }
    }

    #[test]
    fn fresh_state_has_no_violations() {
        let player = Player::new("p1", "Hero", base(), Hex::from_axial(0, 0), AbilitySet::new(vec![]));
        let state = GameState::new(vec![player], vec![], Default::default());
        assert!(validate_game_state(&state).is_empty());
    }

    #[test]
    fn duplicate_ids_are_reported() {
        let p1 = Player::new("dup", "A", base(), Hex::from_axial(0, 0), AbilitySet::new(vec![]));
        let p2 = Player::new("dup", "B", base(), Hex::from_axial(1, 0), AbilitySet::new(vec![]));
        let state = GameState::new(vec![p1, p2], vec![], Default::default());
        let violations = validate_game_state(&state);
        assert!(violations.iter().any(|v| v.contains("duplicate entity id")));
    }

    #[test]
    fn overlapping_positions_among_alive_entities_are_reported() {
        let p1 = Player::new("p1", "A", base(), Hex::from_axial(0, 0), AbilitySet::new(vec![]));
        let p2 = Player::new("p2", "B", base(), Hex::from_axial(0, 0), AbilitySet::new(vec![]));
        let state = GameState::new(vec![p1, p2], vec![], Default::default());
        let violations = validate_game_state(&state);
        assert!(violations.iter().any(|v| v.contains("duplicate position")));
    }
}

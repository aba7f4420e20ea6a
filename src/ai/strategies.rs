//! The six AI strategies, one function each, dispatched from `ai::decide`
//! after behavior rules have had first refusal. Spec.md §4.7.

use super::context::{EntityView, TargetingContext};
use super::{attack_lowest_hp, attack_via_threat, kite_from_enemies, most_wounded, nearest, to_candidates, wait};
use crate::abilities::{AbilityKind, AbilitySet};
use crate::action::AIDecision;
use crate::threat::ThreatTable;

/// If any enemy is within distance 2, attack the nearest; else ask threat
/// to pick a target and step toward it; else wait.
pub fn aggressive(self_view: &EntityView, threat: &mut ThreatTable, context: &TargetingContext) -> AIDecision {
    let enemies = context.targetable_enemies();
    let close: Vec<&EntityView> = enemies
        .iter()
        .copied()
        .filter(|e| self_view.position.distance(&e.position) <= 2)
        .collect();

    if let Some(target) = nearest(self_view, &close) {
        if self_view.position.distance(&target.position) <= 1 {
            return AIDecision::Attack {
                target_id: target.id.clone(),
                priority: 8.0,
                reasoning: "aggressive: enemy within range, attacking nearest".to_string(),
            };
        }
        let step = self_view.position.step(&target.position);
        return AIDecision::Move {
            target_position: step,
            priority: 6.0,
            reasoning: "aggressive: closing on nearest enemy".to_string(),
        };
    }

    if !enemies.is_empty() {
        return attack_via_threat(self_view, threat, context);
    }

    wait("aggressive: no enemies")
}

/// Below 40% HP, step toward the hex maximizing minimum distance to
/// enemies; else counterattack an adjacent enemy if one exists; else wait.
pub fn defensive(self_view: &EntityView, context: &TargetingContext) -> AIDecision {
    if self_view.hp_fraction() < 0.4 {
        return kite_from_enemies(self_view, context);
    }
    let enemies = context.targetable_enemies();
    let adjacent = enemies
        .iter()
        .copied()
        .find(|e| self_view.position.distance(&e.position) <= 1);
    match adjacent {
        Some(target) => AIDecision::Attack {
            target_id: target.id.clone(),
            priority: 5.0,
            reasoning: "defensive: counterattacking adjacent enemy".to_string(),
        },
        None => wait("defensive: no adjacent threat"),
    }
}

struct Situation {
    outnumbered: bool,
    advantaged: bool,
    low_hp: bool,
    nearby_enemy_count: usize,
}

fn assess(self_view: &EntityView, context: &TargetingContext) -> Situation {
    let allies = context.targetable_allies().len() + 1; // + self
    let enemies_count = context.targetable_enemies().len();
    let nearby_enemy_count = context
        .targetable_enemies()
        .iter()
        .filter(|e| self_view.position.distance(&e.position) <= 2)
        .count();
    Situation {
        outnumbered: enemies_count > allies,
        advantaged: allies > enemies_count,
        low_hp: self_view.hp_fraction() < 0.4,
        nearby_enemy_count,
    }
}

/// Computes a situation (outnumbered / advantage / low HP / nearby enemy
/// count), then: attacks a threat-selected target within 1; kites when low
/// HP and crowded; attacks an isolated enemy (no ally within 2) or falls
/// back near allies when outnumbered; focuses the weakest enemy when
/// advantaged; defaults to the nearest enemy.
pub fn tactical(self_view: &EntityView, threat: &mut ThreatTable, context: &TargetingContext) -> AIDecision {
    let enemies = context.targetable_enemies();
    if enemies.is_empty() {
        return wait("tactical: no enemies");
    }
    let situation = assess(self_view, context);

    let candidates = to_candidates(&enemies);
    let selection = threat.select_target(&candidates);
    if let Some(id) = &selection.target {
        if let Some(target) = context.enemies.iter().find(|e| &e.id == id) {
            if self_view.position.distance(&target.position) <= 1 {
                let confidence_score = if situation.advantaged {
                    selection.confidence
                } else if situation.low_hp {
                    selection.confidence * 0.5
                } else {
                    selection.confidence * 0.75
                };
                return AIDecision::Attack {
                    target_id: id.clone(),
                    priority: 8.0 * confidence_score,
                    reasoning: format!("tactical: threat target in range ({})", selection.reason),
                };
            }
        }
    }

    if situation.low_hp && situation.nearby_enemy_count >= 2 {
        return kite_from_enemies(self_view, context);
    }

    if situation.outnumbered {
        let allies_all = context.targetable_allies();
        let isolated = enemies.iter().copied().find(|e| {
            !context.targetable_enemies().iter().any(|other| {
                other.id != e.id && e.position.distance(&other.position) <= 2
            })
        });
        if let Some(target) = isolated {
            if self_view.position.distance(&target.position) <= 1 {
                return AIDecision::Attack {
                    target_id: target.id.clone(),
                    priority: 7.0,
                    reasoning: "tactical: outnumbered, striking isolated enemy".to_string(),
                };
            }
            let step = self_view.position.step(&target.position);
            return AIDecision::Move {
                target_position: step,
                priority: 5.0,
                reasoning: "tactical: closing on isolated enemy".to_string(),
            };
        }
        if let Some(ally) = nearest(self_view, &allies_all) {
            let step = self_view.position.step(&ally.position);
            return AIDecision::Move {
                target_position: step,
                priority: 6.0,
                reasoning: "tactical: outnumbered, falling back to allies".to_string(),
            };
        }
    }

    if situation.advantaged {
        return attack_lowest_hp(self_view, &enemies);
    }

    // Default: nearest enemy.
    match nearest(self_view, &enemies) {
        Some(target) if self_view.position.distance(&target.position) <= 1 => AIDecision::Attack {
            target_id: target.id.clone(),
            priority: 5.0,
            reasoning: "tactical: default nearest enemy".to_string(),
        },
        Some(target) => {
            let step = self_view.position.step(&target.position);
            AIDecision::Move {
                target_position: step,
                priority: 4.0,
                reasoning: "tactical: approaching nearest enemy".to_string(),
            }
        }
        None => wait("tactical: no enemies"),
    }
}

/// Always targets the enemy with lowest current HP: attacks if adjacent,
/// else charges one step. Priority escalates below 50% HP.
pub fn berserker(self_view: &EntityView, context: &TargetingContext) -> AIDecision {
    let enemies = context.targetable_enemies();
    let mut decision = attack_lowest_hp(self_view, &enemies);
    if self_view.hp_fraction() < 0.5 {
        let boosted_priority = match &mut decision {
            AIDecision::Attack { priority, .. } => Some(priority),
            AIDecision::Move { priority, .. } => Some(priority),
            _ => None,
        };
        if let Some(p) = boosted_priority {
            *p += 2.0;
        }
    }
    decision
}

/// If any ally is below 60% HP, casts a healing ability on the most
/// wounded; otherwise falls through to the defensive strategy.
pub fn support(self_view: &EntityView, abilities: &AbilitySet, context: &TargetingContext) -> AIDecision {
    let allies = context.targetable_allies();
    if let Some(wounded) = most_wounded(&allies) {
        if wounded.hp_fraction() < 0.6 {
            if let Some(heal_id) = find_ready_ability(abilities, AbilityKind::Healing) {
                return AIDecision::Ability {
                    ability_id: heal_id,
                    target_id: Some(wounded.id.clone()),
                    target_position: None,
                    priority: 7.0,
                    reasoning: "support: healing the most wounded ally".to_string(),
                };
            }
        }
    }
    defensive(self_view, context)
}

/// Only counterattacks when an enemy is adjacent; otherwise waits.
pub fn passive(self_view: &EntityView, context: &TargetingContext) -> AIDecision {
    let adjacent = context
        .targetable_enemies()
        .into_iter()
        .find(|e| self_view.position.distance(&e.position) <= 1);
    match adjacent {
        Some(target) => AIDecision::Attack {
            target_id: target.id.clone(),
            priority: 4.0,
            reasoning: "passive: counterattacking adjacent enemy".to_string(),
        },
        None => wait("passive: no adjacent enemy"),
    }
}

/// Looks up a ready ability of the given kind; a monster definition with no
/// such ability simply yields `None` and the caller falls through.
fn find_ready_ability(abilities: &AbilitySet, kind: AbilityKind) -> Option<String> {
    abilities.ready_ability_of_kind(kind).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::Hex;
    use std::collections::HashSet;

    fn view(id: &str, pos: Hex, hp: u32, max_hp: u32) -> EntityView {
        EntityView {
            id: id.to_string(),
            name: id.to_string(),
            position: pos,
            is_alive: hp > 0,
            current_hp: hp,
            max_hp,
            effective_armor: 0,
            level: 1,
            can_act: true,
            can_move: true,
            can_be_targeted: true,
            movement_range: 3,
            abilities: Vec::new(),
        }
    }

    fn ctx(enemies: Vec<EntityView>, allies: Vec<EntityView>) -> TargetingContext {
        TargetingContext {
            allies,
            enemies,
            obstacles: HashSet::new(),
            occupied: HashSet::new(),
            current_round: 1,
        }
    }

    #[test]
    fn aggressive_attacks_nearby_enemy() {
        let self_view = view("m1", Hex::from_axial(0, 0), 30, 30);
        let enemy = view("p1", Hex::from_axial(1, 0), 50, 50);
        let context = ctx(vec![enemy], vec![]);
        let decision = aggressive(&self_view, &mut ThreatTable::new(Default::default()), &context);
        match decision {
            AIDecision::Attack { target_id, .. } => assert_eq!(target_id, "p1"),
            other => panic!("expected attack, got {:?}", other),
        }
    }

    #[test]
    fn aggressive_waits_with_no_enemies() {
        let self_view = view("m1", Hex::from_axial(0, 0), 30, 30);
        let context = ctx(vec![], vec![]);
        let decision = aggressive(&self_view, &mut ThreatTable::new(Default::default()), &context);
        assert!(matches!(decision, AIDecision::Wait { .. }));
    }

    #[test]
    fn defensive_kites_when_low_hp() {
        let self_view = view("m1", Hex::from_axial(0, 0), 10, 100);
        let enemy = view("p1", Hex::from_axial(1, 0), 50, 50);
        let context = ctx(vec![enemy], vec![]);
        let decision = defensive(&self_view, &context);
        assert!(matches!(decision, AIDecision::Move { .. }));
    }

    #[test]
    fn passive_only_counterattacks_adjacent() {
        let self_view = view("m1", Hex::from_axial(0, 0), 30, 30);
        let far_enemy = view("p1", Hex::from_axial(3, 0), 50, 50);
        let context = ctx(vec![far_enemy], vec![]);
        assert!(matches!(passive(&self_view, &context), AIDecision::Wait { .. }));

        let near_enemy = view("p2", Hex::from_axial(1, 0), 50, 50);
        let context2 = ctx(vec![near_enemy], vec![]);
        assert!(matches!(passive(&self_view, &context2), AIDecision::Attack { .. }));
    }

    #[test]
    fn berserker_targets_lowest_hp_enemy() {
        let self_view = view("m1", Hex::from_axial(0, 0), 30, 30);
        let weak = view("p1", Hex::from_axial(2, 0), 5, 50);
        let strong = view("p2", Hex::from_axial(1, 0), 40, 50);
        let context = ctx(vec![weak, strong], vec![]);
        let decision = berserker(&self_view, &context);
        match decision {
            AIDecision::Move { .. } => {}
            other => panic!("expected a move toward the weak target, got {:?}", other),
        }
    }

    #[test]
    fn support_heals_when_no_heal_ability_falls_through_to_defensive() {
        let self_view = view("m1", Hex::from_axial(0, 0), 30, 30);
        let ally = view("a1", Hex::from_axial(0, 1), 10, 50);
        let enemy = view("p1", Hex::from_axial(1, 0), 50, 50);
        let context = ctx(vec![enemy], vec![ally]);
        let abilities = AbilitySet::new(vec![]);
        let decision = support(&self_view, &abilities, &context);
        // No healing ability registered -> falls through to defensive,
        // which counterattacks the adjacent enemy.
        assert!(matches!(decision, AIDecision::Attack { .. }));
    }
}

//! Monster AI: one strategy per variant, gated by scripted behavior rules.
//! Spec.md §4.7.

pub mod context;
mod strategies;

pub use context::{AbilitySnapshot, EntityView, TargetingContext};

use crate::abilities::AbilitySet;
pub use crate::action::AIDecision;
use crate::behaviors::{self, BehaviorAction, BehaviorCondition, BehaviorRule, FocusPolicy, MoveTarget};
use crate::threat::{TargetCandidate, ThreatTable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiVariant {
    Aggressive,
    Defensive,
    Tactical,
    Berserker,
    Support,
    Passive,
}

/// Evaluates behavior rules (highest priority first); if none fire, calls
/// the strategy for `variant`. Never outlives the call — `context` is an
/// owned snapshot built fresh per decision by the scheduler.
pub fn decide(
    variant: AiVariant,
    self_view: &EntityView,
    self_abilities: &AbilitySet,
    threat: &mut ThreatTable,
    behavior_rules: &[BehaviorRule],
    context: &TargetingContext,
) -> AIDecision {
    for rule in behaviors::ordered(behavior_rules) {
        if condition_holds(&rule.condition, self_view, self_abilities, context) {
            return decision_from_behavior(&rule.action, self_view, self_abilities, threat, context);
        }
    }

    match variant {
        AiVariant::Aggressive => strategies::aggressive(self_view, threat, context),
        AiVariant::Defensive => strategies::defensive(self_view, context),
        AiVariant::Tactical => strategies::tactical(self_view, threat, context),
        AiVariant::Berserker => strategies::berserker(self_view, context),
        AiVariant::Support => strategies::support(self_view, self_abilities, context),
        AiVariant::Passive => strategies::passive(self_view, context),
    }
}

fn condition_holds(
    condition: &BehaviorCondition,
    self_view: &EntityView,
    self_abilities: &AbilitySet,
    context: &TargetingContext,
) -> bool {
    match condition {
        BehaviorCondition::HpBelow { fraction } => self_view.hp_fraction() < *fraction,
        BehaviorCondition::HpAbove { fraction } => self_view.hp_fraction() > *fraction,
        BehaviorCondition::EnemyInRange { distance } => context
            .targetable_enemies()
            .iter()
            .any(|e| self_view.position.distance(&e.position) <= *distance),
        BehaviorCondition::AllyInDanger { fraction } => {
            context.targetable_allies().iter().any(|a| a.hp_fraction() < *fraction)
        }
        BehaviorCondition::CooldownReady { ability_id } => {
            self_abilities.can_use_ability(ability_id).is_ok()
        }
    }
}

fn decision_from_behavior(
    action: &BehaviorAction,
    self_view: &EntityView,
    self_abilities: &AbilitySet,
    threat: &mut ThreatTable,
    context: &TargetingContext,
) -> AIDecision {
    match action {
        BehaviorAction::UseAbility { ability_id } => {
            auto_target_ability(ability_id, self_view, self_abilities, context)
        }
        BehaviorAction::MoveTo { toward } => match toward {
            MoveTarget::NearestEnemy => move_toward_nearest(self_view, &context.targetable_enemies()),
            MoveTarget::NearestAlly => move_toward_nearest(self_view, &context.targetable_allies()),
            MoveTarget::AwayFromEnemies => kite_from_enemies(self_view, context),
        },
        BehaviorAction::Flee => kite_from_enemies(self_view, context),
        BehaviorAction::FocusTarget { policy } => match policy {
            FocusPolicy::LowestHp => attack_lowest_hp(self_view, &context.targetable_enemies()),
            FocusPolicy::Threat => attack_via_threat(self_view, threat, context),
        },
        BehaviorAction::CallForHelp => AIDecision::CallForHelp {
            priority: 9.0,
            reasoning: "behavior rule: call for help".to_string(),
        },
    }
}

fn auto_target_ability(
    ability_id: &str,
    self_view: &EntityView,
    self_abilities: &AbilitySet,
    context: &TargetingContext,
) -> AIDecision {
    use crate::abilities::AbilityKind;
    let def = self_abilities.get(ability_id);
    match def.map(|d| d.kind) {
        Some(AbilityKind::Healing) => {
            if let Some(target) = most_wounded(&context.targetable_allies()) {
                return AIDecision::Ability {
                    ability_id: ability_id.to_string(),
                    target_id: Some(target.id.clone()),
                    target_position: None,
                    priority: 6.0,
                    reasoning: "behavior rule: use healing ability".to_string(),
                };
            }
        }
        Some(AbilityKind::Attack) => {
            if let Some(target) = nearest(self_view, &context.targetable_enemies()) {
                return AIDecision::Ability {
                    ability_id: ability_id.to_string(),
                    target_id: Some(target.id.clone()),
                    target_position: None,
                    priority: 6.0,
                    reasoning: "behavior rule: use attack ability".to_string(),
                };
            }
        }
        _ => {}
    }
    AIDecision::Ability {
        ability_id: ability_id.to_string(),
        target_id: None,
        target_position: None,
        priority: 5.0,
        reasoning: "behavior rule: use ability".to_string(),
    }
}

fn nearest<'a>(self_view: &EntityView, pool: &[&'a EntityView]) -> Option<&'a EntityView> {
    pool.iter()
        .copied()
        .min_by(|a, b| {
            self_view
                .position
                .distance(&a.position)
                .cmp(&self_view.position.distance(&b.position))
                .then_with(|| a.id.cmp(&b.id))
        })
}

fn most_wounded<'a>(pool: &[&'a EntityView]) -> Option<&'a EntityView> {
    pool.iter()
        .copied()
        .min_by(|a, b| {
            a.hp_fraction()
                .partial_cmp(&b.hp_fraction())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        })
}

fn lowest_current_hp<'a>(pool: &[&'a EntityView]) -> Option<&'a EntityView> {
    pool.iter()
        .copied()
        .min_by(|a, b| a.current_hp.cmp(&b.current_hp).then_with(|| a.id.cmp(&b.id)))
}

fn move_toward_nearest(self_view: &EntityView, pool: &[&EntityView]) -> AIDecision {
    match nearest(self_view, pool) {
        Some(target) => {
            let step = self_view.position.step(&target.position);
            AIDecision::Move {
                target_position: step,
                priority: 4.0,
                reasoning: "behavior rule: move toward nearest".to_string(),
            }
        }
        None => wait("no target to move toward"),
    }
}

/// Picks the reachable hex (within 1 step) maximizing the minimum distance
/// to any targetable enemy — used for kiting/fleeing.
fn kite_from_enemies(self_view: &EntityView, context: &TargetingContext) -> AIDecision {
    let enemies = context.targetable_enemies();
    if enemies.is_empty() {
        return wait("no enemies to flee from");
    }
    let candidates = self_view.position.neighbors();
    let best = candidates
        .iter()
        .filter(|h| {
            let key = h.key();
            !context.occupied.contains(&key) && !context.obstacles.contains(&key)
        })
        .max_by(|a, b| {
            let min_a = enemies.iter().map(|e| a.distance(&e.position)).min().unwrap_or(0);
            let min_b = enemies.iter().map(|e| b.distance(&e.position)).min().unwrap_or(0);
            min_a.cmp(&min_b)
        });
    match best {
        Some(hex) => AIDecision::Move {
            target_position: *hex,
            priority: 7.0,
            reasoning: "kiting away from enemies".to_string(),
        },
        None => wait("no safe hex to retreat to"),
    }
}

fn attack_lowest_hp(self_view: &EntityView, pool: &[&EntityView]) -> AIDecision {
    match lowest_current_hp(pool) {
        Some(target) if self_view.position.distance(&target.position) <= 1 => AIDecision::Attack {
            target_id: target.id.clone(),
            priority: 8.0,
            reasoning: "focusing lowest hp target".to_string(),
        },
        Some(target) => {
            let step = self_view.position.step(&target.position);
            AIDecision::Move {
                target_position: step,
                priority: 6.0,
                reasoning: "closing on lowest hp target".to_string(),
            }
        }
        None => wait("no targets"),
    }
}

fn attack_via_threat(self_view: &EntityView, threat: &mut ThreatTable, context: &TargetingContext) -> AIDecision {
    let candidates = to_candidates(&context.targetable_enemies());
    let selection = threat.select_target(&candidates);
    match selection.target {
        Some(id) => {
            let target = context.enemies.iter().find(|e| e.id == id);
            match target {
                Some(t) if self_view.position.distance(&t.position) <= 1 => AIDecision::Attack {
                    target_id: id,
                    priority: 8.0 * selection.confidence,
                    reasoning: format!("threat-selected target: {}", selection.reason),
                },
                Some(t) => {
                    let step = self_view.position.step(&t.position);
                    AIDecision::Move {
                        target_position: step,
                        priority: 5.0,
                        reasoning: format!("advancing on threat-selected target: {}", selection.reason),
                    }
                }
                None => wait("threat-selected target vanished"),
            }
        }
        None => wait("no targets"),
    }
}

fn to_candidates(pool: &[&EntityView]) -> Vec<TargetCandidate> {
    pool.iter()
        .map(|e| TargetCandidate {
            id: e.id.clone(),
            is_alive: e.is_alive,
            hp_fraction: e.hp_fraction(),
        })
        .collect()
}

fn wait(reason: &str) -> AIDecision {
    AIDecision::Wait {
        priority: 0.0,
        reasoning: reason.to_string(),
    }
}

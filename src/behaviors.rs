//! Scripted behavior rules evaluated before strategy dispatch. Spec.md
//! §4.7, parameterized per SPEC_FULL.md §4.10.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BehaviorCondition {
    HpBelow { fraction: f64 },
    HpAbove { fraction: f64 },
    EnemyInRange { distance: i32 },
    AllyInDanger { fraction: f64 },
    CooldownReady { ability_id: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BehaviorAction {
    UseAbility { ability_id: String },
    MoveTo { toward: MoveTarget },
    Flee,
    FocusTarget { policy: FocusPolicy },
    CallForHelp,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MoveTarget {
    NearestEnemy,
    NearestAlly,
    AwayFromEnemies,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FocusPolicy {
    LowestHp,
    Threat,
}

/// One scripted rule: higher `priority` evaluated first; the first whose
/// condition is true yields the monster's action for the round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BehaviorRule {
    pub priority: i32,
    pub condition: BehaviorCondition,
    pub action: BehaviorAction,
}

/// Sorts rules by descending priority so callers can evaluate in order.
/// Stable: equal-priority rules keep their relative (definition) order.
pub fn ordered(rules: &[BehaviorRule]) -> Vec<&BehaviorRule> {
    let mut refs: Vec<&BehaviorRule> = rules.iter().collect();
    refs.sort_by(|a, b| b.priority.cmp(&a.priority));
    refs
}

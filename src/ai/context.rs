//! Read-only snapshots handed to an AI strategy for one decision. Built
//! fresh per call and never outliving it — spec.md §3 Ownership: "AI
//! contexts are constructed per decision and borrow read-only views of
//! allies, enemies, and obstacles; they never outlive the call."

use crate::abilities::AbilityKind;
use crate::entity::Combatant;
use crate::hex::Hex;
use std::collections::HashSet;

/// A cheap, owned snapshot of one combatant's decision-relevant state.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityView {
    pub id: String,
    pub name: String,
    pub position: Hex,
    pub is_alive: bool,
    pub current_hp: u32,
    pub max_hp: u32,
    pub effective_armor: u32,
    pub level: u32,
    pub can_act: bool,
    pub can_move: bool,
    pub can_be_targeted: bool,
    pub movement_range: u32,
    pub abilities: Vec<AbilitySnapshot>,
}

impl EntityView {
    pub fn of<C: Combatant>(c: &C) -> Self {
        EntityView {
            id: c.id().to_string(),
            name: c.name().to_string(),
            position: c.position(),
            is_alive: c.is_alive(),
            current_hp: c.current_hp(),
            max_hp: c.max_hp(),
            effective_armor: c.effective_armor(),
            level: c.level(),
            can_act: c.status().can_act(),
            can_move: c.status().can_move(),
            can_be_targeted: c.can_be_targeted(),
            movement_range: c.stats().base.movement_range,
            abilities: Vec::new(), // self's own ability snapshot is filled separately via `AbilitySnapshot::with_ids`
        }
    }

    pub fn hp_fraction(&self) -> f64 {
        if self.max_hp == 0 {
            0.0
        } else {
            self.current_hp as f64 / self.max_hp as f64
        }
    }

    pub fn targetable(&self) -> bool {
        self.is_alive && self.can_be_targeted
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AbilitySnapshot {
    pub id: String,
    pub kind: AbilityKind,
    pub range: u32,
    pub ready: bool,
}

impl AbilitySnapshot {
    /// Builds snapshots for exactly the ability ids the caller cares about
    /// (`AbilitySet` doesn't expose full iteration — entities own it
    /// exclusively, so the AI only ever asks about ids it already knows).
    pub fn with_ids(set: &crate::abilities::AbilitySet, ids: &[&str]) -> Vec<AbilitySnapshot> {
        ids.iter()
            .filter_map(|id| {
                set.get(id).map(|def| AbilitySnapshot {
                    id: def.id.clone(),
                    kind: def.kind,
                    range: def.range,
                    ready: set.can_use_ability(id).is_ok(),
                })
            })
            .collect()
    }
}

/// The read-only decision context for one monster's turn.
#[derive(Debug, Clone)]
pub struct TargetingContext {
    pub allies: Vec<EntityView>,
    pub enemies: Vec<EntityView>,
    pub obstacles: HashSet<String>,
    pub occupied: HashSet<String>,
    pub current_round: u32,
}

impl TargetingContext {
    pub fn targetable_enemies(&self) -> Vec<&EntityView> {
        self.enemies.iter().filter(|e| e.targetable()).collect()
    }

    pub fn targetable_allies(&self) -> Vec<&EntityView> {
        self.allies.iter().filter(|a| a.targetable()).collect()
    }
}

//! Ability definitions, cooldown tracking, usage accounting. Spec.md §4.4.

use crate::status::StatusEffectName;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilityKind {
    Attack,
    Defense,
    Utility,
    Healing,
    Support,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetType {
    #[serde(rename = "self")]
    SelfTarget,
    Ally,
    Enemy,
    Any,
    Position,
    Area,
}

/// A status effect an ability may apply to its target, with an optional
/// proc chance (default 1.0, per spec.md §4.8).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AbilityStatusEffect {
    pub name: StatusEffectName,
    pub duration: u32,
    pub value: Option<f64>,
    #[serde(default = "default_chance")]
    pub chance: f64,
}

fn default_chance() -> f64 {
    1.0
}

/// An immutable ability definition, supplied by the embedder's class/
/// monster catalog and never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AbilityDefinition {
    pub id: String,
    pub name: String,
    pub kind: AbilityKind,
    pub damage: Option<u32>,
    pub healing: Option<u32>,
    pub range: u32,
    pub cooldown: u32,
    pub target_type: TargetType,
    pub area_of_effect: Option<u32>,
    #[serde(default)]
    pub status_effects: Vec<AbilityStatusEffect>,
}

impl AbilityDefinition {
    pub fn basic_attack() -> Self {
        AbilityDefinition {
            id: "basic_attack".to_string(),
            name: "Basic Attack".to_string(),
            kind: AbilityKind::Attack,
            damage: Some(10),
            healing: None,
            range: 1,
            cooldown: 0,
            target_type: TargetType::Enemy,
            area_of_effect: None,
            status_effects: Vec::new(),
        }
    }

    pub fn wait() -> Self {
        AbilityDefinition {
            id: "wait".to_string(),
            name: "Wait".to_string(),
            kind: AbilityKind::Utility,
            damage: None,
            healing: None,
            range: 0,
            cooldown: 0,
            target_type: TargetType::SelfTarget,
            area_of_effect: None,
            status_effects: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AbilitySet {
    definitions: HashMap<String, AbilityDefinition>,
    /// Ids added at construction vs. temporarily granted (e.g. consumables)
    /// — temporary ones are dropped on `reset_for_encounter`.
    temporary_ids: Vec<String>,
    cooldowns: HashMap<String, u32>,
    usage_counts: HashMap<String, u32>,
}

impl AbilitySet {
    /// Seeds with `basic_attack` and `wait`, then adds every definition
    /// from the embedder's class/monster catalog.
    pub fn new(defined: Vec<AbilityDefinition>) -> Self {
        let mut set = AbilitySet::default();
        set.add_permanent(AbilityDefinition::basic_attack());
        set.add_permanent(AbilityDefinition::wait());
        for def in defined {
            set.add_permanent(def);
        }
        set
    }

    fn add_permanent(&mut self, def: AbilityDefinition) {
        self.definitions.insert(def.id.clone(), def);
    }

    pub fn add_temporary(&mut self, def: AbilityDefinition) {
        self.temporary_ids.push(def.id.clone());
        self.definitions.insert(def.id.clone(), def);
    }

    pub fn get(&self, id: &str) -> Option<&AbilityDefinition> {
        self.definitions.get(id)
    }

    /// First ready (off cooldown, uses remaining) ability of the given kind,
    /// in id order for determinism — `definitions` is a HashMap and iterates
    /// in arbitrary order otherwise.
    pub fn ready_ability_of_kind(&self, kind: AbilityKind) -> Option<&str> {
        let mut ids: Vec<&str> = self
            .definitions
            .values()
            .filter(|def| def.kind == kind)
            .map(|def| def.id.as_str())
            .collect();
        ids.sort_unstable();
        ids.into_iter().find(|id| self.can_use_ability(id).is_ok())
    }

    pub fn remaining_cooldown(&self, id: &str) -> Option<u32> {
        self.cooldowns.get(id).copied()
    }

    /// Fails if unknown, locked (not reachable in this engine — all
    /// granted abilities are usable once known), or on cooldown; the
    /// message includes the remaining rounds.
    pub fn can_use_ability(&self, id: &str) -> Result<(), String> {
        let Some(_def) = self.definitions.get(id) else {
            return Err(format!("unknown ability: {}", id));
        };
        if let Some(remaining) = self.cooldowns.get(id) {
            if *remaining > 0 {
                return Err(format!("{} is on cooldown for {} more round(s)", id, remaining));
            }
        }
        Ok(())
    }

    /// Sets the ability's cooldown (0 means ready again next turn — i.e.
    /// it is cleared by the very next `process_round`) and increments its
    /// usage counter.
    pub fn use_ability(&mut self, id: &str) -> Result<(), String> {
        self.can_use_ability(id)?;
        let cooldown = self.definitions.get(id).map(|d| d.cooldown).unwrap_or(0);
        if cooldown > 0 {
            self.cooldowns.insert(id.to_string(), cooldown);
        }
        *self.usage_counts.entry(id.to_string()).or_insert(0) += 1;
        Ok(())
    }

    pub fn usage_count(&self, id: &str) -> u32 {
        self.usage_counts.get(id).copied().unwrap_or(0)
    }

    /// Decrements all cooldowns by 1, returns the ids that just expired.
    pub fn process_round(&mut self) -> Vec<String> {
        let mut expired = Vec::new();
        self.cooldowns.retain(|id, remaining| {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                expired.push(id.clone());
                false
            } else {
                true
            }
        });
        expired
    }

    /// Removes temporary abilities and clears all cooldowns/usage counts.
    pub fn reset_for_encounter(&mut self) {
        for id in self.temporary_ids.drain(..) {
            self.definitions.remove(&id);
        }
        self.cooldowns.clear();
        self.usage_counts.clear();
    }
}

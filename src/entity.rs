//! Player and monster entities: the common capability set from spec.md §3,
//! composed from the `stats`/`status`/`movement`/`abilities` sub-systems
//! each entity exclusively owns.

use crate::abilities::AbilitySet;
use crate::action::PlayerAction;
use crate::ai::{AIDecision, AiVariant};
use crate::behaviors::BehaviorRule;
use crate::config::ThreatConfig;
use crate::hex::Hex;
use crate::movement::Movement;
use crate::stats::{BaseStats, EntityStats};
use crate::status::StatusEffects;
use crate::threat::ThreatTable;
use serde::{Deserialize, Serialize};

/// Operations shared by both entity variants (spec.md §3's common
/// capability set).
pub trait Combatant {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn is_alive(&self) -> bool;
    fn position(&self) -> Hex;
    fn current_hp(&self) -> u32;
    fn max_hp(&self) -> u32;
    fn level(&self) -> u32;
    fn stats(&self) -> &EntityStats;
    fn stats_mut(&mut self) -> &mut EntityStats;
    fn status(&self) -> &StatusEffects;
    fn status_mut(&mut self) -> &mut StatusEffects;
    fn movement(&self) -> &Movement;
    fn movement_mut(&mut self) -> &mut Movement;
    fn abilities(&self) -> &AbilitySet;
    fn abilities_mut(&mut self) -> &mut AbilitySet;

    /// `base_armor + temporary_armor + shielded bonus`; always
    /// `>= base_armor` (spec.md §8 invariant).
    fn effective_armor(&self) -> u32 {
        self.stats().effective_armor() + self.status().armor_bonus()
    }

    fn can_be_targeted(&self) -> bool {
        self.is_alive() && self.status().can_be_targeted()
    }

    fn hp_fraction(&self) -> f64 {
        if self.max_hp() == 0 {
            0.0
        } else {
            self.current_hp() as f64 / self.max_hp() as f64
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub stats: EntityStats,
    pub status: StatusEffects,
    pub movement: Movement,
    pub abilities: AbilitySet,
    pub submitted_action: Option<PlayerAction>,
}

impl Player {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        base: BaseStats,
        position: Hex,
        abilities: AbilitySet,
    ) -> Self {
        Player {
            id: id.into(),
            name: name.into(),
            stats: EntityStats::new(base, true),
            status: StatusEffects::new(),
            movement: Movement::new(position, base.movement_range),
            abilities,
            submitted_action: None,
        }
    }

    pub fn reset_for_encounter(&mut self, position: Hex) {
        self.stats.current_hp = self.stats.max_hp();
        self.status.clear();
        self.abilities.reset_for_encounter();
        self.movement = Movement::new(position, self.stats.base.movement_range);
        self.submitted_action = None;
    }
}

impl Combatant for Player {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn is_alive(&self) -> bool {
        self.stats.is_alive()
    }
    fn position(&self) -> Hex {
        self.movement.position
    }
    fn current_hp(&self) -> u32 {
        self.stats.current_hp
    }
    fn max_hp(&self) -> u32 {
        self.stats.max_hp()
    }
    fn level(&self) -> u32 {
        self.stats.level
    }
    fn stats(&self) -> &EntityStats {
        &self.stats
    }
    fn stats_mut(&mut self) -> &mut EntityStats {
        &mut self.stats
    }
    fn status(&self) -> &StatusEffects {
        &self.status
    }
    fn status_mut(&mut self) -> &mut StatusEffects {
        &mut self.status
    }
    fn movement(&self) -> &Movement {
        &self.movement
    }
    fn movement_mut(&mut self) -> &mut Movement {
        &mut self.movement
    }
    fn abilities(&self) -> &AbilitySet {
        &self.abilities
    }
    fn abilities_mut(&mut self) -> &mut AbilitySet {
        &mut self.abilities
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Monster {
    pub id: String,
    pub name: String,
    pub stats: EntityStats,
    pub status: StatusEffects,
    pub movement: Movement,
    pub abilities: AbilitySet,
    pub ai_variant: AiVariant,
    pub threat: ThreatTable,
    pub behaviors: Vec<BehaviorRule>,
    pub last_decision: Option<AIDecision>,
    /// Set by `AIDecision::CallForHelp` for one round; see SPEC_FULL.md
    /// §4.11 and DESIGN.md.
    pub reinforcement_requested: bool,
}

impl Monster {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        base: BaseStats,
        position: Hex,
        abilities: AbilitySet,
        ai_variant: AiVariant,
        threat_config: ThreatConfig,
        behaviors: Vec<BehaviorRule>,
    ) -> Self {
        Monster {
            id: id.into(),
            name: name.into(),
            stats: EntityStats::new(base, false),
            status: StatusEffects::new(),
            movement: Movement::new(position, base.movement_range),
            abilities,
            ai_variant,
            threat: ThreatTable::new(threat_config),
            behaviors,
            last_decision: None,
            reinforcement_requested: false,
        }
    }

    pub fn reset_for_encounter(&mut self, position: Hex) {
        self.stats.current_hp = self.stats.max_hp();
        self.status.clear();
        self.abilities.reset_for_encounter();
        self.movement = Movement::new(position, self.stats.base.movement_range);
        self.threat = ThreatTable::new(self.threat.config.clone());
        self.last_decision = None;
        self.reinforcement_requested = false;
    }
}

impl Combatant for Monster {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn is_alive(&self) -> bool {
        self.stats.is_alive()
    }
    fn position(&self) -> Hex {
        self.movement.position
    }
    fn current_hp(&self) -> u32 {
        self.stats.current_hp
    }
    fn max_hp(&self) -> u32 {
        self.stats.max_hp()
    }
    fn level(&self) -> u32 {
        self.stats.level
    }
    fn stats(&self) -> &EntityStats {
        &self.stats
    }
    fn stats_mut(&mut self) -> &mut EntityStats {
        &mut self.stats
    }
    fn status(&self) -> &StatusEffects {
        &self.status
    }
    fn status_mut(&mut self) -> &mut StatusEffects {
        &mut self.status
    }
    fn movement(&self) -> &Movement {
        &self.movement
    }
    fn movement_mut(&mut self) -> &mut Movement {
        &mut self.movement
    }
    fn abilities(&self) -> &AbilitySet {
        &self.abilities
    }
    fn abilities_mut(&mut self) -> &mut AbilitySet {
        &mut self.abilities
    }
}

//! Core combat stats: HP, armor, damage output, leveling. Spec.md §4.2.

use serde::{Deserialize, Serialize};

/// The immutable baseline an entity was created with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BaseStats {
    pub max_hp: u32,
    pub base_armor: u32,
    pub base_damage: u32,
    pub movement_range: u32,
}

/// Result of `EntityStats::take_damage`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DamageOutcome {
    pub damage_dealt: u32,
    pub blocked: u32,
    pub died: bool,
}

/// Benefits granted by a level-up, returned from `add_experience`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LevelUpResult {
    pub levels_gained: u32,
    pub new_level: u32,
    pub damage_modifier: f64,
    pub healed_to_full: bool,
}

/// Mutable combat stats owned exclusively by the entity that holds them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityStats {
    pub base: BaseStats,
    pub current_hp: u32,
    /// Extra armor from effects such as `shielded`; added to `base_armor`
    /// to form `effective_armor` (status modifiers are layered on top by
    /// the owning entity, see `entity.rs`).
    pub temporary_armor: u32,
    pub damage_modifier: f64,
    pub level: u32,
    pub experience: u32,
    pub leveling_enabled: bool,
}

impl EntityStats {
    pub fn new(base: BaseStats, leveling_enabled: bool) -> Self {
        EntityStats {
            base,
            current_hp: base.max_hp,
            temporary_armor: 0,
            damage_modifier: 1.0,
            level: 1,
            experience: 0,
            leveling_enabled,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    pub fn max_hp(&self) -> u32 {
        self.base.max_hp
    }

    pub fn effective_armor(&self) -> u32 {
        self.base.base_armor + self.temporary_armor
    }

    /// `armorReduction = floor(raw * min(0.9, effectiveArmor * 0.1))`,
    /// `netDamage = max(1, raw - armorReduction)`. Dead entities take no
    /// further damage.
    pub fn take_damage(&mut self, raw: u32, effective_armor: u32) -> DamageOutcome {
        if !self.is_alive() {
            return DamageOutcome {
                damage_dealt: 0,
                blocked: 0,
                died: false,
            };
        }
        let reduction_fraction = (effective_armor as f64 * 0.1).min(0.9);
        let blocked = ((raw as f64) * reduction_fraction).floor() as u32;
        let net = (raw.saturating_sub(blocked)).max(1);
        let before = self.current_hp;
        self.current_hp = self.current_hp.saturating_sub(net);
        let dealt = before - self.current_hp;
        DamageOutcome {
            damage_dealt: dealt,
            blocked,
            died: self.current_hp == 0,
        }
    }

    /// Clamp-healing; returns the actual amount healed. Dead entities
    /// cannot be healed.
    pub fn heal(&mut self, raw: u32) -> u32 {
        if !self.is_alive() {
            return 0;
        }
        let before = self.current_hp;
        self.current_hp = (self.current_hp + raw).min(self.max_hp());
        self.current_hp - before
    }

    /// `floor((base ?? baseDamage) * damageModifier)`.
    pub fn calculate_damage_output(&self, base: Option<u32>) -> u32 {
        let base_damage = base.unwrap_or(self.base.base_damage) as f64;
        (base_damage * self.damage_modifier).floor() as u32
    }

    /// Floors the damage modifier at 0.1 (never zero or negative).
    pub fn set_damage_modifier(&mut self, value: f64) {
        self.damage_modifier = value.max(0.1);
    }

    /// Adds `n` experience (coerced to zero if negative input would make no
    /// sense for a `u32`). Only levels up if `leveling_enabled`. One level
    /// per call: threshold is `level * 100`; on level-up, increments level,
    /// subtracts the threshold, adds 0.10 to the damage modifier, and heals
    /// to full.
    pub fn add_experience(&mut self, n: u32) -> Option<LevelUpResult> {
        if !self.leveling_enabled {
            return None;
        }
        self.experience += n;
        let threshold = self.level * 100;
        if self.experience < threshold {
            return None;
        }
        self.experience -= threshold;
        self.level += 1;
        self.damage_modifier += 0.10;
        self.current_hp = self.max_hp();
        Some(LevelUpResult {
            levels_gained: 1,
            new_level: self.level,
            damage_modifier: self.damage_modifier,
            healed_to_full: true,
        })
    }
}

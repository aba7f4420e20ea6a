//! The status-effect engine: catalog, stacking, per-round ticks, modifier
//! queries. Spec.md §4.3.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusEffectName {
    Poison,
    Burning,
    Regeneration,
    Shielded,
    Vulnerable,
    Weakened,
    Enraged,
    Blessed,
    Cursed,
    Stunned,
    Frozen,
    Invisible,
}

/// Fixed catalog iteration order, used by `process_round` so ticks are
/// emitted deterministically regardless of insertion order.
pub const CATALOG_ORDER: [StatusEffectName; 12] = [
    StatusEffectName::Poison,
    StatusEffectName::Burning,
    StatusEffectName::Regeneration,
    StatusEffectName::Shielded,
    StatusEffectName::Vulnerable,
    StatusEffectName::Weakened,
    StatusEffectName::Enraged,
    StatusEffectName::Blessed,
    StatusEffectName::Cursed,
    StatusEffectName::Stunned,
    StatusEffectName::Frozen,
    StatusEffectName::Invisible,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectCategory {
    Buff,
    Debuff,
    Control,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogEntry {
    pub stackable: bool,
    pub max_stacks: Option<u32>,
    pub category: EffectCategory,
}

/// Static catalog config per spec.md §3: poison/burning are stackable DoTs
/// (poison to 5 stacks, burning to 3 — the spec's "5/3" shorthand, resolved
/// here and recorded in DESIGN.md), regeneration stacks to 3, shielded
/// stacks to 10. Everything else is non-stackable.
pub fn catalog_entry(name: StatusEffectName) -> CatalogEntry {
    use StatusEffectName::*;
    match name {
        Poison => CatalogEntry {
            stackable: true,
            max_stacks: Some(5),
            category: EffectCategory::Debuff,
        },
        Burning => CatalogEntry {
            stackable: true,
            max_stacks: Some(3),
            category: EffectCategory::Debuff,
        },
        Regeneration => CatalogEntry {
            stackable: true,
            max_stacks: Some(3),
            category: EffectCategory::Buff,
        },
        Shielded => CatalogEntry {
            stackable: true,
            max_stacks: Some(10),
            category: EffectCategory::Buff,
        },
        Vulnerable => CatalogEntry {
            stackable: false,
            max_stacks: None,
            category: EffectCategory::Debuff,
        },
        Weakened => CatalogEntry {
            stackable: false,
            max_stacks: None,
            category: EffectCategory::Debuff,
        },
        Enraged => CatalogEntry {
            stackable: false,
            max_stacks: None,
            category: EffectCategory::Buff,
        },
        Blessed => CatalogEntry {
            stackable: false,
            max_stacks: None,
            category: EffectCategory::Buff,
        },
        Cursed => CatalogEntry {
            stackable: false,
            max_stacks: None,
            category: EffectCategory::Debuff,
        },
        Stunned => CatalogEntry {
            stackable: false,
            max_stacks: None,
            category: EffectCategory::Control,
        },
        Frozen => CatalogEntry {
            stackable: false,
            max_stacks: None,
            category: EffectCategory::Control,
        },
        Invisible => CatalogEntry {
            stackable: false,
            max_stacks: None,
            category: EffectCategory::Buff,
        },
    }
}

/// An active instance of a status effect on some entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ActiveStatusEffect {
    pub base_value: Option<f64>,
    pub stacks: u32,
    pub duration: u32,
}

impl ActiveStatusEffect {
    /// `baseValue * stacks`, linear (never exponential — see spec.md §9).
    pub fn effective_value(&self) -> f64 {
        self.base_value.unwrap_or(0.0) * self.stacks as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TickKind {
    PoisonDamage,
    BurningDamage,
    RegenerationHeal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickEvent {
    pub kind: TickKind,
    pub value: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RoundTickResult {
    pub ticks: Vec<TickEvent>,
    pub expired: Vec<StatusEffectName>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatusEffects {
    active: HashMap<StatusEffectName, ActiveStatusEffect>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: StatusEffectName) -> Option<&ActiveStatusEffect> {
        self.active.get(&name)
    }

    pub fn has(&self, name: StatusEffectName) -> bool {
        self.active.contains_key(&name)
    }

    /// Adds or restacks an effect per spec.md §4.3. Returns `Ok(())` on
    /// success or `Err(reason)` matching the spec's stable failure strings.
    pub fn add_effect(
        &mut self,
        name: StatusEffectName,
        duration: u32,
        value: Option<f64>,
    ) -> Result<(), String> {
        let entry = catalog_entry(name);
        match self.active.get(&name).copied() {
            Some(existing) => {
                if entry.stackable {
                    let max_stacks = entry.max_stacks.unwrap_or(u32::MAX);
                    if existing.stacks >= max_stacks {
                        return Err("stack limit reached".to_string());
                    }
                    self.active.insert(
                        name,
                        ActiveStatusEffect {
                            base_value: existing.base_value,
                            stacks: existing.stacks + 1,
                            duration: existing.duration.max(duration),
                        },
                    );
                    Ok(())
                } else {
                    let new_value = value.unwrap_or(0.0);
                    let existing_value = existing.base_value.unwrap_or(0.0);
                    if duration > existing.duration || new_value > existing_value {
                        self.active.insert(
                            name,
                            ActiveStatusEffect {
                                base_value: value,
                                stacks: 1,
                                duration,
                            },
                        );
                        Ok(())
                    } else {
                        Err("already active with better effect".to_string())
                    }
                }
            }
            None => {
                self.active.insert(
                    name,
                    ActiveStatusEffect {
                        base_value: value,
                        stacks: 1,
                        duration,
                    },
                );
                Ok(())
            }
        }
    }

    pub fn remove(&mut self, name: StatusEffectName) {
        self.active.remove(&name);
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Iterates active effects in fixed catalog order, emitting at most one
    /// tick event per DoT/HoT effect, then decrements all durations and
    /// removes expired entries.
    pub fn process_round(&mut self) -> RoundTickResult {
        let mut result = RoundTickResult::default();

        for name in CATALOG_ORDER {
            if let Some(effect) = self.active.get(&name) {
                let value = effect.effective_value();
                let kind = match name {
                    StatusEffectName::Poison => Some(TickKind::PoisonDamage),
                    StatusEffectName::Burning => Some(TickKind::BurningDamage),
                    StatusEffectName::Regeneration => Some(TickKind::RegenerationHeal),
                    _ => None,
                };
                if let Some(kind) = kind {
                    result.ticks.push(TickEvent { kind, value });
                }
            }
        }

        let mut expired = Vec::new();
        for (name, effect) in self.active.iter_mut() {
            effect.duration = effect.duration.saturating_sub(1);
            if effect.duration == 0 {
                expired.push(*name);
            }
        }
        for name in &expired {
            self.active.remove(name);
        }
        result.expired = expired;
        result
    }

    pub fn can_act(&self) -> bool {
        !self.has(StatusEffectName::Stunned) && !self.has(StatusEffectName::Frozen)
    }

    pub fn can_move(&self) -> bool {
        !self.has(StatusEffectName::Stunned) && !self.has(StatusEffectName::Frozen)
    }

    pub fn can_be_targeted(&self) -> bool {
        !self.has(StatusEffectName::Invisible)
    }

    /// `× (1 + enraged.value/100)` if present, `× (1 - weakened.value/100)`
    /// if present. Defaults 50 and 25 respectively when value unset.
    pub fn damage_modifier(&self) -> f64 {
        let mut m = 1.0;
        if let Some(e) = self.get(StatusEffectName::Enraged) {
            m *= 1.0 + e.base_value.unwrap_or(50.0) / 100.0;
        }
        if let Some(w) = self.get(StatusEffectName::Weakened) {
            m *= 1.0 - w.base_value.unwrap_or(25.0) / 100.0;
        }
        m
    }

    /// `× (1 + vulnerable.value/100)`; default 50.
    pub fn damage_taken_modifier(&self) -> f64 {
        if let Some(v) = self.get(StatusEffectName::Vulnerable) {
            1.0 + v.base_value.unwrap_or(50.0) / 100.0
        } else {
            1.0
        }
    }

    /// `× (1 + blessed.value/100) × (1 - cursed.value/100)`; default 50
    /// each.
    pub fn healing_modifier(&self) -> f64 {
        let mut m = 1.0;
        if let Some(b) = self.get(StatusEffectName::Blessed) {
            m *= 1.0 + b.base_value.unwrap_or(50.0) / 100.0;
        }
        if let Some(c) = self.get(StatusEffectName::Cursed) {
            m *= 1.0 - c.base_value.unwrap_or(50.0) / 100.0;
        }
        m
    }

    /// `shielded.effectiveValue()` if present, else 0.
    pub fn armor_bonus(&self) -> u32 {
        self.get(StatusEffectName::Shielded)
            .map(|s| s.effective_value().max(0.0) as u32)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_effect_fails() {
        // All names in this crate's enum are "known" by construction; this
        // documents that the public API surface (entity.rs) rejects string
        // names outside the enum before reaching here.
    }

    #[test]
    fn stackable_restacks_keep_base_value_and_take_max_duration() {
        let mut s = StatusEffects::new();
        s.add_effect(StatusEffectName::Poison, 3, Some(5.0)).unwrap();
        s.add_effect(StatusEffectName::Poison, 2, Some(5.0)).unwrap();
        let p = s.get(StatusEffectName::Poison).unwrap();
        assert_eq!(p.stacks, 2);
        assert_eq!(p.duration, 3); // max(3,2)
        assert_eq!(p.base_value, Some(5.0)); // never multiplied
        assert_eq!(p.effective_value(), 10.0); // linear: 5*2
    }

    #[test]
    fn stackable_rejects_at_max_stacks() {
        let mut s = StatusEffects::new();
        for _ in 0..5 {
            s.add_effect(StatusEffectName::Poison, 1, Some(1.0)).unwrap();
        }
        let err = s.add_effect(StatusEffectName::Poison, 1, Some(1.0));
        assert!(err.is_err());
        assert_eq!(s.get(StatusEffectName::Poison).unwrap().stacks, 5);
    }

    #[test]
    fn non_stackable_rejects_strictly_worse_reapplication() {
        let mut s = StatusEffects::new();
        s.add_effect(StatusEffectName::Vulnerable, 3, Some(50.0)).unwrap();
        let err = s.add_effect(StatusEffectName::Vulnerable, 2, Some(10.0));
        assert!(err.is_err());
        let v = s.get(StatusEffectName::Vulnerable).unwrap();
        assert_eq!(v.duration, 3);
        assert_eq!(v.base_value, Some(50.0));
    }

    #[test]
    fn non_stackable_replaces_on_better_duration_or_value() {
        let mut s = StatusEffects::new();
        s.add_effect(StatusEffectName::Vulnerable, 2, Some(10.0)).unwrap();
        s.add_effect(StatusEffectName::Vulnerable, 5, Some(10.0)).unwrap();
        assert_eq!(s.get(StatusEffectName::Vulnerable).unwrap().duration, 5);
    }

    #[test]
    fn process_round_emits_linear_poison_tick_and_decrements_duration() {
        let mut s = StatusEffects::new();
        s.add_effect(StatusEffectName::Poison, 3, Some(5.0)).unwrap();
        let tick = s.process_round();
        assert_eq!(tick.ticks.len(), 1);
        assert_eq!(tick.ticks[0].kind, TickKind::PoisonDamage);
        assert_eq!(tick.ticks[0].value, 5.0);
        assert_eq!(s.get(StatusEffectName::Poison).unwrap().duration, 2);

        s.add_effect(StatusEffectName::Poison, 3, Some(5.0)).unwrap(); // stacks=2
        let tick2 = s.process_round();
        assert_eq!(tick2.ticks[0].value, 10.0); // linear, not exponential
    }

    #[test]
    fn effect_expires_and_is_removed_after_last_tick() {
        let mut s = StatusEffects::new();
        s.add_effect(StatusEffectName::Poison, 1, Some(5.0)).unwrap();
        let tick = s.process_round();
        assert_eq!(tick.expired, vec![StatusEffectName::Poison]);
        assert!(!s.has(StatusEffectName::Poison));
    }

    #[test]
    fn control_effects_block_act_and_move() {
        let mut s = StatusEffects::new();
        assert!(s.can_act());
        s.add_effect(StatusEffectName::Stunned, 1, None).unwrap();
        assert!(!s.can_act());
        assert!(!s.can_move());
    }

    #[test]
    fn invisible_blocks_targeting_only() {
        let mut s = StatusEffects::new();
        s.add_effect(StatusEffectName::Invisible, 1, None).unwrap();
        assert!(s.can_act());
        assert!(!s.can_be_targeted());
    }

    #[test]
    fn shielded_contributes_linear_armor_bonus() {
        let mut s = StatusEffects::new();
        s.add_effect(StatusEffectName::Shielded, 5, Some(2.0)).unwrap();
        s.add_effect(StatusEffectName::Shielded, 5, Some(2.0)).unwrap();
        assert_eq!(s.armor_bonus(), 4);
    }
}

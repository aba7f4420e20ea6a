//! Per-monster threat accumulator, decay, and target selection. Spec.md
//! §4.6.

use crate::config::{ThreatConfig, MINIMUM_THRESHOLD};
use crate::rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// One round's raw-threat inputs, per spec.md §4.6's update formula.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreatUpdate {
    pub damage_to_self: f64,
    pub total_damage_dealt: f64,
    pub healing_done: f64,
    pub player_armor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct ThreatEntry {
    value: f64,
    /// Bounded history of raw contributions, most recent first, capped at
    /// 10 entries, kept for diagnostics only.
    history: VecDeque<f64>,
}

impl ThreatEntry {
    fn push_history(&mut self, raw: f64) {
        self.history.push_front(raw);
        while self.history.len() > 10 {
            self.history.pop_back();
        }
    }
}

/// A candidate the AI or scheduler considers for targeting: the minimum
/// information `select_target` needs about liveness and HP.
#[derive(Debug, Clone)]
pub struct TargetCandidate {
    pub id: String,
    pub is_alive: bool,
    pub hp_fraction: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult {
    pub target: Option<String>,
    pub reason: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThreatTable {
    pub config: ThreatConfig,
    entries: HashMap<String, ThreatEntry>,
    /// Front = most recently targeted. Deduplicated, truncated to
    /// `config.avoid_last_target_rounds`.
    last_targets: VecDeque<String>,
}

impl ThreatTable {
    pub fn new(config: ThreatConfig) -> Self {
        ThreatTable {
            config,
            entries: HashMap::new(),
            last_targets: VecDeque::new(),
        }
    }

    pub fn threat_of(&self, id: &str) -> f64 {
        self.entries.get(id).map(|e| e.value).unwrap_or(0.0)
    }

    pub fn last_targets(&self) -> &VecDeque<String> {
        &self.last_targets
    }

    /// `raw = armorMultiplier*playerArmor*damageToSelf +
    /// damageMultiplier*totalDamageDealt + healingMultiplier*healingDone`.
    /// Non-positive updates are ignored.
    pub fn update(&mut self, target_id: &str, update: ThreatUpdate) {
        if !self.config.enabled {
            return;
        }
        let raw = self.config.armor_multiplier * update.player_armor * update.damage_to_self
            + self.config.damage_multiplier * update.total_damage_dealt
            + self.config.healing_multiplier * update.healing_done;
        if raw <= 0.0 {
            return;
        }
        let entry = self.entries.entry(target_id.to_string()).or_insert(ThreatEntry {
            value: 0.0,
            history: VecDeque::new(),
        });
        entry.value += raw;
        entry.push_history(raw);
    }

    /// Multiplies every value by `(1 - decayRate)`; drops entries at or
    /// below `MINIMUM_THRESHOLD`.
    pub fn apply_threat_decay(&mut self) {
        if !self.config.enabled {
            return;
        }
        let factor = 1.0 - self.config.decay_rate;
        self.entries.retain(|_, entry| {
            entry.value *= factor;
            entry.value > MINIMUM_THRESHOLD
        });
    }

    /// Confidence is normalized absolute threat magnitude, capped at 1.0,
    /// against a fixed reference scale of 50 threat points — a clear
    /// single-target leader (e.g. 40 threat with no close runner-up) reads
    /// as high confidence without needing a second candidate to compare
    /// against. See DESIGN.md Open Questions.
    fn confidence_from_threat(threat: f64) -> f64 {
        (threat / 50.0).clamp(0.0, 1.0)
    }

    pub fn select_target(&mut self, available: &[TargetCandidate]) -> SelectionResult {
        if !self.config.enabled {
            return SelectionResult {
                target: None,
                reason: "threat disabled".to_string(),
                confidence: 0.0,
            };
        }

        // 1. Drop dead entities from the table.
        let alive_ids: std::collections::HashSet<&str> = available
            .iter()
            .filter(|c| c.is_alive)
            .map(|c| c.id.as_str())
            .collect();
        self.entries.retain(|id, _| alive_ids.contains(id.as_str()));

        let alive: Vec<&TargetCandidate> = available.iter().filter(|c| c.is_alive).collect();
        if alive.is_empty() {
            return SelectionResult {
                target: None,
                reason: "no targets".to_string(),
                confidence: 0.0,
            };
        }

        // 2. pool = available \ recentlyTargeted; if empty, pool = available.
        let recently: std::collections::HashSet<&str> =
            self.last_targets.iter().map(|s| s.as_str()).collect();
        let mut pool: Vec<&TargetCandidate> =
            alive.iter().filter(|c| !recently.contains(c.id.as_str())).copied().collect();
        if pool.is_empty() {
            pool = alive.clone();
        }

        // 3. Keep targets whose threat > MINIMUM_THRESHOLD.
        let mut threatened: Vec<(&TargetCandidate, f64)> = pool
            .iter()
            .map(|c| (*c, self.threat_of(&c.id)))
            .filter(|(_, t)| *t > MINIMUM_THRESHOLD)
            .collect();

        let (chosen_id, reason, confidence) = if threatened.is_empty() {
            if self.config.fallback_to_lowest_hp {
                let mut sorted = pool.clone();
                sorted.sort_by(|a, b| {
                    a.hp_fraction
                        .partial_cmp(&b.hp_fraction)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| a.id.cmp(&b.id))
                });
                (sorted[0].id.clone(), "fallback: lowest hp".to_string(), 0.3)
            } else {
                let chosen = rng::choose(&pool).expect("pool is non-empty");
                (chosen.id.clone(), "fallback: random".to_string(), 0.1)
            }
        } else {
            threatened.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.id.cmp(&b.0.id))
            });
            let max_threat = threatened[0].1;
            let within_margin: Vec<&(&TargetCandidate, f64)> =
                threatened.iter().filter(|(_, t)| (max_threat - t).abs() <= 0.01).collect();
            if self.config.enable_tiebreaker && within_margin.len() > 1 {
                let picked = rng::choose(&within_margin).expect("non-empty");
                (picked.0.id.clone(), "highest threat (tiebreak)".to_string(), Self::confidence_from_threat(picked.1))
            } else {
                // First in deterministic order: sorted by threat desc then
                // id asc, already applied above.
                (threatened[0].0.id.clone(), "highest threat".to_string(), Self::confidence_from_threat(max_threat))
            }
        };

        // 5. Track chosen id: front-insertion, dedup, truncate.
        self.last_targets.retain(|id| id != &chosen_id);
        self.last_targets.push_front(chosen_id.clone());
        while self.last_targets.len() > self.config.avoid_last_target_rounds.max(1) {
            self.last_targets.pop_back();
        }

        SelectionResult {
            target: Some(chosen_id),
            reason,
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(ids: &[&str]) -> Vec<TargetCandidate> {
        ids.iter()
            .map(|id| TargetCandidate {
                id: id.to_string(),
                is_alive: true,
                hp_fraction: 1.0,
            })
            .collect()
    }

    #[test]
    fn non_positive_updates_are_ignored() {
        let mut table = ThreatTable::new(ThreatConfig::default());
        table.update(
            "a",
            ThreatUpdate {
                damage_to_self: 0.0,
                total_damage_dealt: 0.0,
                healing_done: 0.0,
                player_armor: 0.0,
            },
        );
        assert_eq!(table.threat_of("a"), 0.0);
    }

    #[test]
    fn scenario_three_threat_formula_and_selection() {
        // From spec.md §8 scenario 3: A deals 20 dmg (armor 2), B heals 10
        // (armor 2). Defaults: armor 0.5, damage 1.0, healing 1.5.
        let mut table = ThreatTable::new(ThreatConfig::default());
        table.update(
            "A",
            ThreatUpdate {
                damage_to_self: 20.0,
                total_damage_dealt: 20.0,
                healing_done: 0.0,
                player_armor: 2.0,
            },
        );
        table.update(
            "B",
            ThreatUpdate {
                damage_to_self: 0.0,
                total_damage_dealt: 0.0,
                healing_done: 10.0,
                player_armor: 2.0,
            },
        );
        assert_eq!(table.threat_of("A"), 40.0);
        assert_eq!(table.threat_of("B"), 15.0);

        let result = table.select_target(&candidates(&["A", "B"]));
        assert_eq!(result.target, Some("A".to_string()));
        assert!(result.confidence >= 0.8);
    }

    #[test]
    fn decay_drops_entries_below_minimum_threshold() {
        let mut table = ThreatTable::new(ThreatConfig::default());
        table.update(
            "a",
            ThreatUpdate {
                damage_to_self: 0.0,
                total_damage_dealt: 1.0,
                healing_done: 0.0,
                player_armor: 0.0,
            },
        );
        assert_eq!(table.threat_of("a"), 1.0);
        for _ in 0..30 {
            table.apply_threat_decay();
        }
        assert_eq!(table.threat_of("a"), 0.0);
    }

    #[test]
    fn select_target_on_empty_pool_returns_no_targets() {
        let mut table = ThreatTable::new(ThreatConfig::default());
        let result = table.select_target(&[]);
        assert_eq!(result.target, None);
        assert_eq!(result.reason, "no targets");
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn dead_entities_are_dropped_from_table_before_selection() {
        let mut table = ThreatTable::new(ThreatConfig::default());
        table.update(
            "dead",
            ThreatUpdate {
                damage_to_self: 0.0,
                total_damage_dealt: 100.0,
                healing_done: 0.0,
                player_armor: 0.0,
            },
        );
        let candidates = vec![
            TargetCandidate { id: "dead".to_string(), is_alive: false, hp_fraction: 0.0 },
            TargetCandidate { id: "alive".to_string(), is_alive: true, hp_fraction: 1.0 },
        ];
        let result = table.select_target(&candidates);
        assert_eq!(result.target, Some("alive".to_string()));
        assert_eq!(table.threat_of("dead"), 0.0);
    }

    #[test]
    fn avoid_last_target_rounds_excludes_recent_pick_when_alternatives_exist() {
        let mut config = ThreatConfig::default();
        config.avoid_last_target_rounds = 1;
        let mut table = ThreatTable::new(config);
        table.update("a", ThreatUpdate { damage_to_self: 0.0, total_damage_dealt: 10.0, healing_done: 0.0, player_armor: 0.0 });
        table.update("b", ThreatUpdate { damage_to_self: 0.0, total_damage_dealt: 9.0, healing_done: 0.0, player_armor: 0.0 });
        let first = table.select_target(&candidates(&["a", "b"]));
        assert_eq!(first.target, Some("a".to_string()));
        let second = table.select_target(&candidates(&["a", "b"]));
        assert_eq!(second.target, Some("b".to_string()));
    }

    #[test]
    fn fallback_to_lowest_hp_when_no_one_is_threatened() {
        let mut config = ThreatConfig::default();
        config.fallback_to_lowest_hp = true;
        let mut table = ThreatTable::new(config);
        let candidates = vec![
            TargetCandidate { id: "full".to_string(), is_alive: true, hp_fraction: 1.0 },
            TargetCandidate { id: "hurt".to_string(), is_alive: true, hp_fraction: 0.2 },
        ];
        let result = table.select_target(&candidates);
        assert_eq!(result.target, Some("hurt".to_string()));
        assert_eq!(result.reason, "fallback: lowest hp");
    }
}

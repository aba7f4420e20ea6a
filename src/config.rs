//! Engine and threat configuration, with defaults matching spec.md §6/§4.6.
//!
//! Mirrors the teacher's `config.rs` pattern: every field has a documented
//! default and `#[serde(default)]` so partial JSON configs deserialize
//! cleanly from an embedder.

use serde::{Deserialize, Serialize};

/// Top-level engine configuration. Extra JSON fields supplied by an
/// embedder are ignored (serde's default behavior for unknown fields).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub max_rounds: u32,
    pub turn_timeout_ms: u64,
    pub auto_progress_after_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_rounds: 20,
            turn_timeout_ms: 30_000,
            auto_progress_after_ms: 5_000,
        }
    }
}

/// Per-monster threat-table configuration, supplied via
/// `MonsterDefinition.threatConfig`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ThreatConfig {
    pub enabled: bool,
    pub decay_rate: f64,
    pub damage_multiplier: f64,
    pub healing_multiplier: f64,
    pub armor_multiplier: f64,
    pub avoid_last_target_rounds: usize,
    pub fallback_to_lowest_hp: bool,
    pub enable_tiebreaker: bool,
}

impl Default for ThreatConfig {
    fn default() -> Self {
        ThreatConfig {
            enabled: true,
            decay_rate: 0.1,
            damage_multiplier: 1.0,
            healing_multiplier: 1.5,
            armor_multiplier: 0.5,
            avoid_last_target_rounds: 1,
            fallback_to_lowest_hp: false,
            enable_tiebreaker: false,
        }
    }
}

/// The minimum threat an entry must retain to stay tracked; entries at or
/// below this after decay are dropped (spec.md §3/§4.6).
pub const MINIMUM_THRESHOLD: f64 = 0.1;

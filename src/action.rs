//! Tagged sum types for player submissions, AI decisions, and action
//! results — spec.md §9's "replace string discriminators with tagged sum
//! types" design note, applied to `PlayerAction`, `AIDecision`, and
//! `ActionResult`.

use crate::hex::Hex;
use serde::{Deserialize, Serialize};

/// One submitted or decided action. `Wait` always succeeds (spec.md §4.8).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum PlayerAction {
    Move {
        #[serde(rename = "targetPosition")]
        target_position: Hex,
    },
    Attack {
        #[serde(rename = "targetId")]
        target_id: String,
    },
    Ability {
        #[serde(rename = "abilityId")]
        ability_id: String,
        #[serde(rename = "targetId", skip_serializing_if = "Option::is_none", default)]
        target_id: Option<String>,
        #[serde(rename = "targetPosition", skip_serializing_if = "Option::is_none", default)]
        target_position: Option<Hex>,
    },
    Wait,
}

/// A full submission from an embedder: which player, which action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerActionSubmission {
    #[serde(rename = "playerId")]
    pub player_id: String,
    #[serde(flatten)]
    pub action: PlayerAction,
}

/// The AI's decision for one monster this round. Every variant carries its
/// own `priority`/`reasoning` (spec.md §4.7's `AIDecision`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum AIDecision {
    Attack {
        #[serde(rename = "targetId")]
        target_id: String,
        priority: f64,
        reasoning: String,
    },
    Ability {
        #[serde(rename = "abilityId")]
        ability_id: String,
        #[serde(rename = "targetId", skip_serializing_if = "Option::is_none", default)]
        target_id: Option<String>,
        #[serde(rename = "targetPosition", skip_serializing_if = "Option::is_none", default)]
        target_position: Option<Hex>,
        priority: f64,
        reasoning: String,
    },
    Move {
        #[serde(rename = "targetPosition")]
        target_position: Hex,
        priority: f64,
        reasoning: String,
    },
    Wait {
        priority: f64,
        reasoning: String,
    },
    /// Resolved open question from spec.md §9 — see SPEC_FULL.md §4.11.
    CallForHelp {
        priority: f64,
        reasoning: String,
    },
}

impl AIDecision {
    pub fn priority(&self) -> f64 {
        match self {
            AIDecision::Attack { priority, .. }
            | AIDecision::Ability { priority, .. }
            | AIDecision::Move { priority, .. }
            | AIDecision::Wait { priority, .. }
            | AIDecision::CallForHelp { priority, .. } => *priority,
        }
    }

    pub fn reasoning(&self) -> &str {
        match self {
            AIDecision::Attack { reasoning, .. }
            | AIDecision::Ability { reasoning, .. }
            | AIDecision::Move { reasoning, .. }
            | AIDecision::Wait { reasoning, .. }
            | AIDecision::CallForHelp { reasoning, .. } => reasoning,
        }
    }
}

/// Tag identifying what kind of action an `ActionResult` reports on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActionResultVariant {
    Move,
    Attack,
    Ability,
    Wait,
    CallForHelp,
}

/// The outcome of resolving one action, produced by the action processor
/// for every player and monster action each round (spec.md §4.8).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub entity_id: String,
    pub entity_name: String,
    pub variant: ActionResultVariant,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub damage_dealt: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub healing_done: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub new_position: Option<Hex>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ability_used: Option<String>,
}

impl ActionResult {
    pub fn failure(entity_id: &str, entity_name: &str, variant: ActionResultVariant, reason: impl Into<String>) -> Self {
        ActionResult {
            entity_id: entity_id.to_string(),
            entity_name: entity_name.to_string(),
            variant,
            success: false,
            reason: Some(reason.into()),
            damage_dealt: None,
            healing_done: None,
            new_position: None,
            target_id: None,
            ability_used: None,
        }
    }
}

/// Result of `submit_player_action`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmitResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl SubmitResult {
    pub fn ok() -> Self {
        SubmitResult { success: true, error: None }
    }
    pub fn err(msg: impl Into<String>) -> Self {
        SubmitResult { success: false, error: Some(msg.into()) }
    }
}

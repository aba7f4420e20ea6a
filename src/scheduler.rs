//! The round scheduler and the `Engine` façade. Spec.md §4.9/§6.

use crate::abilities::AbilitySet;
use crate::action::{ActionResult, PlayerAction, PlayerActionSubmission, SubmitResult};
use crate::ai::{self, EntityView, TargetingContext};
use crate::config::EngineConfig;
use crate::entity::{Combatant, Monster, Player};
use crate::error::{EngineError, EngineResult};
use crate::state::{GameState, Phase, Winner};
use crate::status::{RoundTickResult, StatusEffectName, TickKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntityTickSummary {
    pub entity_id: String,
    pub ticks: Vec<TickSummary>,
    pub expired: Vec<StatusEffectName>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TickSummary {
    pub kind: TickKind,
    pub value: f64,
}

/// The outcome of one `process_round` call. Spec.md §6.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub round_number: u32,
    pub action_results: Vec<ActionResult>,
    pub status_effect_results: Vec<EntityTickSummary>,
    pub game_ended: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub winner: Option<Winner>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reason: Option<String>,
}

impl RoundResult {
    fn inert(round_number: u32) -> Self {
        RoundResult {
            round_number,
            action_results: Vec::new(),
            status_effect_results: Vec::new(),
            game_ended: false,
            winner: None,
            reason: None,
        }
    }
}

/// The narrow programmatic surface an embedder drives. Spec.md §6.
pub struct Engine {
    state: GameState,
    config: EngineConfig,
    round_history: Vec<RoundResult>,
    /// Pause is orthogonal to `phase` (spec.md §3 only names
    /// setup/playing/ended): a paused engine stays in `playing` but
    /// `process_round` returns inert results until `resume`. See
    /// DESIGN.md Open Questions.
    paused: bool,
}

impl Engine {
    /// Constructs a fresh engine in `Phase::Setup`. Fails hard on
    /// construction-time invariant violations per spec.md §7: an empty
    /// entity id, a duplicate entity id across either roster, or two
    /// entities sharing a starting hex.
    pub fn new(players: Vec<Player>, monsters: Vec<Monster>, config: Option<EngineConfig>) -> EngineResult<Self> {
        validate_roster(&players, &monsters)?;
        Ok(Engine {
            state: GameState::new(players, monsters, HashSet::new()),
            config: config.unwrap_or_default(),
            round_history: Vec::new(),
            paused: false,
        })
    }

    pub fn start_game(&mut self) -> Result<(), String> {
        if self.state.phase != Phase::Setup {
            return Err("game already started".to_string());
        }
        self.state.phase = Phase::Playing;
        self.state.current_round = 1;
        Ok(())
    }

    /// Rejects unknown player, dead player, duplicate submission, or a
    /// submission missing its required fields (missing fields cannot be
    /// constructed in this crate's typed `PlayerAction`, so only the
    /// duplicate/liveness/identity checks apply here).
    pub fn submit_player_action(&mut self, submission: PlayerActionSubmission) -> SubmitResult {
        let Some(player) = self.state.players.iter_mut().find(|p| p.id == submission.player_id) else {
            return SubmitResult::err("unknown player");
        };
        if !player.is_alive() {
            return SubmitResult::err("player is dead");
        }
        if player.submitted_action.is_some() {
            return SubmitResult::err("duplicate submission");
        }
        player.submitted_action = Some(submission.action);
        SubmitResult::ok()
    }

    /// Runs the full spec.md §4.9 sequence for one round.
    pub fn process_round(&mut self) -> RoundResult {
        if self.paused || self.state.phase != Phase::Playing {
            return RoundResult::inert(self.state.current_round);
        }
        log::debug!("round {} starting", self.state.current_round);

        if let Some((winner, reason)) = self.state.check_end_condition() {
            return self.finalize_and_record(winner, reason, Vec::new(), Vec::new());
        }

        self.run_monster_decisions();

        let mut action_results = Vec::with_capacity(self.state.players.len() + self.state.monsters.len());
        for i in 0..self.state.players.len() {
            action_results.push(crate::action_resolver::resolve_player_turn(&mut self.state, i));
        }
        for i in 0..self.state.monsters.len() {
            action_results.push(crate::action_resolver::resolve_monster_turn(&mut self.state, i));
        }
        for result in &action_results {
            log::trace!("{} {:?}: success={} reason={:?}", result.entity_id, result.variant, result.success, result.reason);
        }

        let status_effect_results = self.tick_all_status_effects();

        for p in self.state.players.iter_mut() {
            p.movement.reset_for_new_round();
            p.abilities.process_round();
        }
        for m in self.state.monsters.iter_mut() {
            m.movement.reset_for_new_round();
            m.abilities.process_round();
        }

        self.state.recompute_occupied();

        if let Some((winner, reason)) = self.state.check_end_condition() {
            return self.finalize_and_record(winner, reason, action_results, status_effect_results);
        }

        self.state.current_round += 1;
        if self.state.current_round > self.config.max_rounds {
            return self.finalize_and_record(
                Winner::Draw,
                "Maximum rounds reached".to_string(),
                action_results,
                status_effect_results,
            );
        }

        // Threat decay runs once per round, after action resolution. A
        // monster that called for help this round skips its own decay
        // instead of decaying normally, per SPEC_FULL.md §4.11.
        for m in self.state.monsters.iter_mut() {
            if m.reinforcement_requested {
                log::debug!("{} skips threat decay this round (called for help)", m.id);
                m.reinforcement_requested = false;
            } else {
                m.threat.apply_threat_decay();
            }
        }

        let result = RoundResult {
            round_number: self.state.current_round,
            action_results,
            status_effect_results,
            game_ended: false,
            winner: None,
            reason: None,
        };
        self.round_history.push(result.clone());
        result
    }

    fn finalize_and_record(
        &mut self,
        winner: Winner,
        reason: String,
        action_results: Vec<ActionResult>,
        status_effect_results: Vec<EntityTickSummary>,
    ) -> RoundResult {
        self.state.finalize(winner, reason.clone());
        log::info!("game ended at round {}: {:?} ({})", self.state.current_round, winner, reason);
        let result = RoundResult {
            round_number: self.state.current_round,
            action_results,
            status_effect_results,
            game_ended: true,
            winner: Some(winner),
            reason: Some(reason),
        };
        self.round_history.push(result.clone());
        result
    }

    fn run_monster_decisions(&mut self) {
        for i in 0..self.state.monsters.len() {
            if !self.state.monsters[i].is_alive() || !self.state.monsters[i].status.can_act() {
                continue;
            }
            let context = self.build_targeting_context(i);
            let self_view = EntityView::of(&self.state.monsters[i]);
            let variant = self.state.monsters[i].ai_variant;
            let behavior_rules = self.state.monsters[i].behaviors.clone();

            let monster = &mut self.state.monsters[i];
            let decision = ai::decide(variant, &self_view, &monster.abilities, &mut monster.threat, &behavior_rules, &context);
            monster.last_decision = Some(decision);
        }
    }

    fn build_targeting_context(&self, monster_index: usize) -> TargetingContext {
        let self_id = &self.state.monsters[monster_index].id;
        let allies = self
            .state
            .monsters
            .iter()
            .filter(|m| &m.id != self_id)
            .map(EntityView::of)
            .collect();
        let enemies = self.state.players.iter().map(EntityView::of).collect();
        TargetingContext {
            allies,
            enemies,
            obstacles: self.state.obstacles.clone(),
            occupied: self.state.occupied_positions.clone(),
            current_round: self.state.current_round,
        }
    }

    /// Ticks status effects for every entity (alive or not — a dead
    /// entity's tick is a no-op since `take_damage`/`heal` short-circuit on
    /// death), applying DoT/HoT ticks as raw stat changes.
    fn tick_all_status_effects(&mut self) -> Vec<EntityTickSummary> {
        let mut summaries = Vec::with_capacity(self.state.players.len() + self.state.monsters.len());
        for p in self.state.players.iter_mut() {
            let tick = tick_entity(p);
            summaries.push(summarize_tick(&p.id, tick));
        }
        for m in self.state.monsters.iter_mut() {
            let tick = tick_entity(m);
            summaries.push(summarize_tick(&m.id, tick));
        }
        summaries
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Ends the encounter immediately as a draw; thin wrapper over phase
    /// per spec.md §6.
    pub fn stop(&mut self) {
        if self.state.phase != Phase::Ended {
            self.state.finalize(Winner::Draw, "stopped by embedder");
        }
    }

    pub fn reset_for_new_encounter(&mut self, new_players: Option<Vec<Player>>, new_monsters: Option<Vec<Monster>>) {
        self.state.reset_for_encounter(new_players, new_monsters);
        self.round_history.clear();
        self.paused = false;
    }

    pub fn game_state(&self) -> &GameState {
        &self.state
    }

    pub fn current_round(&self) -> u32 {
        self.state.current_round
    }

    pub fn is_game_ended(&self) -> bool {
        self.state.phase == Phase::Ended
    }

    pub fn winner(&self) -> Option<Winner> {
        self.state.winner
    }

    pub fn round_history(&self) -> &[RoundResult] {
        &self.round_history
    }

    pub fn alive_players(&self) -> Vec<&Player> {
        self.state.alive_players()
    }

    pub fn alive_monsters(&self) -> Vec<&Monster> {
        self.state.alive_monsters()
    }

    pub fn get_all_entities(&self) -> Vec<&dyn Combatant> {
        let mut all: Vec<&dyn Combatant> = self.state.players.iter().map(|p| p as &dyn Combatant).collect();
        all.extend(self.state.monsters.iter().map(|m| m as &dyn Combatant));
        all
    }

    pub fn get_entity_by_id(&self, id: &str) -> Option<&dyn Combatant> {
        self.state.combatant(id)
    }
}

/// Construction-time checks per spec.md §7: empty ids and duplicate ids/
/// positions are refused rather than silently accepted (unlike the
/// scheduler's own invariant posture during play, which only surfaces such
/// problems via `validation::validate_game_state`).
fn validate_roster(players: &[Player], monsters: &[Monster]) -> EngineResult<()> {
    use std::collections::HashSet;

    let mut ids = HashSet::new();
    let mut positions = HashSet::new();
    for p in players {
        if p.id.is_empty() {
            return Err(EngineError::InvalidDefinition("player id is empty".to_string()));
        }
        if !ids.insert(p.id.clone()) {
            return Err(EngineError::DuplicateEntityId(p.id.clone()));
        }
        if !positions.insert(p.position().key()) {
            return Err(EngineError::DuplicatePosition(p.position().key()));
        }
    }
    for m in monsters {
        if m.id.is_empty() {
            return Err(EngineError::InvalidDefinition("monster id is empty".to_string()));
        }
        if !ids.insert(m.id.clone()) {
            return Err(EngineError::DuplicateEntityId(m.id.clone()));
        }
        if !positions.insert(m.position().key()) {
            return Err(EngineError::DuplicatePosition(m.position().key()));
        }
    }
    Ok(())
}

fn tick_entity<C: Combatant>(entity: &mut C) -> RoundTickResult {
    let armor = entity.effective_armor();
    let tick = entity.status_mut().process_round();
    for event in &tick.ticks {
        match event.kind {
            TickKind::PoisonDamage | TickKind::BurningDamage => {
                let raw = event.value.round().max(0.0) as u32;
                entity.stats_mut().take_damage(raw, armor);
            }
            TickKind::RegenerationHeal => {
                let raw = event.value.round().max(0.0) as u32;
                entity.stats_mut().heal(raw);
            }
        }
    }
    tick
}

fn summarize_tick(entity_id: &str, tick: RoundTickResult) -> EntityTickSummary {
    EntityTickSummary {
        entity_id: entity_id.to_string(),
        ticks: tick.ticks.into_iter().map(|t| TickSummary { kind: t.kind, value: t.value }).collect(),
        expired: tick.expired,
    }
}

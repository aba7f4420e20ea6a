//! Owns the entity collections, occupancy set, and phase. Spec.md §3 Game
//! state / §4.9's state-manager responsibilities.

use crate::entity::{Combatant, Monster, Player};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Setup,
    Playing,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Players,
    Monsters,
    Draw,
}

/// Owns players, monsters, obstacles, and occupancy. Mutated only by the
/// round scheduler (spec.md §3 Ownership).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameState {
    pub phase: Phase,
    pub current_round: u32,
    pub players: Vec<Player>,
    pub monsters: Vec<Monster>,
    pub obstacles: HashSet<String>,
    pub occupied_positions: HashSet<String>,
    pub winner: Option<Winner>,
    pub end_reason: Option<String>,
}

impl GameState {
    pub fn new(players: Vec<Player>, monsters: Vec<Monster>, obstacles: HashSet<String>) -> Self {
        let mut state = GameState {
            phase: Phase::Setup,
            current_round: 0,
            players,
            monsters,
            obstacles,
            occupied_positions: HashSet::new(),
            winner: None,
            end_reason: None,
        };
        state.recompute_occupied();
        state
    }

    pub fn is_player(&self, id: &str) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    pub fn is_monster(&self, id: &str) -> bool {
        self.monsters.iter().any(|m| m.id == id)
    }

    pub fn combatant(&self, id: &str) -> Option<&dyn Combatant> {
        if let Some(p) = self.players.iter().find(|p| p.id == id) {
            return Some(p);
        }
        self.monsters.iter().find(|m| m.id == id).map(|m| m as &dyn Combatant)
    }

    pub fn combatant_mut(&mut self, id: &str) -> Option<&mut dyn Combatant> {
        if let Some(pos) = self.players.iter().position(|p| p.id == id) {
            return Some(&mut self.players[pos]);
        }
        if let Some(pos) = self.monsters.iter().position(|m| m.id == id) {
            return Some(&mut self.monsters[pos]);
        }
        None
    }

    /// Ids of the opposing faction, alive and targetable, for whichever
    /// faction `actor_id` belongs to.
    pub fn enemy_ids(&self, actor_id: &str) -> Vec<String> {
        if self.is_player(actor_id) {
            self.monsters
                .iter()
                .filter(|m| m.can_be_targeted())
                .map(|m| m.id.clone())
                .collect()
        } else {
            self.players
                .iter()
                .filter(|p| p.can_be_targeted())
                .map(|p| p.id.clone())
                .collect()
        }
    }

    /// Ids of `actor_id`'s own faction, alive and targetable, excluding
    /// `actor_id` itself.
    pub fn ally_ids(&self, actor_id: &str) -> Vec<String> {
        if self.is_player(actor_id) {
            self.players
                .iter()
                .filter(|p| p.id != actor_id && p.can_be_targeted())
                .map(|p| p.id.clone())
                .collect()
        } else {
            self.monsters
                .iter()
                .filter(|m| m.id != actor_id && m.can_be_targeted())
                .map(|m| m.id.clone())
                .collect()
        }
    }

    pub fn alive_players(&self) -> Vec<&Player> {
        self.players.iter().filter(|p| p.is_alive()).collect()
    }

    pub fn alive_monsters(&self) -> Vec<&Monster> {
        self.monsters.iter().filter(|m| m.is_alive()).collect()
    }

    /// Recomputes occupancy from the positions of currently alive entities.
    /// Called after status ticks resolve deaths (spec.md §4.9 step 6).
    pub fn recompute_occupied(&mut self) {
        self.occupied_positions.clear();
        for p in self.players.iter().filter(|p| p.is_alive()) {
            self.occupied_positions.insert(p.position().key());
        }
        for m in self.monsters.iter().filter(|m| m.is_alive()) {
            self.occupied_positions.insert(m.position().key());
        }
    }

    /// Evaluates the end condition from current liveness, per spec.md §8's
    /// boundary behaviors. Does not mutate `phase`/`winner` itself — the
    /// scheduler decides when to finalize.
    pub fn check_end_condition(&self) -> Option<(Winner, String)> {
        let players_alive = self.players.iter().any(|p| p.is_alive());
        let monsters_alive = self.monsters.iter().any(|m| m.is_alive());
        match (players_alive, monsters_alive) {
            (true, true) => None,
            (true, false) => Some((Winner::Players, "All monsters defeated".to_string())),
            (false, true) => Some((Winner::Monsters, "All players defeated".to_string())),
            (false, false) => Some((Winner::Draw, "All combatants defeated".to_string())),
        }
    }

    pub fn finalize(&mut self, winner: Winner, reason: impl Into<String>) {
        self.phase = Phase::Ended;
        self.winner = Some(winner);
        self.end_reason = Some(reason.into());
    }

    /// Clears history and resets every entity to a fresh encounter; returns
    /// to `setup`. Optionally replaces the roster.
    pub fn reset_for_encounter(&mut self, new_players: Option<Vec<Player>>, new_monsters: Option<Vec<Monster>>) {
        if let Some(players) = new_players {
            self.players = players;
        } else {
            for p in self.players.iter_mut() {
                let position = p.position();
                p.reset_for_encounter(position);
            }
        }
        if let Some(monsters) = new_monsters {
            self.monsters = monsters;
        } else {
            for m in self.monsters.iter_mut() {
                let position = m.position();
                m.reset_for_encounter(position);
            }
        }
        self.phase = Phase::Setup;
        self.current_round = 0;
        self.winner = None;
        self.end_reason = None;
        self.recompute_occupied();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::AbilitySet;
    use crate::ai::AiVariant;
    use crate::config::ThreatConfig;
    use crate::hex::Hex;
    use crate::stats::BaseStats;

    fn base() -> BaseStats {
        BaseStats { max_hp: 100, base_armor: 2, base_damage: 15, movement_range: 3 }
    }

    fn sample_player() -> Player {
        Player::new("p1", "Hero", base(), Hex::from_axial(0, 0), AbilitySet::new(vec![]))
    }

    fn sample_monster() -> Monster {
        Monster::new(
            "m1",
            "Goblin",
            base(),
            Hex::from_axial(1, 0),
            AbilitySet::new(vec![]),
            AiVariant::Aggressive,
            ThreatConfig::default(),
            vec![],
        )
    }

    #[test]
    fn recompute_occupied_excludes_dead_entities() {
        let mut state = GameState::new(vec![sample_player()], vec![sample_monster()], HashSet::new());
        assert_eq!(state.occupied_positions.len(), 2);
        state.players[0].stats.current_hp = 0;
        state.recompute_occupied();
        assert_eq!(state.occupied_positions.len(), 1);
    }

    #[test]
    fn end_condition_reports_each_boundary_case() {
        let mut state = GameState::new(vec![sample_player()], vec![sample_monster()], HashSet::new());
        assert!(state.check_end_condition().is_none());

        state.monsters[0].stats.current_hp = 0;
        let (winner, reason) = state.check_end_condition().unwrap();
        assert_eq!(winner, Winner::Players);
        assert_eq!(reason, "All monsters defeated");

        state.players[0].stats.current_hp = 0;
        let (winner, reason) = state.check_end_condition().unwrap();
        assert_eq!(winner, Winner::Draw);
        assert_eq!(reason, "All combatants defeated");
    }

    #[test]
    fn combatant_lookup_finds_both_factions() {
        let state = GameState::new(vec![sample_player()], vec![sample_monster()], HashSet::new());
        assert!(state.combatant("p1").is_some());
        assert!(state.combatant("m1").is_some());
        assert!(state.combatant("nobody").is_none());
    }
}

//! Single-step movement. Spec.md §4.5.

use crate::hex::Hex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movement {
    pub position: Hex,
    pub movement_range: u32,
    pub has_moved_this_round: bool,
    pub history: Vec<Hex>,
}

impl Movement {
    pub fn new(position: Hex, movement_range: u32) -> Self {
        Movement {
            position,
            movement_range,
            has_moved_this_round: false,
            history: vec![position],
        }
    }

    /// All hexes within `movement_range` of the current position,
    /// irrespective of occupancy (callers filter against occupancy/
    /// obstacles separately, e.g. for AI planning).
    pub fn reachable_positions(&self) -> Vec<Hex> {
        self.position.in_range(self.movement_range as i32)
    }

    /// Attempts a single-step move to `target`. Accepted only if: not
    /// already moved this round, `distance(position, target) <=
    /// movement_range`, `target` isn't occupied or an obstacle, and
    /// `can_move` (status-derived) allows it.
    pub fn try_move(
        &mut self,
        target: Hex,
        occupied: &HashSet<String>,
        obstacles: &HashSet<String>,
        can_move: bool,
    ) -> Result<(), String> {
        if !can_move {
            return Err("status effects prevent movement".to_string());
        }
        if self.has_moved_this_round {
            return Err("already moved this round".to_string());
        }
        let distance = self.position.distance(&target);
        if distance > self.movement_range as i32 {
            return Err("target is out of movement range".to_string());
        }
        let key = target.key();
        if occupied.contains(&key) {
            return Err("Position is occupied".to_string());
        }
        if obstacles.contains(&key) {
            return Err("Position is obstructed".to_string());
        }
        self.position = target;
        self.has_moved_this_round = true;
        self.history.push(target);
        Ok(())
    }

    pub fn reset_for_new_round(&mut self) {
        self.has_moved_this_round = false;
    }
}

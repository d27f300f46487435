//! Read-only projection of the live game handed to decision-makers.

use crate::board::{IntersectionId, Seat};
use crate::player::ResourceHand;
use serde::{Deserialize, Serialize};

/// Compact snapshot of the game, produced fresh after every step.
///
/// Snapshots are plain values: holding one never aliases engine state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub turn: u32,
    pub current_seat: Seat,
    pub victory_points: Vec<u32>,
    pub resources: Vec<ResourceHand>,
    pub longest_road_owner: Option<Seat>,
    pub largest_army_owner: Option<Seat>,
    pub robber_position: IntersectionId,
    /// True while over-limit seats still owe a discard
    pub pending_discard: bool,
}

impl GameState {
    pub fn seat_count(&self) -> usize {
        self.victory_points.len()
    }

    /// Resources of one seat
    pub fn resources_of(&self, seat: Seat) -> Option<&ResourceHand> {
        self.resources.get(seat as usize)
    }

    /// Total cards held by one seat
    pub fn total_cards(&self, seat: Seat) -> u32 {
        self.resources_of(seat).map(ResourceHand::total).unwrap_or(0)
    }

    /// Lowest seat holding the most victory points
    pub fn leader(&self) -> Option<Seat> {
        let best = *self.victory_points.iter().max()?;
        self.victory_points
            .iter()
            .position(|&vp| vp == best)
            .map(|i| i as Seat)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GameState {
        GameState {
            turn: 12,
            current_seat: 1,
            victory_points: vec![3, 5, 5, 1],
            resources: vec![
                ResourceHand::uniform(1),
                ResourceHand::new(),
                ResourceHand::single(crate::board::Resource::Ore, 4),
                ResourceHand::new(),
            ],
            longest_road_owner: Some(2),
            largest_army_owner: None,
            robber_position: 6,
            pending_discard: false,
        }
    }

    #[test]
    fn test_leader_is_lowest_seat_at_max() {
        assert_eq!(sample().leader(), Some(1));
    }

    #[test]
    fn test_total_cards() {
        let state = sample();
        assert_eq!(state.total_cards(0), 5);
        assert_eq!(state.total_cards(2), 4);
        assert_eq!(state.total_cards(9), 0);
    }

    #[test]
    fn test_json_shape() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["resources"][2]["ore"], 4);
        assert_eq!(value["pending_discard"], false);
        assert_eq!(value["largest_army_owner"], serde_json::Value::Null);
        assert_eq!(GameState::from_json(&json).unwrap(), sample());
    }
}

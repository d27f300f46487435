//! Player state and resource management.
//!
//! This module contains:
//! - ResourceHand for managing resource counts
//! - Building costs
//! - Player struct with resources, roads and knights played

use crate::actions::ActionError;
use crate::board::{Path, Resource, Seat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A hand of resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    pub brick: u32,
    pub lumber: u32,
    pub wool: u32,
    pub grain: u32,
    pub ore: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(brick: u32, lumber: u32, wool: u32, grain: u32, ore: u32) -> Self {
        Self {
            brick,
            lumber,
            wool,
            grain,
            ore,
        }
    }

    /// Create a hand holding `amount` of every resource
    pub fn uniform(amount: u32) -> Self {
        Self::with_amounts(amount, amount, amount, amount, amount)
    }

    /// Create a hand with a single resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut hand = Self::new();
        hand.add(resource, amount);
        hand
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.brick + self.lumber + self.wool + self.grain + self.ore
    }

    /// Check if hand is empty
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Brick => self.brick,
            Resource::Lumber => self.lumber,
            Resource::Wool => self.wool,
            Resource::Grain => self.grain,
            Resource::Ore => self.ore,
        }
    }

    fn slot(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Brick => &mut self.brick,
            Resource::Lumber => &mut self.lumber,
            Resource::Wool => &mut self.wool,
            Resource::Grain => &mut self.grain,
            Resource::Ore => &mut self.ore,
        }
    }

    /// Set count of a specific resource
    pub fn set(&mut self, resource: Resource, count: u32) {
        *self.slot(resource) = count;
    }

    /// Add resources to hand
    pub fn add(&mut self, resource: Resource, amount: u32) {
        *self.slot(resource) += amount;
    }

    /// Remove exactly `amount` of a resource, or nothing at all
    pub fn take(&mut self, resource: Resource, amount: u32) -> Result<(), ActionError> {
        let held = self.get(resource);
        if held < amount {
            return Err(ActionError::InsufficientResource {
                resource,
                needed: amount,
                held,
            });
        }
        self.set(resource, held - amount);
        Ok(())
    }

    /// Remove up to `amount` of a resource, returning how many were removed
    pub fn take_up_to(&mut self, resource: Resource, amount: u32) -> u32 {
        let removed = self.get(resource).min(amount);
        *self.slot(resource) -= removed;
        removed
    }

    /// Check if can afford a cost
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        Resource::ALL.iter().all(|&r| self.get(r) >= cost.get(r))
    }

    /// Pay a cost in full, or leave the hand untouched
    pub fn try_subtract(&mut self, cost: &ResourceHand) -> Result<(), ActionError> {
        if !self.can_afford(cost) {
            return Err(ActionError::CannotAfford);
        }
        for r in Resource::ALL {
            *self.slot(r) -= cost.get(r);
        }
        Ok(())
    }

    /// The resource held in the largest quantity; ties go to the earliest in
    /// [`Resource::ALL`]
    pub fn most_held(&self) -> (Resource, u32) {
        let mut best = (Resource::ALL[0], self.get(Resource::ALL[0]));
        for r in Resource::ALL.into_iter().skip(1) {
            let count = self.get(r);
            if count > best.1 {
                best = (r, count);
            }
        }
        best
    }

    /// Iterate `(resource, count)` pairs in [`Resource::ALL`] order
    pub fn iter(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        Resource::ALL.into_iter().map(move |r| (r, self.get(r)))
    }
}

/// Building costs
pub mod costs {
    use super::ResourceHand;

    /// Cost to build a road: 1 brick, 1 lumber
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 0, 0)
    }

    /// Cost to build a settlement: 1 brick, 1 lumber, 1 wool, 1 grain
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 1, 1, 0)
    }

    /// Cost to upgrade to city: 2 grain, 3 ore
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 0, 2, 3)
    }
}

/// A single seat's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Seat index
    pub seat: Seat,
    /// Current resources
    pub resources: ResourceHand,
    /// Paths this player holds roads on
    pub roads: BTreeSet<Path>,
    /// Knights played (for Largest Army). No action increments this yet.
    pub knights_played: u32,
}

impl Player {
    pub fn new(seat: Seat) -> Self {
        Self {
            seat,
            resources: ResourceHand::new(),
            roads: BTreeSet::new(),
            knights_played: 0,
        }
    }

    pub fn with_resources(seat: Seat, resources: ResourceHand) -> Self {
        Self {
            resources,
            ..Self::new(seat)
        }
    }

    pub fn total_cards(&self) -> u32 {
        self.resources.total()
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    pub fn can_afford_road(&self) -> bool {
        self.resources.can_afford(&costs::road())
    }

    pub fn can_afford_settlement(&self) -> bool {
        self.resources.can_afford(&costs::settlement())
    }

    pub fn can_afford_city(&self) -> bool {
        self.resources.can_afford(&costs::city())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_hand_total() {
        let hand = ResourceHand::with_amounts(1, 2, 3, 4, 5);
        assert_eq!(hand.total(), 15);
        assert_eq!(hand.get(Resource::Wool), 3);
        assert_eq!(hand.get(Resource::Ore), 5);
    }

    #[test]
    fn test_resource_hand_can_afford() {
        let hand = ResourceHand::uniform(2);
        assert!(hand.can_afford(&ResourceHand::uniform(1)));
        assert!(!hand.can_afford(&ResourceHand::single(Resource::Brick, 3)));
    }

    #[test]
    fn test_try_subtract_is_all_or_nothing() {
        let mut hand = ResourceHand::with_amounts(1, 1, 1, 1, 0);
        assert_eq!(hand.try_subtract(&costs::city()), Err(ActionError::CannotAfford));
        assert_eq!(hand, ResourceHand::with_amounts(1, 1, 1, 1, 0));

        hand.try_subtract(&costs::settlement()).unwrap();
        assert!(hand.is_empty());
    }

    #[test]
    fn test_take_reports_shortfall() {
        let mut hand = ResourceHand::single(Resource::Ore, 3);
        assert_eq!(
            hand.take(Resource::Ore, 4),
            Err(ActionError::InsufficientResource {
                resource: Resource::Ore,
                needed: 4,
                held: 3,
            })
        );
        assert_eq!(hand.get(Resource::Ore), 3);
    }

    #[test]
    fn test_take_up_to_clamps() {
        let mut hand = ResourceHand::single(Resource::Wool, 2);
        assert_eq!(hand.take_up_to(Resource::Wool, 5), 2);
        assert_eq!(hand.take_up_to(Resource::Wool, 1), 0);
        assert!(hand.is_empty());
    }

    #[test]
    fn test_most_held_prefers_earliest_on_tie() {
        let hand = ResourceHand::with_amounts(0, 3, 1, 3, 2);
        assert_eq!(hand.most_held(), (Resource::Lumber, 3));
        assert_eq!(ResourceHand::new().most_held(), (Resource::Lumber, 0));
    }

    #[test]
    fn test_building_costs() {
        assert_eq!(costs::road().total(), 2);
        assert_eq!(costs::settlement().total(), 4);
        assert_eq!(costs::city().total(), 5);
    }

    #[test]
    fn test_player_affordability() {
        let player = Player::with_resources(0, ResourceHand::with_amounts(1, 1, 1, 1, 2));
        assert!(player.can_afford_road());
        assert!(player.can_afford_settlement());
        assert!(!player.can_afford_city());
        assert_eq!(player.total_cards(), 6);
        assert_eq!(player.knights_played, 0);
    }
}

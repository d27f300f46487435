//! Game board representation: intersections, paths and the robber.
//!
//! This module contains:
//! - Resource types and seat identifiers
//! - Buildings that occupy intersections
//! - Paths (board edges) and road ownership
//! - Board validation and query methods
//!
//! The board is a minimal linear topology standing in for a full hex map.
//! Intersections are numbered `0..n` and path `(i, i + 1)` joins each pair of
//! neighbours. Every empty intersection accepts a settlement and every
//! unowned path accepts a road.

use crate::actions::ActionError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Seat index (0..N-1), stable for the whole game
pub type Seat = u8;

/// Intersection identifier
pub type IntersectionId = u8;

/// Number of intersections on the standard board
pub const STANDARD_INTERSECTIONS: u8 = 12;

/// Resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Lumber,
    Brick,
    Wool,
    Grain,
    Ore,
}

impl Resource {
    /// All resource types, in enumeration order
    pub const ALL: [Resource; 5] = [
        Resource::Lumber,
        Resource::Brick,
        Resource::Wool,
        Resource::Grain,
        Resource::Ore,
    ];

    /// Lowercase name used in descriptions and JSON
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Lumber => "lumber",
            Resource::Brick => "brick",
            Resource::Wool => "wool",
            Resource::Grain => "grain",
            Resource::Ore => "ore",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What's built on an intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Building {
    /// Nothing built
    #[default]
    Empty,
    /// Settlement (1 VP)
    Settlement(Seat),
    /// City (2 VP)
    City(Seat),
}

impl Building {
    /// Get the owner of this building, if any
    pub fn owner(&self) -> Option<Seat> {
        match self {
            Building::Empty => None,
            Building::Settlement(s) | Building::City(s) => Some(*s),
        }
    }

    /// Victory points provided by this building
    pub fn victory_points(&self) -> u32 {
        match self {
            Building::Empty => 0,
            Building::Settlement(_) => 1,
            Building::City(_) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Building::Empty)
    }
}

/// A board edge joining two neighbouring intersections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Path {
    pub from: IntersectionId,
    pub to: IntersectionId,
}

impl Path {
    pub fn new(from: IntersectionId, to: IntersectionId) -> Self {
        Self { from, to }
    }

    /// The path leading from `id` to its right-hand neighbour
    pub fn after(id: IntersectionId) -> Self {
        Self::new(id, id + 1)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.from, self.to)
    }
}

/// The complete game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Buildings indexed by intersection id
    intersections: Vec<Building>,
    /// Road owner per path
    paths: BTreeMap<Path, Option<Seat>>,
    /// Current robber location
    robber_location: IntersectionId,
}

impl Board {
    /// Create a linear board with `size` intersections and `size - 1` paths.
    ///
    /// The robber starts on the middle intersection.
    pub fn linear(size: u8) -> Self {
        let paths = (0..size.saturating_sub(1))
            .map(|i| (Path::after(i), None))
            .collect();

        Self {
            intersections: vec![Building::Empty; size as usize],
            paths,
            robber_location: size / 2,
        }
    }

    /// The standard 12-intersection board
    pub fn standard() -> Self {
        Self::linear(STANDARD_INTERSECTIONS)
    }

    pub fn intersection_count(&self) -> usize {
        self.intersections.len()
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Iterate over every intersection in id order
    pub fn intersections(&self) -> impl Iterator<Item = (IntersectionId, Building)> + '_ {
        self.intersections
            .iter()
            .enumerate()
            .map(|(i, b)| (i as IntersectionId, *b))
    }

    /// Iterate over every path in order along the line
    pub fn paths(&self) -> impl Iterator<Item = (Path, Option<Seat>)> + '_ {
        self.paths.iter().map(|(p, owner)| (*p, *owner))
    }

    /// Building at an intersection, or `None` if the id is off the board
    pub fn get_intersection(&self, id: IntersectionId) -> Option<Building> {
        self.intersections.get(id as usize).copied()
    }

    /// Owner of the road on a path, if any
    pub fn road_owner(&self, path: &Path) -> Option<Seat> {
        self.paths.get(path).copied().flatten()
    }

    pub fn has_path(&self, path: &Path) -> bool {
        self.paths.contains_key(path)
    }

    pub fn robber_location(&self) -> IntersectionId {
        self.robber_location
    }

    /// Check whether a settlement may be placed at an intersection
    pub fn check_settlement(&self, id: IntersectionId) -> Result<(), ActionError> {
        match self.get_intersection(id) {
            None => Err(ActionError::NoSuchIntersection(id)),
            Some(Building::Empty) => Ok(()),
            Some(_) => Err(ActionError::IntersectionOccupied(id)),
        }
    }

    /// Check whether `seat` may upgrade the building at an intersection
    pub fn check_city(&self, id: IntersectionId, seat: Seat) -> Result<(), ActionError> {
        match self.get_intersection(id) {
            None => Err(ActionError::NoSuchIntersection(id)),
            Some(Building::Settlement(owner)) if owner == seat => Ok(()),
            Some(Building::City(owner)) if owner == seat => Err(ActionError::AlreadyCity(id)),
            Some(_) => Err(ActionError::NotOwnSettlement(id)),
        }
    }

    /// Check whether a road may be placed on a path (the adjacency rule)
    pub fn check_road(&self, path: &Path) -> Result<(), ActionError> {
        match self.paths.get(path) {
            None => Err(ActionError::NoSuchPath(*path)),
            Some(None) => Ok(()),
            Some(Some(_)) => Err(ActionError::PathTaken(*path)),
        }
    }

    /// Every intersection that can take a new settlement
    pub fn valid_settlement_spots(&self, _seat: Seat) -> Vec<IntersectionId> {
        self.intersections()
            .filter(|(_, b)| b.is_empty())
            .map(|(id, _)| id)
            .collect()
    }

    /// Every path that can take a new road
    pub fn valid_road_spots(&self, _seat: Seat) -> Vec<Path> {
        self.paths()
            .filter(|(p, _)| self.check_road(p).is_ok())
            .map(|(p, _)| p)
            .collect()
    }

    /// Every settlement of `seat` that can be upgraded
    pub fn valid_city_spots(&self, seat: Seat) -> Vec<IntersectionId> {
        self.intersections()
            .filter(|(_, b)| *b == Building::Settlement(seat))
            .map(|(id, _)| id)
            .collect()
    }

    /// Place a settlement, failing without mutation if the spot is taken
    pub fn place_settlement(&mut self, id: IntersectionId, seat: Seat) -> Result<(), ActionError> {
        self.check_settlement(id)?;
        self.intersections[id as usize] = Building::Settlement(seat);
        Ok(())
    }

    /// Upgrade one of `seat`'s settlements to a city
    pub fn upgrade_to_city(&mut self, id: IntersectionId, seat: Seat) -> Result<(), ActionError> {
        self.check_city(id, seat)?;
        self.intersections[id as usize] = Building::City(seat);
        Ok(())
    }

    /// Place a road, failing without mutation if the path is taken
    pub fn place_road(&mut self, path: Path, seat: Seat) -> Result<(), ActionError> {
        self.check_road(&path)?;
        self.paths.insert(path, Some(seat));
        Ok(())
    }

    /// Victory points `seat` earns from its buildings
    pub fn building_points(&self, seat: Seat) -> u32 {
        self.intersections
            .iter()
            .filter(|b| b.owner() == Some(seat))
            .map(Building::victory_points)
            .sum()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

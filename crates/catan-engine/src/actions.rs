//! Game actions that seats can take.
//!
//! This module defines all possible actions in the game, the events that
//! result from those actions, and the errors raised when an action cannot
//! be carried out against the current board.

use crate::board::{IntersectionId, Path, Resource, Seat};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// All possible actions a seat can take
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    // ==================== Building ====================
    /// Build a settlement on an empty intersection
    BuildSettlement { at: IntersectionId },
    /// Build a road on an unowned path
    BuildRoad { path: Path },
    /// Upgrade one of your settlements to a city
    BuildCity { at: IntersectionId },

    // ==================== Trading ====================
    /// Give one unit of a resource to another seat, uncompensated
    GiftTrade { to: Seat, resource: Resource },
    /// Trade 4 of one resource to the bank for 1 of another
    BankTrade { give: Resource, receive: Resource },

    // ==================== Discard Phase ====================
    /// Discard cards after a 7 when holding more than 7
    Discard { resource: Resource, count: u32 },

    // ==================== Turn Management ====================
    /// End your turn (also the no-op answer in the discard phase)
    EndTurn,
}

/// Payload-free action discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    BuildSettlement,
    BuildRoad,
    BuildCity,
    GiftTrade,
    BankTrade,
    Discard,
    EndTurn,
}

impl ActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::BuildSettlement => "BUILD_SETTLEMENT",
            ActionKind::BuildRoad => "BUILD_ROAD",
            ActionKind::BuildCity => "BUILD_CITY",
            ActionKind::GiftTrade => "TRADE",
            ActionKind::BankTrade => "BANK_TRADE",
            ActionKind::Discard => "DISCARD",
            ActionKind::EndTurn => "END_TURN",
        }
    }

    pub fn is_build(&self) -> bool {
        matches!(
            self,
            ActionKind::BuildSettlement | ActionKind::BuildRoad | ActionKind::BuildCity
        )
    }

    pub fn is_trade(&self) -> bool {
        matches!(self, ActionKind::GiftTrade | ActionKind::BankTrade)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::BuildSettlement { .. } => ActionKind::BuildSettlement,
            Action::BuildRoad { .. } => ActionKind::BuildRoad,
            Action::BuildCity { .. } => ActionKind::BuildCity,
            Action::GiftTrade { .. } => ActionKind::GiftTrade,
            Action::BankTrade { .. } => ActionKind::BankTrade,
            Action::Discard { .. } => ActionKind::Discard,
            Action::EndTurn => ActionKind::EndTurn,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.kind().label();
        match self {
            Action::BuildSettlement { at } => write!(f, "{label} at coords={at}"),
            Action::BuildCity { at } => {
                write!(f, "{label} at coords={at} (upgrade settlement to city)")
            }
            Action::BuildRoad { path } => write!(f, "{label} along path={path}"),
            Action::GiftTrade { to, resource } => {
                write!(f, "{label} give 1 {resource} to player {to}")
            }
            Action::BankTrade { give, receive } => {
                write!(f, "{label} give 4 {give} for 1 {receive}")
            }
            Action::Discard { resource, count } => {
                write!(f, "{label} {count} {resource} (required after rolling 7)")
            }
            Action::EndTurn => f.write_str(label),
        }
    }
}

/// Reasons an action could not be applied to the current board.
///
/// These are recoverable: the engine reports them and the turn still advances.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionError {
    #[error("No such intersection: {0}")]
    NoSuchIntersection(IntersectionId),

    #[error("No such path: {0}")]
    NoSuchPath(Path),

    #[error("Intersection {0} is already occupied")]
    IntersectionOccupied(IntersectionId),

    #[error("Path {0} already has a road")]
    PathTaken(Path),

    #[error("No settlement of yours at intersection {0}")]
    NotOwnSettlement(IntersectionId),

    #[error("Already a city at intersection {0}")]
    AlreadyCity(IntersectionId),

    #[error("Cannot afford this")]
    CannotAfford,

    #[error("Need {needed} {resource}, have {held}")]
    InsufficientResource {
        resource: Resource,
        needed: u32,
        held: u32,
    },

    #[error("Invalid trade recipient: seat {0}")]
    InvalidRecipient(Seat),

    #[error("Cannot trade {0} for itself")]
    SameResource(Resource),

    #[error("Action not allowed in the current phase")]
    WrongPhase,
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Dice were rolled
    DiceRolled {
        seat: Seat,
        roll: (u8, u8),
        total: u8,
    },

    /// Every seat received its yield for the roll
    ResourcesDistributed { distributions: Vec<(Seat, Resource)> },

    /// A settlement was built
    SettlementBuilt { seat: Seat, location: IntersectionId },

    /// A settlement was upgraded to a city
    CityBuilt { seat: Seat, location: IntersectionId },

    /// A road was built
    RoadBuilt { seat: Seat, location: Path },

    /// One unit of a resource was gifted
    GiftGiven {
        from: Seat,
        to: Seat,
        resource: Resource,
    },

    /// Bank trade completed
    BankTradeCompleted {
        seat: Seat,
        gave: Resource,
        received: Resource,
    },

    /// A 7 forced over-limit seats into the discard phase
    DiscardPhaseStarted { seats: Vec<Seat> },

    /// Seat discarded cards
    CardsDiscarded {
        seat: Seat,
        resource: Option<Resource>,
        count: u32,
    },

    /// Every queued seat has discarded; `current` moves next
    DiscardPhaseEnded { current: Seat },

    /// Longest road changed hands
    LongestRoadChanged {
        previous: Option<Seat>,
        current: Option<Seat>,
        roads: usize,
    },

    /// Largest army changed hands
    LargestArmyChanged {
        previous: Option<Seat>,
        current: Option<Seat>,
        knights: u32,
    },

    /// Turn ended
    TurnEnded { seat: Seat, next_seat: Seat },

    /// A seat won the game
    GameWon { seat: Seat, victory_points: u32 },
}

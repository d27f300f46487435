//! Core game state machine.
//!
//! This module contains [`TurnEngine`], the single owner of the live board
//! and seat state. Callers only ever see [`GameState`] snapshots and the
//! legal [`Action`] list; every mutation goes through [`TurnEngine::apply`].

use crate::actions::{Action, ActionError, GameEvent};
use crate::board::{Board, Resource, Seat, STANDARD_INTERSECTIONS};
use crate::catalog::{self, BANK_TRADE_RATE, DISCARD_LIMIT};
use crate::player::{costs, Player, ResourceHand};
use crate::snapshot::GameState;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Minimum roads for Longest Road
pub const MIN_LONGEST_ROAD: usize = 5;

/// Minimum knights for Largest Army
pub const MIN_LARGEST_ARMY: u32 = 3;

/// Victory points granted by each achievement
const ACHIEVEMENT_VP: u32 = 2;

/// Turns between progress log lines
const PROGRESS_INTERVAL: u32 = 10;

/// Errors from misusing the engine.
///
/// Unlike [`ActionError`] these are not game-rule conflicts: they point at a
/// defect in whatever is driving the engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Game has not been started")]
    NotStarted,

    #[error("Game already started")]
    AlreadyStarted,

    #[error("Game is over")]
    GameOver,

    #[error("Action `{0}` is not in the current legal action set")]
    IllegalAction(Action),

    #[error("Invalid dice ({0}, {1})")]
    InvalidDice(u8, u8),
}

/// Errors in an [`EngineConfig`]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Must have 2-4 players, got {0}")]
    PlayerCount(u8),

    #[error("Board of {board_size} intersections cannot seat {num_players} players")]
    BoardTooSmall { board_size: u8, num_players: u8 },

    #[error("Target victory points must be positive")]
    ZeroTarget,

    #[error("Turn limit must be positive")]
    ZeroTurnLimit,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub num_players: u8,
    /// Victory points needed to win
    pub target_vp: u32,
    /// Turn count at which the game stops without a winner
    pub max_turns: u32,
    /// Cards of every resource each seat starts with
    pub starting_resources: u32,
    /// Intersections on the linear board
    pub board_size: u8,
    /// RNG seed; `None` draws one from entropy
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            num_players: 4,
            target_vp: 10,
            max_turns: 500,
            starting_resources: 2,
            board_size: STANDARD_INTERSECTIONS,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=4).contains(&self.num_players) {
            return Err(ConfigError::PlayerCount(self.num_players));
        }
        if self.board_size < self.num_players {
            return Err(ConfigError::BoardTooSmall {
                board_size: self.board_size,
                num_players: self.num_players,
            });
        }
        if self.target_vp == 0 {
            return Err(ConfigError::ZeroTarget);
        }
        if self.max_turns == 0 {
            return Err(ConfigError::ZeroTurnLimit);
        }
        Ok(())
    }
}

/// Engine phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Created, `start_game` not yet called
    Waiting,

    /// The current seat takes one action per call
    Normal,

    /// Seats must discard half their cards (rolled 7, >7 cards)
    Discarding {
        /// Seats that still owe a discard, front is current
        queue: VecDeque<Seat>,
    },

    /// Game is over
    Finished { winner: Option<Seat> },
}

/// What happened during one `apply` call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Individual dice, when a roll happened
    pub dice: Option<(u8, u8)>,
    /// Dice total, when a roll happened
    pub roll: Option<u8>,
    pub robber_rolled: bool,
    /// The action failed validation and had no effect
    pub action_failed: bool,
    pub action_error: Option<ActionError>,
    pub is_trade: bool,
    pub is_bank_trade: bool,
    pub winner: Option<Seat>,
    pub events: Vec<GameEvent>,
}

/// Result of one `apply` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub state: GameState,
    pub done: bool,
    pub info: StepInfo,
}

/// The authoritative game: board, seats, turn counter and phase.
#[derive(Debug, Clone)]
pub struct TurnEngine {
    config: EngineConfig,
    rng: StdRng,
    board: Board,
    players: Vec<Player>,
    current: Seat,
    turn: u32,
    phase: TurnPhase,
    longest_road_owner: Option<Seat>,
    largest_army_owner: Option<Seat>,
}

impl TurnEngine {
    /// Create an engine; the game begins with [`TurnEngine::start_game`]
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            board: Board::linear(config.board_size),
            players: (0..config.num_players).map(Player::new).collect(),
            rng,
            current: 0,
            turn: 0,
            phase: TurnPhase::Waiting,
            longest_road_owner: None,
            largest_army_owner: None,
            config,
        })
    }

    /// Seed every seat with starting resources and one free settlement.
    ///
    /// Can only be called once per engine.
    pub fn start_game(&mut self) -> Result<GameState, EngineError> {
        if self.phase != TurnPhase::Waiting {
            return Err(EngineError::AlreadyStarted);
        }

        let starting = ResourceHand::uniform(self.config.starting_resources);
        for player in &mut self.players {
            player.resources = starting.clone();
        }

        for seat in 0..self.seat_count() {
            let spots = self.board.valid_settlement_spots(seat);
            let Some(&at) = spots.choose(&mut self.rng) else {
                continue;
            };
            if self.board.place_settlement(at, seat).is_ok() {
                debug!(seat, at, "placed starting settlement");
            }
        }

        self.phase = TurnPhase::Normal;
        info!(
            seats = self.players.len(),
            target_vp = self.config.target_vp,
            max_turns = self.config.max_turns,
            "game started"
        );

        Ok(self.snapshot())
    }

    /// Every action the current seat may pass to [`TurnEngine::apply`]
    pub fn get_legal_actions(&self) -> Result<Vec<Action>, EngineError> {
        match &self.phase {
            TurnPhase::Waiting => Err(EngineError::NotStarted),
            TurnPhase::Finished { .. } => Err(EngineError::GameOver),
            TurnPhase::Normal => Ok(catalog::legal_actions(
                &self.board,
                &self.players,
                self.current,
                false,
            )),
            TurnPhase::Discarding { queue, .. } => Ok(catalog::legal_actions(
                &self.board,
                &self.players,
                self.current,
                queue.contains(&self.current),
            )),
        }
    }

    /// Roll the dice and apply one action for the current seat.
    ///
    /// The action must come from the preceding [`TurnEngine::get_legal_actions`]
    /// call; anything else is rejected with [`EngineError::IllegalAction`].
    pub fn apply(&mut self, action: Action) -> Result<StepOutcome, EngineError> {
        self.ensure_legal(&action)?;

        if self.is_discarding() {
            return Ok(self.resolve_discard(action));
        }

        let dice = self.roll_dice();
        Ok(self.resolve_turn(action, dice))
    }

    /// Like [`TurnEngine::apply`] but with the dice fixed by the caller,
    /// for replays. Dice are ignored during the discard phase.
    pub fn apply_with_roll(
        &mut self,
        action: Action,
        dice: (u8, u8),
    ) -> Result<StepOutcome, EngineError> {
        if !(1..=6).contains(&dice.0) || !(1..=6).contains(&dice.1) {
            return Err(EngineError::InvalidDice(dice.0, dice.1));
        }
        self.ensure_legal(&action)?;

        if self.is_discarding() {
            return Ok(self.resolve_discard(action));
        }

        Ok(self.resolve_turn(action, dice))
    }

    /// Fresh read-only snapshot of the game
    pub fn snapshot(&self) -> GameState {
        GameState {
            turn: self.turn,
            current_seat: self.current,
            victory_points: self.victory_point_table(),
            resources: self.players.iter().map(|p| p.resources.clone()).collect(),
            longest_road_owner: self.longest_road_owner,
            largest_army_owner: self.largest_army_owner,
            robber_position: self.board.robber_location(),
            pending_discard: self.is_discarding(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn phase(&self) -> &TurnPhase {
        &self.phase
    }

    pub fn current_seat(&self) -> Seat {
        self.current
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, TurnPhase::Finished { .. })
    }

    /// Winner, once the game is finished with one
    pub fn winner(&self) -> Option<Seat> {
        match self.phase {
            TurnPhase::Finished { winner } => winner,
            _ => None,
        }
    }

    /// Total victory points for a seat (buildings plus achievements)
    pub fn victory_points(&self, seat: Seat) -> u32 {
        let mut vp = self.board.building_points(seat);
        if self.longest_road_owner == Some(seat) {
            vp += ACHIEVEMENT_VP;
        }
        if self.largest_army_owner == Some(seat) {
            vp += ACHIEVEMENT_VP;
        }
        vp
    }

    // ==================== Helper Methods ====================

    fn seat_count(&self) -> Seat {
        self.players.len() as Seat
    }

    fn is_discarding(&self) -> bool {
        matches!(self.phase, TurnPhase::Discarding { .. })
    }

    fn victory_point_table(&self) -> Vec<u32> {
        (0..self.seat_count())
            .map(|seat| self.victory_points(seat))
            .collect()
    }

    fn ensure_legal(&self, action: &Action) -> Result<(), EngineError> {
        if self.get_legal_actions()?.contains(action) {
            Ok(())
        } else {
            Err(EngineError::IllegalAction(action.clone()))
        }
    }

    fn roll_dice(&mut self) -> (u8, u8) {
        (self.rng.gen_range(1..=6), self.rng.gen_range(1..=6))
    }

    /// One queued seat sheds cards. Never consumes a turn or rolls.
    fn resolve_discard(&mut self, action: Action) -> StepOutcome {
        let seat = self.current;
        let mut info = StepInfo::default();

        match action {
            Action::Discard { resource, count } => {
                let removed = self.players[seat as usize]
                    .resources
                    .take_up_to(resource, count);
                if removed < count {
                    warn!(seat, %resource, count, removed, "discard clamped to holdings");
                }
                info.events.push(GameEvent::CardsDiscarded {
                    seat,
                    resource: Some(resource),
                    count: removed,
                });
            }
            _ => {
                // EndTurn: nothing owed
                info.events.push(GameEvent::CardsDiscarded {
                    seat,
                    resource: None,
                    count: 0,
                });
            }
        }

        let next = match &mut self.phase {
            TurnPhase::Discarding { queue } => {
                queue.retain(|&s| s != seat);
                queue.front().copied()
            }
            _ => None,
        };

        // The last seat to discard stays current and rolls next
        match next {
            Some(next) => {
                debug!(seat, next, "discard recorded");
                self.current = next;
            }
            None => {
                debug!(seat, "discard phase over");
                self.phase = TurnPhase::Normal;
                info.events.push(GameEvent::DiscardPhaseEnded { current: seat });
            }
        }

        StepOutcome {
            state: self.snapshot(),
            done: false,
            info,
        }
    }

    /// A normal turn: roll, maybe open the discard phase, otherwise yield,
    /// apply the action, advance and score.
    fn resolve_turn(&mut self, action: Action, dice: (u8, u8)) -> StepOutcome {
        let seat = self.current;
        let total = dice.0 + dice.1;
        let mut info = StepInfo {
            dice: Some(dice),
            roll: Some(total),
            ..StepInfo::default()
        };
        info.events.push(GameEvent::DiceRolled {
            seat,
            roll: dice,
            total,
        });

        if total == 7 {
            info.robber_rolled = true;
            let over_limit: VecDeque<Seat> = self
                .players
                .iter()
                .filter(|p| p.total_cards() > DISCARD_LIMIT)
                .map(|p| p.seat)
                .collect();

            // The roll pre-empts the submitted action
            if let Some(&first) = over_limit.front() {
                debug!(seat, ?over_limit, ?action, "seven rolled, discard phase");
                info.events.push(GameEvent::DiscardPhaseStarted {
                    seats: over_limit.iter().copied().collect(),
                });
                self.phase = TurnPhase::Discarding { queue: over_limit };
                self.current = first;
                return StepOutcome {
                    state: self.snapshot(),
                    done: false,
                    info,
                };
            }
        }

        info.events.push(self.distribute_yield());

        match self.execute(seat, &action) {
            Ok(events) => {
                info.is_trade = matches!(action, Action::GiftTrade { .. });
                info.is_bank_trade = matches!(action, Action::BankTrade { .. });
                info.events.extend(events);
            }
            Err(err) => {
                warn!(seat, %action, error = %err, "action failed");
                info.action_failed = true;
                info.action_error = Some(err);
            }
        }

        self.turn += 1;
        let next_seat = (seat + 1) % self.seat_count();
        self.current = next_seat;
        info.events.push(GameEvent::TurnEnded { seat, next_seat });

        info.events.extend(self.update_achievements());

        if self.turn % PROGRESS_INTERVAL == 0 {
            debug!(turn = self.turn, vp = ?self.victory_point_table(), "progress");
        }

        let winner = self.check_winner();
        let done = winner.is_some() || self.turn >= self.config.max_turns;
        if done {
            self.phase = TurnPhase::Finished { winner };
            match winner {
                Some(winner) => {
                    let victory_points = self.victory_points(winner);
                    info!(winner, victory_points, turn = self.turn, "game won");
                    info.events.push(GameEvent::GameWon {
                        seat: winner,
                        victory_points,
                    });
                    info.winner = Some(winner);
                }
                None => info!(turn = self.turn, "turn limit reached"),
            }
        }

        StepOutcome {
            state: self.snapshot(),
            done,
            info,
        }
    }

    /// Validate and apply one action. Either fully applies or changes nothing.
    fn execute(&mut self, seat: Seat, action: &Action) -> Result<Vec<GameEvent>, ActionError> {
        let idx = seat as usize;

        match *action {
            Action::BuildSettlement { at } => {
                self.board.check_settlement(at)?;
                self.players[idx]
                    .resources
                    .try_subtract(&costs::settlement())?;
                self.board.place_settlement(at, seat)?;
                debug!(seat, at, "settlement built");
                Ok(vec![GameEvent::SettlementBuilt { seat, location: at }])
            }

            Action::BuildRoad { path } => {
                self.board.check_road(&path)?;
                self.players[idx].resources.try_subtract(&costs::road())?;
                self.board.place_road(path, seat)?;
                self.players[idx].roads.insert(path);
                debug!(seat, %path, "road built");
                Ok(vec![GameEvent::RoadBuilt {
                    seat,
                    location: path,
                }])
            }

            Action::BuildCity { at } => {
                self.board.check_city(at, seat)?;
                self.players[idx].resources.try_subtract(&costs::city())?;
                self.board.upgrade_to_city(at, seat)?;
                debug!(seat, at, "city built");
                Ok(vec![GameEvent::CityBuilt { seat, location: at }])
            }

            Action::GiftTrade { to, resource } => {
                if to == seat || to >= self.seat_count() {
                    return Err(ActionError::InvalidRecipient(to));
                }
                self.players[idx].resources.take(resource, 1)?;
                self.players[to as usize].resources.add(resource, 1);
                Ok(vec![GameEvent::GiftGiven {
                    from: seat,
                    to,
                    resource,
                }])
            }

            Action::BankTrade { give, receive } => {
                if give == receive {
                    return Err(ActionError::SameResource(give));
                }
                self.players[idx].resources.take(give, BANK_TRADE_RATE)?;
                self.players[idx].resources.add(receive, 1);
                Ok(vec![GameEvent::BankTradeCompleted {
                    seat,
                    gave: give,
                    received: receive,
                }])
            }

            Action::Discard { .. } => Err(ActionError::WrongPhase),

            Action::EndTurn => Ok(Vec::new()),
        }
    }

    /// One uniformly random resource to every seat
    fn distribute_yield(&mut self) -> GameEvent {
        let mut distributions = Vec::with_capacity(self.players.len());
        for player in &mut self.players {
            let resource = Resource::ALL[self.rng.gen_range(0..Resource::ALL.len())];
            player.resources.add(resource, 1);
            distributions.push((player.seat, resource));
        }
        GameEvent::ResourcesDistributed { distributions }
    }

    /// Re-award Longest Road and Largest Army. A holder keeps the title on
    /// a tie; only a strictly greater count takes it.
    fn update_achievements(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();

        let previous = self.longest_road_owner;
        for player in &self.players {
            let roads = player.road_count();
            if roads < MIN_LONGEST_ROAD {
                continue;
            }
            let takes = match self.longest_road_owner {
                None => true,
                Some(owner) => roads > self.players[owner as usize].road_count(),
            };
            if takes {
                self.longest_road_owner = Some(player.seat);
            }
        }
        if self.longest_road_owner != previous {
            let roads = self
                .longest_road_owner
                .map(|s| self.players[s as usize].road_count())
                .unwrap_or(0);
            events.push(GameEvent::LongestRoadChanged {
                previous,
                current: self.longest_road_owner,
                roads,
            });
        }

        let previous = self.largest_army_owner;
        for player in &self.players {
            let knights = player.knights_played;
            if knights < MIN_LARGEST_ARMY {
                continue;
            }
            let takes = match self.largest_army_owner {
                None => true,
                Some(owner) => knights > self.players[owner as usize].knights_played,
            };
            if takes {
                self.largest_army_owner = Some(player.seat);
            }
        }
        if self.largest_army_owner != previous {
            let knights = self
                .largest_army_owner
                .map(|s| self.players[s as usize].knights_played)
                .unwrap_or(0);
            events.push(GameEvent::LargestArmyChanged {
                previous,
                current: self.largest_army_owner,
                knights,
            });
        }

        events
    }

    /// Lowest seat at the maximum, if that maximum reaches the target
    fn check_winner(&self) -> Option<Seat> {
        let table = self.victory_point_table();
        let best = *table.iter().max()?;
        if best < self.config.target_vp {
            return None;
        }
        table.iter().position(|&vp| vp == best).map(|i| i as Seat)
    }
}

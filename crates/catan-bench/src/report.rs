//! Run report: per-game summaries plus a small aggregate.

use crate::config::BenchConfig;
use crate::orchestrator::GameResult;
use catan_engine::Seat;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One line per `apply` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSummary {
    pub turn: u32,
    pub seat: Seat,
    pub action: String,
    pub roll: Option<u8>,
    pub action_failed: bool,
    pub used_fallback: bool,
}

/// Per-seat counters for one game
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatStats {
    pub decisions: u32,
    pub fallbacks: u32,
    pub failed_actions: u32,
    pub gifts: u32,
    pub bank_trades: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub game_index: u32,
    pub seed: Option<u64>,
    pub agents: Vec<String>,
    pub winner: Option<Seat>,
    pub turns: u32,
    pub victory_points: Vec<u32>,
    pub seats: Vec<SeatStats>,
    pub steps: Vec<StepSummary>,
}

impl GameSummary {
    pub fn from_result(result: &GameResult) -> Self {
        let mut seats = vec![SeatStats::default(); result.agent_names.len()];
        let mut steps = Vec::with_capacity(result.steps.len());

        for step in &result.steps {
            if let Some(stats) = seats.get_mut(step.acting_seat as usize) {
                stats.decisions += 1;
                stats.fallbacks += u32::from(step.decision.used_fallback);
                stats.failed_actions += u32::from(step.info.action_failed);
                stats.gifts += u32::from(step.info.is_trade);
                stats.bank_trades += u32::from(step.info.is_bank_trade);
            }
            steps.push(StepSummary {
                turn: step.state_before.turn,
                seat: step.acting_seat,
                action: step.action.to_string(),
                roll: step.info.roll,
                action_failed: step.info.action_failed,
                used_fallback: step.decision.used_fallback,
            });
        }

        Self {
            game_index: result.game_index,
            seed: result.seed,
            agents: result.agent_names.clone(),
            winner: result.winner,
            turns: result.final_state.turn,
            victory_points: result.final_state.victory_points.clone(),
            seats,
            steps,
        }
    }
}

/// Aggregate over every game of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub games: usize,
    pub wins_per_seat: Vec<u32>,
    /// Games that hit the turn limit
    pub unfinished: u32,
    pub average_turns: f64,
}

impl RunSummary {
    pub fn from_games(games: &[GameSummary], seat_count: usize) -> Self {
        let mut wins_per_seat = vec![0; seat_count];
        let mut unfinished = 0;
        for game in games {
            match game.winner.map(usize::from) {
                Some(seat) if seat < seat_count => wins_per_seat[seat] += 1,
                _ => unfinished += 1,
            }
        }

        let average_turns = if games.is_empty() {
            0.0
        } else {
            games.iter().map(|g| f64::from(g.turns)).sum::<f64>() / games.len() as f64
        };

        Self {
            games: games.len(),
            wins_per_seat,
            unfinished,
            average_turns,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub config: BenchConfig,
    pub summary: RunSummary,
    pub games: Vec<GameSummary>,
}

impl RunReport {
    pub fn new(config: BenchConfig, results: &[GameResult]) -> Self {
        let games: Vec<GameSummary> = results.iter().map(GameSummary::from_result).collect();
        let summary = RunSummary::from_games(&games, config.seat_count());
        Self {
            run_id: Uuid::new_v4(),
            config,
            summary,
            games,
        }
    }

    pub fn log_summary(&self) {
        info!(
            run_id = %self.run_id,
            games = self.summary.games,
            unfinished = self.summary.unfinished,
            average_turns = self.summary.average_turns,
            "run complete"
        );
        for (seat, wins) in self.summary.wins_per_seat.iter().enumerate() {
            let agent = self.config.agents.get(seat).map(|a| a.code()).unwrap_or("?");
            info!(seat, agent, wins, "wins");
        }
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), ReportError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn write_to_path(&self, path: &Path) -> Result<(), ReportError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_json(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

//! Playing one game between a set of agents and recording every step.

use catan_engine::decode::fallback_index;
use catan_engine::{
    Action, Agent, Decision, EngineConfig, EngineError, GameState, Seat, StepInfo, TurnEngine,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("{agents} agents for {seats} seats")]
    AgentCount { agents: usize, seats: usize },

    #[error("Engine rejected the game: {0}")]
    Config(#[from] catan_engine::ConfigError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

/// One `apply` call as seen from outside the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: usize,
    pub acting_seat: Seat,
    pub state_before: GameState,
    pub action: Action,
    pub legal_action_count: usize,
    pub decision: Decision,
    pub state_after: GameState,
    pub info: StepInfo,
}

/// Everything recorded about one finished game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub game_index: u32,
    pub seed: Option<u64>,
    pub agent_names: Vec<String>,
    pub winner: Option<Seat>,
    pub final_state: GameState,
    pub steps: Vec<StepRecord>,
}

/// Play a full game, one agent per seat in seat order.
pub fn play_game(
    game_index: u32,
    config: EngineConfig,
    mut agents: Vec<Box<dyn Agent>>,
) -> Result<GameResult, RunError> {
    if agents.len() != config.num_players as usize {
        return Err(RunError::AgentCount {
            agents: agents.len(),
            seats: config.num_players as usize,
        });
    }

    let seed = config.seed;
    let mut engine = TurnEngine::new(config)?;
    engine.start_game()?;

    let mut steps = Vec::new();
    loop {
        let state_before = engine.snapshot();
        let actions = engine.get_legal_actions()?;
        let seat = state_before.current_seat;

        let agent = &mut agents[seat as usize];
        let mut decision = agent.choose(&state_before, &actions);
        if decision.index >= actions.len() {
            warn!(
                game = game_index,
                agent = agent.name(),
                index = decision.index,
                "agent chose an index outside the action list"
            );
            decision = Decision::fallback(fallback_index(&actions).unwrap_or(0));
        }
        let action = actions[decision.index].clone();
        debug!(game = game_index, seat, %action, "applying");

        let outcome = engine.apply(action.clone())?;

        steps.push(StepRecord {
            step: steps.len(),
            acting_seat: seat,
            state_before,
            action,
            legal_action_count: actions.len(),
            decision,
            state_after: outcome.state,
            info: outcome.info,
        });

        if outcome.done {
            break;
        }
    }

    let final_state = engine.snapshot();
    info!(
        game = game_index,
        winner = ?engine.winner(),
        turns = final_state.turn,
        vp = ?final_state.victory_points,
        "game finished"
    );

    Ok(GameResult {
        game_index,
        seed,
        agent_names: agents.iter().map(|a| a.name().to_string()).collect(),
        winner: engine.winner(),
        final_state,
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use catan_engine::{HeuristicAgent, RandomAgent};
    use pretty_assertions::assert_eq;

    fn config(seed: u64) -> EngineConfig {
        EngineConfig {
            target_vp: 8,
            max_turns: 150,
            ..EngineConfig::default().with_seed(seed)
        }
    }

    fn agents(seed: u64) -> Vec<Box<dyn Agent>> {
        vec![
            Box::new(HeuristicAgent::new("H0")),
            Box::new(RandomAgent::with_seed("R1", seed)),
            Box::new(RandomAgent::with_seed("R2", seed + 1)),
            Box::new(RandomAgent::with_seed("R3", seed + 2)),
        ]
    }

    /// Agent that answers with an index no list ever has
    struct OutOfRange;

    impl Agent for OutOfRange {
        fn name(&self) -> &str {
            "oob"
        }

        fn choose(&mut self, _state: &GameState, _actions: &[Action]) -> Decision {
            Decision::direct(usize::MAX)
        }
    }

    #[test]
    fn test_play_game_records_every_step() {
        let result = play_game(0, config(42), agents(42)).unwrap();

        assert!(!result.steps.is_empty());
        assert_eq!(result.agent_names, vec!["H0", "R1", "R2", "R3"]);
        assert_eq!(result.seed, Some(42));
        for (i, step) in result.steps.iter().enumerate() {
            assert_eq!(step.step, i);
            assert_eq!(step.acting_seat, step.state_before.current_seat);
            assert!(step.decision.index < step.legal_action_count);
        }
        for pair in result.steps.windows(2) {
            assert_eq!(pair[0].state_after, pair[1].state_before);
        }

        let last = result.steps.last().unwrap();
        assert_eq!(last.state_after, result.final_state);
        match result.winner {
            Some(winner) => assert!(result.final_state.victory_points[winner as usize] >= 8),
            None => assert_eq!(result.final_state.turn, 150),
        }
    }

    #[test]
    fn test_play_game_is_reproducible() {
        let a = play_game(1, config(7), agents(7)).unwrap();
        let b = play_game(1, config(7), agents(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_out_of_range_choice_uses_fallback() {
        let agents: Vec<Box<dyn Agent>> = vec![Box::new(OutOfRange), Box::new(OutOfRange)];
        let config = EngineConfig {
            num_players: 2,
            max_turns: 10,
            ..EngineConfig::default().with_seed(3)
        };

        let result = play_game(0, config, agents).unwrap();
        assert!(result.steps.iter().all(|s| s.decision.used_fallback));
        assert!(result.steps.iter().all(|s| !s.decision.valid_index));
    }

    #[test]
    fn test_agent_count_must_match() {
        let err = play_game(0, config(1), vec![Box::new(HeuristicAgent::new("solo"))]).unwrap_err();
        assert!(matches!(err, RunError::AgentCount { agents: 1, seats: 4 }));
    }
}

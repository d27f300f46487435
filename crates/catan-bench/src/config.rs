//! Run configuration read from the environment.

use catan_engine::{Agent, EngineConfig, HeuristicAgent, RandomAgent, ResponseAgent, StubResponder};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Unknown agent code {0:?} (expected R, H or S)")]
    UnknownAgent(String),

    #[error("{0} must be positive")]
    NotPositive(&'static str),

    #[error(transparent)]
    Engine(#[from] catan_engine::ConfigError),
}

/// Built-in decision-makers selectable from the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentKind {
    Random,
    Heuristic,
    /// Response agent fed by the offline stub
    Stub,
}

impl AgentKind {
    pub fn code(&self) -> &'static str {
        match self {
            AgentKind::Random => "R",
            AgentKind::Heuristic => "H",
            AgentKind::Stub => "S",
        }
    }
}

impl FromStr for AgentKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "r" | "random" => Ok(AgentKind::Random),
            "h" | "heuristic" => Ok(AgentKind::Heuristic),
            "s" | "stub" => Ok(AgentKind::Stub),
            _ => Err(ConfigError::UnknownAgent(s.trim().to_string())),
        }
    }
}

/// Settings for one benchmark run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Number of games to play
    pub games: u32,
    pub target_vp: u32,
    pub max_turns: u32,
    /// Base seed; game `i` uses `seed + i`
    pub seed: u64,
    /// One agent per seat
    pub agents: Vec<AgentKind>,
    /// Games played at the same time
    pub workers: usize,
    /// Where to write the JSON report
    pub output: Option<PathBuf>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            games: 5,
            target_vp: 8,
            max_turns: 150,
            seed: 42,
            agents: vec![
                AgentKind::Heuristic,
                AgentKind::Random,
                AgentKind::Random,
                AgentKind::Random,
            ],
            workers: 1,
            output: None,
        }
    }
}

impl BenchConfig {
    /// Read `BENCH_*` variables from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from any variable lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(games) = parse_var(&lookup, "BENCH_GAMES")? {
            config.games = games;
        }
        if let Some(target_vp) = parse_var(&lookup, "BENCH_TARGET_VP")? {
            config.target_vp = target_vp;
        }
        if let Some(max_turns) = parse_var(&lookup, "BENCH_MAX_TURNS")? {
            config.max_turns = max_turns;
        }
        if let Some(seed) = parse_var(&lookup, "BENCH_SEED")? {
            config.seed = seed;
        }
        if let Some(workers) = parse_var(&lookup, "BENCH_WORKERS")? {
            config.workers = workers;
        }
        if let Some(agents) = lookup("BENCH_AGENTS") {
            config.agents = agents
                .split(',')
                .map(AgentKind::from_str)
                .collect::<Result<_, _>>()?;
        }
        if let Some(output) = lookup("BENCH_OUTPUT").filter(|s| !s.is_empty()) {
            config.output = Some(PathBuf::from(output));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.games == 0 {
            return Err(ConfigError::NotPositive("BENCH_GAMES"));
        }
        if self.workers == 0 {
            return Err(ConfigError::NotPositive("BENCH_WORKERS"));
        }
        self.engine_config(0).validate()?;
        Ok(())
    }

    pub fn seat_count(&self) -> usize {
        self.agents.len()
    }

    /// Seed used by game `game_index`
    pub fn game_seed(&self, game_index: u32) -> u64 {
        self.seed.wrapping_add(u64::from(game_index))
    }

    /// Engine settings for one game
    pub fn engine_config(&self, game_index: u32) -> EngineConfig {
        EngineConfig {
            num_players: u8::try_from(self.agents.len()).unwrap_or(u8::MAX),
            target_vp: self.target_vp,
            max_turns: self.max_turns,
            ..EngineConfig::default().with_seed(self.game_seed(game_index))
        }
    }

    /// Fresh agents for one game, one per seat
    pub fn build_agents(&self, game_index: u32) -> Vec<Box<dyn Agent>> {
        let base = self.game_seed(game_index).wrapping_mul(31);
        self.agents
            .iter()
            .enumerate()
            .map(|(seat, kind)| -> Box<dyn Agent> {
                let name = format!("{}{}", kind.code(), seat);
                match kind {
                    AgentKind::Random => {
                        Box::new(RandomAgent::with_seed(name, base.wrapping_add(seat as u64)))
                    }
                    AgentKind::Heuristic => Box::new(HeuristicAgent::new(name)),
                    AgentKind::Stub => Box::new(ResponseAgent::new(name, StubResponder)),
                }
            })
            .collect()
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> =
            vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BenchConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, BenchConfig::default());
        assert_eq!(config.seat_count(), 4);
    }

    #[test]
    fn test_overrides() {
        let config = BenchConfig::from_lookup(lookup(&[
            ("BENCH_GAMES", "12"),
            ("BENCH_TARGET_VP", " 10 "),
            ("BENCH_SEED", "7"),
            ("BENCH_AGENTS", "r, stub,H"),
            ("BENCH_WORKERS", "3"),
            ("BENCH_OUTPUT", "out/report.json"),
        ]))
        .unwrap();

        assert_eq!(config.games, 12);
        assert_eq!(config.target_vp, 10);
        assert_eq!(config.max_turns, 150);
        assert_eq!(
            config.agents,
            vec![AgentKind::Random, AgentKind::Stub, AgentKind::Heuristic]
        );
        assert_eq!(config.workers, 3);
        assert_eq!(config.output, Some(PathBuf::from("out/report.json")));
        assert_eq!(config.engine_config(2).seed, Some(9));
        assert_eq!(config.engine_config(0).num_players, 3);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            BenchConfig::from_lookup(lookup(&[("BENCH_GAMES", "many")])),
            Err(ConfigError::InvalidValue { var: "BENCH_GAMES", .. })
        ));
        assert!(matches!(
            BenchConfig::from_lookup(lookup(&[("BENCH_AGENTS", "H,X")])),
            Err(ConfigError::UnknownAgent(code)) if code == "X"
        ));
        assert!(matches!(
            BenchConfig::from_lookup(lookup(&[("BENCH_AGENTS", "H")])),
            Err(ConfigError::Engine(catan_engine::ConfigError::PlayerCount(1)))
        ));
        assert!(matches!(
            BenchConfig::from_lookup(lookup(&[("BENCH_WORKERS", "0")])),
            Err(ConfigError::NotPositive("BENCH_WORKERS"))
        ));
    }

    #[test]
    fn test_build_agents_names_seats() {
        let config = BenchConfig::default();
        let agents = config.build_agents(0);
        let names: Vec<&str> = agents.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["H0", "R1", "R2", "R3"]);
    }
}

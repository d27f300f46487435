//! Catan benchmark runner.
//!
//! Plays `BENCH_GAMES` independent games between the agents listed in
//! `BENCH_AGENTS` and reports wins per seat.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod orchestrator;
mod report;

use config::BenchConfig;
use orchestrator::play_game;
use report::RunReport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BenchConfig::from_env()?;
    info!(
        games = config.games,
        agents = ?config.agents,
        target_vp = config.target_vp,
        max_turns = config.max_turns,
        workers = config.workers,
        "Starting benchmark run..."
    );

    // Every game owns its engine; the semaphore only bounds parallelism
    let permits = Arc::new(Semaphore::new(config.workers));
    let mut handles = Vec::with_capacity(config.games as usize);
    for game_index in 0..config.games {
        let permit = permits.clone().acquire_owned().await?;
        let engine_config = config.engine_config(game_index);
        let agents = config.build_agents(game_index);
        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            play_game(game_index, engine_config, agents)
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await? {
            Ok(result) => results.push(result),
            Err(e) => {
                error!("Game failed: {}", e);
                return Err(e.into());
            }
        }
    }

    let report = RunReport::new(config, &results);
    report.log_summary();

    match &report.config.output {
        Some(path) => {
            report.write_to_path(path)?;
            info!("Report written to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            report.write_json(stdout.lock())?;
            println!();
        }
    }

    Ok(())
}

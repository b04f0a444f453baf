//! Standalone world server.
//!
//! Runs the phase scheduler against in-memory player and settlement stores,
//! caches the world state on disk, and logs every world event until Ctrl-C.
mod dirs;
mod logging;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use horde_core::{Building, Player, PlayerId, Settlement, SettlementId};
use horde_runtime::{
    FileWorldStateCache, InMemoryPlayerStore, InMemorySettlementStore, Runtime, RuntimeConfig,
    Topic,
};

const DEMO_SURVIVORS: [&str; 4] = ["Ada", "Bram", "Cleo", "Dmitri"];

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    logging::setup_logging(&dirs::log_dir())?;
    let config = RuntimeConfig::from_env()?;

    let data_dir = dirs::data_dir();
    let cache = FileWorldStateCache::new(&data_dir)?;
    info!(
        data_dir = %data_dir.display(),
        resolution_time = %config.resolution_time,
        dawn_time = %config.dawn_time,
        "Starting horde server"
    );

    let settlement = Settlement::new(SettlementId(1), "Last Light")
        .with_building(Building::new("Wall", 20))
        .with_building(Building::new("Trench", 10))
        .with_building(Building::new("Watchtower", 5));
    let max_action_points = config.rules.max_action_points;
    let players = DEMO_SURVIVORS
        .iter()
        .zip(1u64..)
        .map(|(name, id)| Player::new(PlayerId(id), *name, max_action_points));

    let runtime = Runtime::builder()
        .config(config)
        .players(Arc::new(InMemoryPlayerStore::with_players(players)))
        .settlements(Arc::new(InMemorySettlementStore::with_settlement(settlement)))
        .world_state_cache(Arc::new(cache))
        .build()
        .await?;

    let handle = runtime.handle();
    for (topic, mut rx) in handle.subscribe_multiple(&Topic::ALL) {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => info!(target: "server::events", ?topic, ?event, "World event"),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(target: "server::events", ?topic, skipped, "Event subscriber lagged")
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    if let Some(world) = handle.world_state().await? {
        info!(
            day = world.day,
            phase = %world.phase,
            horde_size = world.horde_size,
            next_boundary_at = %world.next_boundary_at,
            "World loaded"
        );
    }

    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received");

    runtime.shutdown().await?;
    info!("Server stopped");

    Ok(())
}

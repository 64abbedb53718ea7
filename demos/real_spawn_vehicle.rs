//! Spawn Vehicle Example (real CARLA)
//!
//! Connects to the CARLA server named in the config, spawns the configured
//! vehicles and idles until Ctrl+C, then tears everything down.
//!
//! Run with: cargo run --bin real_spawn_vehicle --features real-carla [-- scenario.toml]

use std::path::PathBuf;

use carla_utils::{RealCarlaClient, Scenario};
use config_loader::ConfigLoader;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize observability (Tracing + Prometheus)
    observability::init()?;

    info!("Starting Spawn Vehicle Demo");

    let config_path = resolve_config_path();
    info!(path = %config_path.display(), "Loading scenario config");
    let config = ConfigLoader::load_from_path(&config_path)?;

    info!(
        host = %config.client.host,
        port = config.client.port,
        map = %config.client.map,
        "Connecting to CARLA..."
    );
    info!("Press Ctrl+C to exit the program");

    let mut scenario = Scenario::new(RealCarlaClient::new(), config);
    match scenario.run_until(tokio::signal::ctrl_c()).await {
        Ok(report) => {
            info!(
                spawned = ?report.spawned,
                destroyed = report.destroyed,
                ticks = report.ticks,
                "Program finished"
            );
            println!("{}", report.summary);
        }
        Err(e) => {
            warn!(error = %e, "scenario failed");
            return Err(e.into());
        }
    }

    Ok(())
}

fn resolve_config_path() -> PathBuf {
    std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/spawn_vehicle.toml")))
}

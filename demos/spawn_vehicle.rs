//! Spawn Vehicle Example (mock)
//!
//! Runs the scenario from `spawn_vehicle.toml` against the in-memory mock
//! world. No CARLA server needed.
//!
//! Run with: cargo run --bin spawn_vehicle [-- path/to/scenario.toml]

use std::path::PathBuf;

use carla_utils::{MockCarlaClient, Scenario};
use config_loader::ConfigLoader;
use observability::{LogFormat, ObservabilityConfig};
use tracing::info;

/// Ticks to run when the config leaves `max_ticks` at 0
const MOCK_TICKS: u64 = 200;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init_with_config(
        ObservabilityConfig::default()
            .with_log_format(LogFormat::Pretty)
            .without_metrics(),
    )?;

    info!("Starting Spawn Vehicle Demo (mock)");

    let config_path = resolve_config_path();
    info!(path = %config_path.display(), "Loading scenario config");
    let mut config = ConfigLoader::load_from_path(&config_path)?;

    // The mock world ticks instantly; keep the run short
    if config.run.max_ticks == 0 {
        config.run.max_ticks = MOCK_TICKS;
    }
    config.run.teardown_delay_sec = [0.0, 0.5];

    let mut scenario = Scenario::new(MockCarlaClient::new(), config);
    let report = scenario.run_until(tokio::signal::ctrl_c()).await?;

    info!(
        spawned = ?report.spawned,
        failed = report.failed,
        ticks = report.ticks,
        "Demo finished"
    );
    println!("{}", report.summary);
    Ok(())
}

fn resolve_config_path() -> PathBuf {
    std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/spawn_vehicle.toml")))
}

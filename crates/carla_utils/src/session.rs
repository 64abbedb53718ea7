//! Client connection helpers

use contracts::{ActorId, ClientConfig};
use tracing::{debug, info, instrument, warn};

use crate::client::CarlaClient;
use crate::common;
use crate::error::Result;

/// Connection settings for [`create`]
pub type SessionConfig = ClientConfig;

/// Last path segment of a map name
///
/// The server reports "Carla/Maps/Town03" while configs usually say
/// "Town03" or "/Game/Carla/Maps/Town03"; only the basename is compared.
pub fn map_basename(map: &str) -> &str {
    map.trim_end_matches('/').rsplit('/').next().unwrap_or(map)
}

/// Whether `current` already is the map `wanted` refers to
pub fn same_map(current: &str, wanted: &str) -> bool {
    map_basename(current) == map_basename(wanted)
}

/// Connect, set the timeout and make sure the wanted map is loaded
///
/// The map is reloaded when it differs from the current one, or always when
/// `force_reset` is set (which also clears every spawned actor).
#[instrument(
    name = "session_create",
    skip(client, config),
    fields(host = %config.host, port = config.port, map = %config.map)
)]
pub async fn create<C: CarlaClient>(client: &mut C, config: &ClientConfig) -> Result<()> {
    let timeout = common::duration_from_secs("timeout_sec", config.timeout_sec)?;
    client.connect(&config.host, config.port).await?;
    client.set_timeout(timeout);

    let current = client.map_name().await?;
    if config.force_reset || !same_map(&current, &config.map) {
        info!(
            current = %current,
            wanted = %config.map,
            force_reset = config.force_reset,
            "loading map"
        );
        client.load_world(&config.map).await?;
    } else {
        debug!(map = %current, "map already loaded");
    }

    info!("connected to CARLA server");
    Ok(())
}

/// Destroy every actor in the list, best-effort
///
/// `None` entries (failed spawns) are skipped, failures are logged and do not
/// stop the loop. Returns how many actors were actually destroyed.
#[instrument(name = "session_destroy_actors", skip(client, actors), fields(count = actors.len()))]
pub async fn destroy_actors_in_list<C: CarlaClient>(
    client: &C,
    actors: &[Option<ActorId>],
) -> usize {
    let mut destroyed = 0;

    for actor_id in actors.iter().flatten().copied() {
        match client.destroy_actor(actor_id).await {
            Ok(true) => {
                destroyed += 1;
                observability::metrics::record_actor_destroyed();
            }
            Ok(false) => debug!(actor_id, "actor already gone"),
            Err(e) => warn!(actor_id, error = %e, "failed to destroy actor"),
        }
    }

    info!(destroyed, "actors destroyed");
    destroyed
}

//! World helpers: bulk destroy, spawn point overlay, spectator, culling

use contracts::{
    ActorBlueprint, ActorId, Color, DebugShape, DrawStyle, Location, Placement,
    Rotation, Transform,
};
use rand::Rng;
use tracing::{debug, info, instrument, warn};

use crate::actor::{self, DEFAULT_MAX_DISTANCE};
use crate::client::CarlaClient;
use crate::error::Result;

/// Destroy every sensor, vehicle and walker in the world
///
/// Static actors (spectator, traffic signs, lights) are left alone. Returns
/// how many actors were destroyed.
#[instrument(name = "world_destroy_all_dynamic", skip(client))]
pub async fn destroy_all_dynamic_actors<C: CarlaClient>(client: &C) -> Result<usize> {
    let mut destroyed = 0;

    for actor in client.actors("*").await? {
        if !actor.kind().is_dynamic() {
            continue;
        }
        match client.destroy_actor(actor.id).await {
            Ok(true) => {
                destroyed += 1;
                observability::metrics::record_actor_destroyed();
            }
            Ok(false) => debug!(actor_id = actor.id, "actor already gone"),
            Err(e) => warn!(actor_id = actor.id, error = %e, "failed to destroy actor"),
        }
    }

    info!(destroyed, "dynamic actors destroyed");
    Ok(destroyed)
}

/// Label every recommended spawn point with its index
///
/// Returns the number of labels drawn.
#[instrument(name = "world_draw_spawn_points", skip(client))]
pub async fn draw_spawn_points<C: CarlaClient>(client: &C, life_time: f64) -> Result<usize> {
    let spawn_points = client.spawn_points().await?;
    let style = DrawStyle::default()
        .with_color(Color::RED)
        .with_life_time(life_time);

    for (index, transform) in spawn_points.iter().enumerate() {
        client
            .draw(
                DebugShape::String {
                    location: transform.location,
                    text: index.to_string(),
                },
                style,
            )
            .await?;
        observability::metrics::record_debug_draw("string");
    }

    debug!(count = spawn_points.len(), "spawn points drawn");
    Ok(spawn_points.len())
}

/// Bird's-eye view 20 m above the origin
pub fn default_spectator_transform() -> Transform {
    Transform::new(Location::new(0.0, 0.0, 20.0), Rotation::new(-90.0, 0.0, 0.0))
}

/// Move the spectator camera
///
/// `placement` resolves against [`default_spectator_transform`]. Returns the
/// transform applied.
#[instrument(name = "world_move_spectator", skip_all)]
pub async fn move_spectator<C: CarlaClient>(client: &C, placement: &Placement) -> Result<Transform> {
    let transform = placement.resolve(default_spectator_transform());
    client.set_spectator_transform(transform).await?;
    info!(location = ?transform.location, rotation = ?transform.rotation, "spectator moved");
    Ok(transform)
}

/// Which actors `remove_distant_actors` keeps
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceFilter {
    /// Area centre
    pub location: Location,
    /// Radius (metres), inclusive
    pub max_distance: f64,
    /// Wildcard over actor type ids
    pub actor_filter: String,
}

impl Default for DistanceFilter {
    fn default() -> Self {
        Self {
            location: Location::ORIGIN,
            max_distance: DEFAULT_MAX_DISTANCE,
            actor_filter: "vehicle.*".to_string(),
        }
    }
}

impl From<&contracts::CleanupConfig> for DistanceFilter {
    fn from(config: &contracts::CleanupConfig) -> Self {
        Self {
            location: config.location,
            max_distance: config.max_distance,
            actor_filter: config.actor_filter.clone(),
        }
    }
}

/// Destroy matching actors outside the filter's radius
///
/// Returns the ids actually removed. Destroy failures are logged and skipped.
#[instrument(
    name = "world_remove_distant_actors",
    skip_all,
    fields(filter = %filter.actor_filter, max_distance = filter.max_distance)
)]
pub async fn remove_distant_actors<C: CarlaClient>(
    client: &C,
    filter: &DistanceFilter,
) -> Result<Vec<ActorId>> {
    let mut removed = Vec::new();

    for actor in client.actors(&filter.actor_filter).await? {
        if actor::in_range(&actor, &filter.location, filter.max_distance) {
            continue;
        }
        match client.destroy_actor(actor.id).await {
            Ok(true) => {
                info!(actor_id = actor.id, type_id = %actor.type_id, "removed distant actor");
                observability::metrics::record_actor_destroyed();
                removed.push(actor.id);
            }
            Ok(false) => debug!(actor_id = actor.id, "actor already gone"),
            Err(e) => warn!(actor_id = actor.id, error = %e, "failed to remove actor"),
        }
    }

    let remaining = client.actors("vehicle.*").await?.len();
    info!(removed = removed.len(), remaining, "vehicles remaining");

    Ok(removed)
}

/// Spawn a random blueprint from `library` at `transform`
///
/// Vehicles are handed to the autopilot. Returns `None` when the simulator
/// refuses the spawn.
#[instrument(name = "world_spawn_actor", skip(client, library, rng), fields(library = library.len()))]
pub async fn spawn_actor<C, R>(
    client: &C,
    library: &[ActorBlueprint],
    transform: Transform,
    rng: &mut R,
    verbose: bool,
) -> Result<Option<ActorId>>
where
    C: CarlaClient,
    R: Rng + ?Sized + Send,
{
    let blueprint = actor::create_random_blueprint(library, None, rng)?;
    let actor_id =
        actor::initialize(client, &blueprint, Placement::from_transform(transform), verbose)
            .await?;

    if let Some(actor_id) = actor_id {
        if blueprint.id.contains("vehicle") {
            client.set_autopilot(actor_id, true).await?;
            debug!(actor_id, "autopilot enabled");
        }
    }

    Ok(actor_id)
}

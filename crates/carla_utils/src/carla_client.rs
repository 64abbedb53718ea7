//! Real CARLA client implementation
//!
//! Connects to CARLA server using carla-rust crate.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use carla::client::{ActorBase, Client, Vehicle, World};
use carla::geom::{
    BoundingBox as CarlaBoundingBox, Location as CarlaLocation, Rotation as CarlaRotation,
    Transform as CarlaTransform, Vector3D as CarlaVector3D,
};
use carla::rpc::Color as CarlaColor;
use contracts::{
    ActorBlueprint, ActorId, ActorSnapshot, BlueprintAttribute, BoundingBox, Color, DebugShape,
    DrawStyle, Location, Rotation, Transform, Vector3D, Waypoint, WorldTick,
};
use tracing::{debug, info, instrument, warn};

use crate::client::{CarlaClient, ReplayRequest};
use crate::error::{Result, UtilsError};

/// Real CARLA client
///
/// Wraps carla-rust's Client, implements CarlaClient trait.
/// Uses Mutex for interior mutability, allowing `&self` methods to reach the World.
#[derive(Default, Clone)]
pub struct RealCarlaClient {
    /// CARLA client
    client: Arc<Mutex<Option<Client>>>,
    /// World reference, replaced on map load
    world: Arc<Mutex<Option<World>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RealCarlaClient {
    /// Create new client (disconnected state)
    pub fn new() -> Self {
        Self::default()
    }

    /// Access World with mutable reference, ensuring connected
    fn with_world_mut<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut World) -> Result<R>,
    {
        let mut world_guard = lock(&self.world);
        let world = world_guard.as_mut().ok_or(UtilsError::NotConnected)?;
        f(world)
    }

    fn with_client_mut<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Client) -> Result<R>,
    {
        let mut client_guard = lock(&self.client);
        let client = client_guard.as_mut().ok_or(UtilsError::NotConnected)?;
        f(client)
    }

    fn find_actor(world: &World, actor_id: ActorId) -> Option<carla::client::Actor> {
        world.actors().find(actor_id)
    }

    fn snapshot<A: ActorBase>(actor: &A) -> ActorSnapshot {
        ActorSnapshot {
            id: actor.id(),
            type_id: actor.type_id(),
            transform: from_carla_transform(&actor.transform()),
            velocity: from_carla_vector(&actor.velocity()),
            acceleration: from_carla_vector(&actor.acceleration()),
            bounding_box: from_carla_bounding_box(&actor.bounding_box()),
            parent: actor.parent().map(|p| p.id()),
        }
    }

    fn to_carla_blueprint(
        world: &World,
        blueprint: &ActorBlueprint,
    ) -> Result<carla::client::ActorBlueprint> {
        let mut carla_bp = world
            .blueprint_library()
            .find(&blueprint.id)
            .ok_or_else(|| UtilsError::blueprint_not_found(&blueprint.id))?;

        for (key, value) in blueprint.attribute_values() {
            let modifiable = blueprint.attribute(key).is_some_and(|a| a.modifiable);
            if modifiable && !carla_bp.set_attribute(key, value) {
                warn!(key, value, "failed to set blueprint attribute");
            }
        }
        Ok(carla_bp)
    }

    fn from_carla_blueprint(carla_bp: &carla::client::ActorBlueprint) -> ActorBlueprint {
        let mut blueprint = ActorBlueprint::new(carla_bp.id()).with_tags(carla_bp.tags());
        for attribute in carla_bp.attributes() {
            let mut converted = BlueprintAttribute::with_recommended(
                attribute.value_string(),
                attribute.recommended_values(),
            );
            converted.modifiable = attribute.is_modifiable();
            blueprint = blueprint.with_attribute(attribute.id(), converted);
        }
        blueprint
    }
}

fn to_carla_location(location: &Location) -> CarlaLocation {
    CarlaLocation {
        x: location.x as f32,
        y: location.y as f32,
        z: location.z as f32,
    }
}

fn to_carla_rotation(rotation: &Rotation) -> CarlaRotation {
    CarlaRotation {
        pitch: rotation.pitch as f32,
        yaw: rotation.yaw as f32,
        roll: rotation.roll as f32,
    }
}

/// Convert internal Transform to CARLA Transform
fn to_carla_transform(transform: &Transform) -> CarlaTransform {
    CarlaTransform {
        location: to_carla_location(&transform.location),
        rotation: to_carla_rotation(&transform.rotation),
    }
}

fn to_carla_color(color: &Color) -> CarlaColor {
    CarlaColor {
        r: color.r,
        g: color.g,
        b: color.b,
        a: color.a,
    }
}

fn from_carla_location(location: &CarlaLocation) -> Location {
    Location::new(location.x as f64, location.y as f64, location.z as f64)
}

fn from_carla_vector(vector: &CarlaVector3D) -> Vector3D {
    Vector3D::new(vector.x as f64, vector.y as f64, vector.z as f64)
}

fn from_carla_transform(transform: &CarlaTransform) -> Transform {
    Transform::new(
        from_carla_location(&transform.location),
        Rotation::new(
            transform.rotation.pitch as f64,
            transform.rotation.yaw as f64,
            transform.rotation.roll as f64,
        ),
    )
}

fn from_carla_bounding_box(bbox: &CarlaBoundingBox) -> BoundingBox {
    BoundingBox::new(
        from_carla_location(&bbox.location),
        from_carla_vector(&bbox.extent),
    )
}

impl CarlaClient for RealCarlaClient {
    #[instrument(name = "real_carla_connect", skip(self), fields(host = %host, port))]
    async fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        let client = Client::connect(host, port, None);
        let world = client.world();

        info!(
            map = %world.map().name(),
            "connected to CARLA server"
        );

        *lock(&self.client) = Some(client);
        *lock(&self.world) = Some(world);

        Ok(())
    }

    fn set_timeout(&mut self, timeout: Duration) {
        if let Some(client) = lock(&self.client).as_mut() {
            client.set_timeout(timeout);
        }
    }

    async fn map_name(&self) -> Result<String> {
        self.with_world_mut(|world| Ok(world.map().name()))
    }

    #[instrument(name = "real_carla_load_world", skip(self), fields(map = %map))]
    async fn load_world(&self, map: &str) -> Result<()> {
        let available = self.with_client_mut(|client| Ok(client.available_maps()))?;
        let basename = crate::session::map_basename(map);
        if !available
            .iter()
            .any(|m| crate::session::map_basename(m) == basename)
        {
            return Err(UtilsError::LoadWorldFailed {
                map: map.to_string(),
                message: "map not available on server".into(),
            });
        }

        let world = self.with_client_mut(|client| Ok(client.load_world(map)))?;
        *lock(&self.world) = Some(world);
        Ok(())
    }

    async fn blueprints(&self, filter: &str) -> Result<Vec<ActorBlueprint>> {
        self.with_world_mut(|world| {
            Ok(world
                .blueprint_library()
                .filter(filter)
                .iter()
                .map(|bp| Self::from_carla_blueprint(&bp))
                .collect())
        })
    }

    async fn spawn_points(&self) -> Result<Vec<Transform>> {
        self.with_world_mut(|world| {
            Ok(world
                .map()
                .recommended_spawn_points()
                .iter()
                .map(|t| from_carla_transform(&t))
                .collect())
        })
    }

    #[instrument(
        name = "real_carla_try_spawn_actor",
        skip_all,
        fields(blueprint = %blueprint.id, parent = ?parent)
    )]
    async fn try_spawn_actor(
        &self,
        blueprint: &ActorBlueprint,
        transform: Transform,
        parent: Option<ActorId>,
    ) -> Result<Option<ActorId>> {
        self.with_world_mut(|world| {
            let carla_bp = Self::to_carla_blueprint(world, blueprint)?;
            let carla_transform = to_carla_transform(&transform);

            let spawned = match parent {
                Some(parent_id) => {
                    let parent_actor = Self::find_actor(world, parent_id).ok_or_else(|| {
                        UtilsError::spawn(&blueprint.id, format!("parent actor {parent_id} not found"))
                    })?;
                    world.spawn_actor_attached(&carla_bp, &carla_transform, &parent_actor, None)
                }
                None => world.spawn_actor(&carla_bp, &carla_transform),
            };

            match spawned {
                Ok(actor) => {
                    debug!(actor_id = actor.id(), "actor spawned");
                    Ok(Some(actor.id()))
                }
                Err(e) => {
                    debug!(error = %e, "spawn refused");
                    Ok(None)
                }
            }
        })
    }

    #[instrument(name = "real_carla_set_autopilot", skip(self))]
    async fn set_autopilot(&self, actor_id: ActorId, enabled: bool) -> Result<()> {
        self.with_world_mut(|world| {
            let actor =
                Self::find_actor(world, actor_id).ok_or(UtilsError::ActorNotFound { actor_id })?;
            let type_id = actor.type_id();
            let vehicle = Vehicle::try_from(actor)
                .map_err(|_| UtilsError::NotAVehicle { actor_id, type_id })?;
            vehicle.set_autopilot(enabled);
            Ok(())
        })
    }

    #[instrument(name = "real_carla_destroy_actor", skip(self), fields(actor_id))]
    async fn destroy_actor(&self, actor_id: ActorId) -> Result<bool> {
        self.with_world_mut(|world| {
            // Idempotent: a missing actor is not an error
            let Some(actor) = Self::find_actor(world, actor_id) else {
                return Ok(false);
            };
            if actor.destroy() {
                debug!(actor_id, "actor destroyed");
                Ok(true)
            } else {
                Err(UtilsError::destroy(actor_id, "server refused destroy"))
            }
        })
    }

    async fn actors(&self, filter: &str) -> Result<Vec<ActorSnapshot>> {
        self.with_world_mut(|world| {
            Ok(world
                .actors()
                .filter(filter)
                .iter()
                .map(|actor| Self::snapshot(&actor))
                .collect())
        })
    }

    async fn actor(&self, actor_id: ActorId) -> Result<Option<ActorSnapshot>> {
        self.with_world_mut(|world| Ok(Self::find_actor(world, actor_id).map(|a| Self::snapshot(&a))))
    }

    async fn waypoint(&self, location: Location) -> Result<Option<Waypoint>> {
        self.with_world_mut(|world| {
            Ok(world
                .map()
                .waypoint(&to_carla_location(&location))
                .map(|wp| Waypoint {
                    road_id: wp.road_id(),
                    section_id: wp.section_id(),
                    lane_id: wp.lane_id(),
                    s: wp.distance(),
                    transform: from_carla_transform(&wp.transform()),
                }))
        })
    }

    async fn spectator_transform(&self) -> Result<Transform> {
        self.with_world_mut(|world| Ok(from_carla_transform(&world.spectator().transform())))
    }

    #[instrument(name = "real_carla_set_spectator", skip(self, transform))]
    async fn set_spectator_transform(&self, transform: Transform) -> Result<()> {
        self.with_world_mut(|world| {
            world.spectator().set_transform(&to_carla_transform(&transform));
            Ok(())
        })
    }

    async fn draw(&self, shape: DebugShape, style: DrawStyle) -> Result<()> {
        let color = to_carla_color(&style.color);
        let thickness = style.thickness as f32;
        let life_time = style.life_time as f32;
        let persistent = style.is_persistent();

        self.with_world_mut(|world| {
            let mut debug = world.debug();
            match shape {
                DebugShape::Point { location } => {
                    debug.draw_point(&to_carla_location(&location), thickness, color, life_time, persistent)
                }
                DebugShape::Line { begin, end } => debug.draw_line(
                    &to_carla_location(&begin),
                    &to_carla_location(&end),
                    thickness,
                    color,
                    life_time,
                    persistent,
                ),
                DebugShape::Arrow {
                    begin,
                    end,
                    arrow_size,
                } => debug.draw_arrow(
                    &to_carla_location(&begin),
                    &to_carla_location(&end),
                    thickness,
                    arrow_size as f32,
                    color,
                    life_time,
                    persistent,
                ),
                DebugShape::String { location, text } => debug.draw_string(
                    &to_carla_location(&location),
                    &text,
                    false,
                    color,
                    life_time,
                    persistent,
                ),
                DebugShape::Box {
                    bounding_box,
                    rotation,
                } => {
                    let bbox = CarlaBoundingBox {
                        location: to_carla_location(&bounding_box.location),
                        extent: CarlaVector3D {
                            x: bounding_box.extent.x as f32,
                            y: bounding_box.extent.y as f32,
                            z: bounding_box.extent.z as f32,
                        },
                        ..Default::default()
                    };
                    debug.draw_box(
                        &bbox,
                        &to_carla_rotation(&rotation),
                        thickness,
                        color,
                        life_time,
                        persistent,
                    )
                }
            }
            Ok(())
        })
    }

    #[instrument(name = "real_carla_start_recorder", skip(self), fields(file = %file))]
    async fn start_recorder(&self, file: &str, additional_data: bool) -> Result<String> {
        self.with_client_mut(|client| Ok(client.start_recorder(file, additional_data)))
    }

    async fn stop_recorder(&self) -> Result<()> {
        self.with_client_mut(|client| {
            client.stop_recorder();
            Ok(())
        })
    }

    async fn replay_file(&self, request: &ReplayRequest) -> Result<String> {
        self.with_client_mut(|client| {
            Ok(client.replay_file(
                &request.file,
                request.start,
                request.duration,
                request.follow_id,
                false,
            ))
        })
    }

    async fn wait_for_tick(&self) -> Result<WorldTick> {
        self.with_world_mut(|world| {
            let snapshot = world.wait_for_tick();
            let timestamp = snapshot.timestamp();
            Ok(WorldTick {
                frame: snapshot.frame() as u64,
                elapsed_seconds: timestamp.elapsed_seconds,
                delta_seconds: timestamp.delta_seconds,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    // Real client tests require CARLA server running
    // These tests are marked as ignore, only run when server is available

    use super::*;

    #[test]
    fn test_transform_conversion() {
        let transform = Transform::new(Location::new(1.5, -2.0, 0.5), Rotation::new(0.0, 90.0, 0.0));
        assert_eq!(from_carla_transform(&to_carla_transform(&transform)), transform);
    }

    #[tokio::test]
    async fn test_requires_connect() {
        let client = RealCarlaClient::new();
        assert!(matches!(client.map_name().await, Err(UtilsError::NotConnected)));
    }

    #[tokio::test]
    #[ignore = "requires CARLA server"]
    async fn test_real_client_connect() {
        let mut client = RealCarlaClient::new();
        client.connect("127.0.0.1", 2000).await.unwrap();
        assert!(!client.map_name().await.unwrap().is_empty());
    }
}

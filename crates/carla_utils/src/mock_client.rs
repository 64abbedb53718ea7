//! Mock CARLA 客户端
//!
//! 内存中的模拟世界，用于单元测试和 demo，支持注入失败场景。
//!
//! The world is deliberately small: a blueprint library with a handful of
//! vehicles, a walker and the camera sensors, a grid of spawn points, and a
//! few static actors (spectator, traffic lights). Autopilot vehicles drive
//! straight along their yaw on every tick so distance-based helpers have
//! something to act on.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use contracts::{
    wildcard_match, ActorBlueprint, ActorId, ActorKind, ActorSnapshot, BlueprintAttribute,
    BoundingBox, DebugShape, DrawStyle, Location, Rotation, Transform, Vector3D, Waypoint,
    WorldTick,
};
use tracing::{debug, instrument};

use crate::client::{CarlaClient, ReplayRequest};
use crate::error::{Result, UtilsError};
use crate::session::map_basename;

/// Two spawned bodies closer than this collide
const COLLISION_RADIUS: f64 = 2.0;

/// Mock 客户端配置
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// 初始地图
    pub map_name: String,
    /// 可加载的地图
    pub available_maps: Vec<String>,
    /// 蓝图库
    pub blueprints: Vec<ActorBlueprint>,
    /// 推荐出生点
    pub spawn_points: Vec<Transform>,
    /// 连接失败
    pub fail_connect: bool,
    /// 应该失败的 destroy actor IDs
    pub fail_destroy: Vec<ActorId>,
    /// 每个 tick 的仿真时长 (秒)
    pub delta_seconds: f64,
    /// 自动驾驶车速 (m/s)
    pub autopilot_speed: f64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            map_name: "Carla/Maps/Town03".to_string(),
            available_maps: ["Town01", "Town02", "Town03", "Town04", "Town05", "Town10HD"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            blueprints: default_blueprint_library(),
            spawn_points: default_spawn_points(),
            fail_connect: false,
            fail_destroy: Vec::new(),
            delta_seconds: 0.05,
            autopilot_speed: 10.0,
        }
    }
}

/// Blueprint library resembling a stock CARLA install
pub fn default_blueprint_library() -> Vec<ActorBlueprint> {
    let colors = ["17,37,103", "255,255,255", "0,0,0", "214,0,0"];
    let vehicle = |id: &str, tags: &[&str], color: Option<&[&str]>| {
        let mut bp = ActorBlueprint::new(id)
            .with_tags(tags.iter().copied())
            .with_attribute("role_name", BlueprintAttribute::new("autopilot"))
            .with_attribute("number_of_wheels", BlueprintAttribute::read_only("4"));
        if let Some(recommended) = color {
            bp = bp.with_attribute(
                "color",
                BlueprintAttribute::with_recommended(recommended[0], recommended.iter().copied()),
            );
        }
        bp
    };
    let camera = |id: &str, extra: &[(&str, &str)]| {
        let mut bp = ActorBlueprint::new(id)
            .with_tags(["sensor", "camera"])
            .with_attribute("role_name", BlueprintAttribute::new("front"))
            .with_attribute("image_size_x", BlueprintAttribute::new("800"))
            .with_attribute("image_size_y", BlueprintAttribute::new("600"))
            .with_attribute("fov", BlueprintAttribute::new("90.0"))
            .with_attribute("sensor_tick", BlueprintAttribute::new("0.0"));
        for (key, value) in extra {
            bp = bp.with_attribute(*key, BlueprintAttribute::new(*value));
        }
        bp
    };

    vec![
        vehicle("vehicle.tesla.model3", &["vehicle", "tesla", "model3"], Some(&colors[..])),
        vehicle("vehicle.audi.a2", &["vehicle", "audi", "a2"], Some(&colors[..])),
        vehicle(
            "vehicle.carlamotors.carlacola",
            &["vehicle", "carlamotors", "carlacola"],
            None,
        ),
        ActorBlueprint::new("walker.pedestrian.0001")
            .with_tags(["walker", "pedestrian"])
            .with_attribute("role_name", BlueprintAttribute::new("pedestrian"))
            .with_attribute("is_invincible", BlueprintAttribute::new("true")),
        camera("sensor.camera.rgb", &[("enable_postprocess_effects", "True")]),
        camera("sensor.camera.depth", &[]),
        camera("sensor.camera.semantic_segmentation", &[]),
        ActorBlueprint::new("sensor.lidar.ray_cast")
            .with_tags(["sensor", "lidar"])
            .with_attribute("role_name", BlueprintAttribute::new("front"))
            .with_attribute("range", BlueprintAttribute::new("10.0")),
    ]
}

/// 8x8 grid, 20 m apart, alternating heading
pub fn default_spawn_points() -> Vec<Transform> {
    (0..64)
        .map(|i| {
            let row = (i / 8) as f64;
            let col = (i % 8) as f64;
            Transform::new(
                Location::new(col * 20.0, row * 20.0, 0.3),
                Rotation::new(0.0, if i % 2 == 0 { 0.0 } else { 180.0 }, 0.0),
            )
        })
        .collect()
}

#[derive(Debug, Clone)]
struct MockActor {
    snapshot: ActorSnapshot,
    blueprint: Option<ActorBlueprint>,
    /// Pose relative to parent for attached actors
    relative: Option<Transform>,
    autopilot: bool,
}

#[derive(Debug, Default)]
struct MockWorld {
    connected: bool,
    timeout: Option<Duration>,
    map_name: String,
    actors: BTreeMap<ActorId, MockActor>,
    spectator_id: ActorId,
    drawn: Vec<(DebugShape, DrawStyle)>,
    recorder: Option<String>,
    recordings: Vec<String>,
    replays: Vec<ReplayRequest>,
    /// Successful `destroy_actor` calls, in call order
    destroyed: Vec<ActorId>,
    frame: u64,
    elapsed: f64,
    load_count: usize,
}

/// Mock CARLA 客户端
///
/// Cloning shares the same world, so a test can hand one clone to the code
/// under test and inspect the world through another.
#[derive(Clone)]
pub struct MockCarlaClient {
    /// 配置（可注入失败场景）
    config: Arc<MockConfig>,
    /// Actor ID 计数器
    next_actor_id: Arc<AtomicU32>,
    world: Arc<Mutex<MockWorld>>,
}

impl MockCarlaClient {
    /// 创建默认 mock 客户端
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// 使用配置创建 mock 客户端
    pub fn with_config(config: MockConfig) -> Self {
        let client = Self {
            world: Arc::new(Mutex::new(MockWorld {
                map_name: config.map_name.clone(),
                ..MockWorld::default()
            })),
            config: Arc::new(config),
            next_actor_id: Arc::new(AtomicU32::new(1000)), // 从 1000 开始，便于识别
        };
        client.populate_static_actors();
        client
    }

    fn lock(&self) -> MutexGuard<'_, MockWorld> {
        self.world.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn allocate_actor_id(&self) -> ActorId {
        self.next_actor_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Spectator and two traffic lights, recreated on every map load
    fn populate_static_actors(&self) {
        let spectator_id = self.allocate_actor_id();
        let lights = [
            Location::new(10.0, 10.0, 0.0),
            Location::new(90.0, 50.0, 0.0),
        ];

        let mut world = self.lock();
        world.actors.clear();
        world.spectator_id = spectator_id;
        world.actors.insert(
            spectator_id,
            static_actor(spectator_id, "spectator", Transform::default()),
        );
        for location in lights {
            let id = self.allocate_actor_id();
            world.actors.insert(
                id,
                static_actor(
                    id,
                    "traffic.traffic_light",
                    Transform::new(location, Rotation::default()),
                ),
            );
        }
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.lock().connected {
            Ok(())
        } else {
            Err(UtilsError::NotConnected)
        }
    }

    /// Place an actor directly, bypassing the blueprint library and
    /// collision checks. Used to set up obstacles in tests.
    pub fn insert_actor(&self, type_id: &str, transform: Transform) -> ActorId {
        let id = self.allocate_actor_id();
        let kind = ActorKind::from_type_id(type_id);
        self.lock().actors.insert(
            id,
            MockActor {
                snapshot: ActorSnapshot {
                    id,
                    type_id: type_id.to_string(),
                    transform,
                    velocity: Vector3D::default(),
                    acceleration: Vector3D::default(),
                    bounding_box: bounding_box_for(kind),
                    parent: None,
                },
                blueprint: None,
                relative: None,
                autopilot: false,
            },
        );
        id
    }

    /// 获取当前 actor 数量（含静态 actor）
    pub fn actor_count(&self) -> usize {
        self.lock().actors.len()
    }

    /// Number of vehicles, walkers and sensors
    pub fn dynamic_actor_count(&self) -> usize {
        self.lock()
            .actors
            .values()
            .filter(|a| a.snapshot.kind().is_dynamic())
            .count()
    }

    /// 获取所有 actor IDs
    pub fn all_actor_ids(&self) -> Vec<ActorId> {
        self.lock().actors.keys().copied().collect()
    }

    /// Blueprint an actor was spawned from, attributes included
    pub fn spawned_blueprint(&self, actor_id: ActorId) -> Option<ActorBlueprint> {
        self.lock()
            .actors
            .get(&actor_id)
            .and_then(|a| a.blueprint.clone())
    }

    pub fn is_autopilot(&self, actor_id: ActorId) -> bool {
        self.lock()
            .actors
            .get(&actor_id)
            .is_some_and(|a| a.autopilot)
    }

    /// Every shape drawn so far, in order
    pub fn drawn_shapes(&self) -> Vec<(DebugShape, DrawStyle)> {
        self.lock().drawn.clone()
    }

    /// File of the running recorder
    pub fn active_recording(&self) -> Option<String> {
        self.lock().recorder.clone()
    }

    /// Every recorder file started so far
    pub fn recordings(&self) -> Vec<String> {
        self.lock().recordings.clone()
    }

    pub fn replays(&self) -> Vec<ReplayRequest> {
        self.lock().replays.clone()
    }

    /// Actors removed through `destroy_actor`, oldest first
    pub fn destroyed_actors(&self) -> Vec<ActorId> {
        self.lock().destroyed.clone()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.lock().timeout
    }

    /// How many times `load_world` ran
    pub fn load_count(&self) -> usize {
        self.lock().load_count
    }

    pub fn frame(&self) -> u64 {
        self.lock().frame
    }

    fn library_entry(&self, blueprint_id: &str) -> Option<&ActorBlueprint> {
        self.config.blueprints.iter().find(|bp| bp.id == blueprint_id)
    }
}

impl Default for MockCarlaClient {
    fn default() -> Self {
        Self::new()
    }
}

fn static_actor(id: ActorId, type_id: &str, transform: Transform) -> MockActor {
    MockActor {
        snapshot: ActorSnapshot {
            id,
            type_id: type_id.to_string(),
            transform,
            velocity: Vector3D::default(),
            acceleration: Vector3D::default(),
            bounding_box: BoundingBox::default(),
            parent: None,
        },
        blueprint: None,
        relative: None,
        autopilot: false,
    }
}

fn bounding_box_for(kind: ActorKind) -> BoundingBox {
    match kind {
        ActorKind::Vehicle => BoundingBox::new(
            Location::new(0.0, 0.0, 0.7),
            Vector3D::new(2.4, 1.0, 0.75),
        ),
        ActorKind::Walker => BoundingBox::new(Location::ORIGIN, Vector3D::new(0.2, 0.2, 0.9)),
        ActorKind::Sensor | ActorKind::Other => BoundingBox::default(),
    }
}

/// Attached actors ride on their parent: locations add, rotations add
fn compose(parent: &Transform, relative: &Transform) -> Transform {
    Transform {
        location: parent.location + relative.location,
        rotation: Rotation::new(
            parent.rotation.pitch + relative.rotation.pitch,
            parent.rotation.yaw + relative.rotation.yaw,
            parent.rotation.roll + relative.rotation.roll,
        ),
    }
}

impl CarlaClient for MockCarlaClient {
    #[instrument(name = "mock_carla_connect", skip(self), fields(host = %host, port))]
    async fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        if self.config.fail_connect {
            return Err(UtilsError::ConnectionFailed {
                message: format!("mock failure connecting to {host}:{port}"),
            });
        }
        self.lock().connected = true;
        Ok(())
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.lock().timeout = Some(timeout);
    }

    async fn map_name(&self) -> Result<String> {
        self.ensure_connected()?;
        Ok(self.lock().map_name.clone())
    }

    #[instrument(name = "mock_carla_load_world", skip(self), fields(map = %map))]
    async fn load_world(&self, map: &str) -> Result<()> {
        self.ensure_connected()?;

        let basename = map_basename(map);
        if !self.config.available_maps.iter().any(|m| m == basename) {
            return Err(UtilsError::LoadWorldFailed {
                map: map.to_string(),
                message: "map not found".into(),
            });
        }

        {
            let mut world = self.lock();
            world.map_name = format!("Carla/Maps/{basename}");
            world.load_count += 1;
            world.drawn.clear();
        }
        self.populate_static_actors();
        Ok(())
    }

    async fn blueprints(&self, filter: &str) -> Result<Vec<ActorBlueprint>> {
        self.ensure_connected()?;
        Ok(self
            .config
            .blueprints
            .iter()
            .filter(|bp| bp.matches(filter))
            .cloned()
            .collect())
    }

    async fn spawn_points(&self) -> Result<Vec<Transform>> {
        self.ensure_connected()?;
        Ok(self.config.spawn_points.clone())
    }

    #[instrument(
        name = "mock_carla_try_spawn_actor",
        skip_all,
        fields(blueprint = %blueprint.id, parent = ?parent)
    )]
    async fn try_spawn_actor(
        &self,
        blueprint: &ActorBlueprint,
        transform: Transform,
        parent: Option<ActorId>,
    ) -> Result<Option<ActorId>> {
        self.ensure_connected()?;

        if self.library_entry(&blueprint.id).is_none() {
            return Err(UtilsError::blueprint_not_found(&blueprint.id));
        }

        let kind = ActorKind::from_type_id(&blueprint.id);
        let mut world = self.lock();

        let world_transform = match parent {
            Some(parent_id) => {
                let parent_actor = world.actors.get(&parent_id).ok_or_else(|| {
                    UtilsError::spawn(&blueprint.id, format!("parent actor {parent_id} not found"))
                })?;
                compose(&parent_actor.snapshot.transform, &transform)
            }
            None => {
                // 碰撞检测：只检查车辆和行人
                let blocked = matches!(kind, ActorKind::Vehicle | ActorKind::Walker)
                    && world.actors.values().any(|a| {
                        matches!(a.snapshot.kind(), ActorKind::Vehicle | ActorKind::Walker)
                            && a.snapshot.location().distance(&transform.location)
                                < COLLISION_RADIUS
                    });
                if blocked {
                    debug!(location = ?transform.location, "spawn refused: collision");
                    return Ok(None);
                }
                transform
            }
        };

        let actor_id = self.allocate_actor_id();
        world.actors.insert(
            actor_id,
            MockActor {
                snapshot: ActorSnapshot {
                    id: actor_id,
                    type_id: blueprint.id.clone(),
                    transform: world_transform,
                    velocity: Vector3D::default(),
                    acceleration: Vector3D::default(),
                    bounding_box: bounding_box_for(kind),
                    parent,
                },
                blueprint: Some(blueprint.clone()),
                relative: parent.map(|_| transform),
                autopilot: false,
            },
        );
        Ok(Some(actor_id))
    }

    #[instrument(name = "mock_carla_set_autopilot", skip(self))]
    async fn set_autopilot(&self, actor_id: ActorId, enabled: bool) -> Result<()> {
        self.ensure_connected()?;
        let mut world = self.lock();
        let actor = world
            .actors
            .get_mut(&actor_id)
            .ok_or(UtilsError::ActorNotFound { actor_id })?;

        if actor.snapshot.kind() != ActorKind::Vehicle {
            return Err(UtilsError::NotAVehicle {
                actor_id,
                type_id: actor.snapshot.type_id.clone(),
            });
        }
        actor.autopilot = enabled;
        Ok(())
    }

    #[instrument(name = "mock_carla_destroy_actor", skip(self), fields(actor_id))]
    async fn destroy_actor(&self, actor_id: ActorId) -> Result<bool> {
        self.ensure_connected()?;
        if self.config.fail_destroy.contains(&actor_id) {
            return Err(UtilsError::destroy(actor_id, "mock failure"));
        }

        // 幂等：即使不存在也返回 Ok
        let mut world = self.lock();
        let existed = world.actors.remove(&actor_id).is_some();
        if existed {
            world.destroyed.push(actor_id);
        }
        Ok(existed)
    }

    async fn actors(&self, filter: &str) -> Result<Vec<ActorSnapshot>> {
        self.ensure_connected()?;
        Ok(self
            .lock()
            .actors
            .values()
            .filter(|a| wildcard_match(filter, &a.snapshot.type_id))
            .map(|a| a.snapshot.clone())
            .collect())
    }

    async fn actor(&self, actor_id: ActorId) -> Result<Option<ActorSnapshot>> {
        self.ensure_connected()?;
        Ok(self
            .lock()
            .actors
            .get(&actor_id)
            .map(|a| a.snapshot.clone()))
    }

    async fn waypoint(&self, location: Location) -> Result<Option<Waypoint>> {
        self.ensure_connected()?;
        // Spawn points stand in for the road network
        let nearest = self
            .config
            .spawn_points
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.location
                    .distance(&location)
                    .total_cmp(&b.location.distance(&location))
            });

        Ok(nearest.map(|(idx, transform)| Waypoint {
            road_id: idx as u32,
            section_id: 0,
            lane_id: -1,
            s: 0.0,
            transform: *transform,
        }))
    }

    async fn spectator_transform(&self) -> Result<Transform> {
        self.ensure_connected()?;
        let world = self.lock();
        world
            .actors
            .get(&world.spectator_id)
            .map(|a| a.snapshot.transform)
            .ok_or(UtilsError::ActorNotFound {
                actor_id: world.spectator_id,
            })
    }

    #[instrument(name = "mock_carla_set_spectator", skip(self, transform))]
    async fn set_spectator_transform(&self, transform: Transform) -> Result<()> {
        self.ensure_connected()?;
        let mut world = self.lock();
        let spectator_id = world.spectator_id;
        let spectator = world
            .actors
            .get_mut(&spectator_id)
            .ok_or(UtilsError::ActorNotFound {
                actor_id: spectator_id,
            })?;
        spectator.snapshot.transform = transform;
        Ok(())
    }

    async fn draw(&self, shape: DebugShape, style: DrawStyle) -> Result<()> {
        self.ensure_connected()?;
        self.lock().drawn.push((shape, style));
        Ok(())
    }

    #[instrument(name = "mock_carla_start_recorder", skip(self), fields(file = %file))]
    async fn start_recorder(&self, file: &str, additional_data: bool) -> Result<String> {
        self.ensure_connected()?;
        let mut world = self.lock();
        if let Some(active) = &world.recorder {
            return Err(UtilsError::recorder(format!(
                "recorder already running into '{active}'"
            )));
        }
        world.recorder = Some(file.to_string());
        world.recordings.push(file.to_string());
        Ok(format!(
            "Recording on file: {file} (additional data: {additional_data})"
        ))
    }

    async fn stop_recorder(&self) -> Result<()> {
        self.ensure_connected()?;
        self.lock().recorder = None;
        Ok(())
    }

    async fn replay_file(&self, request: &ReplayRequest) -> Result<String> {
        self.ensure_connected()?;
        let mut world = self.lock();
        if !world.recordings.contains(&request.file) {
            return Err(UtilsError::recorder(format!(
                "file '{}' not found",
                request.file
            )));
        }
        world.replays.push(request.clone());
        Ok(format!("Replaying file '{}'", request.file))
    }

    async fn wait_for_tick(&self) -> Result<WorldTick> {
        self.ensure_connected()?;
        let delta = self.config.delta_seconds;
        let speed = self.config.autopilot_speed;
        let mut world = self.lock();

        for actor in world.actors.values_mut().filter(|a| a.autopilot) {
            let yaw = actor.snapshot.transform.rotation.yaw.to_radians();
            let velocity = Vector3D::new(yaw.cos() * speed, yaw.sin() * speed, 0.0);
            actor.snapshot.velocity = velocity;
            actor.snapshot.transform.location =
                actor.snapshot.transform.location + velocity.scale(delta);
        }

        // Attached actors follow their parent
        let parents: BTreeMap<ActorId, Transform> = world
            .actors
            .iter()
            .map(|(id, a)| (*id, a.snapshot.transform))
            .collect();
        for actor in world.actors.values_mut() {
            if let (Some(parent_id), Some(relative)) = (actor.snapshot.parent, actor.relative) {
                if let Some(parent) = parents.get(&parent_id) {
                    actor.snapshot.transform = compose(parent, &relative);
                }
            }
        }

        world.frame += 1;
        world.elapsed += delta;
        Ok(WorldTick {
            frame: world.frame,
            elapsed_seconds: world.elapsed,
            delta_seconds: delta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn connected() -> MockCarlaClient {
        let mut client = MockCarlaClient::new();
        client.connect("localhost", 2000).await.unwrap();
        client
    }

    fn model3() -> ActorBlueprint {
        default_blueprint_library()
            .into_iter()
            .find(|bp| bp.id == "vehicle.tesla.model3")
            .unwrap()
    }

    #[tokio::test]
    async fn test_mock_requires_connect() {
        let client = MockCarlaClient::new();
        let err = client.map_name().await.unwrap_err();
        assert!(matches!(err, UtilsError::NotConnected));
    }

    #[tokio::test]
    async fn test_mock_spawn_vehicle() {
        let client = connected().await;
        let transform = client.spawn_points().await.unwrap()[0];

        let actor_id = client
            .try_spawn_actor(&model3(), transform, None)
            .await
            .unwrap()
            .unwrap();
        assert!(actor_id >= 1000);
        assert_eq!(client.dynamic_actor_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_spawn_collision_refused() {
        let client = connected().await;
        let transform = client.spawn_points().await.unwrap()[0];

        assert!(client
            .try_spawn_actor(&model3(), transform, None)
            .await
            .unwrap()
            .is_some());
        assert!(client
            .try_spawn_actor(&model3(), transform, None)
            .await
            .unwrap()
            .is_none());

        let err = client
            .spawn_actor(&model3(), transform, None)
            .await
            .unwrap_err();
        assert!(matches!(err, UtilsError::SpawnFailed { .. }));
    }

    #[tokio::test]
    async fn test_mock_spawn_attached_sensor_follows_parent() {
        let client = connected().await;
        let vehicle_id = client
            .spawn_actor(&model3(), Transform::default(), None)
            .await
            .unwrap();
        client.set_autopilot(vehicle_id, true).await.unwrap();

        let camera = ActorBlueprint::new("sensor.camera.rgb");
        let relative = Transform::new(Location::new(0.5, 0.0, 1.5), Rotation::default());
        let sensor_id = client
            .spawn_actor(&camera, relative, Some(vehicle_id))
            .await
            .unwrap();

        client.wait_for_tick().await.unwrap();

        let vehicle = client.actor(vehicle_id).await.unwrap().unwrap();
        let sensor = client.actor(sensor_id).await.unwrap().unwrap();
        assert_eq!(sensor.parent, Some(vehicle_id));
        assert!(vehicle.location().x > 0.0);
        assert_eq!(sensor.location(), vehicle.location() + relative.location);
    }

    #[tokio::test]
    async fn test_mock_unknown_blueprint() {
        let client = connected().await;
        let err = client
            .try_spawn_actor(&ActorBlueprint::new("vehicle.unknown"), Transform::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, UtilsError::BlueprintNotFound { .. }));
    }

    #[tokio::test]
    async fn test_mock_autopilot_rejects_walker() {
        let client = connected().await;
        let walker = client.insert_actor("walker.pedestrian.0001", Transform::default());
        let err = client.set_autopilot(walker, true).await.unwrap_err();
        assert!(matches!(err, UtilsError::NotAVehicle { .. }));
    }

    #[tokio::test]
    async fn test_mock_destroy_idempotent() {
        let client = connected().await;
        let actor_id = client
            .spawn_actor(&model3(), Transform::default(), None)
            .await
            .unwrap();
        assert!(client.destroy_actor(actor_id).await.unwrap());
        // Second destroy should also succeed
        assert!(!client.destroy_actor(actor_id).await.unwrap());
        assert_eq!(client.destroyed_actors(), vec![actor_id]);
        assert_eq!(client.dynamic_actor_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_load_world_resets_actors() {
        let client = connected().await;
        client
            .spawn_actor(&model3(), Transform::default(), None)
            .await
            .unwrap();

        client.load_world("/Game/Carla/Maps/Town04").await.unwrap();
        assert_eq!(client.map_name().await.unwrap(), "Carla/Maps/Town04");
        assert_eq!(client.dynamic_actor_count(), 0);
        assert_eq!(client.load_count(), 1);
        assert!(client.spectator_transform().await.is_ok());

        let err = client.load_world("Atlantis").await.unwrap_err();
        assert!(matches!(err, UtilsError::LoadWorldFailed { .. }));
    }

    #[tokio::test]
    async fn test_mock_recorder_single_session() {
        let client = connected().await;
        client.start_recorder("a.log", false).await.unwrap();
        assert!(client.start_recorder("b.log", false).await.is_err());
        client.stop_recorder().await.unwrap();
        assert_eq!(client.active_recording(), None);

        client
            .replay_file(&ReplayRequest::whole_file("a.log"))
            .await
            .unwrap();
        assert!(client
            .replay_file(&ReplayRequest::whole_file("missing.log"))
            .await
            .is_err());
    }
}

//! CARLA client abstraction
//!
//! Defines the trait every helper talks to, supporting the real client and
//! the in-memory mock.

use std::future::Future;
use std::time::Duration;

use contracts::{
    ActorBlueprint, ActorId, ActorSnapshot, DebugShape, DrawStyle, Location, Transform, Waypoint,
    WorldTick,
};

use crate::error::Result;

/// Replay parameters for the recorder
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayRequest {
    pub file: String,
    /// Start offset (seconds), negative counts from the end
    pub start: f64,
    /// Seconds to replay, 0 = whole file
    pub duration: f64,
    /// Actor the spectator follows during replay (0 = free camera)
    pub follow_id: ActorId,
}

impl ReplayRequest {
    pub fn whole_file(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            start: 0.0,
            duration: 0.0,
            follow_id: 0,
        }
    }
}

/// CARLA client trait
///
/// One method per simulator call; each call blocks until the server answers.
/// Helpers in this crate are generic over it so they run against the mock in
/// tests and against a live server in production.
pub trait CarlaClient: Send + Sync {
    /// Connect to CARLA server
    fn connect(&mut self, host: &str, port: u16) -> impl Future<Output = Result<()>> + Send;

    /// Network timeout for later calls
    fn set_timeout(&mut self, timeout: Duration);

    /// Name of the currently loaded map (e.g., "Carla/Maps/Town03")
    fn map_name(&self) -> impl Future<Output = Result<String>> + Send;

    /// Load another map, destroying every actor of the current world
    fn load_world(&self, map: &str) -> impl Future<Output = Result<()>> + Send;

    /// Blueprint library entries matching a wildcard filter
    fn blueprints(&self, filter: &str) -> impl Future<Output = Result<Vec<ActorBlueprint>>> + Send;

    /// Recommended spawn transforms of the current map
    fn spawn_points(&self) -> impl Future<Output = Result<Vec<Transform>>> + Send;

    /// Spawn an actor, returning `None` when the simulator refuses
    /// (e.g., collision at the spawn point)
    ///
    /// # Arguments
    /// * `blueprint` - Blueprint with attributes already set
    /// * `transform` - World pose, or pose relative to `parent`
    /// * `parent` - Actor to attach to
    fn try_spawn_actor(
        &self,
        blueprint: &ActorBlueprint,
        transform: Transform,
        parent: Option<ActorId>,
    ) -> impl Future<Output = Result<Option<ActorId>>> + Send;

    /// Like `try_spawn_actor`, but a refusal is an error
    fn spawn_actor(
        &self,
        blueprint: &ActorBlueprint,
        transform: Transform,
        parent: Option<ActorId>,
    ) -> impl Future<Output = Result<ActorId>> + Send {
        async move {
            self.try_spawn_actor(blueprint, transform, parent)
                .await?
                .ok_or_else(|| {
                    crate::error::UtilsError::spawn(&blueprint.id, "spawn refused by simulator")
                })
        }
    }

    /// Hand a vehicle to the traffic manager
    fn set_autopilot(
        &self,
        actor_id: ActorId,
        enabled: bool,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Destroy actor
    ///
    /// Idempotent operation: returns `Ok(false)` if actor doesn't exist
    fn destroy_actor(&self, actor_id: ActorId) -> impl Future<Output = Result<bool>> + Send;

    /// Live actors whose type id matches a wildcard filter
    fn actors(&self, filter: &str) -> impl Future<Output = Result<Vec<ActorSnapshot>>> + Send;

    /// Single actor snapshot, `None` if it doesn't exist
    fn actor(&self, actor_id: ActorId) -> impl Future<Output = Result<Option<ActorSnapshot>>> + Send;

    /// Nearest driving-lane waypoint
    fn waypoint(&self, location: Location) -> impl Future<Output = Result<Option<Waypoint>>> + Send;

    fn spectator_transform(&self) -> impl Future<Output = Result<Transform>> + Send;

    fn set_spectator_transform(&self, transform: Transform)
        -> impl Future<Output = Result<()>> + Send;

    /// Forward a shape to the world's debug helper
    fn draw(&self, shape: DebugShape, style: DrawStyle) -> impl Future<Output = Result<()>> + Send;

    /// Start the server-side recorder, returning the server's reply
    fn start_recorder(
        &self,
        file: &str,
        additional_data: bool,
    ) -> impl Future<Output = Result<String>> + Send;

    fn stop_recorder(&self) -> impl Future<Output = Result<()>> + Send;

    /// Replay a recorder file, returning the server's reply
    fn replay_file(&self, request: &ReplayRequest) -> impl Future<Output = Result<String>> + Send;

    /// Block until the next simulation tick
    fn wait_for_tick(&self) -> impl Future<Output = Result<WorldTick>> + Send;
}

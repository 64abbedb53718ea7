//! Actor handles and snapshots
//!
//! Actors are owned by the simulator; these are read-only copies of their
//! state at the moment of the query.

use serde::{Deserialize, Serialize};

use crate::{BoundingBox, Location, Transform, Vector3D};

/// CARLA actor handle type
pub type ActorId = u32;

/// Coarse actor classification derived from the type id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Vehicle,
    Walker,
    Sensor,
    Other,
}

impl ActorKind {
    /// Classify a simulator type id, e.g. `vehicle.tesla.model3`
    ///
    /// Substring match, so `controller.ai.walker` counts as a walker.
    pub fn from_type_id(type_id: &str) -> Self {
        if type_id.contains("vehicle") {
            Self::Vehicle
        } else if type_id.contains("walker") {
            Self::Walker
        } else if type_id.contains("sensor") {
            Self::Sensor
        } else {
            Self::Other
        }
    }

    /// Vehicles, walkers and sensors are spawned at runtime; the rest is map
    /// geometry (traffic lights, signs, spectator).
    pub fn is_dynamic(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Point-in-time view of a live actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub type_id: String,
    pub transform: Transform,
    #[serde(default)]
    pub velocity: Vector3D,
    #[serde(default)]
    pub acceleration: Vector3D,
    #[serde(default)]
    pub bounding_box: BoundingBox,
    /// Parent actor for attached sensors
    #[serde(default)]
    pub parent: Option<ActorId>,
}

impl ActorSnapshot {
    pub fn location(&self) -> Location {
        self.transform.location
    }

    pub fn kind(&self) -> ActorKind {
        ActorKind::from_type_id(&self.type_id)
    }
}

/// Map waypoint nearest to a location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub road_id: u32,
    pub section_id: u32,
    pub lane_id: i32,
    /// Distance along the road (metres)
    pub s: f64,
    pub transform: Transform,
}

/// Result of waiting for one simulation step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldTick {
    pub frame: u64,
    pub elapsed_seconds: f64,
    pub delta_seconds: f64,
}

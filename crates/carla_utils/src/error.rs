//! CARLA utilities error types

use contracts::{ActorId, ContractError};
use thiserror::Error;

/// Utilities specific error
#[derive(Debug, Error)]
pub enum UtilsError {
    /// CARLA connection error
    #[error("failed to connect to CARLA: {message}")]
    ConnectionFailed { message: String },

    /// Call issued before `connect`
    #[error("not connected to CARLA server")]
    NotConnected,

    /// Map load error
    #[error("failed to load map '{map}': {message}")]
    LoadWorldFailed { map: String, message: String },

    /// Blueprint lookup error
    #[error("blueprint '{blueprint}' not found")]
    BlueprintNotFound { blueprint: String },

    /// Filter matched nothing
    #[error("blueprint library is empty for filter '{filter}'")]
    EmptyLibrary { filter: String },

    /// Random choice from an empty blueprint slice
    #[error("no blueprints to choose from")]
    NoBlueprints,

    /// Spawn error
    #[error("failed to spawn '{blueprint}': {message}")]
    SpawnFailed { blueprint: String, message: String },

    /// Actor lookup error
    #[error("actor {actor_id} not found")]
    ActorNotFound { actor_id: ActorId },

    /// Autopilot on something that is not a vehicle
    #[error("actor {actor_id} ('{type_id}') is not a vehicle")]
    NotAVehicle { actor_id: ActorId, type_id: String },

    /// Destroy error
    #[error("failed to destroy actor {actor_id}: {message}")]
    DestroyFailed { actor_id: ActorId, message: String },

    /// Spawn point index outside the map's list
    #[error("spawn point {index} out of range (map has {available})")]
    SpawnPointOutOfRange { index: usize, available: usize },

    /// Camera settings the simulator cannot express
    #[error("invalid camera settings: {message}")]
    InvalidCameraSettings { message: String },

    /// Seconds value that does not fit a `Duration` (negative, NaN, infinite, too big)
    #[error("invalid duration for {what}: {seconds} s")]
    InvalidDuration { what: String, seconds: f64 },

    /// Recorder error
    #[error("recorder error: {message}")]
    Recorder { message: String },

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl UtilsError {
    /// Create spawn error
    pub fn spawn(blueprint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SpawnFailed {
            blueprint: blueprint.into(),
            message: message.into(),
        }
    }

    pub fn blueprint_not_found(blueprint: impl Into<String>) -> Self {
        Self::BlueprintNotFound {
            blueprint: blueprint.into(),
        }
    }

    pub fn destroy(actor_id: ActorId, message: impl Into<String>) -> Self {
        Self::DestroyFailed {
            actor_id,
            message: message.into(),
        }
    }

    pub fn invalid_duration(what: impl Into<String>, seconds: f64) -> Self {
        Self::InvalidDuration {
            what: what.into(),
            seconds,
        }
    }

    pub fn recorder(message: impl Into<String>) -> Self {
        Self::Recorder {
            message: message.into(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, UtilsError>;

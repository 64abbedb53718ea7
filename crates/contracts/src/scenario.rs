//! ScenarioConfig - Config Loader output
//!
//! Describes one scripted session: connection, world setup, spawned vehicles,
//! cleanup policy, recording and run length.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{CameraKind, Location, Placement, Transform, PERSISTENT};

/// Complete scenario configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ScenarioConfig {
    #[serde(default)]
    #[validate(nested)]
    pub client: ClientConfig,

    /// Spectator placement (skipped when absent)
    #[serde(default)]
    pub spectator: Option<Placement>,

    #[serde(default)]
    pub debug: DebugConfig,

    #[serde(default)]
    #[validate(nested)]
    pub vehicles: Vec<VehicleSpawnConfig>,

    /// Distance-based removal run every tick (skipped when absent)
    #[serde(default)]
    #[validate(nested)]
    pub cleanup: Option<CleanupConfig>,

    #[serde(default)]
    #[validate(nested)]
    pub recording: Option<RecordingConfig>,

    #[serde(default)]
    pub run: RunConfig,
}

/// Connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ClientConfig {
    /// CARLA server address
    #[serde(default = "default_host")]
    #[validate(length(min = 1, message = "host cannot be empty"))]
    pub host: String,

    /// CARLA server port
    #[serde(default = "default_port")]
    #[validate(range(min = 1, message = "port must be > 0"))]
    pub port: u16,

    /// Network timeout (seconds)
    #[serde(default = "default_timeout")]
    #[validate(range(exclusive_min = 0.0, message = "timeout_sec must be > 0"))]
    pub timeout_sec: f64,

    /// Map to load (e.g., "Town04" or "/Game/Carla/Maps/Town04")
    #[serde(default = "default_map")]
    #[validate(length(min = 1, message = "map cannot be empty"))]
    pub map: String,

    /// Reload the map even when it is already loaded
    #[serde(default)]
    pub force_reset: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    2000
}

fn default_timeout() -> f64 {
    3.0
}

fn default_map() -> String {
    "/Game/Carla/Maps/Town03".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_sec: default_timeout(),
            map: default_map(),
            force_reset: false,
        }
    }
}

/// Debug overlays drawn once at start-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfig {
    #[serde(default)]
    pub draw_spawn_points: bool,

    #[serde(default = "default_life_time")]
    pub life_time: f64,
}

fn default_life_time() -> f64 {
    PERSISTENT
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            draw_spawn_points: false,
            life_time: PERSISTENT,
        }
    }
}

/// One vehicle to spawn
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VehicleSpawnConfig {
    /// Blueprint library filter
    #[serde(default = "default_vehicle_filter")]
    #[validate(length(min = 1, message = "filter cannot be empty"))]
    pub filter: String,

    /// Index into the map's recommended spawn points
    pub spawn_point: usize,

    /// Paint color as "R,G,B" (random recommended color when absent)
    #[serde(default)]
    pub color: Option<String>,

    #[serde(default = "default_autopilot")]
    pub autopilot: bool,

    /// Camera attached to the vehicle
    #[serde(default)]
    #[validate(nested)]
    pub camera: Option<CameraConfig>,
}

fn default_vehicle_filter() -> String {
    "vehicle.*".to_string()
}

fn default_autopilot() -> bool {
    true
}

/// Camera sensor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CameraConfig {
    #[serde(default)]
    pub kind: CameraKind,

    /// Horizontal pixels
    #[serde(default = "default_width")]
    #[validate(range(min = 1, message = "width must be > 0"))]
    pub width: u32,

    /// Vertical pixels
    #[serde(default = "default_height")]
    #[validate(range(min = 1, message = "height must be > 0"))]
    pub height: u32,

    /// Horizontal field of view (degrees)
    #[serde(default = "default_fov")]
    #[validate(range(exclusive_min = 0.0, max = 180.0, message = "fov must be in (0, 180]"))]
    pub fov: f64,

    /// Capture rate (Hz)
    #[serde(default = "default_capture_rate")]
    #[validate(range(min = 1, message = "capture_rate must be >= 1"))]
    pub capture_rate: u32,

    /// Mount pose relative to the parent actor
    #[serde(default = "default_camera_transform")]
    pub transform: Transform,
}

fn default_width() -> u32 {
    1920
}

fn default_height() -> u32 {
    1080
}

fn default_fov() -> f64 {
    110.0
}

fn default_capture_rate() -> u32 {
    5
}

/// Hood-mounted, looking forward
pub fn default_camera_transform() -> Transform {
    Transform {
        location: Location::new(0.5, 0.0, 1.5),
        rotation: Default::default(),
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            kind: CameraKind::Rgb,
            width: default_width(),
            height: default_height(),
            fov: default_fov(),
            capture_rate: default_capture_rate(),
            transform: default_camera_transform(),
        }
    }
}

/// Distance-based actor removal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CleanupConfig {
    /// Area centre
    #[serde(default)]
    pub location: Location,

    #[serde(default = "default_max_distance")]
    #[validate(range(exclusive_min = 0.0, message = "max_distance must be > 0"))]
    pub max_distance: f64,

    #[serde(default = "default_vehicle_filter")]
    #[validate(length(min = 1, message = "actor_filter cannot be empty"))]
    pub actor_filter: String,
}

fn default_max_distance() -> f64 {
    100.0
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            location: Location::ORIGIN,
            max_distance: default_max_distance(),
            actor_filter: default_vehicle_filter(),
        }
    }
}

/// Session recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RecordingConfig {
    /// Recorder file name, relative paths land in the server's save directory
    #[validate(length(min = 1, message = "file cannot be empty"))]
    pub file: String,

    /// Also record bounding boxes, lights and control inputs
    #[serde(default)]
    pub additional_data: bool,
}

/// Idle loop and teardown settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Ticks to wait before teardown (0 = until shutdown)
    #[serde(default)]
    pub max_ticks: u64,

    /// Random pause before teardown, [min, max] seconds
    #[serde(default = "default_teardown_delay")]
    pub teardown_delay_sec: [f64; 2],
}

fn default_teardown_delay() -> [f64; 2] {
    [2.0, 6.0]
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_ticks: 0,
            teardown_delay_sec: default_teardown_delay(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let client = ClientConfig::default();
        assert_eq!(client.host, "127.0.0.1");
        assert_eq!(client.port, 2000);
        assert_eq!(client.timeout_sec, 3.0);
        assert_eq!(client.map, "/Game/Carla/Maps/Town03");

        let camera = CameraConfig::default();
        assert_eq!((camera.width, camera.height), (1920, 1080));
        assert_eq!(camera.transform.location, Location::new(0.5, 0.0, 1.5));
    }

    #[test]
    fn test_validate_nested_camera() {
        let mut config = ScenarioConfig::default();
        config.vehicles.push(VehicleSpawnConfig {
            filter: "vehicle.*".into(),
            spawn_point: 0,
            color: None,
            autopilot: true,
            camera: Some(CameraConfig {
                capture_rate: 0,
                ..CameraConfig::default()
            }),
        });
        assert!(config.validate().is_err());

        config.vehicles[0].camera = Some(CameraConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_minimal_json() {
        let config: ScenarioConfig =
            serde_json::from_str(r#"{ "vehicles": [{ "spawn_point": 3 }] }"#).unwrap();
        assert_eq!(config.vehicles[0].filter, "vehicle.*");
        assert!(config.vehicles[0].autopilot);
        assert_eq!(config.run.teardown_delay_sec, [2.0, 6.0]);
        assert!(config.spectator.is_none());
    }
}

//! Camera sensor blueprints
//!
//! Builds camera blueprints from a handful of settings and spawns them
//! attached to a parent actor.

use contracts::{ActorBlueprint, ActorId, CameraConfig, CameraKind, Transform};
use tracing::{info, instrument};

use crate::client::CarlaClient;
use crate::error::{Result, UtilsError};

pub use contracts::default_camera_transform;

/// Camera image and mount settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    pub height: u32,
    pub width: u32,
    /// Horizontal field of view (degrees)
    pub fov: f64,
    /// Images per second
    pub capture_rate: u32,
    /// Mount pose relative to the parent
    pub transform: Transform,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            height: 1080,
            width: 1920,
            fov: 110.0,
            capture_rate: 5,
            transform: default_camera_transform(),
        }
    }
}

impl From<&CameraConfig> for CameraSettings {
    fn from(config: &CameraConfig) -> Self {
        Self {
            height: config.height,
            width: config.width,
            fov: config.fov,
            capture_rate: config.capture_rate,
            transform: config.transform,
        }
    }
}

impl CameraSettings {
    /// Seconds between captures
    pub fn sensor_tick(&self) -> Result<f64> {
        if self.capture_rate == 0 {
            return Err(UtilsError::InvalidCameraSettings {
                message: "capture_rate must be >= 1".into(),
            });
        }
        Ok(1.0 / f64::from(self.capture_rate))
    }
}

/// Write image size, fov and sensor tick into a camera blueprint
pub fn set_camera_attributes(blueprint: &mut ActorBlueprint, settings: &CameraSettings) -> Result<()> {
    let sensor_tick = settings.sensor_tick()?;

    blueprint.set_attribute("image_size_x", settings.width.to_string())?;
    blueprint.set_attribute("image_size_y", settings.height.to_string())?;
    blueprint.set_attribute("fov", settings.fov.to_string())?;
    blueprint.set_attribute("sensor_tick", sensor_tick.to_string())?;
    Ok(())
}

/// Look up the camera blueprint and apply `settings`
///
/// RGB cameras also get post-processing effects enabled.
#[instrument(name = "camera_create_blueprint", skip(client, settings))]
pub async fn create_blueprint<C: CarlaClient>(
    client: &C,
    kind: CameraKind,
    settings: &CameraSettings,
) -> Result<ActorBlueprint> {
    let id = kind.blueprint_id();
    let mut blueprint = client
        .blueprints(id)
        .await?
        .into_iter()
        .find(|bp| bp.id == id)
        .ok_or_else(|| UtilsError::blueprint_not_found(id))?;

    set_camera_attributes(&mut blueprint, settings)?;
    if kind == CameraKind::Rgb {
        blueprint.set_attribute("enable_postprocess_effects", "True")?;
    }
    Ok(blueprint)
}

/// Spawn a camera attached to `parent` at `settings.transform`
#[instrument(name = "camera_create", skip(client, settings))]
pub async fn create_camera<C: CarlaClient>(
    client: &C,
    parent: ActorId,
    kind: CameraKind,
    settings: &CameraSettings,
) -> Result<ActorId> {
    let blueprint = create_blueprint(client, kind, settings).await?;
    let actor_id = client
        .spawn_actor(&blueprint, settings.transform, Some(parent))
        .await?;

    observability::metrics::record_actor_spawned(&blueprint.id);
    info!(actor_id, parent, kind = %kind, "camera attached");
    Ok(actor_id)
}

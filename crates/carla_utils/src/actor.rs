//! Actor helpers: blueprint randomization, spawning, inspection

use std::fmt;

use contracts::{
    ActorBlueprint, ActorId, ActorSnapshot, BoundingBox, Color, DebugShape, DrawStyle, Location,
    Placement, Transform, Vector3D, Waypoint, PERSISTENT,
};
use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::{debug, info, instrument, warn};

use crate::client::CarlaClient;
use crate::error::{Result, UtilsError};

/// Role name the traffic manager tools look for
pub const AUTOPILOT_ROLE: &str = "autopilot";

/// Pick a random blueprint and prepare it for spawning
///
/// Blueprints with a `color` attribute get `color` (an `"R,G,B"` string) or,
/// when `None`, one of the blueprint's recommended colors. `role_name` is
/// always set to `autopilot`.
///
/// # Errors
/// - empty library
/// - invalid color string
pub fn create_random_blueprint<R: Rng + ?Sized>(
    library: &[ActorBlueprint],
    color: Option<&str>,
    rng: &mut R,
) -> Result<ActorBlueprint> {
    let mut blueprint = library
        .choose(rng)
        .cloned()
        .ok_or(UtilsError::NoBlueprints)?;

    if blueprint.has_attribute("color") {
        let chosen = match color {
            Some(color) => Some(Color::parse_rgb(color)?.to_rgb_string()),
            None => blueprint
                .attribute("color")
                .and_then(|a| a.recommended_values.choose(rng))
                .cloned(),
        };
        if let Some(chosen) = chosen {
            blueprint.set_attribute("color", chosen)?;
        }
    }

    if blueprint.has_attribute("role_name") {
        blueprint.set_attribute("role_name", AUTOPILOT_ROLE)?;
    }

    debug!(blueprint = %blueprint.id, color = ?blueprint.attribute_value("color"), "blueprint chosen");
    Ok(blueprint)
}

/// Spawn an actor at the merged placement
///
/// `placement` resolves against the origin. Returns `None` when the simulator
/// refuses the spawn. With `verbose`, the actor report is logged and its
/// bounding box drawn.
#[instrument(name = "actor_initialize", skip(client, blueprint, placement), fields(blueprint = %blueprint.id))]
pub async fn initialize<C: CarlaClient>(
    client: &C,
    blueprint: &ActorBlueprint,
    placement: Placement,
    verbose: bool,
) -> Result<Option<ActorId>> {
    let transform = placement.resolve(Transform::default());
    let actor_id = client.try_spawn_actor(blueprint, transform, None).await?;

    match actor_id {
        None => {
            warn!(location = ?transform.location, "problem creating actor, spawn refused");
            observability::metrics::record_spawn_refused(&blueprint.id);
        }
        Some(actor_id) => {
            observability::metrics::record_actor_spawned(&blueprint.id);
            if verbose {
                let report = describe(client, actor_id).await?;
                info!("creating actor:\n{report}");
                if let Some(snapshot) = client.actor(actor_id).await? {
                    draw_bounding_box(client, &snapshot, &BoxOverlay::default()).await?;
                }
            }
        }
    }

    Ok(actor_id)
}

/// Bounding box overlay settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxOverlay {
    pub style: DrawStyle,
    /// Offset from the actor's box centre
    pub offset: Location,
}

impl Default for BoxOverlay {
    fn default() -> Self {
        Self {
            style: DrawStyle {
                color: Color::RED,
                thickness: 0.1,
                life_time: PERSISTENT,
            },
            offset: Location::ORIGIN,
        }
    }
}

/// Draw the actor's bounding box, rotated with the actor
pub async fn draw_bounding_box<C: CarlaClient>(
    client: &C,
    actor: &ActorSnapshot,
    overlay: &BoxOverlay,
) -> Result<()> {
    let bounding_box = BoundingBox::new(
        actor.location() + actor.bounding_box.location + overlay.offset,
        actor.bounding_box.extent,
    );
    client
        .draw(
            DebugShape::Box {
                bounding_box,
                rotation: actor.transform.rotation,
            },
            overlay.style,
        )
        .await?;
    observability::metrics::record_debug_draw("box");
    Ok(())
}

/// Everything worth printing about one actor
#[derive(Debug, Clone, PartialEq)]
pub struct ActorReport {
    pub id: ActorId,
    pub type_id: String,
    pub transform: Transform,
    pub velocity: Vector3D,
    pub acceleration: Vector3D,
    pub bounding_box: BoundingBox,
    pub waypoint: Option<Waypoint>,
}

impl fmt::Display for ActorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "   Id: {}", self.id)?;
        writeln!(f, "   Type Id: {}", self.type_id)?;
        writeln!(f, "   Transform: {:?}", self.transform)?;
        writeln!(f, "   Velocity: {:?}", self.velocity)?;
        writeln!(f, "   Acceleration: {:?}", self.acceleration)?;
        writeln!(f, "   Bounding box: {:?}", self.bounding_box)?;
        match &self.waypoint {
            Some(wp) => write!(
                f,
                "   Waypoint: road {} section {} lane {} s={:.2}",
                wp.road_id, wp.section_id, wp.lane_id, wp.s
            ),
            None => write!(f, "   Waypoint: none"),
        }
    }
}

/// Collect the actor report (state plus nearest waypoint)
pub async fn describe<C: CarlaClient>(client: &C, actor_id: ActorId) -> Result<ActorReport> {
    let actor = client
        .actor(actor_id)
        .await?
        .ok_or(UtilsError::ActorNotFound { actor_id })?;
    let waypoint = client.waypoint(actor.location()).await?;

    Ok(ActorReport {
        id: actor.id,
        type_id: actor.type_id,
        transform: actor.transform,
        velocity: actor.velocity,
        acceleration: actor.acceleration,
        bounding_box: actor.bounding_box,
        waypoint,
    })
}

/// Default search radius (metres)
pub const DEFAULT_MAX_DISTANCE: f64 = 100.0;

/// Whether the actor is within `max_distance` of `origin` (inclusive)
pub fn in_range(actor: &ActorSnapshot, origin: &Location, max_distance: f64) -> bool {
    let distance = actor.location().distance(origin);
    debug!(actor_id = actor.id, distance, "actor distance from origin");
    distance <= max_distance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_client::{default_blueprint_library, MockCarlaClient};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn vehicles() -> Vec<ActorBlueprint> {
        default_blueprint_library()
            .into_iter()
            .filter(|bp| bp.matches("vehicle.*"))
            .collect()
    }

    fn snapshot_at(location: Location) -> ActorSnapshot {
        ActorSnapshot {
            id: 7,
            type_id: "vehicle.audi.a2".into(),
            transform: Transform::new(location, Default::default()),
            velocity: Default::default(),
            acceleration: Default::default(),
            bounding_box: BoundingBox::new(Location::new(0.0, 0.0, 0.5), Vector3D::new(2.0, 1.0, 0.75)),
            parent: None,
        }
    }

    #[test]
    fn test_random_blueprint_sets_role_and_color() {
        let mut rng = StdRng::seed_from_u64(7);
        let library = vehicles();

        for _ in 0..20 {
            let bp = create_random_blueprint(&library, None, &mut rng).unwrap();
            assert_eq!(bp.attribute_value("role_name"), Some(AUTOPILOT_ROLE));
            if let Some(attr) = bp.attribute("color") {
                assert!(attr.recommended_values.contains(&attr.value));
            }
        }
    }

    #[test]
    fn test_random_blueprint_explicit_color() {
        let mut rng = StdRng::seed_from_u64(1);
        let library: Vec<_> = vehicles()
            .into_iter()
            .filter(|bp| bp.id == "vehicle.tesla.model3")
            .collect();

        let bp = create_random_blueprint(&library, Some("10, 20, 30"), &mut rng).unwrap();
        assert_eq!(bp.attribute_value("color"), Some("10,20,30"));

        assert!(create_random_blueprint(&library, Some("blue"), &mut rng).is_err());
    }

    #[test]
    fn test_random_blueprint_without_color_attribute() {
        let mut rng = StdRng::seed_from_u64(1);
        let library: Vec<_> = vehicles()
            .into_iter()
            .filter(|bp| bp.id == "vehicle.carlamotors.carlacola")
            .collect();

        let bp = create_random_blueprint(&library, Some("10,20,30"), &mut rng).unwrap();
        assert!(!bp.has_attribute("color"));
        assert_eq!(bp.attribute_value("role_name"), Some(AUTOPILOT_ROLE));
    }

    #[test]
    fn test_random_blueprint_empty_library() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = create_random_blueprint(&[], None, &mut rng).unwrap_err();
        assert!(matches!(err, UtilsError::NoBlueprints));
        assert_eq!(err.to_string(), "no blueprints to choose from");
    }

    #[test]
    fn test_random_blueprint_is_seed_deterministic() {
        let library = vehicles();
        let a = create_random_blueprint(&library, None, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = create_random_blueprint(&library, None, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_in_range_inclusive() {
        let actor = snapshot_at(Location::new(3.0, 4.0, 0.0));
        assert!(in_range(&actor, &Location::ORIGIN, 5.0));
        assert!(!in_range(&actor, &Location::ORIGIN, 4.999));
        assert!(in_range(&actor, &Location::new(3.0, 4.0, 0.0), 0.0));
    }

    #[tokio::test]
    async fn test_initialize_verbose_draws_box() {
        let mut client = MockCarlaClient::new();
        client.connect("localhost", 2000).await.unwrap();

        let bp = ActorBlueprint::new("vehicle.audi.a2");
        let placement = Placement::at(Location::new(5.0, 5.0, 0.5), Default::default());
        let actor_id = initialize(&client, &bp, placement, true)
            .await
            .unwrap()
            .unwrap();

        let actor = client.actor(actor_id).await.unwrap().unwrap();
        assert_eq!(actor.location(), Location::new(5.0, 5.0, 0.5));

        let drawn = client.drawn_shapes();
        assert_eq!(drawn.len(), 1);
        assert_eq!(drawn[0].0.name(), "box");
    }

    #[tokio::test]
    async fn test_initialize_refused_returns_none() {
        let mut client = MockCarlaClient::new();
        client.connect("localhost", 2000).await.unwrap();
        client.insert_actor("vehicle.audi.a2", Transform::default());

        let bp = ActorBlueprint::new("vehicle.audi.a2");
        let actor_id = initialize(&client, &bp, Placement::default(), false)
            .await
            .unwrap();
        assert!(actor_id.is_none());
        assert!(client.drawn_shapes().is_empty());
    }

    #[tokio::test]
    async fn test_draw_bounding_box_offsets() {
        let mut client = MockCarlaClient::new();
        client.connect("localhost", 2000).await.unwrap();

        let actor = snapshot_at(Location::new(1.0, 1.0, 0.0));
        let overlay = BoxOverlay {
            offset: Location::new(0.0, 0.0, 1.0),
            ..BoxOverlay::default()
        };
        draw_bounding_box(&client, &actor, &overlay).await.unwrap();

        let (shape, style) = client.drawn_shapes().remove(0);
        match shape {
            DebugShape::Box { bounding_box, .. } => {
                assert_eq!(bounding_box.location, Location::new(1.0, 1.0, 1.5));
                assert_eq!(bounding_box.extent, Vector3D::new(2.0, 1.0, 0.75));
            }
            other => panic!("unexpected shape {other:?}"),
        }
        assert_eq!(style.color, Color::RED);
        assert!(style.is_persistent());
    }

    #[tokio::test]
    async fn test_describe_report() {
        let mut client = MockCarlaClient::new();
        client.connect("localhost", 2000).await.unwrap();
        let id = client.insert_actor("vehicle.audi.a2", Transform::default());

        let report = describe(&client, id).await.unwrap();
        assert_eq!(report.type_id, "vehicle.audi.a2");
        assert!(report.waypoint.is_some());
        let text = report.to_string();
        assert!(text.contains("Type Id: vehicle.audi.a2"), "got: {text}");

        assert!(describe(&client, 9999).await.is_err());
    }
}

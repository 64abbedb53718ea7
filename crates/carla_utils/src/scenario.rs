//! Scripted driver
//!
//! connect → configure world → spawn vehicles → tick loop → teardown.
//! Teardown runs whenever anything was started, even if a later step failed.

use std::future::Future;

use contracts::{ActorId, Placement, ScenarioConfig, Transform};
use observability::{SessionMetrics, SessionSummary};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, instrument, warn};

use crate::actor;
use crate::camera::{self, CameraSettings};
use crate::client::CarlaClient;
use crate::common;
use crate::error::{Result, UtilsError};
use crate::recorder::Recording;
use crate::session;
use crate::world::{self, DistanceFilter};

/// What a run did
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    /// Vehicles spawned, in config order
    pub spawned: Vec<ActorId>,
    /// Vehicle entries the simulator refused
    pub failed: usize,
    /// Cameras attached to spawned vehicles
    pub cameras: Vec<ActorId>,
    pub ticks: u64,
    /// Actors culled by the cleanup filter
    pub removed: Vec<ActorId>,
    /// Actors destroyed at teardown
    pub destroyed: usize,
    /// Recorder file, if recording was on
    pub recording: Option<String>,
    pub summary: SessionSummary,
}

/// Actors this run owns
///
/// Vehicles keep `None` for refused spawns. A refused camera fails the run,
/// so cameras are always real actors.
#[derive(Debug, Default)]
struct Spawned {
    vehicles: Vec<Option<ActorId>>,
    cameras: Vec<ActorId>,
}

/// Scenario driver over any [`CarlaClient`]
pub struct Scenario<C: CarlaClient> {
    client: C,
    config: ScenarioConfig,
    rng: StdRng,
    metrics: SessionMetrics,
}

impl<C: CarlaClient> Scenario<C> {
    pub fn new(client: C, config: ScenarioConfig) -> Self {
        Self {
            client,
            config,
            rng: StdRng::from_os_rng(),
            metrics: SessionMetrics::new(),
        }
    }

    /// Deterministic blueprint and color choice
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Run until `max_ticks` ticks elapsed or `shutdown` resolves
    ///
    /// With `max_ticks == 0` only `shutdown` ends the loop.
    #[instrument(
        name = "scenario_run",
        skip_all,
        fields(map = %self.config.client.map, vehicles = self.config.vehicles.len())
    )]
    pub async fn run_until<F: Future>(&mut self, shutdown: F) -> Result<ScenarioReport> {
        self.metrics.reset();
        session::create(&mut self.client, &self.config.client).await?;

        if self.config.debug.draw_spawn_points {
            world::draw_spawn_points(&self.client, self.config.debug.life_time).await?;
        }
        if let Some(placement) = &self.config.spectator {
            world::move_spectator(&self.client, placement).await?;
        }

        let recording = match &self.config.recording {
            Some(rec) => Some(Recording::start(&self.client, &rec.file, rec.additional_data).await?),
            None => None,
        };
        let recording_file = recording.as_ref().map(|r| r.file().to_string());

        let mut spawned = Spawned::default();
        let outcome = match self.spawn_vehicles(&mut spawned).await {
            Ok(()) => self.tick_loop(shutdown).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &outcome {
            warn!(error = %e, "scenario failed, tearing down");
        }
        let destroyed = self.teardown(recording, &spawned).await;
        let (ticks, removed) = outcome?;

        let report = ScenarioReport {
            spawned: spawned.vehicles.iter().flatten().copied().collect(),
            failed: spawned.vehicles.iter().filter(|v| v.is_none()).count(),
            cameras: spawned.cameras.clone(),
            ticks,
            removed,
            destroyed,
            recording: recording_file,
            summary: self.metrics.summary(),
        };
        info!(
            spawned = report.spawned.len(),
            failed = report.failed,
            ticks = report.ticks,
            removed = report.removed.len(),
            destroyed = report.destroyed,
            "scenario completed"
        );
        Ok(report)
    }

    /// Spawn every configured vehicle, plus its camera
    ///
    /// All spawn point indices are checked before anything is spawned.
    #[instrument(name = "scenario_spawn_vehicles", skip_all)]
    async fn spawn_vehicles(&mut self, spawned: &mut Spawned) -> Result<()> {
        let spawn_points = self.client.spawn_points().await?;
        let transforms = self
            .config
            .vehicles
            .iter()
            .map(|vc| {
                spawn_points
                    .get(vc.spawn_point)
                    .copied()
                    .ok_or(UtilsError::SpawnPointOutOfRange {
                        index: vc.spawn_point,
                        available: spawn_points.len(),
                    })
            })
            .collect::<Result<Vec<Transform>>>()?;

        for (vc, transform) in self.config.vehicles.iter().zip(transforms) {
            let library = self.client.blueprints(&vc.filter).await?;
            if library.is_empty() {
                return Err(UtilsError::EmptyLibrary {
                    filter: vc.filter.clone(),
                });
            }

            let blueprint =
                actor::create_random_blueprint(&library, vc.color.as_deref(), &mut self.rng)?;
            let actor_id = actor::initialize(
                &self.client,
                &blueprint,
                Placement::from_transform(transform),
                false,
            )
            .await?;
            spawned.vehicles.push(actor_id);

            let Some(vehicle_id) = actor_id else {
                self.metrics.spawn_refused();
                continue;
            };
            self.metrics.spawn_succeeded();
            info!(actor_id = vehicle_id, blueprint = %blueprint.id, spawn_point = vc.spawn_point, "vehicle spawned");

            if vc.autopilot && blueprint.id.contains("vehicle") {
                self.client.set_autopilot(vehicle_id, true).await?;
            }

            if let Some(camera_config) = &vc.camera {
                let settings = CameraSettings::from(camera_config);
                let camera_id =
                    camera::create_camera(&self.client, vehicle_id, camera_config.kind, &settings)
                        .await?;
                spawned.cameras.push(camera_id);
            }
        }

        observability::metrics::record_live_actors(
            spawned.vehicles.iter().flatten().count() + spawned.cameras.len(),
        );
        Ok(())
    }

    async fn tick_loop<F: Future>(&mut self, shutdown: F) -> Result<(u64, Vec<ActorId>)> {
        let max_ticks = self.config.run.max_ticks;
        let cleanup = self.config.cleanup.as_ref().map(DistanceFilter::from);
        let client = &self.client;
        let metrics = &mut self.metrics;

        let mut ticks = 0u64;
        let mut removed = Vec::new();
        tokio::pin!(shutdown);

        while max_ticks == 0 || ticks < max_ticks {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!(ticks, "shutdown requested");
                    break;
                }
                tick = client.wait_for_tick() => {
                    let tick = tick?;
                    ticks += 1;
                    metrics.tick(&tick);

                    if let Some(filter) = &cleanup {
                        let culled = world::remove_distant_actors(client, filter).await?;
                        metrics.actors_removed(culled.len());
                        removed.extend(culled);
                    }
                }
            }
        }

        Ok((ticks, removed))
    }

    /// Stop the recorder, pause, then destroy sensors before vehicles
    #[instrument(name = "scenario_teardown", skip_all)]
    async fn teardown(&mut self, recording: Option<Recording>, spawned: &Spawned) -> usize {
        if let Some(mut recording) = recording {
            if let Err(e) = recording.stop(&self.client).await {
                warn!(error = %e, file = recording.file(), "failed to stop recorder");
            }
        }

        let [low, high] = self.config.run.teardown_delay_sec;
        if let Err(e) = common::sleep_random_time(low, high).await {
            warn!(error = %e, "skipping teardown delay");
        }

        let cameras: Vec<_> = spawned.cameras.iter().copied().map(Some).collect();
        let destroyed = session::destroy_actors_in_list(&self.client, &cameras).await
            + session::destroy_actors_in_list(&self.client, &spawned.vehicles).await;
        self.metrics.actors_destroyed(destroyed);
        observability::metrics::record_live_actors(0);

        info!(destroyed, "teardown completed");
        destroyed
    }
}

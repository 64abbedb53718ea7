//! # CARLA Utilities
//!
//! Thin helpers over the CARLA client API.
//!
//! Modules:
//! - `session`: connect, load the map, bulk destroy
//! - `actor`: random blueprints, spawning, reports, distance checks
//! - `world`: spawn point overlay, spectator, distance-based culling
//! - `camera`: camera blueprints and attached cameras
//! - `common`: random sleeps, vector conversions
//! - `debug`: debug overlays and arcs
//! - `recorder`: server-side session recording and replay
//! - `scenario`: scripted connect → spawn → tick → teardown driver
//!
//! Every helper is generic over [`CarlaClient`]; [`MockCarlaClient`] provides
//! an in-memory world for tests and demos.
//!
//! ## Feature Flags
//!
//! - `real-carla`: Enable real CARLA client (requires carla crate)

pub mod actor;
pub mod camera;
pub mod client;
pub mod common;
pub mod debug;
pub mod error;
pub mod mock_client;
pub mod recorder;
pub mod scenario;
pub mod session;
pub mod world;

#[cfg(feature = "real-carla")]
pub mod carla_client;

pub use camera::CameraSettings;
pub use client::{CarlaClient, ReplayRequest};
pub use contracts::{ActorId, CameraKind, ScenarioConfig};
pub use error::{Result, UtilsError};
pub use mock_client::{MockCarlaClient, MockConfig};
pub use recorder::Recording;
pub use scenario::{Scenario, ScenarioReport};
pub use session::SessionConfig;
pub use world::DistanceFilter;

#[cfg(feature = "real-carla")]
pub use carla_client::RealCarlaClient;

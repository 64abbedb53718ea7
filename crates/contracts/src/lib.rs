//! # Contracts
//!
//! Shared value types for the CARLA utilities: geometry, actor snapshots,
//! blueprints, debug shapes and the scenario configuration model.
//! All other crates depend on this crate, reverse dependencies are prohibited.
//!
//! ## Units
//! - Positions in metres, angles in degrees
//! - Overlay life times in seconds, negative means persistent

mod actor;
mod blueprint;
mod debug;
mod error;
mod geom;
mod scenario;
mod sensor;

pub use actor::*;
pub use blueprint::*;
pub use debug::*;
pub use error::*;
pub use geom::*;
pub use scenario::*;
pub use sensor::CameraKind;

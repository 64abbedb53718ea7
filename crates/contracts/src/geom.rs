//! Geometry value types
//!
//! Mirrors the simulator's `carla.Location` / `carla.Rotation` / `carla.Transform`
//! family. Units: metres for positions, degrees for angles.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::error::ContractError;

/// World position (x, y, z) in metres
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Location {
    pub const ORIGIN: Location = Location {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another location
    pub fn distance(&self, other: &Location) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Linear scale of every component
    pub fn scale(&self, factor: f64) -> Location {
        Location::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

impl Add for Location {
    type Output = Location;

    fn add(self, rhs: Location) -> Location {
        Location::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Location {
    type Output = Location;

    fn sub(self, rhs: Location) -> Location {
        Location::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// 3D vector (velocity, acceleration, extents)
pub type Vector3D = Location;

/// 2D vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Vector2D {
    fn from(value: [f64; 2]) -> Self {
        Vector2D::new(value[0], value[1])
    }
}

impl TryFrom<&[f64]> for Vector2D {
    type Error = ContractError;

    fn try_from(value: &[f64]) -> Result<Self, Self::Error> {
        match value {
            [x, y] => Ok(Vector2D::new(*x, *y)),
            _ => Err(ContractError::dimension_mismatch(2, value.len())),
        }
    }
}

impl From<[f64; 3]> for Location {
    fn from(value: [f64; 3]) -> Self {
        Location::new(value[0], value[1], value[2])
    }
}

impl TryFrom<&[f64]> for Location {
    type Error = ContractError;

    fn try_from(value: &[f64]) -> Result<Self, Self::Error> {
        match value {
            [x, y, z] => Ok(Location::new(*x, *y, *z)),
            _ => Err(ContractError::dimension_mismatch(3, value.len())),
        }
    }
}

/// Orientation (pitch, yaw, roll) in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub yaw: f64,
    #[serde(default)]
    pub roll: f64,
}

impl Rotation {
    pub const fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }
}

/// 3D transform: location + rotation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub location: Location,
    #[serde(default)]
    pub rotation: Rotation,
}

impl Transform {
    pub const fn new(location: Location, rotation: Rotation) -> Self {
        Self { location, rotation }
    }
}

/// Optional location / rotation / transform triple
///
/// Resolved against a default transform: the base is `transform` (or the
/// default), then explicit `location` and `rotation` replace the matching
/// component of the base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub rotation: Option<Rotation>,
    #[serde(default)]
    pub transform: Option<Transform>,
}

impl Placement {
    pub fn at(location: Location, rotation: Rotation) -> Self {
        Self {
            location: Some(location),
            rotation: Some(rotation),
            transform: None,
        }
    }

    pub fn from_transform(transform: Transform) -> Self {
        Self {
            transform: Some(transform),
            ..Self::default()
        }
    }

    pub fn resolve(&self, default: Transform) -> Transform {
        let base = self.transform.unwrap_or(default);
        Transform {
            location: self.location.unwrap_or(base.location),
            rotation: self.rotation.unwrap_or(base.rotation),
        }
    }
}

/// Axis-aligned box in actor space
///
/// `location` is the box centre relative to the actor origin, `extent` the
/// half-size along each axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub location: Location,
    pub extent: Vector3D,
}

impl BoundingBox {
    pub const fn new(location: Location, extent: Vector3D) -> Self {
        Self { location, extent }
    }
}

/// RGBA color used by the debug helper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Color {
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse the simulator's `"R,G,B"` attribute format
    ///
    /// Whitespace around components is accepted.
    pub fn parse_rgb(value: &str) -> Result<Self, ContractError> {
        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        let [r, g, b] = parts.as_slice() else {
            return Err(ContractError::invalid_color(value));
        };
        let component = |s: &str| s.parse::<u8>().map_err(|_| ContractError::invalid_color(value));
        Ok(Color::rgb(component(*r)?, component(*g)?, component(*b)?))
    }

    /// Format as the simulator's `"R,G,B"` attribute value
    pub fn to_rgb_string(&self) -> String {
        format!("{},{},{}", self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::RED
    }
}

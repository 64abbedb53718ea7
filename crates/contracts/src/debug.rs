//! Debug helper primitives
//!
//! Shapes the simulator's debug helper can draw into the world.

use serde::{Deserialize, Serialize};

use crate::{BoundingBox, Color, Location, Rotation};

/// Persistent overlay: never expires
pub const PERSISTENT: f64 = -1.0;

/// Draw style shared by every shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawStyle {
    #[serde(default)]
    pub color: Color,

    /// Line thickness / point size (metres)
    #[serde(default = "default_thickness")]
    pub thickness: f64,

    /// Seconds the shape stays visible, negative = forever
    #[serde(default = "default_life_time")]
    pub life_time: f64,
}

fn default_thickness() -> f64 {
    0.1
}

fn default_life_time() -> f64 {
    PERSISTENT
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            color: Color::RED,
            thickness: default_thickness(),
            life_time: PERSISTENT,
        }
    }
}

impl DrawStyle {
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }

    pub fn with_life_time(mut self, life_time: f64) -> Self {
        self.life_time = life_time;
        self
    }

    pub fn is_persistent(&self) -> bool {
        self.life_time < 0.0
    }
}

/// Shape passed to the debug helper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum DebugShape {
    Point {
        location: Location,
    },
    Line {
        begin: Location,
        end: Location,
    },
    Arrow {
        begin: Location,
        end: Location,
        arrow_size: f64,
    },
    String {
        location: Location,
        text: String,
    },
    Box {
        bounding_box: BoundingBox,
        rotation: Rotation,
    },
}

impl DebugShape {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Point { .. } => "point",
            Self::Line { .. } => "line",
            Self::Arrow { .. } => "arrow",
            Self::String { .. } => "string",
            Self::Box { .. } => "box",
        }
    }
}

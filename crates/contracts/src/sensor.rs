//! Camera sensor kinds

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ContractError;

/// Camera-based sensor types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraKind {
    Depth,
    #[default]
    Rgb,
    #[serde(alias = "segmentation")]
    SemanticSegmentation,
}

impl CameraKind {
    pub const ALL: [CameraKind; 3] = [
        CameraKind::Depth,
        CameraKind::Rgb,
        CameraKind::SemanticSegmentation,
    ];

    /// Blueprint id in the simulator's library
    pub fn blueprint_id(self) -> &'static str {
        match self {
            Self::Depth => "sensor.camera.depth",
            Self::Rgb => "sensor.camera.rgb",
            Self::SemanticSegmentation => "sensor.camera.semantic_segmentation",
        }
    }

    /// Names accepted by `FromStr`, for help/error output
    pub fn options() -> Vec<&'static str> {
        Self::ALL.iter().map(|k| k.name()).collect()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Depth => "depth",
            Self::Rgb => "rgb",
            Self::SemanticSegmentation => "semantic_segmentation",
        }
    }
}

impl fmt::Display for CameraKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CameraKind {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "depth" => Ok(Self::Depth),
            "rgb" => Ok(Self::Rgb),
            "segmentation" | "semantic_segmentation" => Ok(Self::SemanticSegmentation),
            other => Err(ContractError::Other(format!(
                "unknown camera kind '{other}', options: {}",
                Self::options().join(", ")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("RGB".parse::<CameraKind>().unwrap(), CameraKind::Rgb);
        assert_eq!(
            "segmentation".parse::<CameraKind>().unwrap(),
            CameraKind::SemanticSegmentation
        );
        let err = "thermal".parse::<CameraKind>().unwrap_err().to_string();
        assert!(err.contains("depth, rgb, semantic_segmentation"), "got: {err}");
    }

    #[test]
    fn test_serde_alias() {
        let kind: CameraKind = serde_json::from_str("\"segmentation\"").unwrap();
        assert_eq!(kind, CameraKind::SemanticSegmentation);
        assert_eq!(kind.blueprint_id(), "sensor.camera.semantic_segmentation");
    }
}

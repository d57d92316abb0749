//! Toolpath steps fed to the checker.

use serde::{Deserialize, Serialize};
use vcad_kernel_bvh::{math, Point3};

/// How the machine moves into a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionType {
    /// Rapid positioning (G0). Hitting anything here is a crash.
    Rapid,
    /// Linear cutting move (G1).
    Feed,
    /// Vertical entry move.
    Plunge,
    /// Circular interpolation (G2/G3).
    Arc,
}

/// A single position along a toolpath.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolpathStep {
    /// Tool position [x, y, z] in mm.
    pub position: [f64; 3],
    /// Motion used to reach this position.
    pub motion_type: MotionType,
}

impl ToolpathStep {
    /// Create a step.
    pub fn new(position: [f64; 3], motion_type: MotionType) -> Self {
        Self {
            position,
            motion_type,
        }
    }

    /// Rapid move to `position`.
    pub fn rapid(position: [f64; 3]) -> Self {
        Self::new(position, MotionType::Rapid)
    }

    /// Cutting move to `position`.
    pub fn feed(position: [f64; 3]) -> Self {
        Self::new(position, MotionType::Feed)
    }

    /// Position as a point.
    pub fn point(&self) -> Point3 {
        math::point(self.position)
    }
}

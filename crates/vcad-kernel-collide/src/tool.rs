//! Cutting tool geometry as seen by the collision checker.

use serde::{Deserialize, Serialize};
use vcad_kernel_bvh::{Aabb3, Point3, Vec3};

use crate::error::{CollideError, Result};

/// Orientations whose unit z component exceeds this (in magnitude) are
/// treated as vertical 3-axis moves.
pub const VERTICAL_THRESHOLD: f64 = 0.99;

/// Tool dimensions used to bound the space it occupies at a path step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool diameter in mm.
    pub diameter: f64,
    /// Length the tool extends below the path position, in mm.
    pub length: f64,
    /// Tool axis direction. `None` means vertical.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<[f64; 3]>,
}

impl ToolDescriptor {
    /// Create a vertical tool.
    pub fn new(diameter: f64, length: f64) -> Self {
        Self {
            diameter,
            length,
            orientation: None,
        }
    }

    /// Create a tool with an explicit axis direction (5-axis moves).
    pub fn with_orientation(diameter: f64, length: f64, orientation: [f64; 3]) -> Self {
        Self {
            diameter,
            length,
            orientation: Some(orientation),
        }
    }

    /// Get the tool radius.
    pub fn radius(&self) -> f64 {
        self.diameter / 2.0
    }

    /// Validate tool geometry.
    pub fn validate(&self) -> Result<()> {
        if !(self.diameter.is_finite() && self.diameter > 0.0) {
            return Err(CollideError::InvalidTool(format!(
                "diameter must be positive, got {}",
                self.diameter
            )));
        }
        if !(self.length.is_finite() && self.length > 0.0) {
            return Err(CollideError::InvalidTool(format!(
                "length must be positive, got {}",
                self.length
            )));
        }
        if let Some(o) = self.orientation {
            let n = Vec3::new(o[0], o[1], o[2]).norm();
            if !(n.is_finite() && n > 0.0) {
                return Err(CollideError::InvalidTool(format!(
                    "orientation must be a non-zero vector, got {o:?}"
                )));
            }
        }
        Ok(())
    }

    /// Whether the tool axis is close enough to z for the tight box.
    pub fn is_vertical(&self) -> bool {
        match self.orientation {
            None => true,
            Some(o) => {
                let axis = Vec3::new(o[0], o[1], o[2]);
                let n = axis.norm();
                n > 0.0 && (axis.z / n).abs() > VERTICAL_THRESHOLD
            }
        }
    }

    /// Conservative box around the tool at `position`.
    ///
    /// Vertical tools get a column `diameter` wide reaching `length` below
    /// the position. Tilted tools get a cube of half-extent
    /// `sqrt(r^2 + length^2)` centred on the position, which bounds the tool
    /// for any orientation.
    pub fn swept_aabb(&self, position: &Point3) -> Aabb3 {
        let r = self.radius();
        if self.is_vertical() {
            Aabb3::new(
                Point3::new(position.x - r, position.y - r, position.z - self.length),
                Point3::new(position.x + r, position.y + r, position.z),
            )
        } else {
            let half = (r * r + self.length * self.length).sqrt();
            Aabb3::new(
                *position - Vec3::new(half, half, half),
                *position + Vec3::new(half, half, half),
            )
        }
    }
}

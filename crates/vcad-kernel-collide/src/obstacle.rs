//! Obstacle-set assembly: fixture and stock descriptors into BVH primitives.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use vcad_kernel_bvh::{Aabb3, Bounded, BuildOptions, Bvh, Primitive, Ray, RayTarget};

use crate::error::{CollideError, Result};

/// What an obstacle is, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    /// Raw stock material.
    Stock,
    /// Vise, plate or other workholding.
    Fixture,
    /// Clamp or strap.
    Clamp,
    /// Machine structure (table, rotary axis housing).
    Machine,
}

/// Box-shaped obstacle as supplied by the fixture catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleDescriptor {
    /// Display name.
    pub name: String,
    /// Obstacle category.
    pub kind: ObstacleKind,
    /// Minimum corner [x, y, z] in mm.
    pub min: [f64; 3],
    /// Maximum corner [x, y, z] in mm.
    pub max: [f64; 3],
}

impl ObstacleDescriptor {
    /// Create a descriptor from corners.
    pub fn new(name: impl Into<String>, kind: ObstacleKind, min: [f64; 3], max: [f64; 3]) -> Self {
        Self {
            name: name.into(),
            kind,
            min,
            max,
        }
    }

    /// Create a descriptor from `[min_x, min_y, min_z, max_x, max_y, max_z]`.
    pub fn from_bounds(name: impl Into<String>, kind: ObstacleKind, bounds: [f64; 6]) -> Self {
        Self::new(
            name,
            kind,
            [bounds[0], bounds[1], bounds[2]],
            [bounds[3], bounds[4], bounds[5]],
        )
    }

    /// Reject non-finite or inverted bounds.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| CollideError::InvalidObstacle {
            name: self.name.clone(),
            reason,
        };
        if self.min.iter().chain(&self.max).any(|v| !v.is_finite()) {
            return Err(invalid("bounds must be finite".into()));
        }
        for axis in 0..3 {
            if self.min[axis] > self.max[axis] {
                return Err(invalid(format!(
                    "min exceeds max on axis {axis} ({} > {})",
                    self.min[axis], self.max[axis]
                )));
            }
        }
        Ok(())
    }
}

/// An obstacle ready to be placed in a BVH.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    /// Display name.
    pub name: String,
    /// Obstacle category.
    pub kind: ObstacleKind,
    /// Bounds, including any clearance margin.
    pub aabb: Aabb3,
}

impl Bounded for Obstacle {
    fn aabb(&self) -> Aabb3 {
        self.aabb
    }
}

impl RayTarget for Obstacle {
    fn raycast(&self, ray: &Ray) -> Option<f64> {
        ray.hit_distance(&self.aabb)
    }
}

/// Stock plus workholding for one setup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneDescriptor {
    /// Stock bounds `[min_x, min_y, min_z, max_x, max_y, max_z]`, if modelled.
    pub stock: Option<[f64; 6]>,
    /// Fixtures, clamps and machine parts.
    pub obstacles: Vec<ObstacleDescriptor>,
    /// Clearance added to every obstacle on all sides, in mm.
    pub margin: f64,
    /// Options for the obstacle tree.
    pub build: BuildOptions,
}

impl SceneDescriptor {
    /// Decode a scene from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let scene: Self = serde_json::from_str(json)?;
        scene.build.validate()?;
        Ok(scene)
    }

    /// Validate every descriptor and turn them into primitives.
    ///
    /// The stock, if present, comes first and is named `"stock"`.
    pub fn primitives(&self) -> Result<Vec<Primitive<Obstacle>>> {
        if !(self.margin.is_finite() && self.margin >= 0.0) {
            return Err(CollideError::InvalidOptions(format!(
                "margin must be non-negative, got {}",
                self.margin
            )));
        }

        let stock = self
            .stock
            .map(|bounds| ObstacleDescriptor::from_bounds("stock", ObstacleKind::Stock, bounds));

        stock
            .iter()
            .chain(&self.obstacles)
            .map(|desc| {
                desc.validate()?;
                let aabb = Aabb3::from_arrays(desc.min, desc.max).expand(self.margin);
                Ok(Primitive::from_bounded(Obstacle {
                    name: desc.name.clone(),
                    kind: desc.kind,
                    aabb,
                }))
            })
            .collect()
    }

    /// Build the obstacle tree. `Ok(None)` when the scene is empty.
    pub fn build_bvh(&self) -> Result<Option<Bvh<Obstacle>>> {
        let primitives = self.primitives()?;
        if primitives.is_empty() {
            warn!("scene has no stock or obstacles, nothing to check against");
            return Ok(None);
        }
        debug!(obstacles = primitives.len(), margin = self.margin, "assembling obstacle tree");
        Ok(Bvh::build(primitives, &self.build))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcad_kernel_bvh::{Point3, SplitMethod, Vec3};

    fn vise_scene() -> SceneDescriptor {
        SceneDescriptor {
            stock: Some([0.0, 0.0, 0.0, 100.0, 60.0, 25.0]),
            obstacles: vec![
                ObstacleDescriptor::new(
                    "vise jaw left",
                    ObstacleKind::Fixture,
                    [-20.0, 0.0, -10.0],
                    [0.0, 60.0, 20.0],
                ),
                ObstacleDescriptor::new(
                    "vise jaw right",
                    ObstacleKind::Fixture,
                    [100.0, 0.0, -10.0],
                    [120.0, 60.0, 20.0],
                ),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_primitives_stock_first() {
        let prims = vise_scene().primitives().unwrap();
        assert_eq!(prims.len(), 3);
        assert_eq!(prims[0].handle.name, "stock");
        assert_eq!(prims[0].handle.kind, ObstacleKind::Stock);
        assert_eq!(prims[0].aabb, Aabb3::from_arrays([0.0; 3], [100.0, 60.0, 25.0]));
        assert_eq!(prims[2].handle.name, "vise jaw right");
    }

    #[test]
    fn test_margin_expands_boxes() {
        let scene = SceneDescriptor {
            margin: 2.0,
            ..vise_scene()
        };
        let prims = scene.primitives().unwrap();
        assert_eq!(prims[1].aabb.min, Point3::new(-22.0, -2.0, -12.0));
        assert_eq!(prims[1].handle.aabb, prims[1].aabb);
    }

    #[test]
    fn test_invalid_descriptor_rejected() {
        let mut scene = vise_scene();
        scene.obstacles.push(ObstacleDescriptor::new(
            "bad clamp",
            ObstacleKind::Clamp,
            [5.0, 0.0, 0.0],
            [1.0, 1.0, 1.0],
        ));
        match scene.primitives() {
            Err(CollideError::InvalidObstacle { name, .. }) => assert_eq!(name, "bad clamp"),
            other => panic!("expected InvalidObstacle, got {other:?}"),
        }

        let nan = ObstacleDescriptor::new("nan", ObstacleKind::Machine, [f64::NAN; 3], [1.0; 3]);
        assert!(nan.validate().is_err());

        let negative = SceneDescriptor {
            margin: -1.0,
            ..vise_scene()
        };
        assert!(matches!(
            negative.primitives(),
            Err(CollideError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_empty_scene_has_no_tree() {
        assert!(SceneDescriptor::default().build_bvh().unwrap().is_none());
    }

    #[test]
    fn test_build_and_raycast_obstacles() {
        let bvh = vise_scene().build_bvh().unwrap().unwrap();
        assert_eq!(bvh.stats().object_count, 3);

        // Probe along +x at mid height through the left jaw, stock and right jaw.
        let ray = Ray::new(Point3::new(-50.0, 30.0, 10.0), Vec3::new(1.0, 0.0, 0.0));
        let hits = bvh.raycast(&ray, f64::INFINITY);
        let names: Vec<&str> = hits.iter().map(|h| h.handle.name.as_str()).collect();
        assert_eq!(names, vec!["vise jaw left", "stock", "vise jaw right"]);
        assert_eq!(hits[0].t, 30.0);
    }

    #[test]
    fn test_scene_json() {
        let json = r#"{
            "stock": [0, 0, 0, 50, 50, 20],
            "obstacles": [
                {"name": "strap", "kind": "clamp", "min": [10, -5, 20], "max": [20, 55, 25]}
            ],
            "margin": 1.0,
            "build": {"maxLeafSize": 1, "splitMethod": "equal"}
        }"#;
        let scene = SceneDescriptor::from_json(json).unwrap();
        assert_eq!(scene.obstacles[0].kind, ObstacleKind::Clamp);
        assert_eq!(scene.build.split_method, SplitMethod::Equal);
        assert_eq!(scene.build.max_depth, 32);

        let bvh = scene.build_bvh().unwrap().unwrap();
        assert_eq!(bvh.stats().leaf_count, 2);

        assert!(SceneDescriptor::from_json(r#"{"build": {"maxLeafSize": 0}}"#).is_err());
        assert!(matches!(
            SceneDescriptor::from_json("{not json"),
            Err(CollideError::Json(_))
        ));
    }
}

//! Axis-aligned bounding boxes.

use crate::math::{Point3, Vec3};

/// An axis-aligned bounding box in 3D.
///
/// A well-formed box has `min[i] <= max[i]` on every axis. Boxes are plain
/// values: every operation returns a new box and never mutates its inputs.
///
/// Inverted boxes (`min > max` on some axis) are tolerated but never
/// intersect anything and contain no points. [`Aabb3::empty`] is such a box
/// and acts as the identity for [`Aabb3::merge`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from `[x, y, z]` corner arrays.
    pub fn from_arrays(min: [f64; 3], max: [f64; 3]) -> Self {
        Self::new(
            Point3::new(min[0], min[1], min[2]),
            Point3::new(max[0], max[1], max[2]),
        )
    }

    /// Create an empty (inverted) AABB suitable for accumulation.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Tightest box around a set of points, or `None` if there are none.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut aabb = Self::new(*first, *first);
        for p in iter {
            aabb = aabb.include_point(p);
        }
        Some(aabb)
    }

    /// Whether `min <= max` holds on every axis.
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Center of the box.
    pub fn centroid(&self) -> Point3 {
        Point3::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    /// Edge lengths along each axis.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Box grown to include a point.
    pub fn include_point(&self, p: &Point3) -> Self {
        Self {
            min: Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z)),
            max: Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z)),
        }
    }

    /// Smallest box enclosing both boxes.
    pub fn merge(&self, other: &Aabb3) -> Self {
        Self {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// Merge where an absent operand is the identity.
    pub fn merge_opt(a: Option<&Aabb3>, b: Option<&Aabb3>) -> Option<Self> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.merge(b)),
            (Some(a), None) => Some(*a),
            (None, Some(b)) => Some(*b),
            (None, None) => None,
        }
    }

    /// Test if two boxes overlap. Touching faces count as overlap.
    pub fn intersects(&self, other: &Aabb3) -> bool {
        self.is_valid()
            && other.is_valid()
            && self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Test if a point lies inside the box (boundary inclusive).
    pub fn contains_point(&self, p: &Point3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Surface area `2 * (dx*dy + dy*dz + dz*dx)`.
    pub fn surface_area(&self) -> f64 {
        let d = self.extent();
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// Box grown by `margin` on every side.
    pub fn expand(&self, margin: f64) -> Self {
        let m = Vec3::new(margin, margin, margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }
}

//! Ray representation and the slab-method box test.

use crate::aabb::Aabb3;
use crate::math::{Point3, Vec3, AXES};

/// A ray in 3D space defined by origin and direction.
///
/// The direction is not normalized, so hit distances are ray parameters:
/// a hit at `t` lies at `origin + t * direction`. Zero direction components
/// are legal; their reciprocals are signed infinities, which the slab test
/// absorbs without special cases.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3,
    /// Direction of the ray (any length).
    pub direction: Vec3,
    /// Precomputed reciprocal of direction components.
    inv_direction: Vec3,
}

impl Ray {
    /// Create a new ray from origin and direction.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        if direction.x == 0.0 && direction.y == 0.0 && direction.z == 0.0 {
            tracing::warn!(
                origin = ?[origin.x, origin.y, origin.z],
                "ray has a zero direction vector"
            );
        }
        let inv_direction = Vec3::new(1.0 / direction.x, 1.0 / direction.y, 1.0 / direction.z);
        Self {
            origin,
            direction,
            inv_direction,
        }
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction
    }

    /// Slab-method entry and exit parameters for a box.
    ///
    /// Returns `Some((t_min, t_max))` when the ray's line crosses the box and
    /// the box is not entirely behind the origin. `t_min` is negative when the
    /// origin is inside the box. Inverted boxes are never hit.
    #[inline]
    pub fn intersect_aabb(&self, aabb: &Aabb3) -> Option<(f64, f64)> {
        if !aabb.is_valid() {
            return None;
        }

        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;

        for axis in AXES {
            let t1 = (aabb.min[axis] - self.origin[axis]) * self.inv_direction[axis];
            let t2 = (aabb.max[axis] - self.origin[axis]) * self.inv_direction[axis];
            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));
        }

        if t_max < 0.0 || t_min > t_max {
            None
        } else {
            Some((t_min, t_max))
        }
    }

    /// Distance at which the ray first touches the box.
    ///
    /// The entry parameter when the origin is outside the box, the exit
    /// parameter when it is inside.
    #[inline]
    pub fn hit_distance(&self, aabb: &Aabb3) -> Option<f64> {
        self.intersect_aabb(aabb)
            .map(|(t_min, t_max)| if t_min >= 0.0 { t_min } else { t_max })
    }
}

/// Per-object ray test supplied by the caller.
///
/// The BVH only culls with node boxes; at a leaf it asks each member for its
/// own exact hit. Returning the ray parameter of the nearest hit is enough,
/// the tree fills in the point.
pub trait RayTarget {
    /// Ray parameter of the nearest intersection, if any.
    fn raycast(&self, ray: &Ray) -> Option<f64>;
}

impl RayTarget for Aabb3 {
    fn raycast(&self, ray: &Ray) -> Option<f64> {
        ray.hit_distance(self)
    }
}

/// A hit returned by a BVH ray cast.
#[derive(Debug, Clone, Copy)]
pub struct RayHit<'a, T> {
    /// Parameter along the ray where the intersection occurs.
    pub t: f64,
    /// 3D intersection point.
    pub point: Point3,
    /// Index of the hit primitive in the tree's primitive list.
    pub index: usize,
    /// Handle of the hit primitive.
    pub handle: &'a T,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit() -> Aabb3 {
        Aabb3::from_arrays([0.0, 0.0, 0.0], [1.0, 1.0, 1.0])
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
        let p = ray.at(2.5);
        assert_relative_eq!(p.x, 5.0);
        assert_relative_eq!(p.y, 0.0);
    }

    #[test]
    fn test_ray_down_onto_box() {
        let ray = Ray::new(Point3::new(0.5, 0.5, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let (t_min, t_max) = ray.intersect_aabb(&unit()).unwrap();
        assert_relative_eq!(t_min, 4.0);
        assert_relative_eq!(t_max, 5.0);
        assert_relative_eq!(ray.hit_distance(&unit()).unwrap(), 4.0);
    }

    #[test]
    fn test_ray_parallel_miss() {
        // Points straight up from beside the box: the x/y slabs are never entered.
        let ray = Ray::new(Point3::new(5.0, 5.0, 5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(ray.intersect_aabb(&unit()).is_none());
    }

    #[test]
    fn test_ray_behind() {
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vec3::new(-1.0, 0.0, 0.0));
        assert!(ray.intersect_aabb(&unit()).is_none());
    }

    #[test]
    fn test_ray_inside_uses_exit() {
        let ray = Ray::new(Point3::new(0.5, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let (t_min, t_max) = ray.intersect_aabb(&unit()).unwrap();
        assert!(t_min < 0.0);
        assert_relative_eq!(t_max, 0.5);
        assert_relative_eq!(ray.hit_distance(&unit()).unwrap(), 0.5);
    }

    #[test]
    fn test_unnormalized_direction_scales_distance() {
        let ray = Ray::new(Point3::new(-4.0, 0.5, 0.5), Vec3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(ray.hit_distance(&unit()).unwrap(), 2.0);
    }

    #[test]
    fn test_ray_diagonal() {
        let ray = Ray::new(Point3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(ray.hit_distance(&unit()).unwrap(), 1.0);
    }

    #[test]
    fn test_inverted_box_never_hit() {
        let ray = Ray::new(Point3::new(0.5, 0.5, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let inverted = Aabb3::from_arrays([1.0, 1.0, 1.0], [0.0, 0.0, 0.0]);
        assert!(ray.intersect_aabb(&inverted).is_none());
    }

    #[test]
    fn test_box_ray_target() {
        let ray = Ray::new(Point3::new(0.5, 0.5, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(unit().raycast(&ray).unwrap(), 4.0);
    }
}

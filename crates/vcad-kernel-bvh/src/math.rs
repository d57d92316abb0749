//! Scalar and vector types shared by the BVH.
//!
//! Thin aliases over nalgebra so callers can pass their own kernel points
//! straight in.

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = nalgebra::Vector3<f64>;

/// The three coordinate axes, in the order splits are evaluated.
pub const AXES: [usize; 3] = [0, 1, 2];

/// Convert a `[x, y, z]` array into a point.
#[inline]
pub fn point(p: [f64; 3]) -> Point3 {
    Point3::new(p[0], p[1], p[2])
}

/// Convert a point back into a `[x, y, z]` array.
#[inline]
pub fn to_array(p: &Point3) -> [f64; 3] {
    [p.x, p.y, p.z]
}

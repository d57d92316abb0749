//! Tree members: a caller handle paired with its bounding box.

use crate::aabb::Aabb3;
use crate::math::Point3;

/// Objects that can report their own bounding box.
pub trait Bounded {
    /// Current bounding box of the object.
    fn aabb(&self) -> Aabb3;
}

impl Bounded for Aabb3 {
    fn aabb(&self) -> Aabb3 {
        *self
    }
}

/// A caller handle and the box captured for it when the scene was snapshotted.
///
/// The tree never looks inside the handle. It only hands references back from
/// queries, or passes them to caller-supplied closures and trait impls.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive<T> {
    /// Caller's object or a reference to it.
    pub handle: T,
    /// Box captured at snapshot time.
    pub aabb: Aabb3,
}

impl<T> Primitive<T> {
    /// Pair a handle with an explicit box.
    pub fn new(handle: T, aabb: Aabb3) -> Self {
        Self { handle, aabb }
    }

    /// Centroid of the cached box.
    pub fn centroid(&self) -> Point3 {
        self.aabb.centroid()
    }
}

impl<T: Bounded> Primitive<T> {
    /// Snapshot a handle's box through its [`Bounded`] impl.
    pub fn from_bounded(handle: T) -> Self {
        let aabb = handle.aabb();
        Self { handle, aabb }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Block {
        lo: f64,
        hi: f64,
    }

    impl Bounded for Block {
        fn aabb(&self) -> Aabb3 {
            Aabb3::from_arrays([self.lo; 3], [self.hi; 3])
        }
    }

    #[test]
    fn test_from_bounded_snapshots_box() {
        let p = Primitive::from_bounded(Block { lo: 1.0, hi: 3.0 });
        assert_eq!(p.aabb, Aabb3::from_arrays([1.0; 3], [3.0; 3]));
        assert_eq!(p.centroid(), Point3::new(2.0, 2.0, 2.0));
    }
}

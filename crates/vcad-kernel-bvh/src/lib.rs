#![warn(missing_docs)]

//! Bounding volume hierarchy for broad-phase collision queries.
//!
//! Builds an immutable BVH over caller primitives (a handle plus its
//! axis-aligned box) and answers range queries, self-overlap enumeration and
//! ray casts against it.
//!
//! # Architecture
//!
//! - [`Aabb3`] - Axis-aligned box value type
//! - [`Primitive`] - Caller handle paired with its snapshot box
//! - [`Bvh`] - SAH / median / equal-interval tree construction
//! - [`query`] - Range, pair and ray traversal
//! - [`Ray`] - Slab-method ray/box test
//!
//! # Example
//!
//! ```
//! use vcad_kernel_bvh::{Aabb3, BuildOptions, Bvh, Primitive};
//!
//! let boxes = vec![
//!     Primitive::new("vise", Aabb3::from_arrays([0.0, 0.0, 0.0], [1.0, 1.0, 1.0])),
//!     Primitive::new("clamp", Aabb3::from_arrays([2.0, 2.0, 2.0], [3.0, 3.0, 3.0])),
//! ];
//! let bvh = Bvh::build(boxes, &BuildOptions::default()).unwrap();
//!
//! let hits = bvh.query(&Aabb3::from_arrays([0.5, 0.5, 0.5], [1.5, 1.5, 1.5]));
//! assert_eq!(hits, vec![&"vise"]);
//! ```

mod aabb;
mod build;
mod error;
pub mod math;
mod primitive;
pub mod query;
mod ray;

#[cfg(test)]
mod testutil;

pub use aabb::Aabb3;
pub use build::{BuildOptions, Bvh, BvhNode, BvhStats, SplitMethod, SAH_CANDIDATES};
pub use error::{BvhError, Result};
pub use math::{Point3, Vec3};
pub use primitive::{Bounded, Primitive};
pub use ray::{Ray, RayHit, RayTarget};

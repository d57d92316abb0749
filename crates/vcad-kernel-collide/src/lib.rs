#![warn(missing_docs)]

//! Broad-phase collision checking for CNC toolpaths.
//!
//! Obstacles (stock, vises, clamps, machine parts) are assembled into a
//! [`vcad_kernel_bvh::Bvh`]; each toolpath step is bounded by a conservative
//! tool box and range-queried against it.
//!
//! # Example
//!
//! ```
//! use vcad_kernel_collide::{
//!     check_toolpath, SceneDescriptor, Severity, ToolDescriptor, ToolpathStep,
//! };
//!
//! let scene = SceneDescriptor {
//!     stock: Some([0.0, 0.0, 0.0, 50.0, 50.0, 20.0]),
//!     ..Default::default()
//! };
//! let obstacles = scene.build_bvh().unwrap().unwrap();
//!
//! let tool = ToolDescriptor::new(6.0, 25.0);
//! let path = [
//!     ToolpathStep::rapid([25.0, 25.0, 60.0]),
//!     ToolpathStep::rapid([25.0, 25.0, 30.0]),
//! ];
//! let records = check_toolpath(&path, &tool, &obstacles).unwrap();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].severity, Severity::Critical);
//! ```

mod check;
mod error;
mod obstacle;
mod tool;
mod toolpath;

pub use check::{
    check_toolpath, check_toolpath_par, check_toolpath_with, CheckOptions, CollisionRecord,
    Severity, ToolpathReport,
};
pub use error::{CollideError, Result};
pub use obstacle::{Obstacle, ObstacleDescriptor, ObstacleKind, SceneDescriptor};
pub use tool::{ToolDescriptor, VERTICAL_THRESHOLD};
pub use toolpath::{MotionType, ToolpathStep};

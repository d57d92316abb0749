//! Broad-phase toolpath checking against an obstacle BVH.
//!
//! Each step's tool box is range-queried against the tree. A step without a
//! record is guaranteed clear of every obstacle box; a step with a record only
//! has candidates, which need an exact check by the caller.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;
use vcad_kernel_bvh::{Aabb3, Bvh};

use crate::error::{CollideError, Result};
use crate::tool::ToolDescriptor;
use crate::toolpath::{MotionType, ToolpathStep};

/// How serious a candidate collision is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Contact during a cutting move.
    Warning,
    /// Contact during a rapid move.
    Critical,
}

impl Severity {
    /// Severity of a hit reached with `motion`.
    pub fn for_motion(motion: MotionType) -> Self {
        match motion {
            MotionType::Rapid => Severity::Critical,
            MotionType::Feed | MotionType::Plunge | MotionType::Arc => Severity::Warning,
        }
    }
}

/// A path step whose tool box overlaps at least one obstacle box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionRecord {
    /// Index of the step in the path.
    pub step_index: usize,
    /// Tool position at the step.
    pub position: [f64; 3],
    /// Number of candidate obstacles.
    pub candidate_count: usize,
    /// Critical for rapids, warning otherwise.
    pub severity: Severity,
    /// Primitive indices of the candidates, ascending.
    pub candidates: Vec<usize>,
}

/// Checker parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckOptions {
    /// Extra margin around the tool box, in mm.
    pub clearance: f64,
    /// Also cover the motion from the previous step by merging both boxes.
    pub sweep_segments: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            clearance: 0.0,
            sweep_segments: false,
        }
    }
}

impl CheckOptions {
    /// Reject negative or non-finite clearance.
    pub fn validate(&self) -> Result<()> {
        if !(self.clearance.is_finite() && self.clearance >= 0.0) {
            return Err(CollideError::InvalidOptions(format!(
                "clearance must be non-negative, got {}",
                self.clearance
            )));
        }
        Ok(())
    }
}

/// Check every step of `path` with default options.
pub fn check_toolpath<T>(
    path: &[ToolpathStep],
    tool: &ToolDescriptor,
    obstacles: &Bvh<T>,
) -> Result<Vec<CollisionRecord>> {
    check_toolpath_with(path, tool, obstacles, &CheckOptions::default())
}

/// Check every step of `path`, returning records in step order.
pub fn check_toolpath_with<T>(
    path: &[ToolpathStep],
    tool: &ToolDescriptor,
    obstacles: &Bvh<T>,
    options: &CheckOptions,
) -> Result<Vec<CollisionRecord>> {
    tool.validate()?;
    options.validate()?;

    let records: Vec<_> = (0..path.len())
        .filter_map(|i| check_step(path, i, tool, obstacles, options))
        .collect();
    log_summary(path.len(), &records);
    Ok(records)
}

/// Same as [`check_toolpath_with`], with steps spread over the rayon pool.
///
/// The output is identical to the sequential checker.
pub fn check_toolpath_par<T: Sync>(
    path: &[ToolpathStep],
    tool: &ToolDescriptor,
    obstacles: &Bvh<T>,
    options: &CheckOptions,
) -> Result<Vec<CollisionRecord>> {
    tool.validate()?;
    options.validate()?;

    let records: Vec<_> = (0..path.len())
        .into_par_iter()
        .filter_map(|i| check_step(path, i, tool, obstacles, options))
        .collect();
    log_summary(path.len(), &records);
    Ok(records)
}

/// Region queried for step `i`.
fn step_region(
    path: &[ToolpathStep],
    i: usize,
    tool: &ToolDescriptor,
    options: &CheckOptions,
) -> Aabb3 {
    let mut region = tool.swept_aabb(&path[i].point());
    if options.sweep_segments && i > 0 {
        region = region.merge(&tool.swept_aabb(&path[i - 1].point()));
    }
    if options.clearance > 0.0 {
        region = region.expand(options.clearance);
    }
    region
}

fn check_step<T>(
    path: &[ToolpathStep],
    i: usize,
    tool: &ToolDescriptor,
    obstacles: &Bvh<T>,
    options: &CheckOptions,
) -> Option<CollisionRecord> {
    let region = step_region(path, i, tool, options);
    let mut candidates = obstacles.query_indices(&region);
    if candidates.is_empty() {
        return None;
    }
    candidates.sort_unstable();

    let step = &path[i];
    Some(CollisionRecord {
        step_index: i,
        position: step.position,
        candidate_count: candidates.len(),
        severity: Severity::for_motion(step.motion_type),
        candidates,
    })
}

fn log_summary(steps: usize, records: &[CollisionRecord]) {
    let critical = records
        .iter()
        .filter(|r| r.severity == Severity::Critical)
        .count();
    info!(
        steps,
        critical,
        warning = records.len() - critical,
        "toolpath check complete"
    );
}

/// Aggregate view over a checked path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolpathReport {
    /// Number of steps checked.
    pub steps_checked: usize,
    /// Records in step order.
    pub records: Vec<CollisionRecord>,
    /// Records with critical severity.
    pub critical_count: usize,
    /// Records with warning severity.
    pub warning_count: usize,
}

impl ToolpathReport {
    /// Summarize records produced for a path of `steps_checked` steps.
    pub fn new(steps_checked: usize, records: Vec<CollisionRecord>) -> Self {
        let critical_count = records
            .iter()
            .filter(|r| r.severity == Severity::Critical)
            .count();
        let warning_count = records.len() - critical_count;
        Self {
            steps_checked,
            records,
            critical_count,
            warning_count,
        }
    }

    /// Check `path` and summarize the result.
    pub fn check<T>(
        path: &[ToolpathStep],
        tool: &ToolDescriptor,
        obstacles: &Bvh<T>,
        options: &CheckOptions,
    ) -> Result<Self> {
        let records = check_toolpath_with(path, tool, obstacles, options)?;
        Ok(Self::new(path.len(), records))
    }

    /// No step touched an obstacle box.
    pub fn is_clear(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest rapid-move collision, if any.
    pub fn first_critical(&self) -> Option<&CollisionRecord> {
        self.records
            .iter()
            .find(|r| r.severity == Severity::Critical)
    }
}

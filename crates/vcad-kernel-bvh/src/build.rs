//! Top-down BVH construction.
//!
//! Nodes are split recursively until they hold at most `max_leaf_size`
//! members or reach `max_depth`. The default strategy scores candidate
//! planes with the Surface Area Heuristic (SAH).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aabb::Aabb3;
use crate::error::{BvhError, Result};
use crate::math::{Point3, AXES};
use crate::primitive::Primitive;

/// Number of uniformly spaced SAH candidate planes tried per axis.
pub const SAH_CANDIDATES: usize = 16;

/// How an internal node chooses its splitting plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMethod {
    /// Lowest SAH cost over all axes and candidate planes.
    #[default]
    Sah,
    /// Median centroid along the x axis only.
    Median,
    /// Midpoint of the centroid range on the widest axis.
    Equal,
}

/// Parameters for [`Bvh::build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildOptions {
    /// Nodes with at most this many members become leaves.
    pub max_leaf_size: usize,
    /// Nodes at this depth become leaves regardless of size.
    pub max_depth: u32,
    /// Splitting strategy.
    pub split_method: SplitMethod,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_leaf_size: 4,
            max_depth: 32,
            split_method: SplitMethod::Sah,
        }
    }
}

impl BuildOptions {
    /// Validate options.
    pub fn validate(&self) -> Result<()> {
        if self.max_leaf_size == 0 {
            return Err(BvhError::InvalidOptions(
                "maxLeafSize must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Decode options from JSON with keys `maxLeafSize`, `maxDepth` and
    /// `splitMethod`. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }
}

/// Summary of a built tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BvhStats {
    /// Total nodes, leaves included.
    pub node_count: usize,
    /// Leaf nodes.
    pub leaf_count: usize,
    /// Deepest node depth (root is 0).
    pub max_depth: u32,
    /// Primitives referenced by leaves.
    pub object_count: usize,
}

/// A BVH node - either a leaf holding primitives or an internal node with
/// two children.
#[derive(Debug, Clone)]
pub enum BvhNode {
    /// Leaf node.
    Leaf {
        /// Union of the member boxes.
        aabb: Aabb3,
        /// Indices into [`Bvh::primitives`].
        members: Vec<usize>,
        /// Distance from the root.
        depth: u32,
    },
    /// Internal node with two children.
    Internal {
        /// Union of both children's boxes.
        aabb: Aabb3,
        /// Left child node.
        left: Box<BvhNode>,
        /// Right child node.
        right: Box<BvhNode>,
        /// Distance from the root.
        depth: u32,
    },
}

impl BvhNode {
    /// Bounding box of this node.
    pub fn aabb(&self) -> &Aabb3 {
        match self {
            BvhNode::Leaf { aabb, .. } | BvhNode::Internal { aabb, .. } => aabb,
        }
    }

    /// Depth of this node (root is 0).
    pub fn depth(&self) -> u32 {
        match self {
            BvhNode::Leaf { depth, .. } | BvhNode::Internal { depth, .. } => *depth,
        }
    }

    /// Whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, BvhNode::Leaf { .. })
    }
}

/// Bounding Volume Hierarchy over caller primitives.
///
/// Built once from a snapshot and immutable afterwards, so a shared `&Bvh`
/// can be queried from several threads at once.
#[derive(Debug, Clone)]
pub struct Bvh<T> {
    pub(crate) primitives: Vec<Primitive<T>>,
    pub(crate) root: Option<BvhNode>,
    stats: BvhStats,
    options: BuildOptions,
}

/// A splitting plane: members with `centroid[axis] < position` go left.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Split {
    axis: usize,
    position: f64,
}

impl<T> Bvh<T> {
    /// Build a BVH over `primitives`.
    ///
    /// Returns `None` for an empty primitive list. A `max_leaf_size` of 0 is
    /// treated as 1.
    pub fn build(primitives: Vec<Primitive<T>>, options: &BuildOptions) -> Option<Self> {
        if primitives.is_empty() {
            return None;
        }

        let options = BuildOptions {
            max_leaf_size: options.max_leaf_size.max(1),
            ..*options
        };

        let builder = Builder {
            aabbs: primitives.iter().map(|p| p.aabb).collect(),
            centroids: primitives.iter().map(|p| p.centroid()).collect(),
            options,
        };
        let root = builder.build_node((0..primitives.len()).collect(), 0);
        let stats = collect_stats(&root);

        debug!(
            node_count = stats.node_count,
            leaf_count = stats.leaf_count,
            max_depth = stats.max_depth,
            object_count = stats.object_count,
            split_method = ?options.split_method,
            "BVH built"
        );

        Some(Self {
            primitives,
            root: Some(root),
            stats,
            options,
        })
    }

    /// Get a reference to the root node, if any.
    pub fn root(&self) -> Option<&BvhNode> {
        self.root.as_ref()
    }

    /// Node, leaf, depth and object counts gathered after the build.
    pub fn stats(&self) -> &BvhStats {
        &self.stats
    }

    /// Options the tree was built with.
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// All primitives, in the order they were supplied to [`Bvh::build`].
    pub fn primitives(&self) -> &[Primitive<T>] {
        &self.primitives
    }

    /// Number of primitives in the tree.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Whether the tree holds no primitives.
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Bounding box of the whole scene.
    pub fn bounds(&self) -> Option<&Aabb3> {
        self.root.as_ref().map(BvhNode::aabb)
    }
}

struct Builder {
    aabbs: Vec<Aabb3>,
    centroids: Vec<Point3>,
    options: BuildOptions,
}

impl Builder {
    /// Build a node recursively. Recursion depth is bounded by `max_depth`.
    fn build_node(&self, members: Vec<usize>, depth: u32) -> BvhNode {
        let aabb = self.bounds_of(&members);

        if members.len() <= self.options.max_leaf_size || depth >= self.options.max_depth {
            return BvhNode::Leaf { aabb, members, depth };
        }

        let Some(split) = self.find_split(&members, &aabb) else {
            debug!(depth, members = members.len(), "no usable split, forcing leaf");
            return BvhNode::Leaf { aabb, members, depth };
        };

        let (mut left, mut right): (Vec<usize>, Vec<usize>) = members
            .iter()
            .copied()
            .partition(|&i| self.centroids[i][split.axis] < split.position);

        // Fallback if partition fails: halve in input order.
        if left.is_empty() || right.is_empty() {
            let mid = members.len() / 2;
            left = members[..mid].to_vec();
            right = members[mid..].to_vec();
        }

        BvhNode::Internal {
            aabb,
            left: Box::new(self.build_node(left, depth + 1)),
            right: Box::new(self.build_node(right, depth + 1)),
            depth,
        }
    }

    fn bounds_of(&self, members: &[usize]) -> Aabb3 {
        members
            .iter()
            .fold(Aabb3::empty(), |acc, &i| acc.merge(&self.aabbs[i]))
    }

    fn find_split(&self, members: &[usize], bounds: &Aabb3) -> Option<Split> {
        match self.options.split_method {
            SplitMethod::Sah => self.sah_split(members, bounds),
            SplitMethod::Median => self.median_split(members),
            SplitMethod::Equal => self.equal_split(members),
        }
    }

    /// Members sorted by centroid along `axis`, ties broken by index.
    fn sorted_along(&self, members: &[usize], axis: usize) -> Vec<usize> {
        let mut sorted = members.to_vec();
        sorted.sort_by(|&a, &b| {
            self.centroids[a][axis]
                .total_cmp(&self.centroids[b][axis])
                .then(a.cmp(&b))
        });
        sorted
    }

    /// Centroid range along `axis` as `(min, max)`.
    fn centroid_range(&self, members: &[usize], axis: usize) -> (f64, f64) {
        members.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), &i| {
                let c = self.centroids[i][axis];
                (lo.min(c), hi.max(c))
            },
        )
    }

    /// Median centroid on the first axis evaluated (x). Other axes are never
    /// compared.
    fn median_split(&self, members: &[usize]) -> Option<Split> {
        let axis = AXES[0];
        let sorted = self.sorted_along(members, axis);
        let median = *sorted.get(sorted.len() / 2)?;
        Some(Split {
            axis,
            position: self.centroids[median][axis],
        })
    }

    /// Midpoint of the centroid range on the axis where that range is widest.
    fn equal_split(&self, members: &[usize]) -> Option<Split> {
        let mut best: Option<(f64, Split)> = None;
        for axis in AXES {
            let (lo, hi) = self.centroid_range(members, axis);
            let extent = hi - lo;
            if !(extent > 0.0) {
                continue;
            }
            if best.map_or(true, |(e, _)| extent > e) {
                let position = lo + extent / 2.0;
                best = Some((extent, Split { axis, position }));
            }
        }
        best.map(|(_, split)| split)
    }

    /// Lowest-cost SAH plane over all axes, or `None` when no candidate puts
    /// members on both sides.
    fn sah_split(&self, members: &[usize], bounds: &Aabb3) -> Option<Split> {
        let parent_area = bounds.surface_area();
        let mut best: Option<(f64, Split)> = None;

        for axis in AXES {
            let (lo, hi) = self.centroid_range(members, axis);
            let extent = hi - lo;
            // Zero-range axis: every candidate would be one-sided.
            if !(extent > 0.0) {
                continue;
            }

            for i in 0..SAH_CANDIDATES {
                let position = lo + extent * (i + 1) as f64 / (SAH_CANDIDATES + 1) as f64;

                let mut left_bounds = Aabb3::empty();
                let mut right_bounds = Aabb3::empty();
                let mut left_count = 0usize;
                let mut right_count = 0usize;
                for &m in members {
                    if self.centroids[m][axis] < position {
                        left_bounds = left_bounds.merge(&self.aabbs[m]);
                        left_count += 1;
                    } else {
                        right_bounds = right_bounds.merge(&self.aabbs[m]);
                        right_count += 1;
                    }
                }

                if left_count == 0 || right_count == 0 {
                    continue;
                }

                let cost = sah_cost(
                    parent_area,
                    left_bounds.surface_area(),
                    left_count,
                    right_bounds.surface_area(),
                    right_count,
                );

                if best.map_or(true, |(c, _)| cost < c) {
                    best = Some((cost, Split { axis, position }));
                }
            }
        }

        best.map(|(_, split)| split)
    }
}

/// SAH cost: `1 + (A_l * N_l + A_r * N_r) / A_parent`.
///
/// A flat parent (zero area) has no meaningful area ratio; the cost then
/// prefers balanced counts.
fn sah_cost(
    parent_area: f64,
    left_area: f64,
    left_count: usize,
    right_area: f64,
    right_count: usize,
) -> f64 {
    if parent_area > 0.0 {
        1.0 + (left_area * left_count as f64 + right_area * right_count as f64) / parent_area
    } else {
        let n = (left_count + right_count) as f64;
        1.0 + ((left_count * left_count + right_count * right_count) as f64) / n
    }
}

fn collect_stats(root: &BvhNode) -> BvhStats {
    let mut stats = BvhStats::default();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        stats.node_count += 1;
        stats.max_depth = stats.max_depth.max(node.depth());
        match node {
            BvhNode::Leaf { members, .. } => {
                stats.leaf_count += 1;
                stats.object_count += members.len();
            }
            BvhNode::Internal { left, right, .. } => {
                stack.push(right);
                stack.push(left);
            }
        }
    }

    stats
}

//! Range queries, self-pair enumeration and ray casting.
//!
//! All traversals use an explicit stack and visit the left child before the
//! right, the same order a recursive descent would.

use crate::aabb::Aabb3;
use crate::build::{Bvh, BvhNode};
use crate::primitive::{Bounded, Primitive};
use crate::ray::{Ray, RayHit, RayTarget};

impl<T> Bvh<T> {
    /// Handles of every primitive whose box overlaps `region`.
    ///
    /// Leaf members are tested with their own cached box, so the result has
    /// no false negatives and no false positives.
    pub fn query(&self, region: &Aabb3) -> Vec<&T> {
        self.query_indices(region)
            .into_iter()
            .map(|i| &self.primitives[i].handle)
            .collect()
    }

    /// Indices (into [`Bvh::primitives`]) of every primitive overlapping
    /// `region`.
    pub fn query_indices(&self, region: &Aabb3) -> Vec<usize> {
        self.query_by(region, |p| p.aabb)
    }

    /// Like [`Bvh::query`], but re-derives each candidate's box through
    /// `extract` instead of trusting the snapshot.
    ///
    /// Subtrees are still pruned with the boxes captured at build time.
    pub fn query_with<F>(&self, region: &Aabb3, extract: F) -> Vec<&T>
    where
        F: Fn(&T) -> Aabb3,
    {
        self.query_by(region, |p| extract(&p.handle))
            .into_iter()
            .map(|i| &self.primitives[i].handle)
            .collect()
    }

    fn query_by<F>(&self, region: &Aabb3, member_aabb: F) -> Vec<usize>
    where
        F: Fn(&Primitive<T>) -> Aabb3,
    {
        let mut found = Vec::new();
        let Some(root) = &self.root else {
            return found;
        };

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if !node.aabb().intersects(region) {
                continue;
            }
            match node {
                BvhNode::Leaf { members, .. } => {
                    for &i in members {
                        if member_aabb(&self.primitives[i]).intersects(region) {
                            found.push(i);
                        }
                    }
                }
                BvhNode::Internal { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }

        found
    }

    /// Every ordered pair of distinct primitives whose boxes overlap.
    ///
    /// Each overlapping pair is reported exactly twice, once as `(a, b)` and
    /// once as `(b, a)`. Use [`Bvh::find_unique_pairs`] for one entry per pair.
    pub fn find_all_pairs(&self) -> Vec<(&T, &T)> {
        self.find_pair_indices()
            .into_iter()
            .map(|(a, b)| (&self.primitives[a].handle, &self.primitives[b].handle))
            .collect()
    }

    /// Index form of [`Bvh::find_all_pairs`].
    ///
    /// Dual traversal from `(root, root)`: disjoint node pairs are pruned, a
    /// leaf against an internal node descends into both of its children, and
    /// two internal nodes descend into all four child combinations.
    pub fn find_pair_indices(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        let Some(root) = &self.root else {
            return pairs;
        };

        let mut stack: Vec<(&BvhNode, &BvhNode)> = vec![(root, root)];
        while let Some((a, b)) = stack.pop() {
            if !a.aabb().intersects(b.aabb()) {
                continue;
            }
            match (a, b) {
                (BvhNode::Leaf { members: ma, .. }, BvhNode::Leaf { members: mb, .. }) => {
                    for &i in ma {
                        for &j in mb {
                            if i != j
                                && self.primitives[i].aabb.intersects(&self.primitives[j].aabb)
                            {
                                pairs.push((i, j));
                            }
                        }
                    }
                }
                (BvhNode::Leaf { .. }, BvhNode::Internal { left, right, .. }) => {
                    stack.push((a, right.as_ref()));
                    stack.push((a, left.as_ref()));
                }
                (BvhNode::Internal { left, right, .. }, BvhNode::Leaf { .. }) => {
                    stack.push((right.as_ref(), b));
                    stack.push((left.as_ref(), b));
                }
                (
                    BvhNode::Internal {
                        left: al,
                        right: ar,
                        ..
                    },
                    BvhNode::Internal {
                        left: bl,
                        right: br,
                        ..
                    },
                ) => {
                    let (al, ar, bl, br) = (al.as_ref(), ar.as_ref(), bl.as_ref(), br.as_ref());
                    stack.push((ar, br));
                    stack.push((ar, bl));
                    stack.push((al, br));
                    stack.push((al, bl));
                }
            }
        }

        pairs
    }

    /// Overlapping pairs as `(i, j)` primitive indices with `i < j`, sorted
    /// ascending and free of duplicates.
    pub fn find_unique_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs: Vec<(usize, usize)> = self
            .find_pair_indices()
            .into_iter()
            .map(|(a, b)| if a < b { (a, b) } else { (b, a) })
            .collect();
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }

    /// Cast a ray, asking `hit_test` for the exact hit on each leaf member.
    ///
    /// A node is skipped when the slab test misses it or its accept distance
    /// (entry distance, or exit distance if the origin is inside) exceeds
    /// `max_distance`. Both children of a surviving node are visited. Hits
    /// beyond `max_distance` are dropped; the rest come back sorted by
    /// ascending `t`.
    pub fn raycast_with<F>(
        &self,
        ray: &Ray,
        max_distance: f64,
        mut hit_test: F,
    ) -> Vec<RayHit<'_, T>>
    where
        F: FnMut(&T, &Ray) -> Option<f64>,
    {
        let mut hits = Vec::new();
        let Some(root) = &self.root else {
            return hits;
        };

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match ray.hit_distance(node.aabb()) {
                Some(d) if d <= max_distance => {}
                _ => continue,
            }
            match node {
                BvhNode::Leaf { members, .. } => {
                    for &i in members {
                        let handle = &self.primitives[i].handle;
                        if let Some(t) = hit_test(handle, ray) {
                            if t <= max_distance {
                                hits.push(RayHit {
                                    t,
                                    point: ray.at(t),
                                    index: i,
                                    handle,
                                });
                            }
                        }
                    }
                }
                BvhNode::Internal { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }

        hits.sort_by(|a, b| a.t.total_cmp(&b.t).then(a.index.cmp(&b.index)));
        hits
    }
}

impl<T: RayTarget> Bvh<T> {
    /// Cast a ray using each handle's own [`RayTarget`] test.
    pub fn raycast(&self, ray: &Ray, max_distance: f64) -> Vec<RayHit<'_, T>> {
        self.raycast_with(ray, max_distance, |handle, ray| handle.raycast(ray))
    }

    /// Nearest hit within `max_distance`.
    pub fn raycast_closest(&self, ray: &Ray, max_distance: f64) -> Option<RayHit<'_, T>> {
        self.raycast(ray, max_distance).into_iter().next()
    }
}

impl<T: Bounded> Bvh<T> {
    /// Range query that asks each candidate handle for its current box.
    pub fn query_live(&self, region: &Aabb3) -> Vec<&T> {
        self.query_with(region, T::aabb)
    }
}

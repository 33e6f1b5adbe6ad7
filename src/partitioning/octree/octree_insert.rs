use super::octree_tree::octant_index;
use super::{LocatorPoint, NodeIndex, OctNode, OctNodeData, OctTree};
use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, DIM};
use smallvec::SmallVec;

impl OctTree {
    /// Inserts a point, growing the root first if the point lies outside of it.
    ///
    /// The point coordinates must be finite, otherwise growing the root never terminates.
    pub fn insert(&mut self, point: LocatorPoint) {
        debug_assert!(
            point.coords.iter().all(|x| x.is_finite()),
            "Octree points must have finite coordinates."
        );

        while !self.root_bounds().contains_local_point(&point.coords) {
            self.grow_toward(&point.coords);
        }

        let mut curr = self.root;

        loop {
            let node = &self.nodes[curr as usize];
            match &node.data {
                OctNodeData::Internal(children) => curr = children[node.octant_of(&point.coords)],
                OctNodeData::Leaf(_) => break,
            }
        }

        self.nodes[curr as usize].push_point(point);
        self.num_points += 1;
        self.split_recursively(curr);
    }

    /// Replaces the root with a new root twice as large, extended toward `target`.
    ///
    /// The old root becomes one of the eight children of the new root, so the new root's
    /// splitting point lies exactly on the old root's boundary.
    fn grow_toward(&mut self, target: &Point<Real>) {
        let old_root = self.root;
        let old_bounds = *self.root_bounds();
        let mut new_bounds = old_bounds;
        let mut mid = old_bounds.mins;
        let mut old_octant = 0;

        for i in 0..DIM {
            let extent = old_bounds.maxs[i] - old_bounds.mins[i];

            if target[i] < old_bounds.mins[i] {
                new_bounds.mins[i] = old_bounds.mins[i] - extent;
                mid[i] = old_bounds.mins[i];
                old_octant |= 1 << i;
            } else {
                new_bounds.maxs[i] = old_bounds.maxs[i] + extent;
                mid[i] = old_bounds.maxs[i];
            }
        }

        let mut children = [0; 8];
        for (octant, child) in children.iter_mut().enumerate() {
            if octant == old_octant {
                *child = old_root;
            } else {
                *child = self.push_node(OctNode::leaf(new_bounds.octant(&mid, octant)));
            }
        }

        self.root = self.push_node(OctNode {
            bounds: new_bounds,
            mid,
            data: OctNodeData::Internal(children),
            points_bounds: Aabb::new_invalid(),
        });

        log::debug!(
            "Octree root grown to [{:?}, {:?}].",
            new_bounds.mins,
            new_bounds.maxs
        );
    }

    /// Splits `leaf` if it needs to, then each of its new children, and so on.
    fn split_recursively(&mut self, leaf: NodeIndex) {
        let mut stack: SmallVec<[NodeIndex; 32]> = SmallVec::new();
        stack.push(leaf);

        while let Some(curr) = stack.pop() {
            if let Some(children) = self.try_split(curr) {
                stack.extend_from_slice(&children);
            }
        }
    }

    /// Splits the leaf `id` into eight children if it is overfull and its points are
    /// spread enough.
    fn try_split(&mut self, id: NodeIndex) -> Option<[NodeIndex; 8]> {
        let node = &self.nodes[id as usize];
        let OctNodeData::Leaf(points) = &node.data else {
            return None;
        };

        if points.len() <= Self::SPLIT_THRESHOLD || !can_split_at(&node.bounds, &node.mid) {
            return None;
        }

        let spread = node.points_bounds.diagonal_length();
        if spread <= Self::SPREAD_RATIO * node.bounds.diagonal_length() {
            return None;
        }

        let bounds = node.bounds;
        let mid = node.mid;
        let points = match &mut self.nodes[id as usize].data {
            OctNodeData::Leaf(points) => std::mem::take(points),
            OctNodeData::Internal(_) => return None,
        };

        let mut children = [0; 8];
        for (octant, child) in children.iter_mut().enumerate() {
            *child = self.push_node(OctNode::leaf(bounds.octant(&mid, octant)));
        }

        for point in points {
            let child = children[octant_index(&mid, &point.coords)];
            self.nodes[child as usize].push_point(point);
        }

        let node = &mut self.nodes[id as usize];
        node.data = OctNodeData::Internal(children);
        node.points_bounds = Aabb::new_invalid();
        Some(children)
    }

    fn push_node(&mut self, node: OctNode) -> NodeIndex {
        self.nodes.push(node);
        (self.nodes.len() - 1) as NodeIndex
    }
}

/// Splitting is pointless once the float precision is exhausted: on an axis with a
/// non-zero extent, `mid` must lie strictly between the bounds.
fn can_split_at(bounds: &Aabb, mid: &Point<Real>) -> bool {
    (0..DIM).all(|i| {
        bounds.mins[i] == bounds.maxs[i] || (bounds.mins[i] < mid[i] && mid[i] < bounds.maxs[i])
    })
}

use super::{LocatorPoint, NodeIndex, OctNodeData, OctTree};
use crate::math::{Point, Real};
use crate::utils::WeightedValue;
use smallvec::SmallVec;
use std::collections::BinaryHeap;

const TRAVERSAL_STACK_SIZE: usize = 32;

impl OctTree {
    /// Finds the point closest to `target`, with its squared distance.
    ///
    /// If `max_dist_squared` is set, only points at a squared distance smaller or equal to it
    /// are considered, and `None` is returned if there are none.
    ///
    /// This is a best-first branch-and-bound search: nodes are visited in the order of
    /// their distance lower bound, and the search stops once that bound is no smaller than
    /// the best exact distance found so far. On exact ties the first point found wins.
    pub fn nearest(
        &self,
        target: &Point<Real>,
        max_dist_squared: Option<Real>,
    ) -> Option<(&LocatorPoint, Real)> {
        if self.is_empty() {
            return None;
        }

        let limit = max_dist_squared.unwrap_or(Real::MAX);
        let root_bound = self.root_bounds().distance_squared_to_local_point(target);

        if root_bound > limit {
            return None;
        }

        let mut queue: BinaryHeap<WeightedValue<NodeIndex>> = BinaryHeap::new();
        let mut best: Option<(&LocatorPoint, Real)> = None;

        queue.push(WeightedValue::new(self.root, -root_bound));

        while let Some(entry) = queue.pop() {
            let bound = -entry.cost;

            if matches!(best, Some((_, best_dist)) if bound >= best_dist) {
                // No node left that can contain a closer point.
                break;
            }

            match &self.nodes[entry.value as usize].data {
                OctNodeData::Leaf(points) => {
                    for point in points {
                        let dist = na::distance_squared(&point.coords, target);

                        if dist <= limit && best.map_or(true, |(_, best_dist)| dist < best_dist) {
                            best = Some((point, dist));
                        }
                    }
                }
                OctNodeData::Internal(children) => {
                    for child in children {
                        let child_bound = self.nodes[*child as usize]
                            .bounds
                            .distance_squared_to_local_point(target);

                        if child_bound <= limit
                            && best.map_or(true, |(_, best_dist)| child_bound < best_dist)
                        {
                            queue.push(WeightedValue::new(*child, -child_bound));
                        }
                    }
                }
            }
        }

        best
    }

    /// Calls `f` on every point at a squared distance smaller or equal to
    /// `max_dist_squared` from `target`, with that squared distance.
    ///
    /// Subtrees whose bounds are farther than the limit are skipped. The visit order is
    /// unspecified.
    pub fn for_each_in_range(
        &self,
        target: &Point<Real>,
        max_dist_squared: Real,
        mut f: impl FnMut(&LocatorPoint, Real),
    ) {
        let mut stack: SmallVec<[NodeIndex; TRAVERSAL_STACK_SIZE]> = SmallVec::new();
        stack.push(self.root);

        while let Some(curr) = stack.pop() {
            let node = &self.nodes[curr as usize];
            if node.bounds.distance_squared_to_local_point(target) > max_dist_squared {
                continue;
            }

            match &node.data {
                OctNodeData::Leaf(points) => {
                    for point in points {
                        let dist = na::distance_squared(&point.coords, target);
                        if dist <= max_dist_squared {
                            f(point, dist);
                        }
                    }
                }
                OctNodeData::Internal(children) => stack.extend_from_slice(children),
            }
        }
    }
}

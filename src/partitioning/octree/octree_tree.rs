use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, DIM};

/// Index of a node inside the [`OctTree`] arena.
pub type NodeIndex = u32;

/// A point stored in an octree leaf.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LocatorPoint {
    /// The point position.
    pub coords: Point<Real>,
    /// Caller-defined identity of the point, e.g., a vertex or voxel index.
    pub index: usize,
    /// The point set this point was inserted with.
    pub set_id: u32,
}

/// The content of an octree node.
#[derive(Clone, Debug)]
pub enum OctNodeData {
    /// A leaf owning its points.
    Leaf(Vec<LocatorPoint>),
    /// An internal node with one child per octant.
    ///
    /// Bit `i` of the child's position in this array is set if the child covers the
    /// upper half of this node along axis `i`.
    Internal([NodeIndex; 8]),
}

/// A cuboid node of the octree.
#[derive(Clone, Debug)]
pub struct OctNode {
    /// The region covered by this node.
    pub bounds: Aabb,
    /// The splitting point of this node.
    ///
    /// Usually the center of `bounds`, except for nodes created by growing the tree
    /// upward, where it lies exactly on the boundary of the previous root.
    pub mid: Point<Real>,
    /// The points or children of this node.
    pub data: OctNodeData,
    /// The bounding box of the points of this leaf.
    ///
    /// Invalid for internal nodes and empty leaves.
    pub points_bounds: Aabb,
}

impl OctNode {
    pub(super) fn leaf(bounds: Aabb) -> Self {
        Self {
            bounds,
            mid: bounds.center(),
            data: OctNodeData::Leaf(Vec::new()),
            points_bounds: Aabb::new_invalid(),
        }
    }

    /// Adds `point` to this leaf. Does nothing on internal nodes.
    pub(super) fn push_point(&mut self, point: LocatorPoint) {
        if let OctNodeData::Leaf(points) = &mut self.data {
            self.points_bounds.take_point(point.coords);
            points.push(point);
        }
    }

    /// Is this node a leaf?
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.data, OctNodeData::Leaf(_))
    }

    /// The octant of this node a point falls in.
    ///
    /// Branching is always decided by a strict `< mid` comparison, so a point lying on a
    /// splitting plane deterministically goes to the upper child.
    #[inline]
    pub fn octant_of(&self, pt: &Point<Real>) -> usize {
        octant_index(&self.mid, pt)
    }
}

#[inline]
pub(super) fn octant_index(mid: &Point<Real>, pt: &Point<Real>) -> usize {
    let mut octant = 0;

    for i in 0..DIM {
        if pt[i] >= mid[i] {
            octant |= 1 << i;
        }
    }

    octant
}

/// An adaptive octree over points, stored as an arena of nodes.
///
/// Leaves are split once they hold more than [`OctTree::SPLIT_THRESHOLD`] points that are
/// not nearly coincident. The root grows upward when a point falls outside its bounds.
#[derive(Clone, Debug)]
pub struct OctTree {
    pub(super) nodes: Vec<OctNode>,
    pub(super) root: NodeIndex,
    pub(super) num_points: usize,
}

impl OctTree {
    /// A leaf is split once it holds more points than this.
    pub const SPLIT_THRESHOLD: usize = 100;
    /// A leaf is only split if the diagonal of its points' bounding box exceeds this
    /// fraction of the leaf's own diagonal.
    pub const SPREAD_RATIO: Real = 0.01;

    /// Creates an empty octree covering `bounds`.
    ///
    /// The bounds are only the initial root extent: inserting a point outside of them
    /// grows the tree.
    ///
    /// Axes along which `bounds` is flat are widened to a unit extent, so the root can
    /// always grow by doubling.
    pub fn new(mut bounds: Aabb) -> Self {
        for i in 0..DIM {
            if bounds.maxs[i] - bounds.mins[i] <= 0.0 {
                bounds.mins[i] -= 0.5;
                bounds.maxs[i] += 0.5;
            }
        }

        Self {
            nodes: vec![OctNode::leaf(bounds)],
            root: 0,
            num_points: 0,
        }
    }

    /// The region currently covered by the root node.
    #[inline]
    pub fn root_bounds(&self) -> &Aabb {
        &self.nodes[self.root as usize].bounds
    }

    /// The number of points stored in this tree.
    #[inline]
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Is this tree empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_points == 0
    }

    /// The root node index.
    #[inline]
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// All the nodes of this tree, including emptied leaves.
    #[inline]
    pub fn nodes(&self) -> &[OctNode] {
        &self.nodes
    }

    /// Removes every point for which `f` returns `false`.
    ///
    /// Every leaf is scanned. Emptied leaves are kept: the tree is never collapsed.
    /// Returns the number of removed points.
    pub fn retain(&mut self, mut f: impl FnMut(&LocatorPoint) -> bool) -> usize {
        let mut removed = 0;

        for node in &mut self.nodes {
            if let OctNodeData::Leaf(points) = &mut node.data {
                let len = points.len();
                points.retain(&mut f);

                if points.len() != len {
                    removed += len - points.len();
                    node.points_bounds = Aabb::from_points(points.iter().map(|p| p.coords));
                }
            }
        }

        self.num_points -= removed;
        removed
    }
}

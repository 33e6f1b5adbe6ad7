pub use octree_tree::{LocatorPoint, NodeIndex, OctNode, OctNodeData, OctTree};

mod octree_insert;
mod octree_queries;
mod octree_tree;

#[cfg(test)]
mod octree_tests;

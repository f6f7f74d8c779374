//! [BSP](https://en.wikipedia.org/wiki/Binary_space_partitioning) tree construction
//! over a queue of cells and candidate cutting planes.
//!
//! The tree is an arena of nodes indexed by [`NodeId`]: a strict ownership
//! tree with no back references, immutable once built. Cutting planes are
//! applied in input order with no reordering heuristics, so identical input
//! always reproduces the same tree; determinism is chosen over tree balance.

use crate::aabb;
use crate::cell::Cell;
use crate::errors::ConstructError;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::plane::Plane;
use nalgebra::Point3;
use std::collections::VecDeque;

/// Index of a node in the tree's arena.
pub type NodeId = usize;

/// One node of the partition tree.
#[derive(Debug, Clone)]
pub enum BspNode {
    /// A region split by `plane` into a positive- and a negative-side child.
    Interior {
        plane: Plane,
        front: NodeId,
        back: NodeId,
    },
    /// A finished convex region; `cell` indexes the leaf cell list.
    Leaf { cell: usize },
}

/// The finished partition tree. Leaves reference cells by their stable id
/// (discovery order).
#[derive(Debug, Clone)]
pub struct BspTree {
    nodes: Vec<BspNode>,
}

/// Placeholder for a node whose children are still queued.
const UNRESOLVED: usize = usize::MAX;

impl BspTree {
    /// Recursively partition `bounds` by `planes`, in input order.
    ///
    /// Returns the tree and its leaf cells, ids in discovery order. For each
    /// queued cell, the next candidate plane that actually crosses the cell's
    /// extent performs the split; planes that miss or graze a cell are skipped
    /// for that branch (they cannot cross any descendant either, so candidate
    /// lists are always suffixes of the input order and strictly shrink).
    ///
    /// Fails with [`ConstructError::UnboundedInput`] when `bounds` is not a
    /// usable extent.
    pub fn build(
        planes: &[Plane],
        bounds: &Aabb,
        epsilon: Real,
    ) -> Result<(BspTree, Vec<Cell>), ConstructError> {
        if !aabb::usable(bounds, epsilon) {
            return Err(ConstructError::UnboundedInput);
        }

        let mut nodes: Vec<BspNode> = vec![BspNode::Leaf { cell: UNRESOLVED }];
        let mut cells: Vec<Cell> = Vec::new();
        let mut queue: VecDeque<(NodeId, Cell, usize)> = VecDeque::new();
        queue.push_back((0, Cell::from_bounds(bounds), 0));

        while let Some((slot, cell, first_candidate)) = queue.pop_front() {
            let mut chosen = None;
            for index in first_candidate..planes.len() {
                let plane = &planes[index];
                if !plane.crosses_aabb(cell.aabb(), epsilon) {
                    continue;
                }
                if let Some((front, back)) = cell.split(plane, index, epsilon) {
                    chosen = Some((index, front, back));
                    break;
                }
            }

            match chosen {
                Some((index, front, back)) => {
                    let front_id = nodes.len();
                    nodes.push(BspNode::Leaf { cell: UNRESOLVED });
                    let back_id = nodes.len();
                    nodes.push(BspNode::Leaf { cell: UNRESOLVED });
                    nodes[slot] = BspNode::Interior {
                        plane: planes[index],
                        front: front_id,
                        back: back_id,
                    };
                    queue.push_back((front_id, front, index + 1));
                    queue.push_back((back_id, back, index + 1));
                },
                None => {
                    let id = cells.len();
                    cells.push(cell);
                    nodes[slot] = BspNode::Leaf { cell: id };
                },
            }
        }

        log::debug!(
            "bsp construction: {} leaf cells from {} planes",
            cells.len(),
            planes.len()
        );
        Ok((BspTree { nodes }, cells))
    }

    /// Root node id.
    pub const fn root(&self) -> NodeId {
        0
    }

    pub fn node(&self, id: NodeId) -> &BspNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Descend to the leaf cell containing `point`.
    ///
    /// Points exactly on a splitting plane resolve to the back child; points
    /// outside the initial bounds resolve to the nearest boundary cell.
    pub fn locate(&self, point: &Point3<Real>) -> usize {
        let mut id = self.root();
        loop {
            match &self.nodes[id] {
                BspNode::Interior { plane, front, back } => {
                    id = if plane.signed_distance(point) > 0.0 {
                        *front
                    } else {
                        *back
                    };
                },
                BspNode::Leaf { cell } => return *cell,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    const EPS: Real = 1e-9;

    fn bounds() -> Aabb {
        Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0))
    }

    fn axis_plane(normal: Vector3<Real>, offset: Real) -> Plane {
        Plane { normal, offset }
    }

    #[test]
    fn no_planes_yield_one_leaf() {
        let (tree, cells) = BspTree::build(&[], &bounds(), EPS).unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.locate(&Point3::origin()), 0);
    }

    #[test]
    fn one_plane_yields_two_leaves() {
        let planes = [axis_plane(Vector3::x(), 0.0)];
        let (tree, cells) = BspTree::build(&planes, &bounds(), EPS).unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(tree.len(), 3);

        let front_id = tree.locate(&Point3::new(0.5, 0.0, 0.0));
        let back_id = tree.locate(&Point3::new(-0.5, 0.0, 0.0));
        assert_ne!(front_id, back_id);
        assert!(cells[front_id].centroid().x > 0.0);
    }

    #[test]
    fn missing_planes_are_skipped() {
        let planes = [
            axis_plane(Vector3::x(), 5.0), // outside the bounds
            axis_plane(Vector3::x(), 0.0),
        ];
        let (_, cells) = BspTree::build(&planes, &bounds(), EPS).unwrap();
        assert_eq!(cells.len(), 2);
    }

    #[test]
    fn duplicate_planes_contribute_no_split() {
        let planes = [
            axis_plane(Vector3::x(), 0.0),
            axis_plane(Vector3::x(), 0.0),
        ];
        let (_, cells) = BspTree::build(&planes, &bounds(), EPS).unwrap();
        assert_eq!(cells.len(), 2);
    }

    #[test]
    fn locate_agrees_with_containment() {
        let planes = [
            axis_plane(Vector3::x(), 0.0),
            axis_plane(Vector3::y(), 0.0),
            axis_plane(Vector3::z(), 0.0),
        ];
        let (tree, cells) = BspTree::build(&planes, &bounds(), EPS).unwrap();
        assert_eq!(cells.len(), 8);
        for (id, cell) in cells.iter().enumerate() {
            assert_eq!(tree.locate(&cell.centroid()), id);
            assert!(cell.contains(&cell.centroid(), EPS));
        }
    }

    #[test]
    fn unusable_bounds_are_rejected() {
        let planes = [axis_plane(Vector3::x(), 0.0)];
        let flat = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0));
        let result = BspTree::build(&planes, &flat, EPS);
        assert_eq!(result.unwrap_err(), ConstructError::UnboundedInput);
    }
}

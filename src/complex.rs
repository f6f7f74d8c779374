//! The assembled cell complex: cells, their BSP tree, and the adjacency graph.

use crate::adjacency::{self, AdjacencyGraph};
use crate::bsp::BspTree;
use crate::cell::Cell;
use crate::errors::ConstructError;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::plane::Plane;
use crate::polygon::Polygon;
use nalgebra::Point3;
use std::collections::BTreeSet;

/// A linear cell complex: convex cells partitioning a bounded region of
/// space, plus their adjacency graph.
///
/// Read-only after construction. Cell ids are stable indices in discovery
/// order; adjacency is symmetric and irreflexive, and every adjacency edge
/// carries the shared boundary facet.
#[derive(Debug, Clone)]
pub struct CellComplex {
    planes: Vec<Plane>,
    bounds: Aabb,
    epsilon: Real,
    cells: Vec<Cell>,
    tree: BspTree,
    graph: AdjacencyGraph,
}

impl CellComplex {
    /// Construct the complex. The sole entry point.
    ///
    /// `planes` are applied strictly in the given order (reorder beforehand
    /// with [`crate::plane::vertical_first`] if desired). `bounds` is the
    /// initial extent to partition; the import layer computes it from its
    /// point cloud, padded as needed. `epsilon` is the distance tolerance
    /// threaded through every predicate; the adjacency area gate is
    /// `epsilon²`, so keep `epsilon` well below the facet scale of the input.
    /// `parallel` distributes the neighbor tests over the rayon pool; the
    /// result is identical to a sequential run, and at small scale the
    /// coordination overhead usually makes it slower.
    ///
    /// # Errors
    /// [`ConstructError::DegeneratePlane`] for unusable input planes,
    /// [`ConstructError::UnboundedInput`] for an unusable extent,
    /// [`ConstructError::Worker`] when a parallel neighbor test fails.
    pub fn construct(
        planes: &[Plane],
        bounds: Aabb,
        epsilon: Real,
        parallel: bool,
    ) -> Result<Self, ConstructError> {
        let epsilon = epsilon.max(Real::EPSILON);

        // Plane extraction stage: own a validated, unit-normal copy.
        let mut validated = Vec::with_capacity(planes.len());
        for (index, plane) in planes.iter().enumerate() {
            let plane = plane.normalized(epsilon).ok_or_else(|| {
                ConstructError::DegeneratePlane(format!(
                    "input plane {index} has a zero-length or non-finite normal"
                ))
            })?;
            validated.push(plane);
        }

        let (tree, cells) = BspTree::build(&validated, &bounds, epsilon)?;
        let graph = adjacency::assemble(&cells, epsilon, parallel)?;

        log::info!(
            "constructed cell complex: {} planes, {} cells, {} adjacency edges",
            validated.len(),
            cells.len(),
            graph.num_edges()
        );

        Ok(CellComplex {
            planes: validated,
            bounds,
            epsilon,
            cells,
            tree,
            graph,
        })
    }

    /// All cells, indexed by their stable id.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, id: usize) -> Option<&Cell> {
        self.cells.get(id)
    }

    /// Number of cells in the complex.
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Number of (validated) input planes, excluding the initial bounds.
    pub fn num_planes(&self) -> usize {
        self.planes.len()
    }

    /// The validated input planes, in application order.
    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// The initial extent that was partitioned.
    pub const fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// The tolerance the complex was built with.
    pub const fn epsilon(&self) -> Real {
        self.epsilon
    }

    /// The partition tree over the cells.
    pub const fn tree(&self) -> &BspTree {
        &self.tree
    }

    /// Ids of the cells sharing a boundary facet with `id`.
    pub fn neighbors(&self, id: usize) -> &BTreeSet<usize> {
        &self.graph.neighbors[id]
    }

    /// Outward-oriented bounding facets of cell `id`, each carrying the index
    /// of the input plane that generated it (`None` for bounds walls).
    pub fn boundary_facets(&self, id: usize) -> &[Polygon] {
        self.cells[id].facets()
    }

    /// The facet shared by an adjacent pair, oriented from the lower toward
    /// the higher id. `None` when the cells are not adjacent.
    pub fn interface(&self, a: usize, b: usize) -> Option<&Polygon> {
        let key = if a < b { (a, b) } else { (b, a) };
        self.graph.interfaces.get(&key)
    }

    /// All adjacency edges `(a, b, shared facet)` with `a < b`, in ascending
    /// id order. This is what the export layer walks to emit one polygon per
    /// inter-cell interface.
    pub fn interfaces(&self) -> impl Iterator<Item = (usize, usize, &Polygon)> {
        self.graph
            .neighbors
            .iter()
            .enumerate()
            .flat_map(move |(a, neighbors)| {
                neighbors
                    .iter()
                    .filter(move |&&b| a < b)
                    .filter_map(move |&b| self.graph.interfaces.get(&(a, b)).map(|p| (a, b, p)))
            })
    }

    /// Total number of adjacency edges.
    pub fn num_edges(&self) -> usize {
        self.graph.num_edges()
    }

    /// Per-cell volumes, indexed by cell id.
    pub fn volumes(&self) -> Vec<Real> {
        self.cells.iter().map(Cell::volume).collect()
    }

    /// Id of the cell containing `point` (tree descent).
    pub fn locate(&self, point: &Point3<Real>) -> usize {
        self.tree.locate(point)
    }
}

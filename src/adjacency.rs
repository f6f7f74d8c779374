//! Adjacency discovery between finished cells.
//!
//! Two cells are adjacent iff they share a boundary facet of positive
//! (tolerance-bounded) area. The bounding-box sweep shortlists candidate
//! pairs; each candidate is confirmed by locating a coincident facet-plane
//! pair and intersecting the two fragments on their common plane. Pairs whose
//! shared area is at or below `epsilon²` are rejected as box-test false
//! positives.
//!
//! The parallel path distributes the independent pair checks with rayon and
//! merges the confirmed pairs afterwards; merging is an order-independent
//! union, so the resulting graph is identical to the sequential one.

use crate::broadphase;
use crate::cell::Cell;
use crate::errors::ConstructError;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::polygon::Polygon;
use hashbrown::HashMap;
use rayon::prelude::*;
use std::collections::BTreeSet;

/// Symmetric, irreflexive cell adjacency with the shared facet per edge.
///
/// Interface facets are stored once per unordered pair `(a, b)` with `a < b`,
/// oriented from `a` toward `b`.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyGraph {
    /// Neighbor ids per cell id; `BTreeSet` keeps iteration deterministic.
    pub neighbors: Vec<BTreeSet<usize>>,
    /// Shared facet per adjacent pair, keyed `(min id, max id)`.
    pub interfaces: HashMap<(usize, usize), Polygon>,
}

impl AdjacencyGraph {
    /// Number of adjacency edges.
    pub fn num_edges(&self) -> usize {
        self.interfaces.len()
    }
}

/// Discover all adjacent cell pairs.
///
/// `parallel` only changes how candidate pairs are scheduled, never the
/// result. A failing pair check aborts the whole assembly: a partial graph
/// would break the symmetry invariant.
pub fn assemble(
    cells: &[Cell],
    epsilon: Real,
    parallel: bool,
) -> Result<AdjacencyGraph, ConstructError> {
    let boxes: Vec<Aabb> = cells.iter().map(|c| *c.aabb()).collect();
    let candidates = broadphase::intersecting_pairs(&boxes, epsilon);
    log::debug!(
        "adjacency assembly: {} candidate pairs for {} cells",
        candidates.len(),
        cells.len()
    );

    let confirmed: Vec<Option<((usize, usize), Polygon)>> = if parallel {
        candidates
            .par_iter()
            .map(|&(a, b)| confirm_pair(cells, a, b, epsilon))
            .collect::<Result<Vec<_>, ConstructError>>()?
    } else {
        candidates
            .iter()
            .map(|&(a, b)| confirm_pair(cells, a, b, epsilon))
            .collect::<Result<Vec<_>, ConstructError>>()?
    };

    let mut graph = AdjacencyGraph {
        neighbors: vec![BTreeSet::new(); cells.len()],
        interfaces: HashMap::new(),
    };
    for ((a, b), facet) in confirmed.into_iter().flatten() {
        graph.neighbors[a].insert(b);
        graph.neighbors[b].insert(a);
        graph.interfaces.insert((a, b), facet);
    }

    log::debug!("adjacency assembly: {} edges confirmed", graph.num_edges());
    Ok(graph)
}

/// Exact adjacency test for one candidate pair.
///
/// Scans for a facet of `a` and a facet of `b` on coincident planes, in
/// either orientation, and intersects the fragments in-plane. The facet of
/// `a` leads, so confirmed interfaces point from `a` toward `b`.
fn confirm_pair(
    cells: &[Cell],
    a: usize,
    b: usize,
    epsilon: Real,
) -> Result<Option<((usize, usize), Polygon)>, ConstructError> {
    for facet_a in cells[a].facets() {
        for facet_b in cells[b].facets() {
            if !facet_a.plane.coincident(&facet_b.plane, epsilon) {
                continue;
            }
            let Some(shared) = facet_a.intersect_coplanar(facet_b, epsilon) else {
                continue;
            };
            let area = shared.area();
            if !area.is_finite() {
                return Err(ConstructError::Worker(format!(
                    "non-finite interface area between cells {a} and {b}"
                )));
            }
            if area > epsilon * epsilon {
                return Ok(Some(((a, b), shared)));
            }
        }
    }
    Ok(None)
}

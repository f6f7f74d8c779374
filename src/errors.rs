//! Construction errors

use std::fmt::Display;

/// Everything that can abort cell-complex construction.
///
/// Tolerance-driven outcomes (near-touching boxes treated as intersecting,
/// near-zero-area shared facets rejected) are *policy*, not errors; they never
/// surface here. Each message names the stage that failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConstructError {
    /// (DegeneratePlane) Input geometry does not define a usable plane:
    /// coincident or collinear points within tolerance, or a zero-length /
    /// non-finite normal.
    DegeneratePlane(String),
    /// (UnboundedInput) No usable initial extent: the supplied bounding volume
    /// is non-finite or thinner than the tolerance along some axis.
    UnboundedInput,
    /// (Worker) A neighbor-test worker failed. The whole assembly is aborted
    /// rather than returning a partial adjacency graph.
    Worker(String),
}

impl Display for ConstructError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstructError::DegeneratePlane(detail) => {
                write!(f, "plane extraction failed: {detail}")
            },
            ConstructError::UnboundedInput => {
                write!(f, "BSP construction failed: no usable initial extent")
            },
            ConstructError::Worker(detail) => {
                write!(f, "adjacency assembly failed: {detail}")
            },
        }
    }
}
